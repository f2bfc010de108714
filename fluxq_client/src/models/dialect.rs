//! Dialect

use serde::{Deserialize, Serialize};

/// Dialect are options to change the default CSV output format;
/// <https://www.w3.org/TR/2015/REC-tabular-metadata-20151217/#dialect-descriptions>
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dialect {
    /// If true, the results will contain a header row
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<bool>,
    /// Separator between cells; the default is ,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
    /// Annotation rows to include ahead of the header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Vec<Annotations>>,
}

impl Dialect {
    /// The dialect the response decoder expects: a header row plus group,
    /// datatype and default annotations.
    pub fn annotated() -> Self {
        Self {
            header: Some(true),
            delimiter: None,
            annotations: Some(vec![
                Annotations::Group,
                Annotations::Datatype,
                Annotations::Default,
            ]),
        }
    }
}

/// Annotation rows a query response can be asked to carry.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Annotations {
    /// Group Annotation
    Group,
    /// Datatype Annotation
    Datatype,
    /// Default Annotation
    Default,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotated_dialect_serializes_without_absent_fields() {
        let json = serde_json::to_string(&Dialect::annotated()).unwrap();
        assert_eq!(
            json,
            r#"{"header":true,"annotations":["group","datatype","default"]}"#
        );
    }
}
