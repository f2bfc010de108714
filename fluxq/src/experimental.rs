//! Stages from the Flux `experimental` package.
//!
//! These live behind their own trait; bring [`Experimental`] into scope to
//! use them on a [`Flux`] pipeline.

use crate::query::Flux;
use crate::value::Columns;

/// Extension stages from `import "experimental"`.
///
/// Using one adds the import line to the rendered query exactly once,
/// however many experimental stages the pipeline contains.
pub trait Experimental {
    /// Appends `|> experimental.unpivot()`, turning pivoted columns back
    /// into `_field`/`_value` rows. Columns listed in `other_columns` are
    /// carried through instead of unpivoted.
    fn unpivot(&self, other_columns: Option<Columns>) -> Flux;
}

impl Experimental for Flux {
    fn unpivot(&self, other_columns: Option<Columns>) -> Flux {
        let component = match other_columns {
            Some(columns) => {
                format!("|> experimental.unpivot(otherColumns: {})", columns.into_value())
            }
            None => "|> experimental.unpivot()".to_string(),
        };
        self.with_import(component, "experimental")
    }
}
