use fluxq::{Experimental, Flux, Measurement, col};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let org = "my-org";
    let bucket = "telemetry";
    let influx_url = "http://localhost:8086";
    let token = "my-token";

    let client = fluxq_client::Client::new(influx_url, org, token)?;

    let measurements = vec![
        Measurement::builder("cpu_load_short")
            .tag("host", "server01")
            .tag("region", "us-west")
            .field("value", 0.64)
            .timestamp(1625659548)
            .build(),
        Measurement::builder("cpu_load_short")
            .tag("host", "server01")
            .field("value", 27.99)
            .build(),
    ];

    client.write(bucket, &measurements).await?;

    let query = Flux::from_bucket(bucket)
        .range("-15m")?
        .filter(col("_measurement").equals("cpu_load_short"))
        .pivot(None, None, None)
        .unpivot(None)
        .limit(Some(5), None);

    for record in client.query_records(&query).await? {
        println!("{:?}", record.values);
    }

    Ok(())
}
