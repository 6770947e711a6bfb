//! Groups load metrics per host and averages them.
//!
//! This example shows how to:
//! - Fill an in-memory document store with raw load documents
//! - Build a client from a converter and a source
//! - Group by `name-host` and merge same-key series with a pointwise average
//!
//! Run with: cargo run --example load_average

use chronofold::{ChronixClient, DocumentConverter, Query, RawFragment, key, merge};
use chronofold_sources::{InMemorySource, InMemoryStore};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Load Average Example ===\n");

    let base_time = 1_609_459_200_000i64; // 2021-01-01 00:00:00 UTC
    let store = InMemoryStore::new();
    for (host, offset) in [("server1", 0.0), ("server2", 0.5), ("server1", 1.0)] {
        let points = (0..5).map(|i| (base_time + i * 60_000, offset + 0.25 * i as f64));
        store.add(
            RawFragment::new()
                .with_points(points)
                .with_field("name", "system.Load.avg")
                .with_field("host", host),
        );
    }
    println!("Stored {} documents\n", store.len());

    let client = ChronixClient::new(DocumentConverter::new().require("host"), InMemorySource);

    // We want the maximum of all series whose metric matches *Load*.
    let query = Query::new("name:*Load*").param("cf", "metric{max}");

    let series = client.collect(
        &store,
        &query,
        key::attributes(["name", "host"], "-"),
        merge::average(),
    )?;

    println!("Result for query {query}:");
    for ts in &series {
        let host = ts.attribute("host").map(ToString::to_string).unwrap_or_default();
        println!("  {host}: {} points", ts.len());
        for (timestamp, value) in ts.points() {
            println!("    {timestamp}: {value:.2}");
        }
    }

    Ok(())
}
