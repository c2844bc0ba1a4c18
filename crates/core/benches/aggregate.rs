//! Aggregation benchmark over a synthetic record set.
//! Measures filtered scans, grouped statistics, filter vocabularies and chart derivation.
//!
//! Usage: cargo bench --bench aggregate

use pulseboard_core::dashboard::DashboardCharts;
use pulseboard_core::{Field, FilterSet, Page, Record, RecordStore};
use std::time::Instant;
use uuid::Uuid;

const RECORDS: usize = 200_000;
const ITERATIONS: usize = 20;

const COUNTRIES: [&str; 12] = [
    "United States of America",
    "India",
    "Russia",
    "China",
    "Nigeria",
    "Brazil",
    "Iran",
    "Saudi Arabia",
    "Mexico",
    "Germany",
    "",
    "Canada",
];
const SECTORS: [&str; 7] = [
    "Energy",
    "Retail",
    "Manufacturing",
    "Financial services",
    "Government",
    "",
    "Transport",
];
const TOPICS: [&str; 9] = [
    "oil", "gas", "market", "growth", "economy", "coal", "gdp", "war", "",
];

/// Deterministic pseudo-random value in `0..m`.
fn pick(seed: usize, salt: usize, m: usize) -> usize {
    ((seed + 1).wrapping_mul(2654435761) ^ salt.wrapping_mul(40503)) % m
}

fn make_record(i: usize) -> Record {
    Record {
        id: Uuid::new_v4(),
        end_year: (i % 5 != 0).then(|| 2016 + pick(i, 1, 40) as i64),
        intensity: (i % 7 != 0).then(|| pick(i, 2, 72) as f64),
        likelihood: (i % 11 != 0).then(|| pick(i, 3, 5) as f64),
        relevance: Some(pick(i, 4, 7) as f64),
        country: Some(COUNTRIES[pick(i, 5, COUNTRIES.len())].to_string()),
        sector: Some(SECTORS[pick(i, 6, SECTORS.len())].to_string()),
        topic: Some(TOPICS[pick(i, 7, TOPICS.len())].to_string()),
        region: Some(format!("region-{}", pick(i, 8, 14))),
        city: Some(format!("city-{}", pick(i, 9, 60))),
        ..Record::default()
    }
}

fn time<T>(label: &str, mut f: impl FnMut() -> T) -> T {
    let mut out = f();
    let t0 = Instant::now();
    for _ in 0..ITERATIONS {
        out = f();
    }
    let per_iter = t0.elapsed().as_secs_f64() / ITERATIONS as f64;
    println!("{label:<28} {:>9.3} ms", per_iter * 1000.0);
    out
}

fn main() {
    println!("=== Aggregation Benchmark: {RECORDS} synthetic records ===");
    println!();

    let t0 = Instant::now();
    let store = RecordStore::new();
    store.insert_many((0..RECORDS).map(make_record));
    println!(
        "Insert time: {:.3}s ({:.0} records/s)",
        t0.elapsed().as_secs_f64(),
        RECORDS as f64 / t0.elapsed().as_secs_f64()
    );
    println!();

    let by_country = FilterSet::new().with(Field::Country, "India");
    let result = time("find (country, 1000)", || {
        store.find(&by_country, Page::default())
    });
    println!("  -> {} of {} matches returned", result.records.len(), result.total);

    time("find (unfiltered, 1000)", || {
        store.find(&FilterSet::new(), Page::default())
    });
    time("stats", || store.stats());
    let groups = time("grouped (sector)", || store.grouped("sector"));
    println!("  -> {} groups", groups.len());
    let options = time("filter options", || store.filter_options());
    println!("  -> {} end years, {} countries", options.end_years.len(), options.countries.len());

    let page: Vec<Record> = store
        .find(&FilterSet::new(), Page::default())
        .records
        .iter()
        .map(|r| (**r).clone())
        .collect();
    time("charts (1000-record page)", || DashboardCharts::from_records(&page));
}
