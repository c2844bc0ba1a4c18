//! Store-level statistics: global means, grouped means, and filter vocabularies.

use crate::aggregate::group::{group_by, rank, Order};
use crate::record::{Field, FieldValue, Record};
use serde::{Deserialize, Serialize};

/// Whole-store summary shown on the dashboard's stat cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    pub avg_intensity: Option<f64>,
    pub avg_likelihood: Option<f64>,
    pub avg_relevance: Option<f64>,
    pub total_records: usize,
    pub min_year: Option<i64>,
    pub max_year: Option<i64>,
}

/// Per-value statistics for the grouped-aggregation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupStats {
    /// The grouped column value.
    #[serde(rename = "_id")]
    pub id: FieldValue,
    pub avg_intensity: Option<f64>,
    pub avg_likelihood: Option<f64>,
    pub avg_relevance: Option<f64>,
    pub count: usize,
}

/// Distinct values per filterable column, used to populate the filter dropdowns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Sorted descending.
    pub end_years: Vec<i64>,
    pub sectors: Vec<String>,
    pub regions: Vec<String>,
    pub pestles: Vec<String>,
    pub sources: Vec<String>,
    pub countries: Vec<String>,
    pub cities: Vec<String>,
    pub topics: Vec<String>,
}

fn scores(record: &Record) -> [Option<f64>; 3] {
    [record.intensity, record.likelihood, record.relevance]
}

/// Means of intensity, likelihood and relevance over all records, plus the record
/// count and the `end_year` range. Returns `None` for an empty input.
///
/// Missing values are excluded from each mean independently.
pub fn global_stats<'a>(records: impl IntoIterator<Item = &'a Record>) -> Option<GlobalStats> {
    let mut min_year: Option<i64> = None;
    let mut max_year: Option<i64> = None;
    let groups = group_by(
        records.into_iter().inspect(|r| {
            if let Some(y) = r.end_year {
                min_year = Some(min_year.map_or(y, |m| m.min(y)));
                max_year = Some(max_year.map_or(y, |m| m.max(y)));
            }
        }),
        |_| Some(()),
        |r| scores(r),
    );
    let all = groups.into_iter().next()?;
    Some(GlobalStats {
        avg_intensity: all.mean(0),
        avg_likelihood: all.mean(1),
        avg_relevance: all.mean(2),
        total_records: all.count,
        min_year,
        max_year,
    })
}

/// Groups records by `field`, skipping missing and empty values, and returns
/// per-group means and counts sorted by count descending, capped at `limit`.
pub fn grouped_stats<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    field: Field,
    limit: usize,
) -> Vec<GroupStats> {
    let groups = group_by(
        records,
        |r| r.field(field).filter(|v| !v.is_blank()),
        |r| scores(r),
    );
    rank(groups, |g| g.count, Order::Descending, Some(limit))
        .into_iter()
        .map(|g| GroupStats {
            avg_intensity: g.mean(0),
            avg_likelihood: g.mean(1),
            avg_relevance: g.mean(2),
            count: g.count,
            id: g.key,
        })
        .collect()
}

/// Distinct non-empty values of `field` in first-seen order.
pub fn distinct_values<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    field: Field,
) -> Vec<FieldValue> {
    group_by(
        records,
        |r| r.field(field).filter(|v| !v.is_blank()),
        |_| [None::<f64>; 0],
    )
    .into_iter()
    .map(|g| g.key)
    .collect()
}

fn distinct_text(records: &[&Record], field: Field) -> Vec<String> {
    distinct_values(records.iter().copied(), field)
        .into_iter()
        .filter_map(|v| match v {
            FieldValue::Text(s) => Some(s),
            _ => None,
        })
        .collect()
}

/// Builds the filter vocabularies over the whole input, ignoring any active filter.
pub fn filter_options<'a>(records: impl IntoIterator<Item = &'a Record>) -> FilterOptions {
    let records: Vec<&Record> = records.into_iter().collect();
    let mut end_years: Vec<i64> = distinct_values(records.iter().copied(), Field::EndYear)
        .iter()
        .filter_map(FieldValue::as_i64)
        .collect();
    end_years.sort_unstable_by(|a, b| b.cmp(a));

    FilterOptions {
        end_years,
        sectors: distinct_text(&records, Field::Sector),
        regions: distinct_text(&records, Field::Region),
        pestles: distinct_text(&records, Field::Pestle),
        sources: distinct_text(&records, Field::Source),
        countries: distinct_text(&records, Field::Country),
        cities: distinct_text(&records, Field::City),
        topics: distinct_text(&records, Field::Topic),
    }
}
