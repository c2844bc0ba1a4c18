//! Chart data derived from the currently fetched page of records.
//!
//! Each chart is one instance of the [`group_by`] → finalize → [`rank`]
//! pipeline. Missing numeric values count as zero here, matching how the
//! dashboard has always plotted them, unlike the server-side statistics
//! which exclude them.

use crate::aggregate::group::{group_by, rank, round2, Order};
use crate::config;
use crate::record::Record;
use serde::{Deserialize, Serialize};

/// One labelled bar or slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub name: String,
    pub value: f64,
}

/// Mean scores for one `end_year`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearPoint {
    pub year: i64,
    pub intensity: f64,
    pub likelihood: f64,
    pub relevance: f64,
}

/// Every chart the dashboard renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardCharts {
    pub intensity_by_country: Vec<ChartPoint>,
    pub likelihood_by_topic: Vec<ChartPoint>,
    pub relevance_by_region: Vec<ChartPoint>,
    pub year_trend: Vec<YearPoint>,
    pub sector_distribution: Vec<ChartPoint>,
    pub city_distribution: Vec<ChartPoint>,
}

impl DashboardCharts {
    /// Derives all charts from `records` (normally one fetched page).
    pub fn from_records(records: &[Record]) -> Self {
        Self {
            intensity_by_country: intensity_by_country(records),
            likelihood_by_topic: likelihood_by_topic(records),
            relevance_by_region: relevance_by_region(records),
            year_trend: year_trend(records),
            sector_distribution: sector_distribution(records),
            city_distribution: city_distribution(records),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

/// Cuts labels longer than [`config::CHART_LABEL_MAX_CHARS`] characters and appends `...`.
pub fn truncate_label(label: &str) -> String {
    match label.char_indices().nth(config::CHART_LABEL_MAX_CHARS) {
        Some((cut, _)) => format!("{}...", &label[..cut]),
        None => label.to_string(),
    }
}

fn mean_points<'a>(
    records: &'a [Record],
    key: impl Fn(&&'a Record) -> Option<&'a str>,
    metric: impl Fn(&Record) -> Option<f64>,
) -> Vec<ChartPoint> {
    group_by(records, key, |r| [Some(metric(r).unwrap_or(0.0))])
        .into_iter()
        .map(|g| ChartPoint {
            name: g.key.to_string(),
            value: round2(g.mean(0).unwrap_or(0.0)),
        })
        .collect()
}

fn count_points<'a>(
    records: &'a [Record],
    key: impl Fn(&&'a Record) -> Option<&'a str>,
    limit: usize,
) -> Vec<ChartPoint> {
    let points: Vec<ChartPoint> = group_by(records, key, |_| [None::<f64>; 0])
        .into_iter()
        .map(|g| ChartPoint {
            name: g.key.to_string(),
            value: g.count as f64,
        })
        .collect();
    rank(points, |p| p.value, Order::Descending, Some(limit))
}

/// Mean intensity per country, top 10 descending, labels truncated.
pub fn intensity_by_country(records: &[Record]) -> Vec<ChartPoint> {
    let points: Vec<ChartPoint> =
        mean_points(records, |r| non_empty(r.country.as_deref()), |r| r.intensity)
            .into_iter()
            .map(|p| ChartPoint {
                name: truncate_label(&p.name),
                value: p.value,
            })
            .collect();
    rank(
        points,
        |p| p.value,
        Order::Descending,
        Some(config::INTENSITY_CHART_TOP),
    )
}

/// Mean likelihood per trimmed topic, top 8 descending.
///
/// Topics whose likelihood sum or rounded mean is not positive are left out.
pub fn likelihood_by_topic(records: &[Record]) -> Vec<ChartPoint> {
    let groups = group_by(
        records,
        |r| non_empty(r.topic.as_deref().map(str::trim)),
        |r| [Some(r.likelihood.unwrap_or(0.0))],
    );
    let points: Vec<ChartPoint> = groups
        .into_iter()
        .filter(|g| g.count > 0 && g.sum(0) > 0.0)
        .map(|g| ChartPoint {
            name: g.key.to_string(),
            value: round2(g.mean(0).unwrap_or(0.0)),
        })
        .filter(|p| p.value > 0.0)
        .collect();
    rank(
        points,
        |p| p.value,
        Order::Descending,
        Some(config::LIKELIHOOD_CHART_TOP),
    )
}

/// Mean relevance per region, in first-seen order, uncapped.
pub fn relevance_by_region(records: &[Record]) -> Vec<ChartPoint> {
    mean_points(records, |r| non_empty(r.region.as_deref()), |r| r.relevance)
}

/// Mean intensity, likelihood and relevance per `end_year`, ascending by year.
pub fn year_trend(records: &[Record]) -> Vec<YearPoint> {
    let groups = group_by(
        records,
        |r| r.end_year.filter(|y| *y != 0),
        |r| {
            [
                Some(r.intensity.unwrap_or(0.0)),
                Some(r.likelihood.unwrap_or(0.0)),
                Some(r.relevance.unwrap_or(0.0)),
            ]
        },
    );
    let points: Vec<YearPoint> = groups
        .into_iter()
        .map(|g| YearPoint {
            year: g.key,
            intensity: round2(g.mean(0).unwrap_or(0.0)),
            likelihood: round2(g.mean(1).unwrap_or(0.0)),
            relevance: round2(g.mean(2).unwrap_or(0.0)),
        })
        .collect();
    rank(points, |p| p.year, Order::Ascending, None)
}

/// Record count per sector, top 10 descending.
pub fn sector_distribution(records: &[Record]) -> Vec<ChartPoint> {
    count_points(
        records,
        |r| non_empty(r.sector.as_deref()),
        config::SECTOR_CHART_TOP,
    )
}

/// Record count per city, top 8 descending.
pub fn city_distribution(records: &[Record]) -> Vec<ChartPoint> {
    count_points(
        records,
        |r| non_empty(r.city.as_deref()),
        config::CITY_CHART_TOP,
    )
}
