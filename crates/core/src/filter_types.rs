//! Filter types shared by the store, the HTTP layer, and the dashboard view.
//!
//! [`FilterParams`] is the raw, string-valued form that travels in query
//! strings. [`FilterSet`] is the parsed form the store evaluates, and
//! [`Page`] is the pagination window.

use crate::config;
use crate::error::FilterError;
use crate::record::{Field, FieldValue};
use serde::{Deserialize, Serialize};

/// A filterable query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    EndYear,
    Topics,
    Sector,
    Region,
    Pestle,
    Source,
    Country,
    City,
}

impl FilterKey {
    pub const ALL: [FilterKey; 8] = [
        FilterKey::EndYear,
        FilterKey::Topics,
        FilterKey::Sector,
        FilterKey::Region,
        FilterKey::Pestle,
        FilterKey::Source,
        FilterKey::Country,
        FilterKey::City,
    ];

    /// Query parameter name.
    pub fn param(self) -> &'static str {
        match self {
            FilterKey::EndYear => "end_year",
            FilterKey::Topics => "topics",
            FilterKey::Sector => "sector",
            FilterKey::Region => "region",
            FilterKey::Pestle => "pestle",
            FilterKey::Source => "source",
            FilterKey::Country => "country",
            FilterKey::City => "city",
        }
    }

    /// Record column constrained by this parameter. `topics` maps to `topic`.
    pub fn field(self) -> Field {
        match self {
            FilterKey::EndYear => Field::EndYear,
            FilterKey::Topics => Field::Topic,
            FilterKey::Sector => Field::Sector,
            FilterKey::Region => Field::Region,
            FilterKey::Pestle => Field::Pestle,
            FilterKey::Source => Field::Source,
            FilterKey::Country => Field::Country,
            FilterKey::City => Field::City,
        }
    }
}

/// String-valued filter parameters, as sent by the dashboard.
///
/// `None` and `""` both mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParams {
    #[serde(default, skip_serializing_if = "is_unset")]
    pub end_year: Option<String>,
    #[serde(default, skip_serializing_if = "is_unset")]
    pub topics: Option<String>,
    #[serde(default, skip_serializing_if = "is_unset")]
    pub sector: Option<String>,
    #[serde(default, skip_serializing_if = "is_unset")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "is_unset")]
    pub pestle: Option<String>,
    #[serde(default, skip_serializing_if = "is_unset")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "is_unset")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "is_unset")]
    pub city: Option<String>,
}

fn is_unset(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

impl FilterParams {
    fn slot(&mut self, key: FilterKey) -> &mut Option<String> {
        match key {
            FilterKey::EndYear => &mut self.end_year,
            FilterKey::Topics => &mut self.topics,
            FilterKey::Sector => &mut self.sector,
            FilterKey::Region => &mut self.region,
            FilterKey::Pestle => &mut self.pestle,
            FilterKey::Source => &mut self.source,
            FilterKey::Country => &mut self.country,
            FilterKey::City => &mut self.city,
        }
    }

    /// Returns the non-empty value set for `key`, if any.
    pub fn get(&self, key: FilterKey) -> Option<&str> {
        let value = match key {
            FilterKey::EndYear => &self.end_year,
            FilterKey::Topics => &self.topics,
            FilterKey::Sector => &self.sector,
            FilterKey::Region => &self.region,
            FilterKey::Pestle => &self.pestle,
            FilterKey::Source => &self.source,
            FilterKey::Country => &self.country,
            FilterKey::City => &self.city,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }

    /// Sets `key` to `value`; an empty value clears the constraint.
    pub fn set(&mut self, key: FilterKey, value: impl Into<String>) {
        let value = value.into();
        *self.slot(key) = (!value.is_empty()).then_some(value);
    }

    /// `true` when no parameter carries a value.
    pub fn is_empty(&self) -> bool {
        FilterKey::ALL.iter().all(|k| self.get(*k).is_none())
    }

    /// Parses the parameters into an equality filter set.
    ///
    /// `end_year` must be an integer; text parameters are matched verbatim.
    pub fn to_filter_set(&self) -> Result<FilterSet, FilterError> {
        let mut set = FilterSet::new();
        for key in FilterKey::ALL {
            let Some(raw) = self.get(key) else { continue };
            let value = match key.field() {
                Field::EndYear => FieldValue::Integer(parse_integer(key.param(), raw)?),
                _ => FieldValue::Text(raw.to_string()),
            };
            set.push(key.field(), value);
        }
        Ok(set)
    }
}

fn parse_integer(param: &'static str, raw: &str) -> Result<i64, FilterError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| FilterError::NotAnInteger {
            param,
            value: raw.to_string(),
        })
}

/// One equality constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: Field,
    pub value: FieldValue,
}

/// A conjunction of equality constraints. An empty set matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    pub conditions: Vec<Condition>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`FilterSet::push`].
    pub fn with(mut self, field: Field, value: impl Into<FieldValue>) -> Self {
        self.push(field, value);
        self
    }

    pub fn push(&mut self, field: Field, value: impl Into<FieldValue>) {
        self.conditions.push(Condition {
            field,
            value: value.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// Pagination window over a filtered scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: usize,
    pub skip: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: config::DEFAULT_PAGE_LIMIT,
            skip: 0,
        }
    }
}

impl Page {
    /// Parses optional `limit` and `skip` query values.
    ///
    /// Missing or empty values take the defaults (1000 and 0).
    pub fn parse(limit: Option<&str>, skip: Option<&str>) -> Result<Page, FilterError> {
        let mut page = Page::default();
        if let Some(raw) = limit.filter(|v| !v.is_empty()) {
            page.limit = parse_count("limit", raw)?;
            if page.limit == 0 || page.limit > config::MAX_PAGE_LIMIT {
                return Err(FilterError::OutOfRange {
                    param: "limit",
                    min: 1,
                    max: config::MAX_PAGE_LIMIT,
                });
            }
        }
        if let Some(raw) = skip.filter(|v| !v.is_empty()) {
            page.skip = parse_count("skip", raw)?;
        }
        Ok(page)
    }
}

fn parse_count(param: &'static str, raw: &str) -> Result<usize, FilterError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| FilterError::NotAnInteger {
            param,
            value: raw.to_string(),
        })
}
