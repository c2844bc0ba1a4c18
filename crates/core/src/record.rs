//! Core record types for pulseboard.
//!
//! A [`Record`] is one survey/report entry: a flat set of optional scalar
//! fields plus a store-assigned UUID. [`Field`] names every column, and
//! [`FieldValue`] carries a single column value for equality filters,
//! distinct-value lists, and group keys.

use crate::error::StoreError;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A stored survey/report record.
///
/// Every field is optional; no combination of fields is unique. Records are
/// created by bulk import and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Store-assigned identifier (UUID v4).
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub end_year: Option<i64>,
    pub start_year: Option<String>,
    pub intensity: Option<f64>,
    pub likelihood: Option<f64>,
    pub relevance: Option<f64>,
    pub sector: Option<String>,
    pub topic: Option<String>,
    pub region: Option<String>,
    pub pestle: Option<String>,
    pub source: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub insight: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub impact: Option<String>,
    pub published: Option<String>,
    pub added: Option<String>,
}

/// A named record column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    EndYear,
    StartYear,
    Intensity,
    Likelihood,
    Relevance,
    Sector,
    Topic,
    Region,
    Pestle,
    Source,
    Country,
    City,
    Insight,
    Url,
    Title,
    Impact,
    Published,
    Added,
}

impl Field {
    /// Every column, in schema order.
    pub const ALL: [Field; 18] = [
        Field::EndYear,
        Field::StartYear,
        Field::Intensity,
        Field::Likelihood,
        Field::Relevance,
        Field::Sector,
        Field::Topic,
        Field::Region,
        Field::Pestle,
        Field::Source,
        Field::Country,
        Field::City,
        Field::Insight,
        Field::Url,
        Field::Title,
        Field::Impact,
        Field::Published,
        Field::Added,
    ];

    /// Column name as it appears in JSON documents and query parameters.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::EndYear => "end_year",
            Field::StartYear => "start_year",
            Field::Intensity => "intensity",
            Field::Likelihood => "likelihood",
            Field::Relevance => "relevance",
            Field::Sector => "sector",
            Field::Topic => "topic",
            Field::Region => "region",
            Field::Pestle => "pestle",
            Field::Source => "source",
            Field::Country => "country",
            Field::City => "city",
            Field::Insight => "insight",
            Field::Url => "url",
            Field::Title => "title",
            Field::Impact => "impact",
            Field::Published => "published",
            Field::Added => "added",
        }
    }

    /// Looks up a column by its JSON name. Returns `None` for unknown names.
    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

/// A single column value.
///
/// Serialized untagged, so JSON sees a bare integer, number, or string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Integral column (`end_year`).
    Integer(i64),
    /// Floating-point column (`intensity`, `likelihood`, `relevance`).
    Number(OrderedFloat<f64>),
    /// Free-text column.
    Text(String),
}

impl FieldValue {
    /// `true` for the empty string. Missing values never reach a `FieldValue`.
    pub fn is_blank(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.is_empty())
    }

    /// Returns the integer payload, if this is an integer value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(OrderedFloat(v))
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl Record {
    /// Returns the value of `field`, or `None` when the column is absent.
    pub fn field(&self, field: Field) -> Option<FieldValue> {
        match field {
            Field::EndYear => self.end_year.map(FieldValue::from),
            Field::Intensity => self.intensity.map(FieldValue::from),
            Field::Likelihood => self.likelihood.map(FieldValue::from),
            Field::Relevance => self.relevance.map(FieldValue::from),
            _ => self.text(field).map(FieldValue::from),
        }
    }

    /// Borrows a free-text column. Returns `None` for numeric columns.
    pub fn text(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::StartYear => &self.start_year,
            Field::Sector => &self.sector,
            Field::Topic => &self.topic,
            Field::Region => &self.region,
            Field::Pestle => &self.pestle,
            Field::Source => &self.source,
            Field::Country => &self.country,
            Field::City => &self.city,
            Field::Insight => &self.insight,
            Field::Url => &self.url,
            Field::Title => &self.title,
            Field::Impact => &self.impact,
            Field::Published => &self.published,
            Field::Added => &self.added,
            Field::EndYear | Field::Intensity | Field::Likelihood | Field::Relevance => {
                return None
            }
        };
        value.as_deref()
    }

    /// Casts one imported JSON document into a record with a fresh UUID.
    ///
    /// `index` is the position in the import array and only feeds error messages.
    /// Numeric columns take numbers or numeric strings, and `""` means absent.
    /// Text columns keep strings verbatim and stringify numbers and booleans.
    /// Unknown keys are ignored.
    pub fn from_json(index: usize, value: &Value) -> Result<Record, StoreError> {
        let obj = value
            .as_object()
            .ok_or(StoreError::NotAnObject { index })?;
        let text = |field: Field| text_field(index, field, obj);
        let number = |field: Field| number_field(index, field, obj);

        Ok(Record {
            id: Uuid::new_v4(),
            end_year: year_field(index, obj)?,
            start_year: text(Field::StartYear)?,
            intensity: number(Field::Intensity)?,
            likelihood: number(Field::Likelihood)?,
            relevance: number(Field::Relevance)?,
            sector: text(Field::Sector)?,
            topic: text(Field::Topic)?,
            region: text(Field::Region)?,
            pestle: text(Field::Pestle)?,
            source: text(Field::Source)?,
            country: text(Field::Country)?,
            city: text(Field::City)?,
            insight: text(Field::Insight)?,
            url: text(Field::Url)?,
            title: text(Field::Title)?,
            impact: text(Field::Impact)?,
            published: text(Field::Published)?,
            added: text(Field::Added)?,
        })
    }
}

fn invalid(index: usize, field: Field, reason: String) -> StoreError {
    StoreError::InvalidField {
        index,
        field: field.as_str(),
        reason,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn number_field(index: usize, field: Field, obj: &Map<String, Value>) -> Result<Option<f64>, StoreError> {
    let parsed = match obj.get(field.as_str()) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(other) => {
            return Err(invalid(
                index,
                field,
                format!("expected a number, got {}", kind(other)),
            ))
        }
    };
    match parsed {
        Some(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(invalid(index, field, "is not a finite number".into())),
    }
}

fn year_field(index: usize, obj: &Map<String, Value>) -> Result<Option<i64>, StoreError> {
    match number_field(index, Field::EndYear, obj)? {
        None => Ok(None),
        Some(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(Some(v as i64)),
        Some(v) => Err(invalid(
            index,
            Field::EndYear,
            format!("must be a whole number, got {v}"),
        )),
    }
}

fn text_field(index: usize, field: Field, obj: &Map<String, Value>) -> Result<Option<String>, StoreError> {
    match obj.get(field.as_str()) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(invalid(
            index,
            field,
            format!("expected a string, got {}", kind(other)),
        )),
    }
}
