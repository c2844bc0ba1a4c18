//! Equality filtering engine for record queries.
//!
//! Evaluates a [`FilterSet`](crate::filter_types::FilterSet) against a record.
//! Every condition must hold; a record missing a constrained column never matches.

use crate::filter_types::{Condition, FilterSet, Page};
use crate::record::Record;
use std::borrow::Borrow;

/// Check if a record satisfies every condition of the filter set.
pub fn matches_filter(record: &Record, filter: &FilterSet) -> bool {
    filter
        .conditions
        .iter()
        .all(|cond| evaluate_condition(record, cond))
}

fn evaluate_condition(record: &Record, cond: &Condition) -> bool {
    match record.field(cond.field) {
        Some(value) => value == cond.value,
        None => false,
    }
}

/// Scan `records` in order, returning the page window of matches and the total match count.
///
/// Works over plain records and shared handles (`Arc<Record>`) alike.
pub fn paginate<'a, T, I>(records: I, filter: &FilterSet, page: Page) -> (Vec<&'a T>, usize)
where
    T: Borrow<Record> + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut total = 0usize;
    let mut window = Vec::new();
    for record in records {
        if !matches_filter(record.borrow(), filter) {
            continue;
        }
        if total >= page.skip && window.len() < page.limit {
            window.push(record);
        }
        total += 1;
    }
    (window, total)
}
