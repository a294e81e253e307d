//! Semantic type inference for a single column.
//!
//! Rules are checked in a fixed order and the first whose share of the
//! non-null values is strictly above its threshold wins:
//!
//! 1. temporal, more than 80% parse as calendar dates
//! 2. numeric, more than 80% parse as finite numbers
//! 3. boolean, more than 80% read as `true/false/0/1/yes/no`
//! 4. categorical, fewer than half of the values are distinct
//! 5. text otherwise, and for columns with no non-null values at all
//!
//! The order matters: a `0/1` flag column is numeric, never boolean or
//! categorical.

use std::collections::HashSet;

use crate::models::{ColumnType, ScalarValue};

use super::values::ScalarKey;

pub const TEMPORAL_THRESHOLD: f64 = 0.8;
pub const NUMERIC_THRESHOLD: f64 = 0.8;
pub const BOOLEAN_THRESHOLD: f64 = 0.8;
pub const CATEGORICAL_DISTINCT_RATIO: f64 = 0.5;

const BOOLEAN_TOKENS: [&str; 6] = ["true", "false", "0", "1", "yes", "no"];

/// Counts gathered in one pass over a column.
#[derive(Debug, Default)]
struct TypeTally<'a> {
    non_null: usize,
    temporal: usize,
    numeric: usize,
    boolean: usize,
    distinct: HashSet<ScalarKey<'a>>,
}

impl<'a> TypeTally<'a> {
    fn observe(&mut self, value: &'a ScalarValue) {
        if value.is_null() {
            return;
        }

        self.non_null += 1;
        self.distinct.insert(value.key());

        if value.as_timestamp().is_some() {
            self.temporal += 1;
        }
        if value.as_number().is_some() {
            self.numeric += 1;
        }
        if is_boolean_token(value) {
            self.boolean += 1;
        }
    }

    fn share(&self, matches: usize) -> f64 {
        matches as f64 / self.non_null as f64
    }

    fn decide(&self) -> ColumnType {
        if self.non_null == 0 {
            return ColumnType::Text;
        }

        match () {
            _ if self.share(self.temporal) > TEMPORAL_THRESHOLD => ColumnType::Temporal,
            _ if self.share(self.numeric) > NUMERIC_THRESHOLD => ColumnType::Numeric,
            _ if self.share(self.boolean) > BOOLEAN_THRESHOLD => ColumnType::Boolean,
            _ if self.share(self.distinct.len()) < CATEGORICAL_DISTINCT_RATIO => ColumnType::Categorical,
            _ => ColumnType::Text,
        }
    }
}

fn is_boolean_token(value: &ScalarValue) -> bool {
    let text = value.display_string();
    BOOLEAN_TOKENS.iter().any(|token| text.eq_ignore_ascii_case(token))
}

/// Classifies a column's values. Total over any input: an empty or all-null
/// column is [`ColumnType::Text`].
pub fn infer_column_type<'a, I>(values: I) -> ColumnType
where
    I: IntoIterator<Item = &'a ScalarValue>,
{
    let mut tally = TypeTally::default();
    for value in values {
        tally.observe(value);
    }
    tally.decide()
}
