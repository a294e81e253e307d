//! Column statistics, conditioned on the inferred column type.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::models::{ColumnStats, ColumnType, ScalarValue};

use super::values::ScalarKey;

/// Numeric summary over the values of a column that parsed as numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

impl NumericSummary {
    /// `None` for an empty slice.
    pub fn from_values(numbers: &[f64]) -> Option<Self> {
        if numbers.is_empty() {
            return None;
        }

        let n = numbers.len() as f64;
        let min = numbers.iter().copied().fold(f64::INFINITY, f64::min);
        let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = numbers.iter().sum::<f64>() / n;
        let variance = numbers.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

        Some(Self {
            min,
            max,
            mean,
            median: median(numbers),
            std_dev: variance.sqrt(),
        })
    }
}

fn median(numbers: &[f64]) -> f64 {
    let mut sorted = numbers.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Most frequent value; ties go to the value seen first.
fn mode<'a>(frequency: &IndexMap<ScalarKey<'a>, (usize, &'a ScalarValue)>) -> Option<ScalarValue> {
    let mut best: Option<(usize, &ScalarValue)> = None;
    for &(count, value) in frequency.values() {
        match best {
            Some((best_count, _)) if count <= best_count => {}
            _ => best = Some((count, value)),
        }
    }
    best.map(|(_, value)| value.clone())
}

/// Computes count, null and distinct counts, the mode, and the
/// type-specific summary fields for a column.
///
/// Values that cannot be coerced for the numeric or temporal summaries are
/// skipped; if none can, those fields stay `None`.
pub fn compute_stats<'a, I>(values: I, column_type: ColumnType) -> ColumnStats
where
    I: IntoIterator<Item = &'a ScalarValue>,
{
    let mut count = 0;
    let mut non_null: Vec<&'a ScalarValue> = Vec::new();
    for value in values {
        count += 1;
        if !value.is_null() {
            non_null.push(value);
        }
    }

    let mut frequency: IndexMap<ScalarKey<'a>, (usize, &'a ScalarValue)> = IndexMap::new();
    for value in non_null.iter().copied() {
        frequency.entry(value.key()).or_insert((0, value)).0 += 1;
    }

    let mut stats = ColumnStats {
        count,
        null_count: count - non_null.len(),
        unique_count: frequency.len(),
        mode: mode(&frequency),
        ..ColumnStats::default()
    };

    match column_type {
        ColumnType::Numeric => {
            let numbers: Vec<f64> = non_null.iter().filter_map(|v| v.as_number()).collect();
            if let Some(summary) = NumericSummary::from_values(&numbers) {
                stats.min = Some(ScalarValue::Number(summary.min));
                stats.max = Some(ScalarValue::Number(summary.max));
                stats.mean = Some(summary.mean);
                stats.median = Some(summary.median);
                stats.std_dev = Some(summary.std_dev);
            }
        }
        ColumnType::Temporal => {
            let mut range: Option<(DateTime<Utc>, DateTime<Utc>)> = None;
            for t in non_null.iter().filter_map(|v| v.as_timestamp()) {
                range = Some(match range {
                    Some((min, max)) => (min.min(t), max.max(t)),
                    None => (t, t),
                });
            }
            if let Some((min, max)) = range {
                stats.min = Some(ScalarValue::Timestamp(min));
                stats.max = Some(ScalarValue::Timestamp(max));
            }
        }
        ColumnType::Categorical | ColumnType::Text | ColumnType::Boolean => {}
    }

    stats
}
