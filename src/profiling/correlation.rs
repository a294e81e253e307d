//! Pairwise relationships between columns.
//!
//! [`correlation`] is the Pearson coefficient between two equal-length
//! samples. [`detect_relationships`] applies it to every pair of numeric
//! columns and adds a dependency score for pairs of categorical columns.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::models::{Column, ColumnRelationship, ColumnType, RelationshipKind, Row};

use super::values::{value_in, ScalarKey};

/// Pearson product-moment correlation of `a` and `b`, in `[-1, 1]`.
///
/// Mismatched lengths, empty input and constant samples carry no evidence
/// of correlation and return `0.0`.
pub fn correlation(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let (mut numerator, mut sum_sq_a, mut sum_sq_b) = (0.0, 0.0, 0.0);
    for (x, y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        numerator += dx * dy;
        sum_sq_a += dx * dx;
        sum_sq_b += dy * dy;
    }

    let denominator = (sum_sq_a * sum_sq_b).sqrt();
    if denominator == 0.0 {
        0.0
    } else {
        (numerator / denominator).clamp(-1.0, 1.0)
    }
}

/// Values of two columns for the rows where both parse as numbers.
fn aligned_numbers(rows: &[Row], first: &str, second: &str) -> (Vec<f64>, Vec<f64>) {
    rows.iter()
        .filter_map(|row| {
            let x = value_in(row, first).as_number()?;
            let y = value_in(row, second).as_number()?;
            Some((x, y))
        })
        .unzip()
}

/// Share of rows whose `dependent` value is the most common one for their
/// `determinant` value. `1.0` means `determinant` fully determines `dependent`.
///
/// `None` when no row has both values, or when `determinant` is constant.
pub fn dependency_strength(rows: &[Row], determinant: &str, dependent: &str) -> Option<f64> {
    let mut groups: IndexMap<ScalarKey<'_>, HashMap<ScalarKey<'_>, usize>> = IndexMap::new();
    let mut total = 0usize;

    for row in rows {
        let left = value_in(row, determinant);
        let right = value_in(row, dependent);
        if left.is_null() || right.is_null() {
            continue;
        }
        total += 1;
        *groups.entry(left.key()).or_default().entry(right.key()).or_insert(0) += 1;
    }

    if total == 0 || groups.len() < 2 {
        return None;
    }

    let consistent: usize = groups
        .values()
        .map(|counts| counts.values().copied().max().unwrap_or(0))
        .sum();
    Some(consistent as f64 / total as f64)
}

/// Correlations between every pair of numeric columns and dependencies
/// between every ordered pair of categorical columns, strongest first.
///
/// Pairs with no measurable relationship are left out.
pub fn detect_relationships(columns: &[Column], rows: &[Row]) -> Vec<ColumnRelationship> {
    let of_type = |wanted: ColumnType| -> Vec<&Column> {
        columns.iter().filter(|c| c.column_type == wanted).collect()
    };
    let numeric = of_type(ColumnType::Numeric);
    let categorical = of_type(ColumnType::Categorical);

    let mut relationships = Vec::new();

    for (i, first) in numeric.iter().enumerate() {
        for second in &numeric[i + 1..] {
            let (a, b) = aligned_numbers(rows, &first.name, &second.name);
            let strength = correlation(&a, &b);
            if strength != 0.0 {
                relationships.push(ColumnRelationship {
                    column1: first.name.clone(),
                    column2: second.name.clone(),
                    kind: RelationshipKind::Correlation,
                    strength,
                });
            }
        }
    }

    for determinant in &categorical {
        for dependent in &categorical {
            if determinant.name == dependent.name {
                continue;
            }
            if let Some(strength) = dependency_strength(rows, &determinant.name, &dependent.name) {
                relationships.push(ColumnRelationship {
                    column1: determinant.name.clone(),
                    column2: dependent.name.clone(),
                    kind: RelationshipKind::Dependency,
                    strength,
                });
            }
        }
    }

    relationships.sort_by(|a, b| b.strength.abs().total_cmp(&a.strength.abs()));
    relationships
}
