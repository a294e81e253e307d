//! Chart-type suggestions from a profiled schema.

use crate::models::{ChartType, Column, ColumnType};

/// Most distinct values a lone categorical column may have for pie charts.
pub const PIE_MAX_CATEGORIES: usize = 8;

/// Proposes chart types for a set of columns, in priority order.
///
/// Every rule is checked and all that match contribute; when none match the
/// result falls back to bar and line. Only the schema is consulted, never
/// row data.
pub fn suggest_chart_types(columns: &[Column]) -> Vec<ChartType> {
    let of_type = |wanted: ColumnType| -> Vec<&Column> {
        columns.iter().filter(|c| c.column_type == wanted).collect()
    };
    let numeric = of_type(ColumnType::Numeric);
    let categorical = of_type(ColumnType::Categorical);
    let temporal = of_type(ColumnType::Temporal);

    let mut suggestions = Vec::new();

    // Time series
    if !temporal.is_empty() && !numeric.is_empty() {
        suggestions.extend([ChartType::Line, ChartType::Area]);
    }

    if !categorical.is_empty() && !numeric.is_empty() {
        suggestions.extend([ChartType::Bar, ChartType::Column]);

        if let [only] = categorical.as_slice() {
            if only.stats.unique_count <= PIE_MAX_CATEGORIES {
                suggestions.extend([ChartType::Pie, ChartType::Donut]);
            }
        }
    }

    if numeric.len() >= 2 {
        suggestions.push(ChartType::Scatter);
        if numeric.len() >= 3 {
            suggestions.push(ChartType::Bubble);
        }
    }

    if categorical.len() >= 2 {
        suggestions.push(ChartType::Heatmap);
    }

    if suggestions.is_empty() {
        suggestions.extend([ChartType::Bar, ChartType::Line]);
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ColumnStats;

    fn column(name: &str, column_type: ColumnType, unique_count: usize) -> Column {
        Column {
            name: name.to_string(),
            column_type,
            original_type: "string".to_string(),
            nullable: false,
            unique: false,
            stats: ColumnStats {
                unique_count,
                ..ColumnStats::default()
            },
        }
    }

    #[test]
    fn test_time_series() {
        let columns = vec![
            column("date", ColumnType::Temporal, 30),
            column("sales", ColumnType::Numeric, 30),
        ];
        assert_eq!(suggest_chart_types(&columns), vec![ChartType::Line, ChartType::Area]);
    }

    #[test]
    fn test_single_small_category_adds_pie() {
        let columns = vec![
            column("region", ColumnType::Categorical, 4),
            column("revenue", ColumnType::Numeric, 100),
        ];
        assert_eq!(
            suggest_chart_types(&columns),
            vec![ChartType::Bar, ChartType::Column, ChartType::Pie, ChartType::Donut]
        );
    }

    #[test]
    fn test_pie_limit_is_inclusive() {
        let at_limit = vec![
            column("region", ColumnType::Categorical, 8),
            column("revenue", ColumnType::Numeric, 100),
        ];
        assert!(suggest_chart_types(&at_limit).contains(&ChartType::Pie));

        let over_limit = vec![
            column("region", ColumnType::Categorical, 9),
            column("revenue", ColumnType::Numeric, 100),
        ];
        assert!(!suggest_chart_types(&over_limit).contains(&ChartType::Pie));
    }

    #[test]
    fn test_two_categories_no_pie_but_heatmap() {
        let columns = vec![
            column("region", ColumnType::Categorical, 3),
            column("product", ColumnType::Categorical, 5),
            column("units", ColumnType::Numeric, 50),
        ];
        assert_eq!(
            suggest_chart_types(&columns),
            vec![ChartType::Bar, ChartType::Column, ChartType::Heatmap]
        );
    }

    #[test]
    fn test_numeric_counts() {
        let two = vec![
            column("a", ColumnType::Numeric, 10),
            column("b", ColumnType::Numeric, 10),
        ];
        assert_eq!(suggest_chart_types(&two), vec![ChartType::Scatter]);

        let three = vec![
            column("a", ColumnType::Numeric, 10),
            column("b", ColumnType::Numeric, 10),
            column("c", ColumnType::Numeric, 10),
        ];
        assert_eq!(suggest_chart_types(&three), vec![ChartType::Scatter, ChartType::Bubble]);
    }

    #[test]
    fn test_fallback() {
        assert_eq!(suggest_chart_types(&[]), vec![ChartType::Bar, ChartType::Line]);

        let text_only = vec![
            column("notes", ColumnType::Text, 10),
            column("flag", ColumnType::Boolean, 2),
        ];
        assert_eq!(suggest_chart_types(&text_only), vec![ChartType::Bar, ChartType::Line]);
    }

    #[test]
    fn test_everything_fires() {
        let columns = vec![
            column("day", ColumnType::Temporal, 10),
            column("store", ColumnType::Categorical, 2),
            column("x", ColumnType::Numeric, 10),
            column("y", ColumnType::Numeric, 10),
            column("z", ColumnType::Numeric, 10),
        ];
        assert_eq!(
            suggest_chart_types(&columns),
            vec![
                ChartType::Line,
                ChartType::Area,
                ChartType::Bar,
                ChartType::Column,
                ChartType::Pie,
                ChartType::Donut,
                ChartType::Scatter,
                ChartType::Bubble,
            ]
        );
    }
}
