use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::profiling::{correlation, suggestions};

/// A single cell as handed over by an ingestion collaborator.
///
/// JSON input never produces `Timestamp` directly (date text stays a
/// `String` and is recognised by the coercions); only adapters that know
/// a cell is a date, such as the Excel reader, build timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Timestamp(DateTime<Utc>),
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Number(value)
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Number(value as f64)
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Bool(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::String(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::String(value)
    }
}

impl From<DateTime<Utc>> for ScalarValue {
    fn from(value: DateTime<Utc>) -> Self {
        ScalarValue::Timestamp(value)
    }
}

impl<T: Into<ScalarValue>> From<Option<T>> for ScalarValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ScalarValue::Null, Into::into)
    }
}

/// One record: column name to cell, in the order the collaborator produced them.
pub type Row = IndexMap<String, ScalarValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Categorical,
    Temporal,
    Text,
    Boolean,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Numeric => "numeric",
            ColumnType::Categorical => "categorical",
            ColumnType::Temporal => "temporal",
            ColumnType::Text => "text",
            ColumnType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive statistics for one column.
///
/// `min`/`max` hold numbers for numeric columns and timestamps for temporal
/// ones; `mean`, `median` and `std_dev` only exist for numeric columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnStats {
    pub count: usize,
    pub null_count: usize,
    pub unique_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<ScalarValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<ScalarValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<ScalarValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std_dev: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default = "default_original_type")]
    pub original_type: String,
    pub nullable: bool,
    pub unique: bool,
    pub stats: ColumnStats,
}

pub(crate) fn default_original_type() -> String {
    "string".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    Correlation,
    Dependency,
}

/// A derived fact about two columns. Never stored back into the columns themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRelationship {
    pub column1: String,
    pub column2: String,
    #[serde(rename = "type")]
    pub kind: RelationshipKind,
    pub strength: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Line,
    Area,
    Bar,
    Column,
    Scatter,
    Bubble,
    Pie,
    Donut,
    Heatmap,
    Treemap,
    Combo,
}

/// Declared field of a query-result source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl FieldSchema {
    pub fn is_required(&self) -> bool {
        self.mode.as_deref() == Some("REQUIRED")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub fields: Vec<FieldSchema>,
}

/// Derived views over a dataset. Both slots start empty and are filled at
/// most once, by whoever asks for them first.
#[derive(Debug, Clone)]
pub struct DatasetMetadata {
    pub analyzed_at: DateTime<Utc>,
    suggested_chart_types: OnceCell<Vec<ChartType>>,
    relationships: OnceCell<Vec<ColumnRelationship>>,
}

impl DatasetMetadata {
    pub(crate) fn new(analyzed_at: DateTime<Utc>) -> Self {
        Self {
            analyzed_at,
            suggested_chart_types: OnceCell::new(),
            relationships: OnceCell::new(),
        }
    }

    pub fn cached_chart_types(&self) -> Option<&[ChartType]> {
        self.suggested_chart_types.get().map(Vec::as_slice)
    }

    pub fn cached_relationships(&self) -> Option<&[ColumnRelationship]> {
        self.relationships.get().map(Vec::as_slice)
    }
}

/// A profiled row set. Built once by the assembler and read-only afterwards.
///
/// Not serialized directly; the HTTP layer sends a summary without the rows.
#[derive(Debug, Clone)]
pub struct Dataset {
    id: String,
    name: String,
    source_id: String,
    columns: Vec<Column>,
    row_count: usize,
    data: Vec<Row>,
    metadata: DatasetMetadata,
}

impl Dataset {
    pub(crate) fn new(
        id: String,
        name: String,
        source_id: String,
        columns: Vec<Column>,
        data: Vec<Row>,
        analyzed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            source_id,
            row_count: data.len(),
            columns,
            data,
            metadata: DatasetMetadata::new(analyzed_at),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn rows(&self) -> &[Row] {
        &self.data
    }

    pub fn metadata(&self) -> &DatasetMetadata {
        &self.metadata
    }

    /// Chart types that fit this schema, computed on first use.
    pub fn suggested_chart_types(&self) -> &[ChartType] {
        self.metadata
            .suggested_chart_types
            .get_or_init(|| suggestions::suggest_chart_types(&self.columns))
    }

    /// Pairwise column relationships, computed on first use.
    pub fn relationships(&self) -> &[ColumnRelationship] {
        self.metadata
            .relationships
            .get_or_init(|| correlation::detect_relationships(&self.columns, &self.data))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceType {
    BigQuery,
    Csv,
    Excel,
    Inline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    pub file_name: String,
    pub file_size: usize,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BigQueryConfig {
    pub project_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceConfig {
    File(FileConfig),
    BigQuery(BigQueryConfig),
    None,
}

/// Where a dataset came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub source_type: DataSourceType,
    pub config: SourceConfig,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

impl DataSource {
    pub fn new(name: impl Into<String>, source_type: DataSourceType, config: SourceConfig) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            source_type,
            config,
            created_at: now,
            last_modified: now,
        }
    }

    pub fn uploaded_file(name: &str, source_type: DataSourceType, file_size: usize) -> Self {
        let config = SourceConfig::File(FileConfig {
            file_name: name.to_string(),
            file_size,
            uploaded_at: Utc::now(),
        });
        Self::new(name, source_type, config)
    }
}
