//! Logical types and schema descriptor types.

use serde::{Deserialize, Serialize};

/// Application-level abstract type a column maps to, independent of the
/// driver-reported type text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalType {
    Boolean,
    FixedString { limit: Option<u32> },
    VariableString { limit: Option<u32> },
    Binary { limit: Option<u32> },
    Text { limit: Option<u32> },
    Date { precision: Option<u32> },
    Time { precision: Option<u32> },
    DateTime { precision: Option<u32> },
    Float { limit: Option<u32> },
    Integer { limit: Option<u32> },
    Decimal { precision: Option<u32>, scale: Option<u32> },
    Json,
}

/// Parameterless selector used when registering type constructors; the
/// registry supplies the limit or precision extracted from the descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalKind {
    Boolean,
    FixedString,
    VariableString,
    Binary,
    Text,
    Date,
    Time,
    DateTime,
    Float,
    Integer,
    Json,
}

impl LogicalKind {
    /// Build the logical type parameterized by a limit. Kinds that carry no
    /// limit ignore it.
    pub fn with_limit(self, limit: Option<u32>) -> LogicalType {
        match self {
            LogicalKind::FixedString => LogicalType::FixedString { limit },
            LogicalKind::VariableString => LogicalType::VariableString { limit },
            LogicalKind::Binary => LogicalType::Binary { limit },
            LogicalKind::Text => LogicalType::Text { limit },
            LogicalKind::Float => LogicalType::Float { limit },
            LogicalKind::Integer => LogicalType::Integer { limit },
            other => other.bare(),
        }
    }

    /// Build the logical type parameterized by a precision.
    pub fn with_precision(self, precision: Option<u32>) -> LogicalType {
        match self {
            LogicalKind::Date => LogicalType::Date { precision },
            LogicalKind::Time => LogicalType::Time { precision },
            LogicalKind::DateTime => LogicalType::DateTime { precision },
            other => other.bare(),
        }
    }

    /// Build the logical type with no descriptor parameters.
    pub fn bare(self) -> LogicalType {
        match self {
            LogicalKind::Boolean => LogicalType::Boolean,
            LogicalKind::Json => LogicalType::Json,
            LogicalKind::FixedString => LogicalType::FixedString { limit: None },
            LogicalKind::VariableString => LogicalType::VariableString { limit: None },
            LogicalKind::Binary => LogicalType::Binary { limit: None },
            LogicalKind::Text => LogicalType::Text { limit: None },
            LogicalKind::Date => LogicalType::Date { precision: None },
            LogicalKind::Time => LogicalType::Time { precision: None },
            LogicalKind::DateTime => LogicalType::DateTime { precision: None },
            LogicalKind::Float => LogicalType::Float { limit: None },
            LogicalKind::Integer => LogicalType::Integer { limit: None },
        }
    }
}

/// Structured view of the (possibly synthesized) sql-type descriptor a
/// column resolved through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlTypeMetadata {
    /// The descriptor string the type registry parsed, after any back-fill
    /// rewriting (e.g. `DECIMAL(10,2)` or `INT`).
    pub sql_type: String,

    /// Driver-reported type code, when present.
    pub type_code: Option<i64>,

    /// Column size as reported by the catalog.
    pub limit: Option<u32>,

    /// Numeric or character precision.
    pub precision: Option<u32>,

    /// Numeric scale.
    pub scale: Option<u32>,
}

/// One column of a table, fully resolved.
///
/// Owned by the caller of the column-listing call; nothing is cached across
/// calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Case-folded column name.
    pub name: String,

    /// Type name exactly as the DBMS reported it (e.g. `NUMBER`, `VARIANT`).
    pub native_type: String,

    /// Resolved application-level type.
    pub logical_type: LogicalType,

    /// Descriptor metadata the resolution was based on.
    pub sql_type_metadata: SqlTypeMetadata,

    /// Whether the column allows NULL.
    pub nullable: bool,

    /// Default value expression, when reported.
    pub default: Option<String>,
}

/// One index of a table, aggregated from consecutive statistics rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    /// Table the index belongs to.
    pub table: String,

    /// Case-folded index name.
    pub name: String,

    /// Whether the index enforces uniqueness.
    pub unique: bool,

    /// Indexed column names, in key order.
    pub columns: Vec<String>,
}

/// One foreign-key constraint; maps one-to-one onto a catalog row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyDescriptor {
    /// Referenced (primary-key side) table.
    pub from_table: String,

    /// Referencing (foreign-key side) table.
    pub to_table: String,

    /// Constraint name.
    pub name: Option<String>,

    /// Column on the primary-key side.
    pub column: Option<String>,

    /// Column on the foreign-key side.
    pub referenced_column: Option<String>,

    /// ON DELETE rule, as reported.
    pub on_delete: Option<String>,

    /// ON UPDATE rule, as reported.
    pub on_update: Option<String>,
}
