//! Abstract catalog-driver capability set.
//!
//! The introspection service does not speak a wire protocol itself; it
//! consumes a driver that exposes the standard catalog calls (tables,
//! columns, index statistics, primary keys, foreign keys) plus the
//! fixed-field connection-info query. Concrete transports implement
//! [`CatalogDriver`] and [`CatalogCursor`]; everything in this crate is
//! written against those traits.
//!
//! All operations are synchronous request/response over a single connection
//! handle. Concurrent use of one driver must be serialized by the caller.

use crate::error::Result;

/// A single field of a catalog result row.
///
/// Catalog result sets mix text and small integers (ordinal positions,
/// nullability flags, statistics types), so rows are carried as a uniform
/// variant type rather than per-call structs.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Str(String),
    Bytes(Vec<u8>),
}

impl Value {
    /// Numeric view of the field. Text fields holding an integer parse
    /// through, since some drivers report catalog numbers as text.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Borrowed string view of the field.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Owned text form, `None` only for SQL NULL.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Int(v) => Some(v.to_string()),
            Value::Str(s) => Some(s.clone()),
            Value::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
        }
    }
}

/// A raw catalog row, indexed by the positions in [`tables_cols`],
/// [`column_cols`], [`stats_cols`], [`pk_cols`] and [`fk_cols`].
pub type Row = Vec<Value>;

/// Field at `idx` as text, `None` when absent or NULL.
pub fn str_at(row: &Row, idx: usize) -> Option<&str> {
    row.get(idx).and_then(Value::as_str)
}

/// Field at `idx` as an integer, `None` when absent, NULL or non-numeric.
pub fn int_at(row: &Row, idx: usize) -> Option<i64> {
    row.get(idx).and_then(Value::as_int)
}

/// Field at `idx` as owned text, `None` when absent or NULL.
pub fn text_at(row: &Row, idx: usize) -> Option<String> {
    row.get(idx).and_then(Value::to_text)
}

/// The nine fixed connection-info fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfoField {
    DbmsName,
    DbmsVer,
    IdentifierCase,
    QuotedIdentifierCase,
    IdentifierQuoteChar,
    MaxIdentifierLen,
    MaxTableNameLen,
    UserName,
    DatabaseName,
}

impl InfoField {
    pub const ALL: [InfoField; 9] = [
        InfoField::DbmsName,
        InfoField::DbmsVer,
        InfoField::IdentifierCase,
        InfoField::QuotedIdentifierCase,
        InfoField::IdentifierQuoteChar,
        InfoField::MaxIdentifierLen,
        InfoField::MaxTableNameLen,
        InfoField::UserName,
        InfoField::DatabaseName,
    ];

    /// Driver-protocol name of the field.
    pub fn name(self) -> &'static str {
        match self {
            InfoField::DbmsName => "SQL_DBMS_NAME",
            InfoField::DbmsVer => "SQL_DBMS_VER",
            InfoField::IdentifierCase => "SQL_IDENTIFIER_CASE",
            InfoField::QuotedIdentifierCase => "SQL_QUOTED_IDENTIFIER_CASE",
            InfoField::IdentifierQuoteChar => "SQL_IDENTIFIER_QUOTE_CHAR",
            InfoField::MaxIdentifierLen => "SQL_MAX_IDENTIFIER_LEN",
            InfoField::MaxTableNameLen => "SQL_MAX_TABLE_NAME_LEN",
            InfoField::UserName => "SQL_USER_NAME",
            InfoField::DatabaseName => "SQL_DATABASE_NAME",
        }
    }
}

/// Identifier-case sentinels reported for `SQL_IDENTIFIER_CASE`.
pub const SQL_IC_UPPER: i64 = 1;
pub const SQL_IC_LOWER: i64 = 2;
pub const SQL_IC_SENSITIVE: i64 = 3;
pub const SQL_IC_MIXED: i64 = 4;

/// SQL type codes reported in the `DATA_TYPE` column of catalog results.
pub mod type_codes {
    pub const SQL_CHAR: i64 = 1;
    pub const SQL_NUMERIC: i64 = 2;
    pub const SQL_DECIMAL: i64 = 3;
    pub const SQL_INTEGER: i64 = 4;
    pub const SQL_SMALLINT: i64 = 5;
    pub const SQL_FLOAT: i64 = 6;
    pub const SQL_REAL: i64 = 7;
    pub const SQL_DOUBLE: i64 = 8;
    pub const SQL_VARCHAR: i64 = 12;
    pub const SQL_LONGVARCHAR: i64 = -1;
    pub const SQL_WCHAR: i64 = -8;
    pub const SQL_WVARCHAR: i64 = -9;
    pub const SQL_WLONGVARCHAR: i64 = -10;
}

/// Column positions in the table-listing result set.
pub mod tables_cols {
    pub const TABLE_SCHEM: usize = 1;
    pub const TABLE_NAME: usize = 2;
    pub const TABLE_TYPE: usize = 3;
}

/// Column positions in the column-listing result set.
pub mod column_cols {
    pub const COLUMN_NAME: usize = 3;
    pub const DATA_TYPE: usize = 4;
    pub const TYPE_NAME: usize = 5;
    pub const COLUMN_SIZE: usize = 6;
    pub const DECIMAL_DIGITS: usize = 8;
    pub const NULLABLE: usize = 10;
    pub const COLUMN_DEF: usize = 12;
    pub const IS_NULLABLE: usize = 17;
}

/// Column positions in the index-statistics result set.
pub mod stats_cols {
    pub const NON_UNIQUE: usize = 3;
    pub const INDEX_NAME: usize = 5;
    /// Statistics type; zero marks a table-statistics row, not a real index.
    pub const TYPE: usize = 6;
    pub const ORDINAL_POSITION: usize = 7;
    pub const COLUMN_NAME: usize = 8;
}

/// Column positions in the primary-key result set.
pub mod pk_cols {
    pub const COLUMN_NAME: usize = 3;
}

/// Column positions in the foreign-key result set.
pub mod fk_cols {
    pub const PKTABLE_NAME: usize = 2;
    pub const PKCOLUMN_NAME: usize = 3;
    pub const FKTABLE_NAME: usize = 6;
    pub const FKCOLUMN_NAME: usize = 7;
    pub const UPDATE_RULE: usize = 9;
    pub const DELETE_RULE: usize = 10;
    pub const FK_NAME: usize = 11;
}

/// A driver-side statement/cursor resource.
///
/// Cursors must be released deterministically on every exit path; use
/// [`drain`] rather than calling `fetch_all` directly.
pub trait CatalogCursor {
    /// Fetch every remaining row.
    fn fetch_all(&mut self) -> Result<Vec<Row>>;

    /// Release the driver-side resource.
    fn close(self: Box<Self>) -> Result<()>;
}

/// Synchronous catalog capability set consumed by the introspection service.
pub trait CatalogDriver {
    /// One fixed-field connection-info query.
    fn get_info(&mut self, field: InfoField) -> Result<Value>;

    /// List tables visible on the connection.
    fn tables(&mut self) -> Result<Box<dyn CatalogCursor + '_>>;

    /// List columns of `table`.
    fn columns(&mut self, table: &str) -> Result<Box<dyn CatalogCursor + '_>>;

    /// Index statistics for `table`.
    fn index_statistics(&mut self, table: &str) -> Result<Box<dyn CatalogCursor + '_>>;

    /// Primary-key columns of `table`.
    fn primary_keys(&mut self, table: &str) -> Result<Box<dyn CatalogCursor + '_>>;

    /// Foreign keys of `table`.
    fn foreign_keys(&mut self, table: &str) -> Result<Box<dyn CatalogCursor + '_>>;
}

/// Fetch all rows and close the cursor, closing even when the fetch fails.
pub fn drain(mut cursor: Box<dyn CatalogCursor + '_>) -> Result<Vec<Row>> {
    let fetched = cursor.fetch_all();
    let closed = cursor.close();
    let rows = fetched?;
    closed?;
    Ok(rows)
}
