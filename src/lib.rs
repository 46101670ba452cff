//! # odbc-introspect
//!
//! Schema introspection and type mapping over an ODBC-style catalog
//! protocol.
//!
//! This library sits between a tabular-data-source driver (exposing the
//! standard catalog calls plus a fixed-field connection-info query) and an
//! application's abstract column model. Its core job is type
//! reconciliation: turning the heterogeneous, string-encoded type
//! descriptions a remote DBMS reports into precise column descriptors —
//! including warehouse dialects whose catalog protocol drops precision and
//! scale from the type text, or reports structured types (VARIANT, JSON,
//! STRUCT) as plain strings.
//!
//! - **Descriptor parsing** of `NAME`, `NAME(n)` and `NAME(p,s)` type
//!   strings
//! - **Pattern-keyed type registry** with alias indirection and curated
//!   first-match-wins precedence
//! - **Connection metadata cache** captured once per connection
//! - **Dialect selection** by reported DBMS name, with per-dialect quoting
//!   and capability flags
//! - **Catalog introspection** for tables, columns, indexes, primary keys
//!   and foreign keys, with precision/scale back-fill
//!
//! ## Example
//!
//! ```rust,ignore
//! use odbc_introspect::{MetadataOptions, SchemaIntrospector};
//!
//! let mut schema = SchemaIntrospector::connect(driver, MetadataOptions::default())?;
//! for table in schema.tables()? {
//!     for column in schema.columns(&table)? {
//!         println!("{}.{} -> {:?}", table, column.name, column.logical_type);
//!     }
//! }
//! ```

pub mod dialect;
pub mod driver;
pub mod error;
pub mod metadata;
pub mod parse;
pub mod registry;
pub mod schema;
pub mod types;

// Re-exports for convenient access
pub use dialect::{Dialect, SqlRenderer};
pub use driver::{CatalogCursor, CatalogDriver, InfoField, Row, Value};
pub use error::{IntrospectError, Result};
pub use metadata::{ConnectionMetadata, MetadataOptions};
pub use registry::TypeRegistry;
pub use schema::SchemaIntrospector;
pub use types::{
    ColumnDescriptor, ForeignKeyDescriptor, IndexDescriptor, LogicalKind, LogicalType,
    SqlTypeMetadata,
};
