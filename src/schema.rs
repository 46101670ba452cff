//! Catalog introspection service.
//!
//! Orchestrates the driver's catalog calls, normalizes raw rows into the
//! descriptor types, applies identifier case folding, and resolves each
//! column's logical type through the dialect's registry. Stateless across
//! calls apart from the read-only connection metadata captured once at
//! construction; results are owned by the caller and never cached.

use tracing::{debug, info};

use crate::dialect::Dialect;
use crate::driver::{
    column_cols, drain, fk_cols, int_at, pk_cols, stats_cols, str_at, tables_cols, text_at,
    CatalogDriver, Row,
};
use crate::error::Result;
use crate::metadata::{ConnectionMetadata, MetadataOptions};
use crate::types::{
    ColumnDescriptor, ForeignKeyDescriptor, IndexDescriptor, SqlTypeMetadata,
};

/// Predicate deciding whether a `(schema, table_type)` pair is hidden from
/// the table listing.
pub type TableFilter = Box<dyn Fn(&str, &str) -> bool + Send>;

/// Per-connection introspection service.
///
/// Construction captures the connection metadata once and selects the
/// dialect from the reported DBMS name. The underlying driver model allows
/// one in-flight catalog call at a time, which `&mut self` enforces.
pub struct SchemaIntrospector<D: CatalogDriver> {
    driver: D,
    metadata: ConnectionMetadata,
    dialect: Dialect,
    table_filter: Option<TableFilter>,
}

impl<D: CatalogDriver> SchemaIntrospector<D> {
    /// Establish the service over an open driver connection.
    pub fn connect(mut driver: D, options: MetadataOptions) -> Result<Self> {
        let metadata = ConnectionMetadata::capture(&mut driver, options)?;
        let dialect = Dialect::for_dbms(metadata.dbms_name())?;
        info!(
            dbms = %metadata.dbms_name(),
            dialect = dialect.name(),
            "schema introspector ready"
        );
        Ok(Self {
            driver,
            metadata,
            dialect,
            table_filter: None,
        })
    }

    /// Cached connection metadata.
    pub fn metadata(&self) -> &ConnectionMetadata {
        &self.metadata
    }

    /// Active dialect handle (type registry, quoting, capability flags).
    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Resolve a type-descriptor string through the active dialect's
    /// registry.
    pub fn resolve_type(&self, descriptor: &str) -> Result<crate::types::LogicalType> {
        self.dialect.registry().resolve(descriptor)
    }

    /// Replace the dialect's default system-table filter.
    pub fn set_table_filter(&mut self, filter: TableFilter) {
        self.table_filter = Some(filter);
    }

    fn filtered(&self, schema: &str, table_type: &str) -> bool {
        match &self.table_filter {
            Some(f) => f(schema, table_type),
            None => self.dialect.table_filtered(schema, table_type),
        }
    }

    /// List table names visible on the connection, case-folded, in driver
    /// order. System/internal schemas are dropped by the filter predicate.
    pub fn tables(&mut self) -> Result<Vec<String>> {
        let rows = drain(self.driver.tables()?)?;

        let mut names = Vec::new();
        for row in &rows {
            let schema = str_at(row, tables_cols::TABLE_SCHEM).unwrap_or_default();
            let name = str_at(row, tables_cols::TABLE_NAME).unwrap_or_default();
            let table_type = str_at(row, tables_cols::TABLE_TYPE).unwrap_or_default();
            if self.filtered(schema, table_type) {
                continue;
            }
            names.push(self.metadata.format_case(name));
        }

        debug!(count = names.len(), "listed tables");
        Ok(names)
    }

    /// List the columns of `table`, each with its logical type resolved.
    pub fn columns(&mut self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        let native = self.metadata.native_case(table);
        let rows = drain(self.driver.columns(&native)?)?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            columns.push(self.column_from_row(row)?);
        }

        debug!(table = %native, count = columns.len(), "listed columns");
        Ok(columns)
    }

    fn column_from_row(&self, row: &Row) -> Result<ColumnDescriptor> {
        let name = str_at(row, column_cols::COLUMN_NAME).unwrap_or_default();
        let type_code = int_at(row, column_cols::DATA_TYPE);
        let native_type = str_at(row, column_cols::TYPE_NAME)
            .unwrap_or_default()
            .to_string();
        let size = int_at(row, column_cols::COLUMN_SIZE).and_then(to_u32);
        let digits = int_at(row, column_cols::DECIMAL_DIGITS).and_then(to_u32);
        let default = text_at(row, column_cols::COLUMN_DEF);
        let nullable = nullability(
            str_at(row, column_cols::IS_NULLABLE),
            int_at(row, column_cols::NULLABLE),
        );

        let mut sql_type = native_type.clone();
        let mut precision = None;
        let mut scale = None;

        if self.dialect.is_opaque_json(&native_type) {
            // The catalog protocol cannot express these as first-class
            // types; values arrive as strings the application deserializes
            // at a higher layer.
            sql_type = "json".to_string();
        } else if self.dialect.boolean_type() == Some(native_type.as_str()) {
            sql_type = "BOOLEAN".to_string();
        } else if !native_type.contains('(') {
            // Back-fill: this dialect's catalog does not embed precision or
            // scale in the type text, so synthesize a parseable descriptor
            // from the structured columns before handing it to the registry.
            let is_text = native_type.eq_ignore_ascii_case("VARCHAR")
                || type_code.is_some_and(|c| self.dialect.is_text_code(c));
            let is_decimal = native_type.eq_ignore_ascii_case("DECIMAL")
                || native_type.eq_ignore_ascii_case("NUMERIC")
                || type_code.is_some_and(|c| self.dialect.is_decimal_code(c));

            if is_decimal {
                scale = Some(digits.unwrap_or(0));
                precision = size;
                sql_type = if scale == Some(0) {
                    "INT".to_string()
                } else {
                    format!(
                        "{}({},{})",
                        native_type,
                        precision.unwrap_or(0),
                        digits.unwrap_or(0)
                    )
                };
            } else if is_text {
                if let Some(p) = size {
                    precision = Some(p);
                    sql_type = format!("{}({})", native_type, p);
                }
            }
        }

        let logical_type = self.dialect.registry().resolve(&sql_type)?;

        Ok(ColumnDescriptor {
            name: self.metadata.format_case(name),
            native_type,
            logical_type,
            sql_type_metadata: SqlTypeMetadata {
                sql_type,
                type_code,
                limit: size,
                precision,
                scale,
            },
            nullable,
            default,
        })
    }

    /// List the indexes of `table` by grouping consecutive statistics rows.
    ///
    /// Table-statistics rows (statistics type zero) are skipped entirely,
    /// including as group boundaries for the rows around them. A group runs
    /// from an ordinal-position-1 row to the end of input, the next
    /// ordinal-1 row, or the next table-statistics row; uniqueness and the
    /// index name come from the group's first row.
    pub fn indexes(&mut self, table: &str) -> Result<Vec<IndexDescriptor>> {
        let native = self.metadata.native_case(table);
        let rows = drain(self.driver.index_statistics(&native)?)?;

        let mut indexes = Vec::new();
        let mut columns = Vec::new();
        let mut index_name = String::new();
        let mut unique = false;

        for (idx, row) in rows.iter().enumerate() {
            if is_table_statistics(row) {
                continue;
            }

            if int_at(row, stats_cols::ORDINAL_POSITION) == Some(1) {
                columns = Vec::new();
                unique = int_at(row, stats_cols::NON_UNIQUE) == Some(0);
                index_name = str_at(row, stats_cols::INDEX_NAME)
                    .unwrap_or_default()
                    .to_string();
            }

            if let Some(col) = str_at(row, stats_cols::COLUMN_NAME) {
                columns.push(self.metadata.format_case(col));
            }

            let group_closes = match rows.get(idx + 1) {
                None => true,
                Some(next) => {
                    is_table_statistics(next)
                        || int_at(next, stats_cols::ORDINAL_POSITION) == Some(1)
                }
            };

            if group_closes {
                indexes.push(IndexDescriptor {
                    table: table.to_string(),
                    name: self.metadata.format_case(&index_name),
                    unique,
                    columns: std::mem::take(&mut columns),
                });
            }
        }

        debug!(table = %native, count = indexes.len(), "listed indexes");
        Ok(indexes)
    }

    /// Primary-key column of `table`: the first result row's column name,
    /// or `None` when the catalog returns no rows.
    pub fn primary_key(&mut self, table: &str) -> Result<Option<String>> {
        let native = self.metadata.native_case(table);
        let rows = drain(self.driver.primary_keys(&native)?)?;
        Ok(rows
            .first()
            .and_then(|row| str_at(row, pk_cols::COLUMN_NAME))
            .map(str::to_string))
    }

    /// List the foreign keys of `table`; one descriptor per catalog row.
    pub fn foreign_keys(&mut self, table: &str) -> Result<Vec<ForeignKeyDescriptor>> {
        let native = self.metadata.native_case(table);
        let rows = drain(self.driver.foreign_keys(&native)?)?;

        let keys = rows
            .iter()
            .map(|row| ForeignKeyDescriptor {
                from_table: str_at(row, fk_cols::PKTABLE_NAME)
                    .unwrap_or_default()
                    .to_string(),
                to_table: str_at(row, fk_cols::FKTABLE_NAME)
                    .unwrap_or_default()
                    .to_string(),
                name: text_at(row, fk_cols::FK_NAME),
                column: text_at(row, fk_cols::PKCOLUMN_NAME),
                referenced_column: text_at(row, fk_cols::FKCOLUMN_NAME),
                on_delete: text_at(row, fk_cols::DELETE_RULE),
                on_update: text_at(row, fk_cols::UPDATE_RULE),
            })
            .collect::<Vec<_>>();

        debug!(table = %native, count = keys.len(), "listed foreign keys");
        Ok(keys)
    }

    /// The connected database's name, trimmed of surrounding whitespace.
    pub fn current_database(&self) -> String {
        self.metadata.database_name().trim().to_string()
    }

    /// Candidate name for an index on `columns`, truncated to the DBMS's
    /// maximum identifier length (255 when unreported).
    pub fn index_name(&self, table: &str, columns: &[&str]) -> String {
        let maximum = self.metadata.max_identifier_len().unwrap_or(255) as usize;
        let candidate = format!("index_{}_on_{}", table, columns.join("_and_"));
        candidate.chars().take(maximum).collect()
    }
}

fn is_table_statistics(row: &Row) -> bool {
    int_at(row, stats_cols::TYPE) == Some(0)
}

fn to_u32(v: i64) -> Option<u32> {
    u32::try_from(v).ok()
}

/// Nullability from the catalog's two flags: the string form (`YES`/`NO`)
/// is preferred, the numeric form is the fallback, and unknown means
/// nullable.
fn nullability(is_nullable: Option<&str>, nullable_code: Option<i64>) -> bool {
    match is_nullable.map(str::trim) {
        Some(s) if s.eq_ignore_ascii_case("YES") => true,
        Some(s) if s.eq_ignore_ascii_case("NO") => false,
        _ => !matches!(nullable_code, Some(0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nullability_prefers_string_form() {
        assert!(nullability(Some("YES"), Some(0)));
        assert!(!nullability(Some("NO"), Some(1)));
    }

    #[test]
    fn test_nullability_numeric_fallback() {
        assert!(!nullability(None, Some(0)));
        assert!(nullability(None, Some(1)));
        // SQL_NULLABLE_UNKNOWN and missing both read as nullable.
        assert!(nullability(None, Some(2)));
        assert!(nullability(Some(""), None));
    }
}
