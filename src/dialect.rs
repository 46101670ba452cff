//! Dialect handles and DBMS-name selection.
//!
//! A dialect bundles everything that varies per target DBMS: the type
//! registry, literal-quoting rule, capability flags, type-name sentinels
//! and the system-schema filter. Handles are plain values built by explicit
//! constructors; selection happens once per connection from the cached DBMS
//! name, and unmatched names fall back to the generic handle, so new
//! dialects are added without touching the introspection service.

use crate::driver::type_codes;
use crate::error::{IntrospectError, Result};
use crate::registry::TypeRegistry;
use crate::types::LogicalKind;

/// Substitute SQL-text renderer used when no native renderer exists for the
/// DBMS. The warehouse dialect routes through the PostgreSQL renderer for
/// broadest coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlRenderer {
    Generic,
    Postgres,
}

/// Behavior bundle for one target DBMS.
#[derive(Debug, Clone)]
pub struct Dialect {
    name: &'static str,
    registry: TypeRegistry,
    prepared_statements: bool,
    supports_migrations: bool,
    renderer: SqlRenderer,
    /// Escape backslashes in string literals in addition to single quotes.
    backslash_escape: bool,
    /// Native type name the DBMS uses for booleans, when the catalog cannot
    /// express them as a first-class type.
    boolean_type: Option<&'static str>,
    /// Native type names the catalog reports as plain strings but which hold
    /// structured values the application must deserialize as JSON.
    opaque_json_types: &'static [&'static str],
    /// Driver type codes treated as character data for back-fill purposes.
    text_type_codes: &'static [i64],
    /// Driver type codes treated as decimal data for back-fill purposes.
    decimal_type_codes: &'static [i64],
}

const TEXT_CODES: &[i64] = &[
    type_codes::SQL_CHAR,
    type_codes::SQL_VARCHAR,
    type_codes::SQL_LONGVARCHAR,
    type_codes::SQL_WCHAR,
    type_codes::SQL_WVARCHAR,
    type_codes::SQL_WLONGVARCHAR,
];

const DECIMAL_CODES: &[i64] = &[type_codes::SQL_DECIMAL, type_codes::SQL_NUMERIC];

impl Dialect {
    /// Select the dialect handle for a driver-reported DBMS name.
    /// Unmatched names resolve to the generic handle.
    pub fn for_dbms(dbms_name: &str) -> Result<Self> {
        if dbms_name.to_lowercase().contains("snowflake") {
            Self::snowflake()
        } else {
            Self::generic()
        }
    }

    /// Warehouse (Snowflake) dialect: read-mostly, no prepared statements,
    /// no migrations, precision/scale back-fill required.
    pub fn snowflake() -> Result<Self> {
        Ok(Self {
            name: "snowflake",
            registry: snowflake_registry()?,
            prepared_statements: false,
            supports_migrations: false,
            renderer: SqlRenderer::Postgres,
            backslash_escape: true,
            boolean_type: Some("BOOLEAN"),
            opaque_json_types: &["VARIANT", "JSON", "STRUCT"],
            text_type_codes: TEXT_CODES,
            decimal_type_codes: DECIMAL_CODES,
        })
    }

    /// Default handle for DBMSs without a dedicated dialect.
    pub fn generic() -> Result<Self> {
        Ok(Self {
            name: "generic",
            registry: default_registry()?,
            prepared_statements: true,
            supports_migrations: true,
            renderer: SqlRenderer::Generic,
            backslash_escape: false,
            boolean_type: None,
            opaque_json_types: &[],
            text_type_codes: TEXT_CODES,
            decimal_type_codes: DECIMAL_CODES,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn prepared_statements(&self) -> bool {
        self.prepared_statements
    }

    pub fn supports_migrations(&self) -> bool {
        self.supports_migrations
    }

    pub fn renderer(&self) -> SqlRenderer {
        self.renderer
    }

    pub fn boolean_type(&self) -> Option<&'static str> {
        self.boolean_type
    }

    /// Whether the native type name denotes an opaque structured value the
    /// application must treat as JSON.
    pub fn is_opaque_json(&self, native_type: &str) -> bool {
        self.opaque_json_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(native_type))
    }

    pub fn is_text_code(&self, code: i64) -> bool {
        self.text_type_codes.contains(&code)
    }

    pub fn is_decimal_code(&self, code: i64) -> bool {
        self.decimal_type_codes.contains(&code)
    }

    /// Quote a string literal. The warehouse dialect escapes backslash and
    /// single-quote characters only; the generic rule doubles quotes.
    pub fn quote_string(&self, s: &str) -> String {
        let s = if self.backslash_escape {
            s.replace('\\', "\\\\")
        } else {
            s.to_string()
        };
        s.replace('\'', "''")
    }

    /// Reject schema-altering operations on dialects without migration
    /// support.
    ///
    /// # Errors
    ///
    /// [`IntrospectError::Unsupported`] naming the rejected operation.
    pub fn ensure_migrations_supported(&self, operation: &str) -> Result<()> {
        if self.supports_migrations {
            Ok(())
        } else {
            Err(IntrospectError::Unsupported(format!(
                "{} (migrations are disabled for the {} dialect)",
                operation, self.name
            )))
        }
    }

    /// Default predicate filtering system/internal tables out of the table
    /// listing. Hosts may override it on the introspection service.
    pub fn table_filtered(&self, schema_name: &str, table_type: &str) -> bool {
        match self.name {
            "snowflake" => {
                schema_name.eq_ignore_ascii_case("information_schema")
                    || table_type.to_uppercase().contains("SYSTEM")
            }
            _ => false,
        }
    }
}

/// Registrations shared by every dialect. Overlapping patterns are curated
/// by order: first match wins, so `^datetime` precedes `^date`, and the
/// `timestamp` alias precedes `^time`.
fn base_registrations(r: &mut TypeRegistry) -> Result<()> {
    r.register_with_limit("boolean", LogicalKind::Boolean)?;
    r.register_with_precision("^datetime", LogicalKind::DateTime)?;
    r.alias("^timestamp", "datetime")?;
    r.register_with_precision("^date", LogicalKind::Date)?;
    r.register_with_precision("^time", LogicalKind::Time)?;
    r.register_with_limit("^char", LogicalKind::FixedString)?;
    r.register_with_limit("^varchar", LogicalKind::VariableString)?;
    r.register_with_limit("binary", LogicalKind::Binary)?;
    r.alias("blob", "binary")?;
    r.register_with_limit("text", LogicalKind::Text)?;
    r.alias("clob", "text")?;
    r.register_decimal("decimal")?;
    r.alias("numeric", "decimal")?;
    r.alias("number", "decimal")?;
    r.register_with_limit("float", LogicalKind::Float)?;
    r.alias("double", "float")?;
    r.register_with_limit("int", LogicalKind::Integer)?;
    Ok(())
}

fn default_registry() -> Result<TypeRegistry> {
    let mut r = TypeRegistry::new();
    base_registrations(&mut r)?;
    Ok(r)
}

fn snowflake_registry() -> Result<TypeRegistry> {
    let mut r = TypeRegistry::new();
    base_registrations(&mut r)?;
    // The catalog reports these as strings; values are opaque JSON.
    r.register_exact("json", LogicalKind::Json)?;
    r.register_exact("struct", LogicalKind::Json)?;
    Ok(r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LogicalType;

    #[test]
    fn test_selection_by_dbms_name() {
        assert_eq!(Dialect::for_dbms("Snowflake").unwrap().name(), "snowflake");
        assert_eq!(Dialect::for_dbms("SNOWFLAKE 8.1").unwrap().name(), "snowflake");
        assert_eq!(Dialect::for_dbms("PostgreSQL").unwrap().name(), "generic");
        assert_eq!(Dialect::for_dbms("").unwrap().name(), "generic");
    }

    #[test]
    fn test_snowflake_capability_flags() {
        let d = Dialect::snowflake().unwrap();
        assert!(!d.prepared_statements());
        assert!(!d.supports_migrations());
        assert_eq!(d.renderer(), SqlRenderer::Postgres);
        assert!(matches!(
            d.ensure_migrations_supported("create_table"),
            Err(IntrospectError::Unsupported(_))
        ));
    }

    #[test]
    fn test_generic_allows_migrations() {
        let d = Dialect::generic().unwrap();
        assert!(d.ensure_migrations_supported("create_table").is_ok());
    }

    #[test]
    fn test_quote_string() {
        let snow = Dialect::snowflake().unwrap();
        assert_eq!(snow.quote_string(r"a\b'c"), r"a\\b''c");

        let generic = Dialect::generic().unwrap();
        assert_eq!(generic.quote_string(r"a\b'c"), r"a\b''c");
    }

    #[test]
    fn test_registry_curated_precedence() {
        let r = Dialect::snowflake().unwrap();
        let reg = r.registry();
        assert_eq!(
            reg.resolve("DATETIME(3)").unwrap(),
            LogicalType::DateTime {
                precision: Some(3)
            }
        );
        assert_eq!(
            reg.resolve("DATE").unwrap(),
            LogicalType::Date { precision: None }
        );
        assert_eq!(
            reg.resolve("TIMESTAMP(9)").unwrap(),
            LogicalType::DateTime {
                precision: Some(9)
            }
        );
        assert_eq!(
            reg.resolve("TIME(9)").unwrap(),
            LogicalType::Time {
                precision: Some(9)
            }
        );
    }

    #[test]
    fn test_snowflake_registrations() {
        let d = Dialect::snowflake().unwrap();
        let reg = d.registry();
        assert_eq!(reg.resolve("BOOLEAN").unwrap(), LogicalType::Boolean);
        assert_eq!(
            reg.resolve("VARCHAR(255)").unwrap(),
            LogicalType::VariableString { limit: Some(255) }
        );
        assert_eq!(
            reg.resolve("CHAR(10)").unwrap(),
            LogicalType::FixedString { limit: Some(10) }
        );
        assert_eq!(
            reg.resolve("BINARY(8388608)").unwrap(),
            LogicalType::Binary {
                limit: Some(8388608)
            }
        );
        assert_eq!(
            reg.resolve("BLOB").unwrap(),
            LogicalType::Binary { limit: None }
        );
        assert_eq!(
            reg.resolve("CLOB").unwrap(),
            LogicalType::Text { limit: None }
        );
        assert_eq!(
            reg.resolve("NUMBER(38,0)").unwrap(),
            LogicalType::Decimal {
                precision: Some(38),
                scale: Some(0)
            }
        );
        assert_eq!(
            reg.resolve("DOUBLE").unwrap(),
            LogicalType::Float { limit: None }
        );
        assert_eq!(
            reg.resolve("BIGINT").unwrap(),
            LogicalType::Integer { limit: None }
        );
        assert_eq!(reg.resolve("json").unwrap(), LogicalType::Json);
        assert_eq!(reg.resolve("STRUCT").unwrap(), LogicalType::Json);
    }

    #[test]
    fn test_opaque_and_boolean_sentinels() {
        let d = Dialect::snowflake().unwrap();
        assert!(d.is_opaque_json("VARIANT"));
        assert!(d.is_opaque_json("Json"));
        assert!(!d.is_opaque_json("VARCHAR"));
        assert_eq!(d.boolean_type(), Some("BOOLEAN"));
    }

    #[test]
    fn test_table_filter_defaults() {
        let d = Dialect::snowflake().unwrap();
        assert!(d.table_filtered("INFORMATION_SCHEMA", "VIEW"));
        assert!(d.table_filtered("PUBLIC", "SYSTEM TABLE"));
        assert!(!d.table_filtered("PUBLIC", "TABLE"));

        let g = Dialect::generic().unwrap();
        assert!(!g.table_filtered("INFORMATION_SCHEMA", "VIEW"));
    }
}
