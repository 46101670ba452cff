//! Connection metadata cache.
//!
//! A one-time snapshot of the fixed connection-info fields the driver
//! reports (DBMS name/version, identifier casing and quoting rules, length
//! limits, current user and database). Captured once when the connection is
//! established and read-only afterwards, so it is safe to share across
//! threads for the connection's lifetime.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::driver::{CatalogDriver, InfoField, Value, SQL_IC_UPPER};
use crate::error::{IntrospectError, Result};

/// Capture-time options.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MetadataOptions {
    /// Some drivers mis-encode get-info string fields when running in a
    /// wide-character mode, returning UTF-16LE bytes labeled as native text.
    /// When set, string fields are re-decoded from UTF-16LE before storage.
    pub utf16_workaround: bool,
}

/// Cached connection/environment facts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionMetadata {
    dbms_name: String,
    dbms_ver: String,
    identifier_case: Option<i64>,
    quoted_identifier_case: Option<i64>,
    identifier_quote_char: String,
    max_identifier_len: Option<u32>,
    max_table_name_len: Option<u32>,
    user_name: String,
    database_name: String,
    upcase_identifiers: bool,
}

impl ConnectionMetadata {
    /// Issue the nine fixed-field queries and build the snapshot.
    ///
    /// # Errors
    ///
    /// [`IntrospectError::MetadataUnavailable`] naming the first field whose
    /// query failed. Fatal for connection setup.
    pub fn capture<D: CatalogDriver>(driver: &mut D, options: MetadataOptions) -> Result<Self> {
        let mut get = |field: InfoField| {
            driver
                .get_info(field)
                .map_err(|e| IntrospectError::MetadataUnavailable {
                    field: field.name(),
                    message: e.to_string(),
                })
        };

        let dbms_name = string_field(get(InfoField::DbmsName)?, options);
        let dbms_ver = string_field(get(InfoField::DbmsVer)?, options);
        let identifier_case = get(InfoField::IdentifierCase)?.as_int();
        let quoted_identifier_case = get(InfoField::QuotedIdentifierCase)?.as_int();
        let identifier_quote_char = string_field(get(InfoField::IdentifierQuoteChar)?, options);
        let max_identifier_len = int_field(get(InfoField::MaxIdentifierLen)?);
        let max_table_name_len = int_field(get(InfoField::MaxTableNameLen)?);
        let user_name = string_field(get(InfoField::UserName)?, options);
        let database_name = string_field(get(InfoField::DatabaseName)?, options);

        let upcase_identifiers = identifier_case == Some(SQL_IC_UPPER);

        debug!(
            dbms = %dbms_name,
            version = %dbms_ver,
            database = %database_name,
            upcase_identifiers,
            "captured connection metadata"
        );

        Ok(Self {
            dbms_name,
            dbms_ver,
            identifier_case,
            quoted_identifier_case,
            identifier_quote_char,
            max_identifier_len,
            max_table_name_len,
            user_name,
            database_name,
            upcase_identifiers,
        })
    }

    pub fn dbms_name(&self) -> &str {
        &self.dbms_name
    }

    pub fn dbms_ver(&self) -> &str {
        &self.dbms_ver
    }

    pub fn identifier_case(&self) -> Option<i64> {
        self.identifier_case
    }

    pub fn quoted_identifier_case(&self) -> Option<i64> {
        self.quoted_identifier_case
    }

    pub fn identifier_quote_char(&self) -> &str {
        &self.identifier_quote_char
    }

    pub fn max_identifier_len(&self) -> Option<u32> {
        self.max_identifier_len
    }

    pub fn max_table_name_len(&self) -> Option<u32> {
        self.max_table_name_len
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    /// True when the DBMS stores unquoted identifiers in upper case.
    pub fn upcase_identifiers(&self) -> bool {
        self.upcase_identifiers
    }

    /// Fold a DBMS-reported identifier into the application's convention:
    /// an upcasing DBMS reports `ORDERS`, the application expects `orders`.
    pub fn format_case(&self, name: &str) -> String {
        if self.upcase_identifiers {
            name.to_lowercase()
        } else {
            name.to_string()
        }
    }

    /// Fold an application identifier into the DBMS's native convention
    /// before using it in a catalog call. Mixed-case names pass through
    /// unchanged, since those were quoted at creation time.
    pub fn native_case(&self, name: &str) -> String {
        if self.upcase_identifiers && !name.chars().any(|c| c.is_uppercase()) {
            name.to_uppercase()
        } else {
            name.to_string()
        }
    }
}

fn int_field(value: Value) -> Option<u32> {
    value.as_int().and_then(|v| u32::try_from(v).ok())
}

fn string_field(value: Value, options: MetadataOptions) -> String {
    match value {
        Value::Str(s) if options.utf16_workaround => redecode_utf16le(s.as_bytes()),
        Value::Str(s) => s,
        Value::Bytes(b) if options.utf16_workaround => redecode_utf16le(&b),
        Value::Bytes(b) => String::from_utf8_lossy(&b).into_owned(),
        Value::Int(v) => v.to_string(),
        Value::Null => String::new(),
    }
}

/// Reinterpret mislabeled text as UTF-16LE code units.
fn redecode_utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{CatalogCursor, SQL_IC_MIXED};

    struct StubDriver {
        identifier_case: i64,
        fail_on: Option<InfoField>,
        utf16: bool,
    }

    impl CatalogDriver for StubDriver {
        fn get_info(&mut self, field: InfoField) -> Result<Value> {
            if self.fail_on == Some(field) {
                return Err(IntrospectError::driver_msg("HY000 get-info failed"));
            }
            Ok(match field {
                InfoField::DbmsName if self.utf16 => {
                    let bytes: Vec<u8> = "Snowflake"
                        .encode_utf16()
                        .flat_map(|u| u.to_le_bytes())
                        .collect();
                    Value::Bytes(bytes)
                }
                InfoField::DbmsName => Value::Str("Snowflake".into()),
                InfoField::DbmsVer => Value::Str("8.1.0".into()),
                InfoField::IdentifierCase => Value::Int(self.identifier_case),
                InfoField::QuotedIdentifierCase => Value::Int(SQL_IC_MIXED),
                InfoField::IdentifierQuoteChar => Value::Str("\"".into()),
                InfoField::MaxIdentifierLen => Value::Int(255),
                InfoField::MaxTableNameLen => Value::Int(255),
                InfoField::UserName => Value::Str("APP".into()),
                InfoField::DatabaseName => Value::Str(" ANALYTICS ".into()),
            })
        }

        fn tables(&mut self) -> Result<Box<dyn CatalogCursor + '_>> {
            unimplemented!("metadata tests never open cursors")
        }

        fn columns(&mut self, _table: &str) -> Result<Box<dyn CatalogCursor + '_>> {
            unimplemented!()
        }

        fn index_statistics(&mut self, _table: &str) -> Result<Box<dyn CatalogCursor + '_>> {
            unimplemented!()
        }

        fn primary_keys(&mut self, _table: &str) -> Result<Box<dyn CatalogCursor + '_>> {
            unimplemented!()
        }

        fn foreign_keys(&mut self, _table: &str) -> Result<Box<dyn CatalogCursor + '_>> {
            unimplemented!()
        }
    }

    #[test]
    fn test_capture_snapshot() {
        let mut driver = StubDriver {
            identifier_case: SQL_IC_UPPER,
            fail_on: None,
            utf16: false,
        };
        let meta = ConnectionMetadata::capture(&mut driver, MetadataOptions::default()).unwrap();
        assert_eq!(meta.dbms_name(), "Snowflake");
        assert_eq!(meta.max_identifier_len(), Some(255));
        assert!(meta.upcase_identifiers());
    }

    #[test]
    fn test_capture_failure_names_the_field() {
        let mut driver = StubDriver {
            identifier_case: SQL_IC_UPPER,
            fail_on: Some(InfoField::MaxIdentifierLen),
            utf16: false,
        };
        let err =
            ConnectionMetadata::capture(&mut driver, MetadataOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            IntrospectError::MetadataUnavailable { field, .. } if field == "SQL_MAX_IDENTIFIER_LEN"
        ));
    }

    #[test]
    fn test_utf16_workaround_redecodes_string_fields() {
        let mut driver = StubDriver {
            identifier_case: SQL_IC_UPPER,
            fail_on: None,
            utf16: true,
        };
        let opts = MetadataOptions {
            utf16_workaround: true,
        };
        let meta = ConnectionMetadata::capture(&mut driver, opts).unwrap();
        assert_eq!(meta.dbms_name(), "Snowflake");
    }

    #[test]
    fn test_case_folding_on_upcasing_dbms() {
        let mut driver = StubDriver {
            identifier_case: SQL_IC_UPPER,
            fail_on: None,
            utf16: false,
        };
        let meta = ConnectionMetadata::capture(&mut driver, MetadataOptions::default()).unwrap();
        assert_eq!(meta.format_case("ORDERS"), "orders");
        assert_eq!(meta.native_case("orders"), "ORDERS");
        // Mixed case means the identifier was quoted at creation time.
        assert_eq!(meta.native_case("Orders"), "Orders");
    }

    #[test]
    fn test_case_folding_on_case_sensitive_dbms() {
        let mut driver = StubDriver {
            identifier_case: crate::driver::SQL_IC_SENSITIVE,
            fail_on: None,
            utf16: false,
        };
        let meta = ConnectionMetadata::capture(&mut driver, MetadataOptions::default()).unwrap();
        assert!(!meta.upcase_identifiers());
        assert_eq!(meta.format_case("Orders"), "Orders");
        assert_eq!(meta.native_case("orders"), "orders");
    }
}
