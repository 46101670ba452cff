//! Pattern-keyed type registry.
//!
//! An explicitly constructed, ordered table of `(pattern, constructor)`
//! pairs. Lookup scans in registration order and the first matching pattern
//! wins, so precedence for overlapping patterns is curated at registration
//! time (e.g. `^datetime` must be registered before `^date`). The registry
//! is built once by a dialect handle and never mutated afterwards; there is
//! no global or static registry state.

use regex::{Regex, RegexBuilder};

use crate::error::{IntrospectError, Result};
use crate::parse::{extract_limit, extract_precision, extract_scale};
use crate::types::{LogicalKind, LogicalType};

/// Aliases re-dispatch by lookup key; this bounds accidental cycles.
const MAX_ALIAS_HOPS: usize = 8;

#[derive(Debug, Clone)]
enum Rule {
    /// Constructor parameterized by `extract_limit`.
    WithLimit(LogicalKind),
    /// Constructor parameterized by `extract_precision`.
    WithPrecision(LogicalKind),
    /// Constructor using both `extract_precision` and `extract_scale`.
    Decimal,
    /// Constructor ignoring the descriptor body.
    Exact(LogicalKind),
    /// Re-dispatch to whatever the target key currently resolves to.
    Alias(String),
}

#[derive(Debug, Clone)]
struct Entry {
    source: String,
    pattern: Regex,
    rule: Rule,
}

/// Ordered, first-match-wins mapping from type-name patterns to logical-type
/// constructors.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    entries: Vec<Entry>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&mut self, pattern: &str, rule: Rule) -> Result<()> {
        let compiled = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| IntrospectError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;

        let entry = Entry {
            source: pattern.to_string(),
            pattern: compiled,
            rule,
        };

        // Re-registering the same pattern replaces it in place, keeping its
        // precedence slot. Aliases pointing at the pattern see the new
        // constructor because they re-dispatch at lookup time.
        if let Some(existing) = self.entries.iter_mut().find(|e| e.source == pattern) {
            *existing = entry;
        } else {
            self.entries.push(entry);
        }
        Ok(())
    }

    /// Register a constructor parameterized by the descriptor's limit.
    pub fn register_with_limit(&mut self, pattern: &str, kind: LogicalKind) -> Result<()> {
        self.register(pattern, Rule::WithLimit(kind))
    }

    /// Register a constructor parameterized by the descriptor's precision.
    pub fn register_with_precision(&mut self, pattern: &str, kind: LogicalKind) -> Result<()> {
        self.register(pattern, Rule::WithPrecision(kind))
    }

    /// Register the decimal constructor (precision and scale).
    pub fn register_decimal(&mut self, pattern: &str) -> Result<()> {
        self.register(pattern, Rule::Decimal)
    }

    /// Register a constructor that ignores the descriptor body.
    pub fn register_exact(&mut self, pattern: &str, kind: LogicalKind) -> Result<()> {
        self.register(pattern, Rule::Exact(kind))
    }

    /// Alias `pattern` to whatever `target` resolves to at lookup time.
    /// Indirection, not a copy: re-registering the target retargets the
    /// alias.
    pub fn alias(&mut self, pattern: &str, target: &str) -> Result<()> {
        self.register(pattern, Rule::Alias(target.to_string()))
    }

    /// Resolve a descriptor string (`NAME`, `NAME(n)` or `NAME(p,s)`) to a
    /// logical type. Matching is case-insensitive; descriptor parameters are
    /// always extracted from the original descriptor, even across aliases.
    ///
    /// # Errors
    ///
    /// [`IntrospectError::UnknownType`] when no pattern matches.
    pub fn resolve(&self, descriptor: &str) -> Result<LogicalType> {
        self.resolve_key(descriptor, descriptor, 0)
    }

    fn resolve_key(&self, key: &str, descriptor: &str, hops: usize) -> Result<LogicalType> {
        if hops > MAX_ALIAS_HOPS {
            return Err(IntrospectError::UnknownType(descriptor.to_string()));
        }

        for entry in &self.entries {
            if !entry.pattern.is_match(key) {
                continue;
            }
            return Ok(match &entry.rule {
                Rule::WithLimit(kind) => kind.with_limit(extract_limit(descriptor)),
                Rule::WithPrecision(kind) => kind.with_precision(extract_precision(descriptor)),
                Rule::Decimal => LogicalType::Decimal {
                    precision: extract_precision(descriptor),
                    scale: extract_scale(descriptor),
                },
                Rule::Exact(kind) => kind.bare(),
                Rule::Alias(target) => return self.resolve_key(target, descriptor, hops + 1),
            });
        }

        Err(IntrospectError::UnknownType(descriptor.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TypeRegistry {
        let mut r = TypeRegistry::new();
        r.register_with_limit("^varchar", LogicalKind::VariableString)
            .unwrap();
        r.register_with_limit("float", LogicalKind::Float).unwrap();
        r.register_decimal("decimal").unwrap();
        r.alias("double", "float").unwrap();
        r.alias("numeric", "decimal").unwrap();
        r.register_exact("json", LogicalKind::Json).unwrap();
        r
    }

    #[test]
    fn test_resolution_is_case_insensitive() {
        let r = sample();
        assert_eq!(
            r.resolve("DECIMAL(10,2)").unwrap(),
            r.resolve("decimal(10,2)").unwrap()
        );
        assert_eq!(
            r.resolve("VARCHAR(40)").unwrap(),
            LogicalType::VariableString { limit: Some(40) }
        );
    }

    #[test]
    fn test_decimal_parameters() {
        let r = sample();
        assert_eq!(
            r.resolve("decimal(10,2)").unwrap(),
            LogicalType::Decimal {
                precision: Some(10),
                scale: Some(2)
            }
        );
        assert_eq!(
            r.resolve("decimal(10)").unwrap(),
            LogicalType::Decimal {
                precision: Some(10),
                scale: Some(0)
            }
        );
        assert_eq!(
            r.resolve("decimal").unwrap(),
            LogicalType::Decimal {
                precision: None,
                scale: None
            }
        );
    }

    #[test]
    fn test_alias_uses_original_descriptor_parameters() {
        let r = sample();
        assert_eq!(r.resolve("DOUBLE(5)").unwrap(), r.resolve("FLOAT(5)").unwrap());
        assert_eq!(
            r.resolve("NUMERIC(12,4)").unwrap(),
            LogicalType::Decimal {
                precision: Some(12),
                scale: Some(4)
            }
        );
    }

    #[test]
    fn test_alias_follows_target_re_registration() {
        let mut r = sample();
        // Retarget "float" to a limit-less text type; the alias must follow.
        r.register_exact("float", LogicalKind::Json).unwrap();
        assert_eq!(r.resolve("DOUBLE(5)").unwrap(), LogicalType::Json);
    }

    #[test]
    fn test_overlapping_patterns_first_registration_wins() {
        let mut r = TypeRegistry::new();
        r.register_with_limit("int", LogicalKind::Integer).unwrap();
        // Overlaps every string containing "int"; registered later, so it
        // must lose to the entry above.
        r.register_exact("bigint", LogicalKind::Json).unwrap();
        assert_eq!(
            r.resolve("bigint").unwrap(),
            LogicalType::Integer { limit: None }
        );
    }

    #[test]
    fn test_unknown_type_is_an_error() {
        let r = sample();
        let err = r.resolve("GEOGRAPHY").unwrap_err();
        assert!(matches!(err, IntrospectError::UnknownType(t) if t == "GEOGRAPHY"));
    }

    #[test]
    fn test_alias_cycle_is_bounded() {
        let mut r = TypeRegistry::new();
        r.alias("^a$", "b").unwrap();
        r.alias("^b$", "a").unwrap();
        assert!(matches!(
            r.resolve("a"),
            Err(IntrospectError::UnknownType(_))
        ));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let mut r = TypeRegistry::new();
        let err = r.register_decimal("dec(").unwrap_err();
        assert!(matches!(err, IntrospectError::InvalidPattern { .. }));
    }
}
