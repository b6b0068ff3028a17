use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::OnceLock;

use crate::config::{GEOMETRY_HEADERS, MAX_IDENTIFIER_LENGTH, TARGET_SRID};
use crate::error::{LoaderError, LoaderResult};
use crate::file_load::Record;

/// Column types a field can be mapped to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Geometry,
    Boolean,
    Integer,
    DoublePrecision,
    Jsonb,
    Text,
}

impl ColumnType {
    /// Returns the Postgres type name
    pub fn to_postgres(&self) -> String {
        match self {
            ColumnType::Geometry => format!("GEOMETRY(GEOMETRY, {})", TARGET_SRID),
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::DoublePrecision => "DOUBLE PRECISION".to_string(),
            ColumnType::Jsonb => "JSONB".to_string(),
            ColumnType::Text => "TEXT".to_string(),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_postgres())
    }
}

/// A field name from the sample record together with its column type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub column_type: ColumnType,
}

impl FieldDescriptor {
    pub fn is_geometry(&self) -> bool {
        self.column_type == ColumnType::Geometry
    }

    pub fn column_definition(&self) -> String {
        format!("{} {}", self.name, self.column_type.to_postgres())
    }
}

pub fn is_geometry_header(header: &str) -> bool {
    let lowered = header.to_lowercase();
    GEOMETRY_HEADERS.contains(&lowered.as_str())
}

// The header wins over the value, then the JSON shape decides; anything else is text
pub fn decide_sql_type(header: &str, value: &Value) -> ColumnType {
    if is_geometry_header(header) {
        return ColumnType::Geometry;
    }
    match value {
        Value::Bool(_) => ColumnType::Boolean,
        Value::Number(n) if n.is_i64() || n.is_u64() => ColumnType::Integer,
        Value::Number(_) => ColumnType::DoublePrecision,
        Value::Object(_) => ColumnType::Jsonb,
        _ => ColumnType::Text,
    }
}

/// Derive one descriptor per key of the sample record, in key order.
pub fn infer_fields(record: &Record) -> Vec<FieldDescriptor> {
    record
        .iter()
        .map(|(name, value)| FieldDescriptor {
            name: name.clone(),
            column_type: decide_sql_type(name, value),
        })
        .collect()
}

/// The first geometry field in key order; this is the one that gets the spatial index.
pub fn spatial_column(fields: &[FieldDescriptor]) -> Option<&FieldDescriptor> {
    fields.iter().find(|field| field.is_geometry())
}

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex")
    })
}

/// Table and column names are written into SQL text, so only plain identifiers are allowed.
pub fn validate_identifier(identifier: &str) -> LoaderResult<()> {
    let reason = if identifier.is_empty() {
        "identifier is empty".to_string()
    } else if identifier.len() > MAX_IDENTIFIER_LENGTH {
        format!("longer than {} bytes", MAX_IDENTIFIER_LENGTH)
    } else if !identifier_pattern().is_match(identifier) {
        "only ASCII letters, digits and underscores are allowed, and it must not start with a digit"
            .to_string()
    } else {
        return Ok(());
    };

    Err(LoaderError::InvalidIdentifier {
        identifier: identifier.to_string(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    #[test]
    fn test_decide_sql_type_by_value() {
        assert_eq!(decide_sql_type("flag", &json!(true)), ColumnType::Boolean);
        assert_eq!(decide_sql_type("count", &json!(3)), ColumnType::Integer);
        assert_eq!(decide_sql_type("big", &json!(u64::MAX)), ColumnType::Integer);
        assert_eq!(decide_sql_type("neg", &json!(-7)), ColumnType::Integer);
        assert_eq!(decide_sql_type("ratio", &json!(1.5)), ColumnType::DoublePrecision);
        assert_eq!(decide_sql_type("meta", &json!({"a": 1})), ColumnType::Jsonb);
        assert_eq!(decide_sql_type("name", &json!("X")), ColumnType::Text);
        assert_eq!(decide_sql_type("nothing", &Value::Null), ColumnType::Text);
        assert_eq!(decide_sql_type("tags", &json!(["a", "b"])), ColumnType::Text);
    }

    #[test]
    fn test_geometry_alias_is_case_insensitive() {
        for header in ["geom", "Geom", "GEOMETRY", "wkt", "WKT", "Geometry"] {
            assert!(is_geometry_header(header), "{header} should be geometry");
            assert_eq!(decide_sql_type(header, &json!("POINT(1 2)")), ColumnType::Geometry);
        }
        assert!(!is_geometry_header("geom_id"));
        assert!(!is_geometry_header("the_geom"));
    }

    #[test]
    fn test_geometry_alias_beats_value_shape() {
        assert_eq!(decide_sql_type("geom", &json!(12)), ColumnType::Geometry);
        assert_eq!(decide_sql_type("wkt", &Value::Null), ColumnType::Geometry);
    }

    #[test]
    fn test_decide_sql_type_is_deterministic() {
        let value = json!({"nested": [1, 2]});
        assert_eq!(decide_sql_type("meta", &value), decide_sql_type("meta", &value));
    }

    #[test]
    fn test_geometry_type_name() {
        assert_eq!(ColumnType::Geometry.to_postgres(), "GEOMETRY(GEOMETRY, 3857)");
        assert_eq!(ColumnType::DoublePrecision.to_string(), "DOUBLE PRECISION");
    }

    #[test]
    fn test_infer_fields_keeps_record_order() {
        let sample = record(json!({"name": "X", "count": 3, "ratio": 1.5, "meta": {"a": 1}}));
        let fields = infer_fields(&sample);
        let described: Vec<(&str, ColumnType)> = fields
            .iter()
            .map(|f| (f.name.as_str(), f.column_type))
            .collect();
        assert_eq!(
            described,
            vec![
                ("name", ColumnType::Text),
                ("count", ColumnType::Integer),
                ("ratio", ColumnType::DoublePrecision),
                ("meta", ColumnType::Jsonb),
            ]
        );
    }

    #[test]
    fn test_spatial_column_picks_first_geometry_field() {
        let sample = record(json!({"name": "X", "WKT": "POINT(0 0)", "geom": "POINT(1 1)"}));
        let fields = infer_fields(&sample);
        assert_eq!(spatial_column(&fields).map(|f| f.name.as_str()), Some("WKT"));

        let plain = record(json!({"name": "X"}));
        assert!(spatial_column(&infer_fields(&plain)).is_none());
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("GEO_TABLE").is_ok());
        assert!(validate_identifier("_private2").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("2fast").is_err());
        assert!(validate_identifier("name; DROP TABLE x").is_err());
        assert!(validate_identifier("with space").is_err());
        assert!(validate_identifier("quote\"d").is_err());
        assert!(validate_identifier(&"a".repeat(63)).is_ok());
        assert!(validate_identifier(&"a".repeat(64)).is_err());
    }
}
