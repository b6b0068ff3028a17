//! Binding JSON values as query parameters.
//!
//! The server decides each parameter's type when the insert is prepared
//! (from the target column, or `text` for the argument of
//! `ST_GeomFromText`). [`RecordValue`] encodes a JSON value for whatever
//! type was chosen, so values always travel as parameters and never as
//! part of the statement text.

use bytes::BytesMut;
use postgres::types::{to_sql_checked, IsNull, ToSql, Type};
use serde_json::Value;
use std::error::Error;

type EncodeResult = Result<IsNull, Box<dyn Error + Sync + Send>>;

/// A borrowed JSON value ready to be bound to a statement parameter
#[derive(Debug, Clone, Copy)]
pub struct RecordValue<'a>(pub &'a Value);

impl ToSql for RecordValue<'_> {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> EncodeResult {
        let value = self.0;
        if value.is_null() {
            return Ok(IsNull::Yes);
        }

        if *ty == Type::BOOL {
            boolean(value, ty)?.to_sql(ty, out)
        } else if *ty == Type::INT2 {
            let number = integer(value, ty)?;
            i16::try_from(number)
                .map_err(|_| out_of_range(value, ty))?
                .to_sql(ty, out)
        } else if *ty == Type::INT4 {
            let number = integer(value, ty)?;
            i32::try_from(number)
                .map_err(|_| out_of_range(value, ty))?
                .to_sql(ty, out)
        } else if *ty == Type::INT8 {
            integer(value, ty)?.to_sql(ty, out)
        } else if *ty == Type::FLOAT4 {
            (float(value, ty)? as f32).to_sql(ty, out)
        } else if *ty == Type::FLOAT8 {
            float(value, ty)?.to_sql(ty, out)
        } else if *ty == Type::JSON || *ty == Type::JSONB {
            value.to_sql(ty, out)
        } else if <&str as ToSql>::accepts(ty) {
            match value {
                Value::String(text) => text.as_str().to_sql(ty, out),
                // Mirrors the assignment casts Postgres applies to non-text literals
                other => other.to_string().as_str().to_sql(ty, out),
            }
        } else {
            Err(format!("parameters of type {} are not supported", ty).into())
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

// Booleans, or strings in Postgres' boolean input syntax
fn boolean(value: &Value, ty: &Type) -> Result<bool, Box<dyn Error + Sync + Send>> {
    match value {
        Value::Bool(flag) => Ok(*flag),
        Value::String(text) => parse_bool(text).ok_or_else(|| mismatch(value, ty)),
        other => Err(mismatch(other, ty)),
    }
}

/// Parses text the way `boolin` does: case-insensitive, surrounding whitespace
/// ignored, any unique prefix of `true`/`false`/`yes`/`no`, plus `on`/`off`/`1`/`0`.
fn parse_bool(text: &str) -> Option<bool> {
    let lowered = text.trim().to_lowercase();
    let word = lowered.as_str();
    if word.is_empty() {
        return None;
    }
    match word {
        "1" | "on" => Some(true),
        "0" | "of" | "off" => Some(false),
        _ if "true".starts_with(word) || "yes".starts_with(word) => Some(true),
        // "o" alone is ambiguous between on and off
        _ if "false".starts_with(word) || "no".starts_with(word) => Some(false),
        _ => None,
    }
}

// Integers as-is, fractional numbers rounded half away from zero like numeric::int,
// strings in integer input syntax
fn integer(value: &Value, ty: &Type) -> Result<i64, Box<dyn Error + Sync + Send>> {
    match value {
        Value::Number(number) => {
            if let Some(n) = number.as_i64() {
                return Ok(n);
            }
            if number.is_u64() {
                return Err(out_of_range(value, ty));
            }
            let rounded = number
                .as_f64()
                .map(f64::round)
                .ok_or_else(|| mismatch(value, ty))?;
            // 2^63 is exactly representable; anything at or above it overflows i64
            if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded < i64::MAX as f64 {
                Ok(rounded as i64)
            } else {
                Err(out_of_range(value, ty))
            }
        }
        Value::String(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| mismatch(value, ty)),
        other => Err(mismatch(other, ty)),
    }
}

// Numbers, or strings in float input syntax (including NaN and Infinity)
fn float(value: &Value, ty: &Type) -> Result<f64, Box<dyn Error + Sync + Send>> {
    match value {
        Value::Number(number) => number.as_f64().ok_or_else(|| mismatch(value, ty)),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| mismatch(value, ty)),
        other => Err(mismatch(other, ty)),
    }
}

fn mismatch(value: &Value, ty: &Type) -> Box<dyn Error + Sync + Send> {
    format!("cannot bind JSON {} {} as {}", json_kind(value), value, ty).into()
}

fn out_of_range(value: &Value, ty: &Type) -> Box<dyn Error + Sync + Send> {
    format!("{} is out of range for {}", value, ty).into()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // None stands for SQL NULL
    fn encode(value: Value, ty: Type) -> Result<Option<Vec<u8>>, String> {
        let mut out = BytesMut::new();
        match RecordValue(&value).to_sql(&ty, &mut out) {
            Ok(IsNull::Yes) => Ok(None),
            Ok(IsNull::No) => Ok(Some(out.to_vec())),
            Err(e) => Err(e.to_string()),
        }
    }

    #[test]
    fn test_null_binds_as_sql_null_for_any_type() {
        for ty in [Type::INT4, Type::TEXT, Type::BOOL, Type::JSONB, Type::FLOAT8] {
            assert_eq!(encode(Value::Null, ty).unwrap(), None);
        }
    }

    #[test]
    fn test_integer_encoding() {
        let bytes = encode(json!(3), Type::INT4).unwrap().unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 3]);

        let bytes = encode(json!(-1), Type::INT8).unwrap().unwrap();
        assert_eq!(bytes, vec![0xff; 8]);

        let bytes = encode(json!(258), Type::INT2).unwrap().unwrap();
        assert_eq!(bytes, vec![1, 2]);
    }

    #[test]
    fn test_integer_out_of_range() {
        let err = encode(json!(3_000_000_000i64), Type::INT4).unwrap_err();
        assert!(err.contains("out of range"));

        let err = encode(json!(u64::MAX), Type::INT8).unwrap_err();
        assert!(err.contains("out of range"));
    }

    #[test]
    fn test_float_encoding() {
        let bytes = encode(json!(1.5), Type::FLOAT8).unwrap().unwrap();
        assert_eq!(bytes, 1.5f64.to_be_bytes().to_vec());

        // Integers widen into double precision columns
        let bytes = encode(json!(2), Type::FLOAT8).unwrap().unwrap();
        assert_eq!(bytes, 2.0f64.to_be_bytes().to_vec());
    }

    #[test]
    fn test_values_postgres_would_convert() {
        let bytes = encode(json!(2.0), Type::INT4).unwrap().unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 2]);

        // numeric to integer rounds half away from zero
        let bytes = encode(json!(2.5), Type::INT4).unwrap().unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 3]);
        let bytes = encode(json!(-2.5), Type::INT8).unwrap().unwrap();
        assert_eq!(bytes, (-3i64).to_be_bytes().to_vec());

        let bytes = encode(json!(" 3 "), Type::INT4).unwrap().unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 3]);
        let bytes = encode(json!("-7"), Type::INT2).unwrap().unwrap();
        assert_eq!(bytes, (-7i16).to_be_bytes().to_vec());

        let bytes = encode(json!("1.5"), Type::FLOAT8).unwrap().unwrap();
        assert_eq!(bytes, 1.5f64.to_be_bytes().to_vec());

        assert_eq!(encode(json!("false"), Type::BOOL).unwrap(), Some(vec![0]));
        assert_eq!(encode(json!("true"), Type::BOOL).unwrap(), Some(vec![1]));
    }

    #[test]
    fn test_unconvertible_values_are_errors() {
        assert!(encode(json!("3.5"), Type::INT4).is_err());
        assert!(encode(json!("three"), Type::INT4).is_err());
        assert!(encode(json!(true), Type::INT4).is_err());
        assert!(encode(json!(1), Type::BOOL).is_err());
        assert!(encode(json!("maybe"), Type::BOOL).is_err());
        assert!(encode(json!("yes"), Type::FLOAT8).is_err());
        assert!(encode(json!({"a": 1}), Type::FLOAT8).is_err());

        let err = encode(json!(1e20), Type::INT8).unwrap_err();
        assert!(err.contains("out of range"));
        let err = encode(json!(40000.0), Type::INT2).unwrap_err();
        assert!(err.contains("out of range"));
    }

    #[test]
    fn test_parse_bool_accepts_boolean_input_syntax() {
        for text in ["t", "TRUE", " tr ", "y", "yes", "on", "1"] {
            assert_eq!(parse_bool(text), Some(true), "{text}");
        }
        for text in ["f", "False", "n", "NO", "off", "of", "0"] {
            assert_eq!(parse_bool(text), Some(false), "{text}");
        }
        for text in ["", "o", "2", "truth", "nope"] {
            assert_eq!(parse_bool(text), None, "{text}");
        }
    }

    #[test]
    fn test_bool_encoding() {
        let bytes = encode(json!(true), Type::BOOL).unwrap().unwrap();
        assert_eq!(bytes, vec![1]);
    }

    #[test]
    fn test_text_is_bound_verbatim() {
        let hostile = "O'Brien; DROP TABLE x;";
        let bytes = encode(json!(hostile), Type::TEXT).unwrap().unwrap();
        assert_eq!(bytes, hostile.as_bytes());
    }

    #[test]
    fn test_non_string_into_text() {
        let bytes = encode(json!(42), Type::TEXT).unwrap().unwrap();
        assert_eq!(bytes, b"42");

        let bytes = encode(json!(["a", 1]), Type::TEXT).unwrap().unwrap();
        assert_eq!(bytes, br#"["a",1]"#);
    }

    #[test]
    fn test_jsonb_encoding() {
        let bytes = encode(json!({"a": 1}), Type::JSONB).unwrap().unwrap();
        // jsonb binary format is a version byte followed by the JSON text
        assert_eq!(bytes[0], 1);
        assert_eq!(&bytes[1..], br#"{"a":1}"#);
    }

    #[test]
    fn test_unsupported_parameter_type() {
        let err = encode(json!("2024-01-01"), Type::DATE).unwrap_err();
        assert!(err.contains("not supported"));
    }
}
