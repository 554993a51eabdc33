//! Prediction request validation

use crate::dataset::schema::{AVG_PRICE_YUAN_PER_TON, CROP, REGION, SOWN_AREA_KHA, YEAR};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Keys every request must carry, in the order they are reported when missing
pub const REQUIRED_FIELDS: [&str; 5] = [CROP, REGION, YEAR, SOWN_AREA_KHA, AVG_PRICE_YUAN_PER_TON];

/// Reasons a raw request is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("{field} must be {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("crop and region must not be empty")]
    EmptyName,
}

/// Validated model input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub crop: String,
    pub region: String,
    pub year: i64,
    pub sown_area_kha: f64,
    pub avg_price_yuan_per_ton: f64,
}

impl PredictionRequest {
    /// One-row frame with the training feature schema
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        df!(
            CROP => &[self.crop.as_str()],
            REGION => &[self.region.as_str()],
            YEAR => &[self.year],
            SOWN_AREA_KHA => &[self.sown_area_kha],
            AVG_PRICE_YUAN_PER_TON => &[self.avg_price_yuan_per_ton],
        )
    }
}

/// Validate an untyped JSON payload.
///
/// Checks run in a fixed order and the first failing class is reported: missing keys, then
/// `year`, `sown_area_kha`, `avg_price_yuan_per_ton`, then empty names. No range checks are
/// applied to the numeric fields.
pub fn validate_input(payload: &Value) -> Result<PredictionRequest, ValidationError> {
    let fields = payload.as_object().ok_or(ValidationError::NotAnObject)?;

    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|key| !fields.contains_key(**key))
        .map(|key| key.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    let year = as_integer(field(fields, YEAR)).ok_or(ValidationError::InvalidType {
        field: YEAR,
        expected: "an integer",
    })?;
    let sown_area_kha = as_float(field(fields, SOWN_AREA_KHA)).ok_or(ValidationError::InvalidType {
        field: SOWN_AREA_KHA,
        expected: "a number",
    })?;
    let avg_price_yuan_per_ton =
        as_float(field(fields, AVG_PRICE_YUAN_PER_TON)).ok_or(ValidationError::InvalidType {
            field: AVG_PRICE_YUAN_PER_TON,
            expected: "a number",
        })?;

    let crop = as_name(field(fields, CROP), CROP)?;
    let region = as_name(field(fields, REGION), REGION)?;
    if crop.is_empty() || region.is_empty() {
        return Err(ValidationError::EmptyName);
    }

    Ok(PredictionRequest {
        crop,
        region,
        year,
        sown_area_kha,
        avg_price_yuan_per_ton,
    })
}

fn field<'a>(fields: &'a Map<String, Value>, key: &str) -> &'a Value {
    fields.get(key).unwrap_or(&Value::Null)
}

/// Integers pass through, floats truncate toward zero, strings must hold an integer literal.
fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

/// Non-finite values are rejected along with anything unparsable.
fn as_float(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn as_name(value: &Value, field: &'static str) -> Result<String, ValidationError> {
    match value {
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(true) => Ok("True".to_string()),
        Value::Bool(false) => Ok("False".to_string()),
        Value::Null => Ok(String::new()),
        Value::Array(_) | Value::Object(_) => Err(ValidationError::InvalidType {
            field,
            expected: "a string",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> Value {
        json!({
            "crop": "Wheat",
            "region": "Henan",
            "year": 2021,
            "sown_area_kha": 5600.5,
            "avg_price_yuan_per_ton": 2300,
        })
    }

    #[test]
    fn test_valid_payload() {
        let request = validate_input(&valid()).unwrap();
        assert_eq!(request.crop, "Wheat");
        assert_eq!(request.year, 2021);
        assert_eq!(request.sown_area_kha, 5600.5);
        assert_eq!(request.avg_price_yuan_per_ton, 2300.0);
    }

    #[test]
    fn test_missing_fields_in_declared_order() {
        let err = validate_input(&json!({"year": 2020, "crop": "Wheat"})).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields(vec![
                "region".to_string(),
                "sown_area_kha".to_string(),
                "avg_price_yuan_per_ton".to_string(),
            ])
        );
    }

    #[test]
    fn test_year_checked_before_area() {
        let mut payload = valid();
        payload["year"] = json!("not-a-year");
        payload["sown_area_kha"] = json!("lots");

        assert_eq!(
            validate_input(&payload).unwrap_err(),
            ValidationError::InvalidType { field: "year", expected: "an integer" }
        );
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let mut payload = valid();
        payload["year"] = json!(" 2019 ");
        payload["sown_area_kha"] = json!("12.5");
        payload["avg_price_yuan_per_ton"] = json!("-3");

        let request = validate_input(&payload).unwrap();
        assert_eq!(request.year, 2019);
        assert_eq!(request.sown_area_kha, 12.5);
        assert_eq!(request.avg_price_yuan_per_ton, -3.0);
    }

    #[test]
    fn test_float_year_truncates() {
        let mut payload = valid();
        payload["year"] = json!(2020.9);
        assert_eq!(validate_input(&payload).unwrap().year, 2020);
    }

    #[test]
    fn test_names_are_trimmed_or_rejected() {
        let mut payload = valid();
        payload["crop"] = json!("  Wheat ");
        assert_eq!(validate_input(&payload).unwrap().crop, "Wheat");

        payload["region"] = json!("   ");
        assert_eq!(validate_input(&payload).unwrap_err(), ValidationError::EmptyName);
    }

    #[test]
    fn test_scalar_names_are_stringified() {
        let mut payload = valid();
        payload["crop"] = json!(true);
        payload["region"] = json!(42);

        let request = validate_input(&payload).unwrap();
        assert_eq!(request.crop, "True");
        assert_eq!(request.region, "42");
    }

    #[test]
    fn test_huge_float_year_is_rejected() {
        let mut payload = valid();
        payload["year"] = json!(1e30);
        assert_eq!(
            validate_input(&payload).unwrap_err(),
            ValidationError::InvalidType { field: "year", expected: "an integer" }
        );
    }

    #[test]
    fn test_non_object_payload() {
        assert_eq!(validate_input(&json!([1, 2])).unwrap_err(), ValidationError::NotAnObject);
    }

    #[test]
    fn test_to_frame_schema() {
        let frame = validate_input(&valid()).unwrap().to_frame().unwrap();
        assert_eq!(frame.height(), 1);
        assert_eq!(
            frame.get_column_names().iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            vec!["crop", "region", "year", "sown_area_kha", "avg_price_yuan_per_ton"]
        );
    }
}
