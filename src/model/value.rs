use crate::catalog::PropertyType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A typed property literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum PropertyValue {
    String(String),
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Decimal(f64),
}

impl PropertyValue {
    pub fn property_type(&self) -> PropertyType {
        match self {
            PropertyValue::String(_) => PropertyType::String,
            PropertyValue::Boolean(_) => PropertyType::Boolean,
            PropertyValue::Integer(_) => PropertyType::Integer,
            PropertyValue::Float(_) => PropertyType::Float,
            PropertyValue::Decimal(_) => PropertyType::Decimal,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Integer(i) => Some(*i as f64),
            PropertyValue::Float(f) | PropertyValue::Decimal(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Reads a JSON literal as a value of `property_type`, without any string
    /// coercion. Integers must be whole numbers.
    pub fn from_json(value: &serde_json::Value, property_type: PropertyType) -> Option<Self> {
        match property_type {
            PropertyType::String => value.as_str().map(|s| PropertyValue::String(s.to_string())),
            PropertyType::Boolean => value.as_bool().map(PropertyValue::Boolean),
            PropertyType::Integer => value
                .as_i64()
                .or_else(|| value.as_f64().and_then(whole_i64))
                .map(PropertyValue::Integer),
            PropertyType::Float => value.as_f64().map(PropertyValue::Float),
            PropertyType::Decimal => value.as_f64().map(PropertyValue::Decimal),
        }
    }
}

/// `value` as an `i64` when it is a whole number the type can hold exactly.
pub(crate) fn whole_i64(value: f64) -> Option<i64> {
    // 2^63 is the first whole f64 above i64::MAX.
    let bound = -(i64::MIN as f64);
    (value.fract() == 0.0 && value >= i64::MIN as f64 && value < bound).then_some(value as i64)
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => write!(f, "{}", s),
            PropertyValue::Boolean(b) => write!(f, "{}", b),
            PropertyValue::Integer(i) => write!(f, "{}", i),
            PropertyValue::Float(n) | PropertyValue::Decimal(n) => write!(f, "{}", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integer_requires_whole_number() {
        assert_eq!(
            PropertyValue::from_json(&json!(4.0), PropertyType::Integer),
            Some(PropertyValue::Integer(4))
        );
        assert_eq!(PropertyValue::from_json(&json!(4.5), PropertyType::Integer), None);
    }

    #[test]
    fn integer_out_of_range_is_rejected() {
        assert_eq!(PropertyValue::from_json(&json!(1e30), PropertyType::Integer), None);
        assert_eq!(
            PropertyValue::from_json(&json!(u64::MAX), PropertyType::Integer),
            None
        );
        assert_eq!(
            PropertyValue::from_json(&json!(i64::MIN), PropertyType::Integer),
            Some(PropertyValue::Integer(i64::MIN))
        );
        assert_eq!(whole_i64(-9_223_372_036_854_775_808.0), Some(i64::MIN));
        assert_eq!(whole_i64(9_223_372_036_854_775_808.0), None);
        assert_eq!(whole_i64(f64::INFINITY), None);
        assert_eq!(whole_i64(f64::NAN), None);
    }

    #[test]
    fn strings_are_not_coerced() {
        assert_eq!(PropertyValue::from_json(&json!("1"), PropertyType::Decimal), None);
        assert_eq!(PropertyValue::from_json(&json!(1), PropertyType::String), None);
    }

    #[test]
    fn json_form_is_tagged() {
        let json = serde_json::to_value(PropertyValue::Decimal(2.5)).unwrap();
        assert_eq!(json, json!({"type": "decimal", "value": 2.5}));
    }
}
