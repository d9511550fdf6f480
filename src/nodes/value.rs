//! Typed property values carried by nodes and socket defaults

use serde::{Deserialize, Serialize};
use std::fmt;

/// A node property or socket default value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f32),
    /// Vectors of any arity (2D/3D/4D)
    Vector(Vec<f32>),
    /// Linear RGBA color
    Color([f32; 4]),
    String(String),
    /// Identifier of one option of an enumeration (e.g. "LINEAR")
    Enum(String),
}

impl PropertyValue {
    /// Short type tag used in serialized graphs
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Bool(_) => "bool",
            PropertyValue::Int(_) => "int",
            PropertyValue::Float(_) => "float",
            PropertyValue::Vector(_) => "vector",
            PropertyValue::Color(_) => "color",
            PropertyValue::String(_) => "string",
            PropertyValue::Enum(_) => "enum",
        }
    }

    /// Portable text form of the value
    ///
    /// Floats use Rust's shortest round-trip formatting, vector components are
    /// space separated, booleans are `True`/`False`.
    pub fn to_portable(&self) -> String {
        self.to_string()
    }
}

fn write_floats(f: &mut fmt::Formatter<'_>, values: &[f32]) -> fmt::Result {
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{}", v)?;
    }
    Ok(())
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(b) => f.write_str(if *b { "True" } else { "False" }),
            PropertyValue::Int(i) => write!(f, "{}", i),
            PropertyValue::Float(v) => write!(f, "{}", v),
            PropertyValue::Vector(values) => write_floats(f, values),
            PropertyValue::Color(rgba) => write_floats(f, rgba),
            PropertyValue::String(s) | PropertyValue::Enum(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portable_forms() {
        assert_eq!(PropertyValue::Bool(true).to_portable(), "True");
        assert_eq!(PropertyValue::Int(-3).to_portable(), "-3");
        assert_eq!(PropertyValue::Float(0.5).to_portable(), "0.5");
        assert_eq!(PropertyValue::Float(1.0).to_portable(), "1");
        assert_eq!(PropertyValue::Vector(vec![0.0, 1.5, -2.0]).to_portable(), "0 1.5 -2");
        assert_eq!(PropertyValue::Color([1.0, 0.25, 0.0, 1.0]).to_portable(), "1 0.25 0 1");
        assert_eq!(PropertyValue::Enum("LINEAR".into()).to_portable(), "LINEAR");
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(PropertyValue::Float(0.5)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "float", "value": 0.5}));

        let back: PropertyValue =
            serde_json::from_value(serde_json::json!({"type": "enum", "value": "CLOSEST"})).unwrap();
        assert_eq!(back, PropertyValue::Enum("CLOSEST".into()));
    }
}
