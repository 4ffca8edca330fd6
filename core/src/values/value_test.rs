use super::{FunctionalObject, ObjectRegistry, Value};
use crate::evaluator::EvalError;
use glam::{DVec2, DVec3};
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[derive(Debug)]
struct Marker;

impl FunctionalObject for Marker {
    fn type_name(&self) -> &str {
        "marker"
    }

    fn call(&self, name: &str, _args: &[Value]) -> Result<Value, EvalError> {
        Ok(Value::from(name))
    }
}

#[test]
fn test_display() {
    assert_eq!(Value::Float(1.0).to_string(), "1");
    assert_eq!(Value::Float(2.5).to_string(), "2.5");
    assert_eq!(Value::Bool(true).to_string(), "true");
    assert_eq!(Value::from(DVec2::new(1.0, 2.5)).to_string(), "1, 2.5");
    assert_eq!(Value::from(DVec3::new(1.0, 2.0, 3.0)).to_string(), "1, 2, 3");
    assert_eq!(
        Value::from(vec![Value::Float(1.0), Value::from("a")]).to_string(),
        "(1; a)"
    );
    assert_eq!(Value::Null.to_string(), "null");
}

#[test]
fn test_concat_text() {
    assert_eq!(Value::Null.concat_text(), "");
    assert_eq!(Value::from("x").concat_text(), "x");
    assert_eq!(Value::Object(Arc::new(Marker)).concat_text(), "marker");
}

#[test]
fn test_equality() {
    assert_eq!(Value::Float(1.0), Value::Float(1.0));
    assert_ne!(Value::Float(1.0), Value::Bool(true));
    assert_eq!(Value::Null, Value::Null);

    let a: Arc<dyn FunctionalObject> = Arc::new(Marker);
    let b: Arc<dyn FunctionalObject> = Arc::new(Marker);
    assert_eq!(Value::Object(a.clone()), Value::Object(a.clone()));
    assert_ne!(Value::Object(a), Value::Object(b));
}

#[test]
fn test_accessors() {
    assert_eq!(Value::Float(3.0).as_float(), Some(3.0));
    assert_eq!(Value::Bool(false).as_float(), None);
    assert_eq!(Value::from("s").as_str(), Some("s"));
    assert_eq!(Value::empty_array().as_array().map(|a| a.len()), Some(0));
    assert_eq!(Value::Vec2(DVec2::ZERO).kind_name(), "vec2");
}

#[test]
fn test_registry() {
    let mut registry = ObjectRegistry::new();
    assert!(registry.is_empty());
    assert!(registry.register("shape", Arc::new(Marker)).is_none());
    assert!(registry.register("shape", Arc::new(Marker)).is_some());
    assert!(registry.contains("shape"));
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["shape"]);
    assert!(registry.unregister("shape").is_some());
    assert!(registry.get("shape").is_none());
}
