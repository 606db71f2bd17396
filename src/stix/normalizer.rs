// file: src/stix/normalizer.rs
// description: extracts STIX objects from every wrapper convention the feed emits
// reference: TAXII 2.1 envelope and STIX 2.1 bundle layouts

use serde_json::Value;

/// Wrapper convention of one raw item. Classification order is the
/// declaration order below; the first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemShape {
    /// `{"envelope": {"objects": [...]}}`
    TaxiiEnvelope,
    /// `{"content": {"type": "bundle", "objects": [...]}}`
    ContentBundle,
    /// `{"content": {"envelope": {"objects": [...]}}}`
    ContentEnvelope,
    /// `{"type": "bundle", "objects": [...]}`
    Bundle,
    /// `{"objects": [...]}`
    Objects,
    Unrecognized,
}

impl ItemShape {
    pub fn classify(item: &Value) -> Self {
        if is_array(item.pointer("/envelope/objects")) {
            return ItemShape::TaxiiEnvelope;
        }

        if item.get("content").is_some_and(Value::is_object) {
            if item.pointer("/content/type").and_then(Value::as_str) == Some("bundle")
                && is_array(item.pointer("/content/objects"))
            {
                return ItemShape::ContentBundle;
            }
            if is_array(item.pointer("/content/envelope/objects")) {
                return ItemShape::ContentEnvelope;
            }
        }

        if is_array(item.get("objects")) {
            if item.get("type").and_then(Value::as_str) == Some("bundle") {
                return ItemShape::Bundle;
            }
            return ItemShape::Objects;
        }

        ItemShape::Unrecognized
    }

    /// JSON pointer to the object array for this shape.
    pub fn objects_pointer(&self) -> Option<&'static str> {
        match self {
            ItemShape::TaxiiEnvelope => Some("/envelope/objects"),
            ItemShape::ContentBundle => Some("/content/objects"),
            ItemShape::ContentEnvelope => Some("/content/envelope/objects"),
            ItemShape::Bundle | ItemShape::Objects => Some("/objects"),
            ItemShape::Unrecognized => None,
        }
    }
}

fn is_array(value: Option<&Value>) -> bool {
    value.is_some_and(Value::is_array)
}

pub struct ShapeNormalizer;

impl ShapeNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Flattens raw items into STIX objects, preserving order. Items of an
    /// unrecognized shape contribute nothing.
    pub fn flatten_objects(&self, items: Vec<Value>) -> Vec<Value> {
        let mut objects = Vec::new();

        for mut item in items {
            let Some(pointer) = ItemShape::classify(&item).objects_pointer() else {
                continue;
            };
            if let Some(Value::Array(found)) = item.pointer_mut(pointer).map(Value::take) {
                objects.extend(found);
            }
        }

        objects
    }
}

impl Default for ShapeNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
