// file: src/models/page.rs
// description: tagged representation of one feed response body
// reference: observed shapes of the threat-intel feeds endpoint

use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    /// Bare JSON array of items.
    Items(Vec<Value>),
    /// Object carrying a `value` array and an optional `nextLink` cursor.
    Envelope {
        value: Vec<Value>,
        next_link: Option<String>,
    },
    /// Any other object. Kept whole, minus its cursor, as one synthetic item.
    Single {
        item: Value,
        next_link: Option<String>,
    },
    /// Scalars and nulls; they contribute no items.
    Opaque,
}

impl Page {
    /// Body equivalent of an HTTP 204 response.
    pub fn empty_payload() -> Value {
        json!({ "value": [], "nextLink": null })
    }

    pub fn from_value(payload: Value) -> Self {
        match payload {
            Value::Array(items) => Page::Items(items),
            Value::Object(mut map) => {
                let next_link = map.remove("nextLink").and_then(cursor_url);
                match map.remove("value") {
                    Some(Value::Array(value)) => Page::Envelope { value, next_link },
                    Some(other) => {
                        map.insert("value".to_string(), other);
                        Page::Single {
                            item: Value::Object(map),
                            next_link,
                        }
                    }
                    None => Page::Single {
                        item: Value::Object(map),
                        next_link,
                    },
                }
            }
            _ => Page::Opaque,
        }
    }

    pub fn next_link(&self) -> Option<&str> {
        match self {
            Page::Envelope { next_link, .. } | Page::Single { next_link, .. } => {
                next_link.as_deref()
            }
            Page::Items(_) | Page::Opaque => None,
        }
    }

    pub fn item_count(&self) -> usize {
        match self {
            Page::Items(items) => items.len(),
            Page::Envelope { value, .. } => value.len(),
            Page::Single { .. } => 1,
            Page::Opaque => 0,
        }
    }

    pub fn into_items(self) -> Vec<Value> {
        match self {
            Page::Items(items) => items,
            Page::Envelope { value, .. } => value,
            Page::Single { item, .. } => vec![item],
            Page::Opaque => Vec::new(),
        }
    }
}

fn cursor_url(value: Value) -> Option<String> {
    match value {
        Value::String(url) if !url.trim().is_empty() => Some(url),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bare_array() {
        let page = Page::from_value(json!([{"id": 1}, {"id": 2}]));
        assert_eq!(page.next_link(), None);
        assert_eq!(page.into_items(), vec![json!({"id": 1}), json!({"id": 2})]);
    }

    #[test]
    fn test_envelope_with_cursor() {
        let page = Page::from_value(json!({
            "value": [{"id": 1}],
            "nextLink": "https://api.example.com/v3.0/threatintel/feeds?skipToken=abc"
        }));
        assert_eq!(
            page.next_link(),
            Some("https://api.example.com/v3.0/threatintel/feeds?skipToken=abc")
        );
        assert_eq!(page.into_items(), vec![json!({"id": 1})]);
    }

    #[test]
    fn test_null_and_empty_cursor_terminate() {
        assert_eq!(Page::from_value(json!({"value": [], "nextLink": null})).next_link(), None);
        assert_eq!(Page::from_value(json!({"value": [], "nextLink": ""})).next_link(), None);
    }

    #[test]
    fn test_single_object_drops_cursor() {
        let page = Page::from_value(json!({
            "type": "bundle",
            "objects": [],
            "nextLink": "https://api.example.com/next"
        }));
        assert_eq!(page.next_link(), Some("https://api.example.com/next"));
        assert_eq!(page.into_items(), vec![json!({"type": "bundle", "objects": []})]);
    }

    #[test]
    fn test_non_array_value_is_kept_on_single_item() {
        let page = Page::from_value(json!({"value": "oops"}));
        assert_eq!(page.into_items(), vec![json!({"value": "oops"})]);
    }

    #[test]
    fn test_empty_payload_is_an_empty_envelope() {
        let page = Page::from_value(Page::empty_payload());
        assert_eq!(page.item_count(), 0);
        assert_eq!(page.next_link(), None);
    }

    #[test]
    fn test_scalars_are_opaque() {
        assert_eq!(Page::from_value(json!("text")), Page::Opaque);
        assert_eq!(Page::from_value(Value::Null).into_items(), Vec::<Value>::new());
    }
}
