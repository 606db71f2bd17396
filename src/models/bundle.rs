// file: src/models/bundle.rs
// description: STIX 2.1 bundle container handed to the import collaborator
// reference: https://docs.oasis-open.org/cti/stix/v2.1/os/stix-v2.1-os.html

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// A bundle is built once by the packager and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StixBundle {
    #[serde(rename = "type")]
    kind: String,
    id: String,
    objects: Vec<Value>,
}

impl StixBundle {
    pub fn new(objects: Vec<Value>) -> Self {
        Self {
            kind: "bundle".to_string(),
            id: format!("bundle--{}", Uuid::new_v4()),
            objects,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn objects(&self) -> &[Value] {
        &self.objects
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}
