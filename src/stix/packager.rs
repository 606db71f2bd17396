// file: src/stix/packager.rs
// description: re-chunks a flat STIX object list into size-bounded bundles

use crate::models::StixBundle;
use serde_json::Value;

pub const DEFAULT_MAX_OBJECTS_PER_BUNDLE: usize = 5000;

pub struct BundlePackager {
    max_objects: usize,
}

impl BundlePackager {
    pub fn new(max_objects: usize) -> Self {
        Self {
            max_objects: max_objects.max(1),
        }
    }

    pub fn max_objects(&self) -> usize {
        self.max_objects
    }

    /// Contiguous chunks of at most `max_objects`, order preserved. An empty
    /// input yields no bundles.
    pub fn package_bundles(&self, objects: Vec<Value>) -> Vec<StixBundle> {
        let mut bundles = Vec::with_capacity(objects.len().div_ceil(self.max_objects));
        let mut remaining = objects.into_iter().peekable();

        while remaining.peek().is_some() {
            let chunk: Vec<Value> = remaining.by_ref().take(self.max_objects).collect();
            bundles.push(StixBundle::new(chunk));
        }

        bundles
    }
}

impl Default for BundlePackager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_OBJECTS_PER_BUNDLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stix::ShapeNormalizer;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashSet;

    fn objects(count: usize) -> Vec<Value> {
        (0..count)
            .map(|n| json!({"type": "indicator", "id": format!("indicator--{n}")}))
            .collect()
    }

    #[test]
    fn test_chunk_sizes() {
        let bundles = BundlePackager::new(3).package_bundles(objects(8));
        let sizes: Vec<usize> = bundles.iter().map(StixBundle::object_count).collect();
        assert_eq!(sizes, vec![3, 3, 2]);
    }

    #[test]
    fn test_exact_multiple() {
        let bundles = BundlePackager::new(5).package_bundles(objects(10));
        assert_eq!(bundles.len(), 2);
        assert!(bundles.iter().all(|b| b.object_count() == 5));
    }

    #[test]
    fn test_empty_input_yields_no_bundles() {
        assert!(BundlePackager::default().package_bundles(Vec::new()).is_empty());
    }

    #[test]
    fn test_bundle_ids_are_unique() {
        let bundles = BundlePackager::new(1).package_bundles(objects(50));
        let ids: HashSet<&str> = bundles.iter().map(StixBundle::id).collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_repackaging_round_trip_keeps_objects() {
        let original = objects(12);
        let bundles = BundlePackager::new(5).package_bundles(original.clone());

        let as_items: Vec<Value> = bundles
            .iter()
            .map(|b| serde_json::to_value(b).unwrap())
            .collect();
        let reflattened = ShapeNormalizer::new().flatten_objects(as_items);

        assert_eq!(reflattened, original);
    }

    #[test]
    fn test_taxii_page_packages_into_one_bundle() {
        let o1 = json!({"type": "malware", "id": "malware--1"});
        let o2 = json!({"type": "indicator", "id": "indicator--2"});
        let page = json!({
            "value": [{"content": {"type": "bundle", "objects": [o1.clone(), o2.clone()]}}],
            "nextLink": null
        });

        let items = crate::models::Page::from_value(page).into_items();
        let flat = ShapeNormalizer::new().flatten_objects(items);
        assert_eq!(flat, vec![o1.clone(), o2.clone()]);

        let bundles = BundlePackager::default().package_bundles(flat);
        assert_eq!(bundles.len(), 1);
        assert_eq!(bundles[0].objects(), &[o1, o2]);
    }
}
