// file: src/platform/directory.rs
// description: offline import collaborator writing each bundle as a json file

use crate::error::Result;
use crate::models::StixBundle;
use crate::platform::importer::BundleImporter;
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct DirectoryImporter {
    output_dir: PathBuf,
}

impl DirectoryImporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn bundle_path(&self, bundle: &StixBundle) -> PathBuf {
        self.output_dir.join(format!("{}.json", bundle.id()))
    }
}

#[async_trait]
impl BundleImporter for DirectoryImporter {
    /// Bundle ids are fresh per packaging, so `update` has nothing to merge here.
    async fn import_bundle(&self, bundle: &StixBundle, _update: bool) -> Result<()> {
        let path = self.bundle_path(bundle);
        let json = serde_json::to_vec_pretty(bundle)?;
        tokio::fs::write(&path, json).await?;

        info!("Wrote {} objects to {}", bundle.object_count(), path.display());
        Ok(())
    }

    fn name(&self) -> &str {
        "directory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use tempfile::tempdir;

    #[test]
    fn test_importer_creates_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("out/bundles");
        let importer = DirectoryImporter::new(&nested);
        assert!(importer.is_ok());
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn test_writes_bundle_file() {
        let dir = tempdir().unwrap();
        let importer = DirectoryImporter::new(dir.path()).unwrap();
        let bundle = StixBundle::new(vec![json!({"type": "indicator", "id": "indicator--1"})]);

        importer.import_bundle(&bundle, true).await.unwrap();

        let written = fs::read_to_string(dir.path().join(format!("{}.json", bundle.id()))).unwrap();
        let value: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["id"], bundle.id());
        assert_eq!(value["objects"][0]["id"], "indicator--1");
    }
}
