// file: src/platform/importer.rs
// description: import collaborator seam and the dispatcher that pushes bundles through it

use crate::error::{ConnectorError, Result};
use crate::models::StixBundle;
use async_trait::async_trait;
use tracing::debug;

/// "Import one STIX bundle, upsert on conflict" on the graph platform.
#[async_trait]
pub trait BundleImporter: Send + Sync {
    async fn import_bundle(&self, bundle: &StixBundle, update: bool) -> Result<()>;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub bundles: usize,
    pub objects: usize,
}

pub struct ImportDispatcher<'a> {
    importer: &'a dyn BundleImporter,
}

impl<'a> ImportDispatcher<'a> {
    pub fn new(importer: &'a dyn BundleImporter) -> Self {
        Self { importer }
    }

    /// Imports bundles in order with `update = true`. The first failure stops
    /// the run; bundles imported before it stay committed.
    pub async fn import_all(&self, bundles: &[StixBundle]) -> Result<ImportStats> {
        let mut stats = ImportStats::default();

        for bundle in bundles {
            self.importer
                .import_bundle(bundle, true)
                .await
                .map_err(|e| ConnectorError::Import {
                    bundles_committed: stats.bundles,
                    message: format!("{} rejected {}: {}", self.importer.name(), bundle.id(), e),
                })?;

            stats.bundles += 1;
            stats.objects += bundle.object_count();
            debug!(
                "Imported {} ({} objects) via {}",
                bundle.id(),
                bundle.object_count(),
                self.importer.name()
            );
        }

        Ok(stats)
    }
}
