//! Manifest registry: entity type -> ordered identifiers, persisted as JSON
//! between generator runs so a later pass can reference earlier rows.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::atomic::write_bytes_atomic;
use crate::entity::EntityType;
use crate::error::{Error, Result};
use crate::identifier::Identifier;

/// In-memory mapping from entity type to the identifiers minted for it.
///
/// Keys not known to [`EntityType`] are kept as-is so a round trip never
/// drops data written by another tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRegistry {
    ids: BTreeMap<String, Vec<Identifier>>,
}

impl ManifestRegistry {
    /// Registry with an empty sequence for every known entity type.
    pub fn new() -> Self {
        let ids = EntityType::DEPENDENCY_ORDER
            .iter()
            .map(|entity| (entity.table_name().to_string(), Vec::new()))
            .collect();
        Self { ids }
    }

    /// Identifier at `index mod len` for `entity`.
    pub fn get(&self, entity: EntityType, index: usize) -> Result<Identifier> {
        let ids = self.ids(entity);
        if ids.is_empty() {
            return Err(Error::EmptyRegistry(entity));
        }
        Ok(ids[index % ids.len()])
    }

    /// Identifier at exactly `index`, for references that must not cycle.
    pub fn get_exact(&self, entity: EntityType, index: usize) -> Option<Identifier> {
        self.ids(entity).get(index).copied()
    }

    pub fn append(&mut self, entity: EntityType, id: Identifier) {
        self.ids
            .entry(entity.table_name().to_string())
            .or_default()
            .push(id);
    }

    pub fn ids(&self, entity: EntityType) -> &[Identifier] {
        self.ids
            .get(entity.table_name())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self, entity: EntityType) -> usize {
        self.ids(entity).len()
    }

    pub fn is_empty(&self, entity: EntityType) -> bool {
        self.ids(entity).is_empty()
    }

    pub fn contains(&self, entity: EntityType, id: &Identifier) -> bool {
        self.ids(entity).contains(id)
    }

    /// Identifier counts keyed by manifest key, including unknown keys.
    pub fn counts(&self) -> BTreeMap<&str, usize> {
        self.ids
            .iter()
            .map(|(key, ids)| (key.as_str(), ids.len()))
            .collect()
    }

    fn from_document(ids: BTreeMap<String, Vec<Identifier>>) -> Self {
        Self { ids }
    }
}

impl Default for ManifestRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Location of a persisted manifest.
///
/// Loading consumes the store and hands back the only [`ManifestWriter`]
/// for it, so a run loads at most once and persists at most once.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the persisted manifest.
    pub fn load(self) -> Result<(ManifestRegistry, ManifestWriter)> {
        let registry = read_manifest(&self.path)?;
        info!(
            path = %self.path.display(),
            entity_types = registry.ids.len(),
            "manifest loaded"
        );
        Ok((registry, ManifestWriter { path: self.path }))
    }

    /// Start from an empty registry without reading anything.
    pub fn start_empty(self) -> (ManifestRegistry, ManifestWriter) {
        debug!(path = %self.path.display(), "starting with an empty manifest");
        (ManifestRegistry::new(), ManifestWriter { path: self.path })
    }
}

/// Write-once handle returned by [`ManifestStore`].
#[derive(Debug)]
pub struct ManifestWriter {
    path: PathBuf,
}

impl ManifestWriter {
    /// Overwrite the manifest with the full registry content.
    pub fn persist(self, registry: &ManifestRegistry) -> Result<()> {
        let data = serde_json::to_vec_pretty(&registry.ids)
            .map_err(|err| Error::storage(&self.path, err))?;
        write_bytes_atomic(&self.path, &data).map_err(|err| Error::storage(&self.path, err))?;
        info!(path = %self.path.display(), "manifest persisted");
        Ok(())
    }
}

fn read_manifest(path: &Path) -> Result<ManifestRegistry> {
    let content = std::fs::read_to_string(path).map_err(|err| Error::storage(path, err))?;
    let ids: BTreeMap<String, Vec<Identifier>> =
        serde_json::from_str(&content).map_err(|err| Error::storage(path, err))?;
    Ok(ManifestRegistry::from_document(ids))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn registry_with(entity: EntityType, n: usize) -> (ManifestRegistry, Vec<Identifier>) {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut registry = ManifestRegistry::new();
        let ids: Vec<Identifier> = (0..n).map(|_| Identifier::mint(&mut rng)).collect();
        for id in &ids {
            registry.append(entity, *id);
        }
        (registry, ids)
    }

    #[test]
    fn get_cycles_through_smaller_pool() {
        let (registry, ids) = registry_with(EntityType::Agencies, 2);
        for index in 0..15 {
            let id = registry.get(EntityType::Agencies, index).expect("agency");
            assert_eq!(id, ids[index % 2]);
        }
    }

    #[test]
    fn single_identifier_pool_always_returns_it() {
        let (registry, ids) = registry_with(EntityType::Invoices, 1);
        for index in [0, 1, 7, 1_000, usize::MAX] {
            assert_eq!(registry.get(EntityType::Invoices, index).expect("id"), ids[0]);
        }
    }

    #[test]
    fn get_on_empty_pool_fails() {
        let registry = ManifestRegistry::new();
        let err = registry.get(EntityType::Staff, 0).expect_err("empty pool");
        assert!(matches!(err, Error::EmptyRegistry(EntityType::Staff)));
    }

    #[test]
    fn append_preserves_order_and_get_exact_does_not_cycle() {
        let (registry, ids) = registry_with(EntityType::Shifts, 3);
        assert_eq!(registry.ids(EntityType::Shifts), ids.as_slice());
        assert_eq!(registry.get_exact(EntityType::Shifts, 2), Some(ids[2]));
        assert_eq!(registry.get_exact(EntityType::Shifts, 3), None);
    }
}
