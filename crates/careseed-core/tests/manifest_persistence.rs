use std::fs;
use std::path::PathBuf;

use careseed_core::{EntityType, Error, Identifier, ManifestRegistry, ManifestStore};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn temp_manifest(label: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("careseed_core_{label}_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir.join("SEED_DATA_MANIFEST.json")
}

#[test]
fn persist_then_load_round_trips_in_order() {
    let path = temp_manifest("round_trip");
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    let (mut registry, writer) = ManifestStore::new(&path).start_empty();
    for _ in 0..2 {
        registry.append(EntityType::Agencies, Identifier::mint(&mut rng));
    }
    for _ in 0..15 {
        registry.append(EntityType::Shifts, Identifier::mint(&mut rng));
    }
    writer.persist(&registry).expect("persist");

    let (loaded, _writer) = ManifestStore::new(&path).load().expect("load");
    assert_eq!(loaded, registry);
    assert_eq!(loaded.len(EntityType::Agencies), 2);
    assert_eq!(loaded.len(EntityType::Shifts), 15);
    assert_eq!(loaded.ids(EntityType::Shifts), registry.ids(EntityType::Shifts));
}

#[test]
fn persisted_document_is_a_plain_key_to_uuid_list_mapping() {
    let path = temp_manifest("shape");
    let id: Identifier = "67e55044-10b1-426f-9247-bb680e5fe0c8".parse().unwrap();

    let (mut registry, writer) = ManifestStore::new(&path).start_empty();
    registry.append(EntityType::Staff, id);
    writer.persist(&registry).expect("persist");

    let document: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("json");
    assert_eq!(
        document["staff"],
        serde_json::json!(["67e55044-10b1-426f-9247-bb680e5fe0c8"])
    );
    assert_eq!(document["agencies"], serde_json::json!([]));
}

#[test]
fn unknown_keys_survive_a_round_trip() {
    let path = temp_manifest("unknown_keys");
    fs::write(
        &path,
        r#"{"agencies": ["67e55044-10b1-426f-9247-bb680e5fe0c8"], "legacy_rows": []}"#,
    )
    .expect("write manifest");

    let (registry, writer) = ManifestStore::new(&path).load().expect("load");
    assert_eq!(registry.counts().get("legacy_rows"), Some(&0));
    writer.persist(&registry).expect("persist");

    let (reloaded, _) = ManifestStore::new(&path).load().expect("reload");
    assert_eq!(reloaded, registry);
}

#[test]
fn missing_manifest_is_a_storage_error() {
    let path = temp_manifest("missing");
    let err = ManifestStore::new(&path).load().expect_err("missing file");
    assert!(matches!(err, Error::Storage { .. }));
}

#[test]
fn malformed_manifest_is_a_storage_error() {
    let path = temp_manifest("malformed");
    fs::write(&path, "{\"agencies\": [\"not-a-uuid\"]}").expect("write manifest");
    let err = ManifestStore::new(&path).load().expect_err("bad uuid");
    assert!(matches!(err, Error::Storage { .. }));

    fs::write(&path, "not json").expect("write manifest");
    assert!(ManifestStore::new(&path).load().is_err());
}

#[test]
fn empty_registry_lists_every_entity_type() {
    let registry = ManifestRegistry::new();
    assert_eq!(registry.counts().len(), EntityType::DEPENDENCY_ORDER.len());
    assert!(registry.is_empty(EntityType::NotificationQueue));
}
