#[cfg(test)]
mod tests {
    use karmanator_core::{AwardKind, KarmaError, KarmaMap, KarmaRecord};
    use karmanator_store::KarmaStore;

    fn store_in(dir: &tempfile::TempDir) -> KarmaStore {
        KarmaStore::open(dir.path().join("karma.yaml"))
    }

    fn record(pp: u64, mm: u64, pm: u64) -> KarmaRecord {
        let mut r = KarmaRecord::default();
        for _ in 0..pp {
            r.increment(AwardKind::PlusPlus);
        }
        for _ in 0..mm {
            r.increment(AwardKind::MinusMinus);
        }
        for _ in 0..pm {
            r.increment(AwardKind::PlusMinus);
        }
        r
    }

    #[test]
    fn test_absent_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.load().unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_empty_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "   \n").unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_null_document_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "~\n").unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut map = KarmaMap::new();
        map.insert("alice".into(), record(2, 1, 0));
        map.insert("bob".into(), record(0, 0, 3));
        store.save(&map).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, map);
        assert_eq!(loaded["alice"].net(), 1);
        assert_eq!(loaded["bob"].count(AwardKind::PlusMinus), 3);
    }

    #[test]
    fn test_save_of_load_preserves_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut map = KarmaMap::new();
        map.insert("carol".into(), record(5, 2, 1));
        store.save(&map).unwrap();

        let first = store.load().unwrap();
        store.save(&first).unwrap();
        assert_eq!(store.load().unwrap(), first);
    }

    #[test]
    fn test_reads_historical_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            "alice:\n  ++: 3\n  --: 1\nbob:\n  +-: 2\n",
        )
        .unwrap();
        let map = store.load().unwrap();
        assert_eq!(map["alice"].count(AwardKind::PlusPlus), 3);
        assert_eq!(map["alice"].count(AwardKind::MinusMinus), 1);
        assert_eq!(map["alice"].count(AwardKind::PlusMinus), 0);
        assert_eq!(map["bob"].count(AwardKind::PlusMinus), 2);
    }

    #[test]
    fn test_mixed_case_keys_are_folded() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            "Alice:\n  ++: 1\nalice:\n  ++: 2\n  --: 1\n",
        )
        .unwrap();
        let map = store.load().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["alice"].count(AwardKind::PlusPlus), 3);
        assert_eq!(map["alice"].net(), 2);
    }

    #[test]
    fn test_malformed_document_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "alice: [1, 2\n").unwrap();
        let err = store.load().unwrap_err();
        assert!(matches!(err, KarmaError::MalformedStore { .. }));
        assert!(err.is_persistence());
    }

    #[test]
    fn test_wrong_shape_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "alice:\n  ++: lots\n").unwrap();
        assert!(matches!(
            store.load().unwrap_err(),
            KarmaError::MalformedStore { .. }
        ));
    }

    #[test]
    fn test_unwritable_location_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = KarmaStore::open(dir.path().join("missing").join("karma.yaml"));
        let err = store.save(&KarmaMap::new()).unwrap_err();
        assert!(matches!(err, KarmaError::Persistence { .. }));
    }

    #[test]
    fn test_refused_rename_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("karma.yaml");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep"), "kept").unwrap();

        let store = KarmaStore::open(&target);
        let mut map = KarmaMap::new();
        map.insert("alice".into(), record(1, 0, 0));
        let err = store.save(&map).unwrap_err();
        assert!(matches!(err, KarmaError::Persistence { .. }));

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
        assert_eq!(std::fs::read_to_string(target.join("keep")).unwrap(), "kept");
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut map = KarmaMap::new();
        map.insert("dave".into(), record(1, 0, 0));
        store.save(&map).unwrap();
        store.save(&map).unwrap();
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_record_and_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut map = KarmaMap::new();
        map.insert("zed".into(), record(1, 0, 0));
        map.insert("amy".into(), record(0, 1, 0));
        store.save(&map).unwrap();

        assert_eq!(store.names().unwrap(), vec!["amy", "zed"]);
        assert_eq!(store.record("ZED").unwrap().unwrap().net(), 1);
        assert!(store.record("nobody").unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_save_keeps_existing_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "alice:\n  ++: 1\n").unwrap();
        std::fs::set_permissions(store.path(), std::fs::Permissions::from_mode(0o644)).unwrap();

        store.save(&store.load().unwrap()).unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_keeps_restrictive_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "").unwrap();
        std::fs::set_permissions(store.path(), std::fs::Permissions::from_mode(0o640)).unwrap();

        let mut map = KarmaMap::new();
        map.insert("alice".into(), record(1, 0, 0));
        store.save(&map).unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[cfg(unix)]
    #[test]
    fn test_new_store_file_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&KarmaMap::new()).unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }
}
