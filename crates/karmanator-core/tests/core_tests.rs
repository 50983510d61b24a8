#[cfg(test)]
mod tests {
    use karmanator_core::*;

    // ── AwardKind ──────────────────────────────────────────────

    #[test]
    fn test_award_kind_suffixes() {
        assert_eq!(AwardKind::PlusPlus.suffix(), "++");
        assert_eq!(AwardKind::MinusMinus.suffix(), "--");
        assert_eq!(AwardKind::PlusMinus.suffix(), "+-");
        assert_eq!(AwardKind::PlusMinus.to_string(), "+-");
    }

    #[test]
    fn test_award_kind_from_suffix() {
        assert_eq!(AwardKind::from_suffix("++"), Some(AwardKind::PlusPlus));
        assert_eq!(AwardKind::from_suffix("--"), Some(AwardKind::MinusMinus));
        assert_eq!(AwardKind::from_suffix("+-"), Some(AwardKind::PlusMinus));
        assert_eq!(AwardKind::from_suffix("-+"), None);
        assert_eq!(AwardKind::from_suffix("+++"), None);
    }

    #[test]
    fn test_award_kind_serializes_as_suffix() {
        let json = serde_json::to_string(&AwardKind::MinusMinus).unwrap();
        assert_eq!(json, "\"--\"");
        let kind: AwardKind = serde_json::from_str("\"+-\"").unwrap();
        assert_eq!(kind, AwardKind::PlusMinus);
    }

    // ── KarmaRecord ────────────────────────────────────────────

    #[test]
    fn test_empty_record_counts_zero() {
        let record = KarmaRecord::default();
        for kind in AwardKind::ALL {
            assert_eq!(record.count(kind), 0);
        }
        assert_eq!(record.net(), 0);
    }

    #[test]
    fn test_increment_touches_only_one_counter() {
        let mut record = KarmaRecord::default();
        record.increment(AwardKind::MinusMinus);
        assert_eq!(record.count(AwardKind::MinusMinus), 1);
        assert_eq!(record.count(AwardKind::PlusPlus), 0);
        assert_eq!(record.count(AwardKind::PlusMinus), 0);
    }

    #[test]
    fn test_net_ignores_plus_minus() {
        let mut record = KarmaRecord::default();
        for _ in 0..3 {
            record.increment(AwardKind::PlusPlus);
        }
        record.increment(AwardKind::MinusMinus);
        for _ in 0..5 {
            record.increment(AwardKind::PlusMinus);
        }
        assert_eq!(record.net(), 2);
    }

    #[test]
    fn test_net_can_go_negative() {
        let mut record = KarmaRecord::default();
        record.increment(AwardKind::MinusMinus);
        record.increment(AwardKind::MinusMinus);
        assert_eq!(record.net(), -2);
    }

    #[test]
    fn test_record_json_shape() {
        let mut record = KarmaRecord::default();
        record.increment(AwardKind::PlusPlus);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"++":1}"#);
    }

    #[test]
    fn test_fold_name() {
        assert_eq!(fold_name("Bob"), "bob");
        assert_eq!(fold_name("BOB42"), "bob42");
    }

    // ── Error tests ────────────────────────────────────────────

    #[test]
    fn test_persistence_error_display() {
        let err = KarmaError::Persistence {
            path: "karma.yaml".into(),
            reason: "permission denied".into(),
        };
        let s = err.to_string();
        assert!(s.contains("karma.yaml"));
        assert!(s.contains("permission denied"));
        assert!(err.is_persistence());
    }

    #[test]
    fn test_malformed_store_is_persistence() {
        let err = KarmaError::MalformedStore {
            path: "karma.yaml".into(),
            reason: "bad indent".into(),
        };
        assert!(err.is_persistence());
        assert!(!KarmaError::Config("x".into()).is_persistence());
    }

    #[test]
    fn test_error_channel() {
        let err = KarmaError::Channel {
            channel: "irc".into(),
            reason: "connection reset".into(),
        };
        let s = err.to_string();
        assert!(s.contains("irc"));
        assert!(s.contains("connection reset"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: KarmaError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }
}
