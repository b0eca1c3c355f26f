use std::path::{Path, PathBuf};

use tidyfile_core::{
    Action, ActionOp, DuplicateGroup, DuplicateReport, EngineConfig, FileRecord, HashAlgorithm,
    IndexReport, Phase, ProgressEvent, StreamSummary, META_KEPT, META_REASON,
};

#[test]
fn test_action_constructors() {
    let moved = Action::moved("/src/a.txt", "/dst/a.txt");
    assert_eq!(moved.op(), ActionOp::Move);
    assert_eq!(moved.src(), Path::new("/src/a.txt"));
    assert_eq!(moved.dst(), Some(Path::new("/dst/a.txt")));
    assert!(moved.op().is_mutation());

    let failed = Action::undo_failed("/src/a.txt", "Cannot restore deleted files");
    assert_eq!(failed.op(), ActionOp::UndoFailed);
    assert_eq!(failed.meta(META_REASON), Some("Cannot restore deleted files"));
    assert!(!failed.op().is_mutation());

    let archived = Action::archived_dupe("/a/2.txt", "/arch/2.txt", Path::new("/a/1.txt"));
    assert_eq!(archived.meta(META_KEPT), Some("/a/1.txt"));
    assert_eq!(archived.op(), ActionOp::ArchiveDupe);

    assert!(ActionOp::Trash.is_mutation());
    assert!(!ActionOp::Dupe.is_mutation());
}

#[test]
fn test_action_json_round_trip() {
    let original = Action::dupe("/a/2.txt", Path::new("/a/1.txt"));
    let json = serde_json::to_string(&original).unwrap();
    let parsed: Action = serde_json::from_str(&json).unwrap();
    assert_eq!(original, parsed);
}

#[test]
fn test_file_record_hash_keys() {
    let record = FileRecord::new(PathBuf::from("/data/report.pdf"), 2048, 1_700_000_000)
        .with_hash(HashAlgorithm::Sha256, Some("ab".repeat(32)));

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["name"], "report.pdf");
    assert_eq!(json["hashes"]["sha256"].as_str().unwrap().len(), 64);
    assert_eq!(record.hash(HashAlgorithm::Sha256).map(str::len), Some(64));
    assert!(record.hash(HashAlgorithm::Md5).is_none());
}

#[test]
fn test_duplicate_report_totals() {
    let groups = vec![
        DuplicateGroup::new(
            "aa".into(),
            HashAlgorithm::Sha256,
            10,
            vec!["/a".into(), "/b".into()],
        )
        .unwrap(),
        DuplicateGroup::new(
            "bb".into(),
            HashAlgorithm::Sha256,
            5,
            vec!["/c".into(), "/d".into(), "/e".into()],
        )
        .unwrap(),
    ];
    let report = DuplicateReport::new(groups, 9, 5);

    assert!(report.has_duplicates());
    assert_eq!(report.total_duplicates, 3);
    assert_eq!(report.total_wasted_bytes, 10 + 10);
    assert_eq!(report.actions().count(), 0);
}

#[test]
fn test_stream_summary_untagged() {
    let event = ProgressEvent::complete(StreamSummary::Index(IndexReport::from_records(vec![
        FileRecord::new("/x/y".into(), 7, 0),
    ])));
    let json = serde_json::to_string(&event).unwrap();
    let parsed: ProgressEvent = serde_json::from_str(&json).unwrap();

    match parsed {
        ProgressEvent::Complete {
            summary: StreamSummary::Index(report),
        } => {
            assert_eq!(report.total_files, 1);
            assert_eq!(report.total_bytes, 7);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn test_progress_builders() {
    let event = ProgressEvent::progress(Phase::Hashing, 0, 4).with_message("Hashing 4 candidate files...");
    assert_eq!(event.phase(), Some(Phase::Hashing));
    assert!(!event.is_terminal());
}

#[test]
fn test_engine_config_defaults() {
    let config = EngineConfig::default();
    assert_eq!(config.hash_workers, 0);
    assert_eq!(config.history_limit, 100);
    assert_eq!(config.default_algorithm, HashAlgorithm::Sha256);
}
