// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::adapters::FakeSessionAdapter;

#[test]
fn parses_well_formed_line() {
    let session = parse_line("hive-web-2\t/srv/web\t1700000000\t1700000100").unwrap();
    assert_eq!(session.name, "hive-web-2");
    assert_eq!(session.working_dir, PathBuf::from("/srv/web"));
    assert_eq!(session.created_at_ms, 1_700_000_000_000);
    assert_eq!(session.last_active_ms, 1_700_000_100_000);
}

#[test]
fn skips_lines_with_missing_fields() {
    assert!(parse_line("hive-web\t/srv/web").is_none());
    assert!(parse_line("").is_none());
}

#[test]
fn skips_lines_with_bad_timestamps() {
    assert!(parse_line("hive-web\t/srv/web\tnot-a-number\t1700000100").is_none());
    assert!(parse_line("hive-web\t/srv/web\t1700000000\tlater").is_none());
}

#[tokio::test]
async fn fake_adapter_returns_scripted_snapshot() {
    let adapter = FakeSessionAdapter::new();
    adapter.set_sessions(vec![LiveSession {
        name: "hive-web".to_string(),
        working_dir: "/srv".into(),
        created_at_ms: 1,
        last_active_ms: 2,
    }]);

    let sessions = adapter.list_sessions().await.unwrap();
    assert_eq!(sessions.len(), 1);

    adapter.set_fail(true);
    assert!(adapter.list_sessions().await.is_err());
}
