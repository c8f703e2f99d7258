/// End-to-end report tests against an in-memory row source
use membership_sync_tools::db::RowSource;
use membership_sync_tools::errors::ReportError;
use membership_sync_tools::queries::{ReportQuery, Section};
use membership_sync_tools::report::Reporter;
use membership_sync_tools::sync_status::SyncStatus;

/// Canned rows per section; `None` simulates an unreachable store.
#[derive(Default)]
struct StaticRows {
    members: Option<Vec<String>>,
    memberships: Option<Vec<String>>,
    sync: Option<Vec<String>>,
}

impl RowSource for StaticRows {
    async fn fetch_rows(&self, query: &ReportQuery) -> Result<Vec<String>, ReportError> {
        let rows = match query.section {
            Section::Members => &self.members,
            Section::Memberships => &self.memberships,
            Section::Sync => &self.sync,
        };
        rows.clone().ok_or(ReportError::QueryFailure(sqlx::Error::PoolTimedOut))
    }
}

fn rows(lines: &[&str]) -> Option<Vec<String>> {
    Some(lines.iter().map(|l| l.to_string()).collect())
}

async fn render(source: StaticRows) -> (String, membership_sync_tools::report::ReportSummary) {
    let reporter = Reporter::new(source, 50);
    let mut out = Vec::new();
    let summary = reporter.run(&mut out).await.unwrap();
    (String::from_utf8(out).unwrap(), summary)
}

#[tokio::test]
async fn test_synced_member_end_to_end() {
    let source = StaticRows {
        members: rows(&["0xAAA0000000000001|3|2|2024-01-01"]),
        memberships: rows(&["0xAAA0000000000001|2|true|2|2024-01-02"]),
        sync: rows(&["0xAAA0000000000001|3|2|2|2024-01-02"]),
    };
    let (report, summary) = render(source).await;

    assert!(report.contains("  0xAAA00000... -> Level 3, Owned: [2]"));
    assert!(report.contains("  0xAAA00000... -> NFT L2, Member: yes, Unlock: 2, Claimed: 2024-01-02"));
    assert!(report.contains("  0xAAA00000... -> Member L3, NFT L2, Unlock: 2 [SYNCED]"));
    assert_eq!(summary.sections_ok, 3);
    assert_eq!(summary.sections_failed, 0);
    assert_eq!(summary.status_counts.get(&SyncStatus::Synced), Some(&1));
}

#[tokio::test]
async fn test_member_without_level2_row_is_other() {
    let source = StaticRows {
        members: rows(&["0xBBB0000000000001|1|1|2024-01-01"]),
        memberships: rows(&[]),
        sync: rows(&["0xBBB0000000000001|1||||"]),
    };
    let (report, summary) = render(source).await;

    assert!(report.contains("  0xBBB00000... -> Member L1, NFT L0, Unlock: 0 [OTHER]"));
    assert_eq!(summary.status_counts.get(&SyncStatus::Other), Some(&1));
}

#[tokio::test]
async fn test_every_status_is_tallied() {
    let source = StaticRows {
        members: rows(&[]),
        memberships: rows(&[]),
        sync: rows(&[
            "0x1111111111111111|2|2|2|2024-01-02",
            "0x2222222222222222|1|2|2|2024-01-02",
            "0x3333333333333333|4||||",
            "0x4444444444444444|3|0|0|",
        ]),
    };
    let (report, summary) = render(source).await;

    assert!(report.contains("[SYNCED]"));
    assert!(report.contains("[NFT_AHEAD]"));
    assert!(report.contains("  0x33333333... -> Member L4, NFT L0, Unlock: 0 [MEMBER_AHEAD]"));
    assert!(report.contains("  0x44444444... -> Member L3, NFT L0, Unlock: 0 [OTHER]"));
    for status in SyncStatus::ALL {
        assert_eq!(summary.status_counts.get(&status), Some(&1), "{}", status);
    }
    assert!(report.contains("  SYNCED: 1\n  NFT_AHEAD: 1\n  MEMBER_AHEAD: 1\n  OTHER: 1\n"));
}

#[tokio::test]
async fn test_failed_section_does_not_stop_later_sections() {
    let source = StaticRows {
        members: None,
        memberships: rows(&["0xAAA0000000000001|2|t|2|"]),
        sync: rows(&["0xAAA0000000000001|3|2|2|"]),
    };
    let (report, summary) = render(source).await;

    assert!(report.contains("=== Members ===\n  ❌ Query failed:"));
    assert!(report.contains("[SYNCED]"));
    assert_eq!(summary.sections_failed, 1);
    assert_eq!(summary.sections_ok, 2);
}

#[tokio::test]
async fn test_short_rows_skipped_without_failing() {
    let source = StaticRows {
        members: rows(&["0xAAA|3|2", "0xBBB0000000000001|1|[1]|"]),
        memberships: rows(&["0xAAA|2|t|2"]),
        sync: rows(&["0xAAA|3|2|2", "0xCCC0000000000001|2||||"]),
    };
    let (report, summary) = render(source).await;

    assert_eq!(summary.rows_skipped, 3);
    assert_eq!(summary.rows_rendered, 2);
    assert_eq!(summary.sections_failed, 0);
    assert!(report.contains("  (1 rows, 1 skipped)"));
    assert!(report.contains("  (0 rows, 1 skipped)"));
    assert!(report.contains("[MEMBER_AHEAD]"));
}

#[tokio::test]
async fn test_store_unreachable_everywhere() {
    let (report, summary) = render(StaticRows::default()).await;

    assert_eq!(report.matches("❌ Query failed").count(), 3);
    assert_eq!(summary.sections_failed, 3);
    assert_eq!(summary.rows_rendered, 0);
}
