//! Renders the multi-section sync report.
//!
//! Each section is a single pass: fetch rows, decode, optionally classify,
//! write one line per row. A failed query replaces the section body with a
//! notice and the run moves on; a malformed row is skipped.

use std::collections::BTreeMap;
use std::io::{self, Write};

use crate::db::RowSource;
use crate::errors::ReportError;
use crate::models::{parse_row, DelimitedRecord, MemberRecord, MembershipRecord, SyncRow};
use crate::queries::{ReportQuery, Section};
use crate::sync_status::{SyncComparison, SyncStatus};

/// Counters gathered over one report run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub sections_ok: usize,
    pub sections_failed: usize,
    pub rows_rendered: usize,
    pub rows_skipped: usize,
    pub status_counts: BTreeMap<SyncStatus, usize>,
}

pub fn render_member(member: &MemberRecord) -> String {
    format!(
        "  {} -> Level {}, Owned: {}",
        member.wallet_address.short(),
        member.current_level,
        member.levels_owned
    )
}

pub fn render_membership(membership: &MembershipRecord) -> String {
    let claimed = membership
        .claimed_at
        .map(|ts| ts.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "never".to_string());
    format!(
        "  {} -> NFT L{}, Member: {}, Unlock: {}, Claimed: {}",
        membership.wallet_address.short(),
        membership.nft_level,
        if membership.is_member { "yes" } else { "no" },
        membership.unlock_level.unwrap_or(0),
        claimed
    )
}

pub fn render_sync(cmp: &SyncComparison) -> String {
    format!(
        "  {} -> Member L{}, NFT L{}, Unlock: {} [{}]",
        cmp.wallet_address.short(),
        cmp.current_level,
        cmp.nft_level,
        cmp.unlock_level,
        cmp.status
    )
}

/// Decodes `rows` as `T`, skipping blank lines and rows that fail to decode.
///
/// Returns the decoded records and the number of skipped rows.
pub fn decode_rows<T: DelimitedRecord>(section: Section, rows: &[String]) -> (Vec<T>, usize) {
    let mut records = Vec::with_capacity(rows.len());
    let mut skipped = 0;

    for line in rows.iter().filter(|l| !l.trim().is_empty()) {
        match parse_row::<T>(line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Skipping row in {:?} section: {}", section, e);
                skipped += 1;
            }
        }
    }

    (records, skipped)
}

pub struct Reporter<S> {
    source: S,
    limit: i64,
}

impl<S: RowSource> Reporter<S> {
    pub fn new(source: S, limit: i64) -> Self {
        Self { source, limit }
    }

    /// Runs every section in order and writes the report to `out`.
    ///
    /// Only I/O errors on `out` are returned.
    pub async fn run<W: Write>(&self, out: &mut W) -> io::Result<ReportSummary> {
        let mut summary = ReportSummary::default();

        writeln!(out, "Membership sync report")?;
        for section in Section::ALL {
            writeln!(out)?;
            writeln!(out, "=== {} ===", section.title())?;

            let query = ReportQuery::new(section, self.limit);
            let rows = match self.source.fetch_rows(&query).await {
                Ok(rows) => rows,
                Err(e) => {
                    tracing::error!("{:?} section failed: {}", section, e);
                    writeln!(out, "  ❌ {}", describe_failure(&e))?;
                    summary.sections_failed += 1;
                    continue;
                }
            };

            let (lines, skipped): (Vec<String>, usize) = match section {
                Section::Members => {
                    let (members, skipped) = decode_rows::<MemberRecord>(section, &rows);
                    (members.iter().map(render_member).collect(), skipped)
                }
                Section::Memberships => {
                    let (memberships, skipped) = decode_rows::<MembershipRecord>(section, &rows);
                    (memberships.iter().map(render_membership).collect(), skipped)
                }
                Section::Sync => {
                    let (sync_rows, skipped) = decode_rows::<SyncRow>(section, &rows);
                    let comparisons: Vec<SyncComparison> =
                        sync_rows.iter().map(SyncComparison::from).collect();
                    for cmp in &comparisons {
                        *summary.status_counts.entry(cmp.status).or_insert(0) += 1;
                    }
                    (comparisons.iter().map(render_sync).collect(), skipped)
                }
            };

            for line in &lines {
                writeln!(out, "{}", line)?;
            }
            if skipped > 0 {
                writeln!(out, "  ({} rows, {} skipped)", lines.len(), skipped)?;
            } else {
                writeln!(out, "  ({} rows)", lines.len())?;
            }

            if section == Section::Sync {
                for status in SyncStatus::ALL {
                    if let Some(count) = summary.status_counts.get(&status) {
                        writeln!(out, "  {}: {}", status, count)?;
                    }
                }
            }

            summary.sections_ok += 1;
            summary.rows_rendered += lines.len();
            summary.rows_skipped += skipped;
        }

        Ok(summary)
    }
}

fn describe_failure(err: &ReportError) -> String {
    match err {
        ReportError::QueryFailure(_) => err.to_string(),
        other => format!("Query failed: {}", other),
    }
}
