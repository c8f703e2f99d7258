//! The fixed report queries.
//!
//! Each query renders one pipe-delimited text column per row using
//! `format('%s|...')`, so a NULL column arrives as an empty field.

/// Issued first in every report transaction.
pub const READ_ONLY_TRANSACTION: &str = "SET TRANSACTION READ ONLY";

/// One section of the sync report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Latest activated members and the levels they own.
    Members,
    /// Level-2 membership (NFT claim) records.
    Memberships,
    /// Members joined against their level-2 membership record.
    Sync,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Members, Section::Memberships, Section::Sync];

    pub fn title(&self) -> &'static str {
        match self {
            Section::Members => "Members",
            Section::Memberships => "Level 2 Memberships",
            Section::Sync => "Member / Membership Sync (Level 2)",
        }
    }

    /// Minimum number of delimited fields a row of this section must carry.
    pub fn expected_fields(&self) -> usize {
        match self {
            Section::Members => 4,
            Section::Memberships | Section::Sync => 5,
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            Section::Members => MEMBERS_SQL,
            Section::Memberships => MEMBERSHIPS_SQL,
            Section::Sync => SYNC_SQL,
        }
    }
}

const MEMBERS_SQL: &str = r#"
    SELECT format('%s|%s|%s|%s',
                  wallet_address, current_level, levels_owned, activation_time)
    FROM members
    ORDER BY activation_time DESC NULLS LAST
    LIMIT $1
"#;

const MEMBERSHIPS_SQL: &str = r#"
    SELECT format('%s|%s|%s|%s|%s',
                  wallet_address, nft_level, is_member, unlock_membership_level, claimed_at)
    FROM membership
    WHERE nft_level = 2
    ORDER BY claimed_at DESC NULLS LAST
    LIMIT $1
"#;

// The level filter lives in the join condition, not the WHERE clause, so a
// member without a level-2 row still appears with a NULL nft_level.
const SYNC_SQL: &str = r#"
    SELECT format('%s|%s|%s|%s|%s',
                  m.wallet_address, m.current_level, ms.nft_level,
                  ms.unlock_membership_level, ms.claimed_at)
    FROM members m
    LEFT JOIN membership ms
           ON LOWER(ms.wallet_address) = LOWER(m.wallet_address)
          AND ms.nft_level = 2
    ORDER BY m.current_level DESC, m.activation_time DESC NULLS LAST
    LIMIT $1
"#;

/// A report query together with its bound row limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportQuery {
    pub section: Section,
    pub limit: i64,
}

impl ReportQuery {
    pub fn new(section: Section, limit: i64) -> Self {
        Self { section, limit }
    }

    pub fn sql(&self) -> &'static str {
        self.section.sql()
    }
}
