//! Level-2 sync classification between `members` and `membership`.

use std::fmt;

use crate::models::{SyncRow, WalletAddress};

/// Level at which a member is expected to hold a membership NFT record.
pub const SYNC_LEVEL: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SyncStatus {
    /// Member is level 2+ and holds the level-2 record.
    Synced,
    /// Level-2 record exists but the member is still below level 2.
    NftAhead,
    /// Member is level 2+ but has no level-2 record.
    MemberAhead,
    /// Anything else. Never-activated wallets and stale claims both land here.
    Other,
}

impl SyncStatus {
    pub const ALL: [SyncStatus; 4] = [
        SyncStatus::Synced,
        SyncStatus::NftAhead,
        SyncStatus::MemberAhead,
        SyncStatus::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SyncStatus::Synced => "SYNCED",
            SyncStatus::NftAhead => "NFT_AHEAD",
            SyncStatus::MemberAhead => "MEMBER_AHEAD",
            SyncStatus::Other => "OTHER",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classifies a member against its level-2 membership row.
///
/// `nft_level` is `None` when no level-2 row matched the join. An explicit
/// `Some(0)` is not treated as missing.
pub fn classify(current_level: u32, nft_level: Option<i32>) -> SyncStatus {
    let member_reached = current_level >= SYNC_LEVEL as u32;
    match (member_reached, nft_level) {
        (true, Some(SYNC_LEVEL)) => SyncStatus::Synced,
        (false, Some(SYNC_LEVEL)) => SyncStatus::NftAhead,
        (true, None) => SyncStatus::MemberAhead,
        _ => SyncStatus::Other,
    }
}

/// A classified sync row ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncComparison {
    pub wallet_address: WalletAddress,
    pub current_level: u32,
    /// Level-2 NFT level, 0 when no row matched.
    pub nft_level: i32,
    /// Unlock level of the level-2 row, 0 when absent.
    pub unlock_level: i32,
    pub status: SyncStatus,
}

impl From<&SyncRow> for SyncComparison {
    fn from(row: &SyncRow) -> Self {
        Self {
            wallet_address: row.wallet_address.clone(),
            current_level: row.current_level,
            nft_level: row.nft_level.unwrap_or(0),
            unlock_level: row.unlock_level.unwrap_or(0),
            status: classify(row.current_level, row.nft_level),
        }
    }
}
