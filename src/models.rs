//! Typed records decoded from the pipe-delimited report rows.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::errors::ReportError;

/// Number of leading characters kept when a wallet is shortened for display.
pub const WALLET_PREFIX_LEN: usize = 10;

/// A participant's wallet address. Equality ignores ASCII case.
#[derive(Debug, Clone)]
pub struct WalletAddress(String);

impl WalletAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First ten characters followed by `...`.
    pub fn short(&self) -> String {
        let prefix: String = self.0.chars().take(WALLET_PREFIX_LEN).collect();
        format!("{}...", prefix)
    }
}

impl PartialEq for WalletAddress {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for WalletAddress {}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Levels a member owns, as stored in the `levels_owned` column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelSet(BTreeSet<i32>);

impl LevelSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Accepts JSON arrays (`[1, 2]`), Postgres arrays (`{1,2}`), a bare
    /// number (`2`) and the empty string.
    pub fn parse(raw: &str) -> Result<Self, ReportError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self::default());
        }
        if let Ok(levels) = serde_json::from_str::<Vec<i32>>(raw) {
            return Ok(Self(levels.into_iter().collect()));
        }

        let inner = raw
            .trim_start_matches(&['[', '{'][..])
            .trim_end_matches(&[']', '}'][..]);
        inner
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<i32>().map_err(|_| {
                    ReportError::invalid_field("levels_owned", raw, "not a list of levels")
                })
            })
            .collect::<Result<BTreeSet<_>, _>>()
            .map(Self)
    }
}

impl fmt::Display for LevelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, level) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", level)?;
        }
        f.write_str("]")
    }
}

/// A row type decodable from a fixed number of delimited fields.
pub trait DelimitedRecord: Sized {
    const FIELDS: usize;

    /// Decodes from trimmed fields. Fails with `MalformedRow` when fewer than
    /// `FIELDS` are given; extra fields are ignored.
    fn from_fields(fields: &[&str]) -> Result<Self, ReportError>;
}

fn short_row(expected: usize, fields: &[&str]) -> ReportError {
    ReportError::MalformedRow {
        expected,
        found: fields.len(),
        line: fields.join("|"),
    }
}

/// Splits a `|`-delimited line and decodes it as `T`.
///
/// Fails with `MalformedRow` when the line has fewer than `T::FIELDS` fields.
/// Trailing extra fields are ignored.
pub fn parse_row<T: DelimitedRecord>(line: &str) -> Result<T, ReportError> {
    let fields: Vec<&str> = line.split('|').map(str::trim).collect();
    if fields.len() < T::FIELDS {
        return Err(ReportError::MalformedRow {
            expected: T::FIELDS,
            found: fields.len(),
            line: line.to_string(),
        });
    }
    T::from_fields(&fields)
}

/// One row of the `members` table.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberRecord {
    pub wallet_address: WalletAddress,
    pub current_level: u32,
    pub levels_owned: LevelSet,
    pub activation_time: Option<DateTime<Utc>>,
}

impl DelimitedRecord for MemberRecord {
    const FIELDS: usize = 4;

    fn from_fields(fields: &[&str]) -> Result<Self, ReportError> {
        let [wallet, level, owned, activated, ..] = fields else {
            return Err(short_row(Self::FIELDS, fields));
        };
        Ok(Self {
            wallet_address: parse_wallet(wallet)?,
            current_level: parse_level("current_level", level)?,
            levels_owned: LevelSet::parse(owned)?,
            activation_time: parse_timestamp("activation_time", activated)?,
        })
    }
}

/// One row of the `membership` table.
#[derive(Debug, Clone, PartialEq)]
pub struct MembershipRecord {
    pub wallet_address: WalletAddress,
    pub nft_level: i32,
    pub is_member: bool,
    pub unlock_level: Option<i32>,
    pub claimed_at: Option<DateTime<Utc>>,
}

impl DelimitedRecord for MembershipRecord {
    const FIELDS: usize = 5;

    fn from_fields(fields: &[&str]) -> Result<Self, ReportError> {
        let [wallet, nft, member, unlock, claimed, ..] = fields else {
            return Err(short_row(Self::FIELDS, fields));
        };
        Ok(Self {
            wallet_address: parse_wallet(wallet)?,
            nft_level: parse_int("nft_level", nft)?,
            is_member: parse_flag("is_member", member)?,
            unlock_level: parse_optional_int("unlock_membership_level", unlock)?,
            claimed_at: parse_timestamp("claimed_at", claimed)?,
        })
    }
}

/// A member joined against its level-2 membership row, if any.
///
/// `nft_level` is `None` when the member has no level-2 row at all, which is
/// not the same as an explicit level of 0.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncRow {
    pub wallet_address: WalletAddress,
    pub current_level: u32,
    pub nft_level: Option<i32>,
    pub unlock_level: Option<i32>,
    pub claimed_at: Option<DateTime<Utc>>,
}

impl DelimitedRecord for SyncRow {
    const FIELDS: usize = 5;

    fn from_fields(fields: &[&str]) -> Result<Self, ReportError> {
        let [wallet, level, nft, unlock, claimed, ..] = fields else {
            return Err(short_row(Self::FIELDS, fields));
        };
        Ok(Self {
            wallet_address: parse_wallet(wallet)?,
            current_level: parse_level("current_level", level)?,
            nft_level: parse_optional_int("nft_level", nft)?,
            unlock_level: parse_optional_int("unlock_membership_level", unlock)?,
            claimed_at: parse_timestamp("claimed_at", claimed)?,
        })
    }
}

fn parse_wallet(raw: &str) -> Result<WalletAddress, ReportError> {
    if raw.is_empty() {
        return Err(ReportError::invalid_field(
            "wallet_address",
            raw,
            "empty wallet address",
        ));
    }
    Ok(WalletAddress::new(raw))
}

fn parse_level(field: &'static str, raw: &str) -> Result<u32, ReportError> {
    raw.parse::<u32>()
        .map_err(|_| ReportError::invalid_field(field, raw, "expected a non-negative integer"))
}

fn parse_int(field: &'static str, raw: &str) -> Result<i32, ReportError> {
    raw.parse::<i32>()
        .map_err(|_| ReportError::invalid_field(field, raw, "expected an integer"))
}

fn parse_optional_int(field: &'static str, raw: &str) -> Result<Option<i32>, ReportError> {
    if raw.is_empty() {
        return Ok(None);
    }
    parse_int(field, raw).map(Some)
}

fn parse_flag(field: &'static str, raw: &str) -> Result<bool, ReportError> {
    match raw.to_ascii_lowercase().as_str() {
        "t" | "true" => Ok(true),
        "f" | "false" | "" => Ok(false),
        _ => Err(ReportError::invalid_field(field, raw, "expected a boolean")),
    }
}

/// Parses the timestamp formats Postgres and the legacy scripts emit.
pub fn parse_timestamp(
    field: &'static str,
    raw: &str,
) -> Result<Option<DateTime<Utc>>, ReportError> {
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    // Postgres text output, e.g. `2024-01-01 12:00:00.123456+00`
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(Some(ts.and_utc()));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(ts) = date.and_hms_opt(0, 0, 0) {
            return Ok(Some(ts.and_utc()));
        }
    }
    Err(ReportError::invalid_field(field, raw, "unrecognized timestamp"))
}
