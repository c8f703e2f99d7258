//! Text patchers for generated source files.
//!
//! Both patchers work on plain strings; the binaries in `src/bin` handle the
//! file I/O around them.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use regex::Regex;
use walkdir::WalkDir;

use crate::errors::ReportError;

/// Result of a `created_at` rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    pub replacements: usize,
}

fn created_at_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bcreated_at\b").expect("valid created_at regex"))
}

fn identifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("valid identifier regex"))
}

/// Replaces whole-identifier references to `created_at` with `replacement`.
///
/// `member_created_at` and similar identifiers are left alone.
pub fn rewrite_created_at(source: &str, replacement: &str) -> Result<Rewrite, ReportError> {
    if !identifier_regex().is_match(replacement) {
        return Err(ReportError::Config(format!(
            "{:?} is not a valid column name",
            replacement
        )));
    }

    let re = created_at_regex();
    let replacements = re.find_iter(source).count();
    let text = re.replace_all(source, replacement).into_owned();

    Ok(Rewrite { text, replacements })
}

/// Header block injected into functions that lack one.
pub const CORS_HEADERS_BLOCK: &str = "const corsHeaders = {
  'Access-Control-Allow-Origin': '*',
  'Access-Control-Allow-Headers': 'authorization, x-client-info, apikey, content-type, x-wallet-address',
  'Access-Control-Allow-Methods': 'GET, POST, PUT, DELETE, OPTIONS'
};
";

/// Preflight short-circuit placed at the top of the request handler.
pub const CORS_PREFLIGHT_BLOCK: &str = "
  if (req.method === 'OPTIONS') {
    return new Response('ok', { headers: corsHeaders });
  }
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsPatch {
    /// The file already declares `corsHeaders`.
    AlreadyPresent,
    Patched {
        text: String,
        /// Whether a request handler was found and given a preflight branch.
        preflight: bool,
    },
}

fn cors_declared_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:const|let|var)\s+corsHeaders\b").expect("valid corsHeaders regex")
    })
}

/// Matches a whole top-level import statement, including ones whose
/// specifier list spans several lines, through its quoted module path.
fn import_statement_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)^import\b[^;'"]*?['"][^'"\n]*['"][ \t]*;?[ \t]*$"#)
            .expect("valid import regex")
    })
}

fn serve_handler_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"serve\(\s*async\s*\(\s*req\b[^)]*\)\s*=>\s*\{")
            .expect("valid serve handler regex")
    })
}

/// Injects the CORS header constant and preflight branch into `source`.
pub fn inject_cors(source: &str) -> CorsPatch {
    if cors_declared_regex().is_match(source) {
        return CorsPatch::AlreadyPresent;
    }

    // Header block goes right after the last import statement.
    let insert_at = import_statement_regex()
        .find_iter(source)
        .last()
        .map(|m| {
            let end = m.end();
            if source[end..].starts_with('\n') {
                end + 1
            } else {
                end
            }
        })
        .unwrap_or(0);

    let mut text = String::with_capacity(
        source.len() + CORS_HEADERS_BLOCK.len() + CORS_PREFLIGHT_BLOCK.len() + 1,
    );
    text.push_str(&source[..insert_at]);
    if insert_at > 0 && !source[..insert_at].ends_with('\n') {
        text.push('\n');
    }
    text.push_str(CORS_HEADERS_BLOCK);
    text.push_str(&source[insert_at..]);

    let preflight = match serve_handler_regex().find(&text) {
        Some(m) => {
            text.insert_str(m.end(), CORS_PREFLIGHT_BLOCK);
            true
        }
        None => false,
    };

    CorsPatch::Patched { text, preflight }
}

/// Totals for a directory-wide CORS injection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorsSummary {
    pub scanned: usize,
    pub patched: usize,
    pub already_present: usize,
    pub without_handler: usize,
    pub failed: Vec<PathBuf>,
}

/// Injects CORS boilerplate into every `index.ts` under `root`.
///
/// Unreadable or unwritable files are logged and recorded in `failed`; the
/// walk continues.
pub fn inject_cors_dir(root: &Path, dry_run: bool) -> anyhow::Result<CorsSummary> {
    if !root.is_dir() {
        anyhow::bail!("{} is not a directory", root.display());
    }

    let mut summary = CorsSummary::default();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() || entry.file_name() != OsStr::new("index.ts") {
            continue;
        }

        summary.scanned += 1;
        let path = entry.path();
        match patch_file(path, dry_run) {
            Ok(CorsPatch::AlreadyPresent) => {
                tracing::debug!("{} already has CORS headers", path.display());
                summary.already_present += 1;
            }
            Ok(CorsPatch::Patched { preflight, .. }) => {
                tracing::info!("Patched {}", path.display());
                summary.patched += 1;
                if !preflight {
                    tracing::warn!("No serve() handler found in {}", path.display());
                    summary.without_handler += 1;
                }
            }
            Err(e) => {
                tracing::error!("Failed to patch {}: {:#}", path.display(), e);
                summary.failed.push(path.to_path_buf());
            }
        }
    }

    Ok(summary)
}

fn patch_file(path: &Path, dry_run: bool) -> anyhow::Result<CorsPatch> {
    let source =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let patch = inject_cors(&source);
    if let CorsPatch::Patched { text, .. } = &patch {
        if !dry_run {
            fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
        }
    }
    Ok(patch)
}
