//! Deployment instructions for a single serverless function.
//!
//! Nothing here talks to the hosting platform: the plan is printed for an
//! operator to run by hand.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use regex::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};

const PROJECT_REF_PLACEHOLDER: &str = "<project-ref>";

/// Secrets the platform injects into every function.
const PLATFORM_SECRETS: &[&str] = &[
    "SUPABASE_URL",
    "SUPABASE_ANON_KEY",
    "SUPABASE_SERVICE_ROLE_KEY",
    "SUPABASE_DB_URL",
];

fn env_get_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"Deno\.env\.get\(\s*['"`]([A-Za-z0-9_]+)['"`]\s*\)"#)
            .expect("valid env lookup regex")
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct DeploymentPlan {
    pub function_name: String,
    pub source_path: PathBuf,
    pub lines: usize,
    pub bytes: usize,
    pub sha256: String,
    /// Secrets read via `Deno.env.get`, sorted.
    pub secrets: BTreeSet<String>,
    pub project_ref: Option<String>,
}

impl DeploymentPlan {
    pub fn from_path(path: &Path, project_ref: Option<String>) -> anyhow::Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("reading function source {}", path.display()))?;
        let function_name = function_name_for(path)
            .with_context(|| format!("cannot derive a function name from {}", path.display()))?;

        Ok(Self::from_source(
            function_name,
            path.to_path_buf(),
            &source,
            project_ref,
        ))
    }

    pub fn from_source(
        function_name: String,
        source_path: PathBuf,
        source: &str,
        project_ref: Option<String>,
    ) -> Self {
        let secrets = env_get_regex()
            .captures_iter(source)
            .map(|c| c[1].to_string())
            .collect();

        Self {
            function_name,
            source_path,
            lines: source.lines().count(),
            bytes: source.len(),
            sha256: hex::encode(Sha256::digest(source.as_bytes())),
            secrets,
            project_ref: project_ref.filter(|r| !r.trim().is_empty()),
        }
    }

    /// Secrets the operator has to set themselves.
    pub fn custom_secrets(&self) -> impl Iterator<Item = &str> {
        self.secrets
            .iter()
            .map(String::as_str)
            .filter(|s| !PLATFORM_SECRETS.contains(s))
    }

    pub fn deploy_command(&self) -> String {
        format!(
            "supabase functions deploy {} --project-ref {}",
            self.function_name,
            self.project_ref.as_deref().unwrap_or(PROJECT_REF_PLACEHOLDER)
        )
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Function: {}\n", self.function_name));
        out.push_str(&format!("Source:   {}\n", self.source_path.display()));
        out.push_str(&format!(
            "Size:     {} lines, {} bytes\n",
            self.lines, self.bytes
        ));
        out.push_str(&format!("SHA-256:  {}\n", self.sha256));
        out.push('\n');

        let custom: Vec<&str> = self.custom_secrets().collect();
        if custom.is_empty() {
            out.push_str("No custom secrets referenced.\n");
        } else {
            out.push_str("Set these secrets first (if not already set):\n");
            for secret in custom {
                out.push_str(&format!("  supabase secrets set {}=...\n", secret));
            }
        }
        out.push('\n');

        out.push_str("Deploy with:\n");
        out.push_str(&format!("  {}\n", self.deploy_command()));
        if self.project_ref.is_none() {
            out.push_str("  (set SUPABASE_PROJECT_REF or pass --project-ref)\n");
        }
        out.push_str("\nNothing was deployed.\n");
        out
    }
}

/// `supabase/functions/<name>/index.ts` deploys as `<name>`; any other file
/// deploys under its own stem.
fn function_name_for(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    if stem == "index" {
        path.parent()?
            .file_name()?
            .to_str()
            .map(str::to_string)
    } else {
        Some(stem.to_string())
    }
}
