use crate::error::{OrderError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const YAK_DIR: &str = ".yak";
pub const CONFIG_FILE: &str = ".yak/config.yaml";
pub const CATALOG_FILE: &str = ".yak/catalog.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn yak_dir(root: &Path) -> PathBuf {
    root.join(YAK_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn catalog_path(root: &Path) -> PathBuf {
    root.join(CATALOG_FILE)
}

// ---------------------------------------------------------------------------
// Key validation
// ---------------------------------------------------------------------------

static KEY_RE: OnceLock<Regex> = OnceLock::new();

fn key_re() -> &'static Regex {
    KEY_RE.get_or_init(|| Regex::new(r"^[a-z0-9_\-]+$").unwrap())
}

/// Taxonomy and post-type keys: lowercase alphanumerics, `_` and `-`, at most
/// 32 characters.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.len() > 32 || !key_re().is_match(key) {
        return Err(OrderError::InvalidKey(key.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
