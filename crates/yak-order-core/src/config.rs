use crate::compare::SecondaryOrder;
use crate::error::{OrderError, Result};
use crate::paths;
use crate::store::Catalog;
use crate::types::GroupKey;
use crate::writer::{RankSpacing, DEFAULT_RANK_START, DEFAULT_RANK_STEP};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

pub const DEFAULT_CAPABILITY: &str = "manage_categories";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Resolve term reads on the front end.
    #[serde(default = "default_true")]
    pub autosort_enabled: bool,
    /// Resolve term reads in admin screens.
    #[serde(default = "default_true")]
    pub admin_autosort: bool,
    /// Taxonomies with ordering enabled. Empty means disabled everywhere.
    #[serde(default)]
    pub taxonomies: Vec<String>,
    #[serde(default)]
    pub secondary_orderby: SecondaryOrder,
    /// Capability the host checks before exposing ordering. Not enforced here.
    #[serde(default = "default_capability")]
    pub capability: String,
    #[serde(default)]
    pub post_types: Vec<String>,
    #[serde(default)]
    pub post_autosort_frontend: bool,
    #[serde(default = "default_rank_start")]
    pub rank_start: i64,
    #[serde(default = "default_rank_step")]
    pub rank_step: i64,
}

fn default_true() -> bool {
    true
}

fn default_capability() -> String {
    DEFAULT_CAPABILITY.to_string()
}

fn default_rank_start() -> i64 {
    DEFAULT_RANK_START
}

fn default_rank_step() -> i64 {
    DEFAULT_RANK_STEP
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            autosort_enabled: true,
            admin_autosort: true,
            taxonomies: Vec::new(),
            secondary_orderby: SecondaryOrder::Name,
            capability: default_capability(),
            post_types: Vec::new(),
            post_autosort_frontend: false,
            rank_start: DEFAULT_RANK_START,
            rank_step: DEFAULT_RANK_STEP,
        }
    }
}

impl Settings {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(OrderError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let settings: Settings = serde_yaml::from_str(&data)?;
        Ok(settings)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn spacing(&self) -> Result<RankSpacing> {
        RankSpacing::new(self.rank_start, self.rank_step)
    }

    pub fn taxonomy_enabled(&self, taxonomy: &str) -> bool {
        self.taxonomies.iter().any(|t| t == taxonomy)
    }

    pub fn post_type_enabled(&self, post_type: &str) -> bool {
        self.post_types.iter().any(|p| p == post_type)
    }

    /// Enable ordering for a taxonomy. Returns `false` if already enabled.
    pub fn enable_taxonomy(&mut self, taxonomy: &str) -> Result<bool> {
        paths::validate_key(taxonomy)?;
        Ok(push_unique(&mut self.taxonomies, taxonomy))
    }

    pub fn disable_taxonomy(&mut self, taxonomy: &str) -> bool {
        remove_key(&mut self.taxonomies, taxonomy)
    }

    pub fn enable_post_type(&mut self, post_type: &str) -> Result<bool> {
        paths::validate_key(post_type)?;
        Ok(push_unique(&mut self.post_types, post_type))
    }

    pub fn disable_post_type(&mut self, post_type: &str) -> bool {
        remove_key(&mut self.post_types, post_type)
    }

    /// `InvalidGroup` unless ordering is enabled for the group's collection.
    pub fn ensure_enabled(&self, group: &GroupKey) -> Result<()> {
        let enabled = match group {
            GroupKey::Term { taxonomy, .. } => self.taxonomy_enabled(taxonomy),
            GroupKey::PostType { post_type } => self.post_type_enabled(post_type),
        };
        if enabled {
            return Ok(());
        }
        Err(OrderError::InvalidGroup(format!(
            "ordering is not enabled for {} '{}'",
            group.kind(),
            group.collection()
        )))
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self, catalog: &Catalog) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.rank_step < 1 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("rank_step must be at least 1, got {}", self.rank_step),
            });
        }

        for (field, keys) in [("taxonomies", &self.taxonomies), ("post_types", &self.post_types)] {
            let mut seen = HashSet::new();
            for key in keys {
                if paths::validate_key(key).is_err() {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Error,
                        message: format!("invalid key '{key}' in {field}"),
                    });
                }
                if !seen.insert(key.as_str()) {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Warning,
                        message: format!("duplicate key '{key}' in {field}"),
                    });
                }
            }
        }

        for key in &self.taxonomies {
            if catalog.taxonomy(key).is_none() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("unknown taxonomy '{key}' in taxonomies"),
                });
            }
        }
        for key in &self.post_types {
            if catalog.post_type(key).is_none() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("unknown post type '{key}' in post_types"),
                });
            }
        }

        if self.capability.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "capability is empty; hosts will fall back to their default".to_string(),
            });
        }

        warnings
    }
}

fn push_unique(list: &mut Vec<String>, key: &str) -> bool {
    if list.iter().any(|k| k == key) {
        return false;
    }
    list.push(key.to_string());
    true
}

fn remove_key(list: &mut Vec<String>, key: &str) -> bool {
    let before = list.len();
    list.retain(|k| k != key);
    list.len() < before
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_settings_roundtrip() {
        let dir = TempDir::new().unwrap();
        let s = Settings::default();
        s.save(dir.path()).unwrap();
        let loaded = Settings::load(dir.path()).unwrap();
        assert_eq!(loaded, s);
        assert_eq!(loaded.spacing().unwrap(), RankSpacing::default());
    }

    #[test]
    fn sparse_yaml_gets_defaults() {
        let s: Settings = serde_yaml::from_str("taxonomies: [genre]\n").unwrap();
        assert!(s.autosort_enabled);
        assert!(s.admin_autosort);
        assert!(!s.post_autosort_frontend);
        assert_eq!(s.secondary_orderby, SecondaryOrder::Name);
        assert_eq!(s.capability, DEFAULT_CAPABILITY);
        assert_eq!((s.rank_start, s.rank_step), (10, 10));
        assert!(s.taxonomy_enabled("genre"));
    }

    #[test]
    fn legacy_term_id_secondary_orderby() {
        let s: Settings = serde_yaml::from_str("secondary_orderby: term_id\n").unwrap();
        assert_eq!(s.secondary_orderby, SecondaryOrder::Id);
    }

    #[test]
    fn load_missing_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Settings::load(dir.path()),
            Err(OrderError::NotInitialized)
        ));
    }

    #[test]
    fn enable_is_idempotent() {
        let mut s = Settings::default();
        assert!(s.enable_taxonomy("genre").unwrap());
        assert!(!s.enable_taxonomy("genre").unwrap());
        assert_eq!(s.taxonomies, vec!["genre"]);
        assert!(s.enable_post_type("Bad Key").is_err());
        assert!(s.disable_taxonomy("genre"));
        assert!(!s.disable_taxonomy("genre"));
    }

    #[test]
    fn ensure_enabled_checks_collection_kind() {
        let mut s = Settings::default();
        s.enable_taxonomy("book").unwrap();
        assert!(s.ensure_enabled(&GroupKey::term("book", 4)).is_ok());
        // Same key as a post type is a different collection.
        assert!(matches!(
            s.ensure_enabled(&GroupKey::post_type("book")),
            Err(OrderError::InvalidGroup(_))
        ));
    }

    #[test]
    fn validate_clean_settings_no_warnings() {
        let mut catalog = Catalog::default();
        catalog.add_taxonomy("genre", "Genre", true).unwrap();
        let mut s = Settings::default();
        s.enable_taxonomy("genre").unwrap();
        assert!(s.validate(&catalog).is_empty());
    }

    #[test]
    fn validate_flags_problems() {
        let catalog = Catalog::default();
        let s = Settings {
            taxonomies: vec!["genre".into(), "genre".into()],
            post_types: vec!["Not Valid".into()],
            rank_step: 0,
            ..Settings::default()
        };
        let warnings = s.validate(&catalog);
        let messages: Vec<&str> = warnings.iter().map(|w| w.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("rank_step")));
        assert!(messages.iter().any(|m| m.contains("duplicate key 'genre'")));
        assert!(messages.iter().any(|m| m.contains("invalid key 'Not Valid'")));
        assert!(messages.iter().any(|m| m.contains("unknown taxonomy 'genre'")));
        assert!(warnings.iter().any(|w| w.level == WarnLevel::Error));
    }
}
