use crate::cmd::{load_catalog, load_settings};
use crate::output::print_json;
use anyhow::Context;
use clap::{Args, Subcommand};
use std::path::Path;
use yak_order_core::compare::SecondaryOrder;
use yak_order_core::config::WarnLevel;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current settings
    Show,

    /// Validate settings against the catalog
    Validate,

    /// Enable manual ordering for a taxonomy or post type
    Enable {
        #[command(flatten)]
        target: Target,
    },

    /// Disable manual ordering for a taxonomy or post type
    Disable {
        #[command(flatten)]
        target: Target,
    },

    /// Set the tie-breaker for entities without a distinct manual order
    Secondary {
        /// name | id
        by: String,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct Target {
    #[arg(long)]
    taxonomy: Option<String>,
    #[arg(long)]
    post_type: Option<String>,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(root, json),
        ConfigSubcommand::Validate => validate(root, json),
        ConfigSubcommand::Enable { target } => toggle(root, target, true, json),
        ConfigSubcommand::Disable { target } => toggle(root, target, false, json),
        ConfigSubcommand::Secondary { by } => secondary(root, &by, json),
    }
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let settings = load_settings(root)?;
    if json {
        return print_json(&settings);
    }
    print!("{}", serde_yaml::to_string(&settings)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(root: &Path, json: bool) -> anyhow::Result<()> {
    let settings = load_settings(root)?;
    let catalog = load_catalog(root)?;
    let warnings = settings.validate(&catalog);

    if json {
        print_json(&serde_json::json!({ "warnings": warnings }))?;
    } else if warnings.is_empty() {
        println!("Settings are valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("settings validation found errors");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// enable / disable
// ---------------------------------------------------------------------------

fn toggle(root: &Path, target: Target, enable: bool, json: bool) -> anyhow::Result<()> {
    let mut settings = load_settings(root)?;
    let (label, key, changed) = match (target.taxonomy, target.post_type) {
        (Some(key), _) => {
            let changed = if enable {
                settings.enable_taxonomy(&key)?
            } else {
                settings.disable_taxonomy(&key)
            };
            ("taxonomy", key, changed)
        }
        (None, Some(key)) => {
            let changed = if enable {
                settings.enable_post_type(&key)?
            } else {
                settings.disable_post_type(&key)
            };
            ("post type", key, changed)
        }
        (None, None) => anyhow::bail!("pass --taxonomy or --post-type"),
    };
    settings.save(root).context("failed to save settings")?;

    let state = if enable { "enabled" } else { "disabled" };
    if json {
        print_json(&serde_json::json!({
            "kind": label,
            "key": key,
            "enabled": enable,
            "changed": changed,
        }))?;
    } else if changed {
        println!("Ordering {state} for {label} '{key}'");
    } else {
        println!("Ordering already {state} for {label} '{key}'");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// secondary
// ---------------------------------------------------------------------------

fn secondary(root: &Path, by: &str, json: bool) -> anyhow::Result<()> {
    let order = SecondaryOrder::parse(by)
        .with_context(|| format!("unknown secondary order '{by}': expected 'name' or 'id'"))?;
    let mut settings = load_settings(root)?;
    settings.secondary_orderby = order;
    settings.save(root).context("failed to save settings")?;

    if json {
        print_json(&serde_json::json!({ "secondary_orderby": order }))?;
    } else {
        println!("Secondary order set to '{order}'");
    }
    Ok(())
}
