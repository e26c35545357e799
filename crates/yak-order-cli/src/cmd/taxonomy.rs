use crate::cmd::{load_catalog, load_settings};
use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum TaxonomySubcommand {
    /// Register a taxonomy
    Add {
        /// Key (lowercase letters, digits, '-' and '_')
        key: String,
        /// Display label (defaults to the key)
        #[arg(long)]
        label: Option<String>,
        /// Terms cannot have parents
        #[arg(long)]
        flat: bool,
    },
    /// List registered taxonomies
    List,
}

pub fn run(root: &Path, subcmd: TaxonomySubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        TaxonomySubcommand::Add { key, label, flat } => add(root, &key, label, flat, json),
        TaxonomySubcommand::List => list(root, json),
    }
}

fn add(root: &Path, key: &str, label: Option<String>, flat: bool, json: bool) -> anyhow::Result<()> {
    let mut catalog = load_catalog(root)?;
    let label = label.unwrap_or_else(|| key.to_string());
    catalog
        .add_taxonomy(key, label.as_str(), !flat)
        .with_context(|| format!("failed to add taxonomy '{key}'"))?;
    catalog.save(root).context("failed to save catalog")?;

    if json {
        print_json(&serde_json::json!({
            "key": key,
            "label": label,
            "hierarchical": !flat,
        }))?;
    } else {
        println!("Added taxonomy '{key}'");
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let catalog = load_catalog(root)?;
    let settings = load_settings(root)?;

    if json {
        let list: Vec<serde_json::Value> = catalog
            .taxonomies
            .iter()
            .map(|t| {
                serde_json::json!({
                    "key": t.key,
                    "label": t.label,
                    "hierarchical": t.hierarchical,
                    "terms": catalog.terms.iter().filter(|term| term.taxonomy == t.key).count(),
                    "enabled": settings.taxonomy_enabled(&t.key),
                })
            })
            .collect();
        return print_json(&list);
    }

    if catalog.taxonomies.is_empty() {
        println!("No taxonomies registered.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = catalog
        .taxonomies
        .iter()
        .map(|t| {
            let terms = catalog.terms.iter().filter(|term| term.taxonomy == t.key).count();
            vec![
                t.key.clone(),
                t.label.clone(),
                if t.hierarchical { "tree" } else { "flat" }.to_string(),
                terms.to_string(),
                yes_no(settings.taxonomy_enabled(&t.key)),
            ]
        })
        .collect();
    print_table(&["KEY", "LABEL", "SHAPE", "TERMS", "ENABLED"], &rows);
    Ok(())
}

pub(crate) fn yes_no(b: bool) -> String {
    if b { "yes" } else { "no" }.to_string()
}
