use crate::cmd::taxonomy::yes_no;
use crate::cmd::{load_catalog, load_settings};
use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum PostTypeSubcommand {
    /// Register a post type
    Add {
        /// Key (lowercase letters, digits, '-' and '_')
        key: String,
        /// Display label (defaults to the key)
        #[arg(long)]
        label: Option<String>,
    },
    /// List registered post types
    List,
}

pub fn run(root: &Path, subcmd: PostTypeSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        PostTypeSubcommand::Add { key, label } => add(root, &key, label, json),
        PostTypeSubcommand::List => list(root, json),
    }
}

fn add(root: &Path, key: &str, label: Option<String>, json: bool) -> anyhow::Result<()> {
    let mut catalog = load_catalog(root)?;
    let label = label.unwrap_or_else(|| key.to_string());
    catalog
        .add_post_type(key, label.as_str())
        .with_context(|| format!("failed to add post type '{key}'"))?;
    catalog.save(root).context("failed to save catalog")?;

    if json {
        print_json(&serde_json::json!({ "key": key, "label": label }))?;
    } else {
        println!("Added post type '{key}'");
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let catalog = load_catalog(root)?;
    let settings = load_settings(root)?;
    let count = |key: &str| catalog.posts.iter().filter(|p| p.post_type == key).count();

    if json {
        let list: Vec<serde_json::Value> = catalog
            .post_types
            .iter()
            .map(|p| {
                serde_json::json!({
                    "key": p.key,
                    "label": p.label,
                    "posts": count(&p.key),
                    "enabled": settings.post_type_enabled(&p.key),
                })
            })
            .collect();
        return print_json(&list);
    }

    if catalog.post_types.is_empty() {
        println!("No post types registered.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = catalog
        .post_types
        .iter()
        .map(|p| {
            vec![
                p.key.clone(),
                p.label.clone(),
                count(&p.key).to_string(),
                yes_no(settings.post_type_enabled(&p.key)),
            ]
        })
        .collect();
    print_table(&["KEY", "LABEL", "POSTS", "ENABLED"], &rows);
    Ok(())
}
