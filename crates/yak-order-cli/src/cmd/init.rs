use anyhow::Context;
use std::path::Path;
use yak_order_core::config::Settings;
use yak_order_core::store::Catalog;
use yak_order_core::{io, paths};

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing yak-order in: {}", root.display());

    let dir = paths::yak_dir(root);
    io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    if paths::config_path(root).exists() {
        println!("  exists:  {}", paths::CONFIG_FILE);
    } else {
        Settings::default()
            .save(root)
            .context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    }

    if paths::catalog_path(root).exists() {
        println!("  exists:  {}", paths::CATALOG_FILE);
    } else {
        Catalog::default()
            .save(root)
            .context("failed to write catalog.yaml")?;
        println!("  created: {}", paths::CATALOG_FILE);
    }

    println!("\nNext: register a taxonomy and enable it, e.g.");
    println!("  yak-order taxonomy add genre");
    println!("  yak-order config enable --taxonomy genre");
    Ok(())
}
