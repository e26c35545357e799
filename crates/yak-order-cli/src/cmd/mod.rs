pub mod config;
pub mod init;
pub mod post;
pub mod post_type;
pub mod taxonomy;
pub mod term;
pub mod ui;

use crate::output::{print_json, print_ranked};
use anyhow::Context;
use std::path::Path;
use yak_order_core::autosort::{read_ordered, ReadRequest};
use yak_order_core::config::Settings;
use yak_order_core::observer::LogObserver;
use yak_order_core::store::{Catalog, EntitySource, FileStore, MemoryStore};
use yak_order_core::types::{EntityId, EntityKind, GroupKey};
use yak_order_core::writer::OrderWriter;

pub(crate) fn load_settings(root: &Path) -> anyhow::Result<Settings> {
    Settings::load(root).context("failed to load settings")
}

pub(crate) fn load_catalog(root: &Path) -> anyhow::Result<Catalog> {
    Catalog::load(root).context("failed to load catalog")
}

/// Print a gated read of `request` from one catalog snapshot.
pub(crate) fn list(root: &Path, request: ReadRequest, json: bool) -> anyhow::Result<()> {
    let settings = load_settings(root)?;
    let catalog = load_catalog(root)?;
    let collection = request.filter.collection();
    let known = match request.filter.kind() {
        EntityKind::Term => catalog.taxonomy(collection).is_some(),
        EntityKind::Post => catalog.post_type(collection).is_some(),
    };
    if !known {
        anyhow::bail!("unknown {} collection '{collection}'", request.filter.kind());
    }

    let store = MemoryStore::new(catalog);
    let read = read_ordered(&store, &store, &settings, &request, None)?;

    if json {
        print_json(&read)?;
    } else {
        if !read.sorted {
            println!("(manual order not applied)");
        }
        print_ranked(&read.items);
    }
    Ok(())
}

/// Renumber `group` so its members follow `ids`.
pub(crate) fn reorder(
    root: &Path,
    group: GroupKey,
    ids: &[EntityId],
    actor: Option<u64>,
    json: bool,
) -> anyhow::Result<()> {
    let settings = load_settings(root)?;
    settings.ensure_enabled(&group)?;
    let spacing = settings.spacing().context("invalid rank spacing in settings")?;

    let store = FileStore::new(root);
    let log = LogObserver;
    let outcome = OrderWriter::new(&store, &store)
        .with_observer(&log)
        .with_spacing(spacing)
        .renumber(&group, ids, actor)
        .with_context(|| format!("failed to reorder {group}"))?;

    if json {
        print_json(&outcome)?;
    } else {
        println!(
            "Saved {} of {} in {group} (skipped: {}, failed: {})",
            outcome.persisted_count(),
            outcome.requested_ids.len(),
            outcome.skipped_ids.len(),
            outcome.failed_ids.len(),
        );
        for a in &outcome.assignments {
            println!("  {:>6}  {}", a.rank, a.id);
        }
    }

    if outcome.has_failures() {
        anyhow::bail!(
            "{} id(s) could not be saved: {:?}",
            outcome.failed_ids.len(),
            outcome.failed_ids
        );
    }
    Ok(())
}

/// Set a single manual order directly.
pub(crate) fn set_order(
    root: &Path,
    kind: EntityKind,
    id: EntityId,
    value: i64,
    json: bool,
) -> anyhow::Result<()> {
    let settings = load_settings(root)?;
    let store = FileStore::new(root);
    let entity = store
        .entity(kind, id)?
        .with_context(|| format!("{kind} not found: {id}"))?;
    settings.ensure_enabled(&entity.group)?;

    let entity = OrderWriter::new(&store, &store).set_single(kind, id, value)?;

    if json {
        print_json(&serde_json::json!({
            "id": entity.id,
            "name": entity.name,
            "group": entity.group,
            "manual_order": value,
        }))?;
    } else {
        println!("{} '{}' ({}) order set to {value}", kind, entity.name, entity.id);
    }
    Ok(())
}
