use crate::cmd::{list as list_read, load_catalog, load_settings, reorder, set_order};
use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;
use yak_order_core::autosort::{ReadContext, ReadRequest};
use yak_order_core::eligibility::eligible_parents;
use yak_order_core::store::MemoryStore;
use yak_order_core::types::{CollectionFilter, EntityId, EntityKind, GroupKey, ROOT_PARENT};

#[derive(Subcommand)]
pub enum TermSubcommand {
    /// Add a term to a taxonomy
    Add {
        taxonomy: String,
        name: String,
        /// Parent term id (0 = top level)
        #[arg(long, default_value_t = ROOT_PARENT)]
        parent: EntityId,
    },
    /// List terms, in manual order when ordering applies
    List {
        taxonomy: String,
        /// Only the children of this parent (0 = top level)
        #[arg(long)]
        parent: Option<EntityId>,
        /// Read as the front end would
        #[arg(long)]
        frontend: bool,
    },
    /// List parents whose children can be reordered
    Parents { taxonomy: String },
    /// Renumber one sibling group
    Reorder {
        taxonomy: String,
        /// Parent of the sibling group (0 = top level)
        #[arg(long, default_value_t = ROOT_PARENT)]
        parent: EntityId,
        /// Term ids in desired order
        #[arg(required = true)]
        ids: Vec<EntityId>,
        /// User id recorded on the update
        #[arg(long)]
        actor: Option<u64>,
    },
    /// Set one term's manual order directly
    SetOrder {
        id: EntityId,
        #[arg(allow_negative_numbers = true)]
        value: i64,
    },
}

pub fn run(root: &Path, subcmd: TermSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        TermSubcommand::Add {
            taxonomy,
            name,
            parent,
        } => add(root, &taxonomy, &name, parent, json),
        TermSubcommand::List {
            taxonomy,
            parent,
            frontend,
        } => {
            let filter = match parent {
                Some(parent) => CollectionFilter::ByParent { taxonomy, parent },
                None => CollectionFilter::ByTaxonomy { taxonomy },
            };
            list_read(root, read_request(filter, frontend), json)
        }
        TermSubcommand::Parents { taxonomy } => parents(root, &taxonomy, json),
        TermSubcommand::Reorder {
            taxonomy,
            parent,
            ids,
            actor,
        } => reorder(root, GroupKey::term(taxonomy, parent), &ids, actor, json),
        TermSubcommand::SetOrder { id, value } => set_order(root, EntityKind::Term, id, value, json),
    }
}

pub(crate) fn read_request(filter: CollectionFilter, frontend: bool) -> ReadRequest {
    let context = if frontend {
        ReadContext::Frontend
    } else {
        ReadContext::Admin
    };
    ReadRequest::new(filter).context(context)
}

fn add(root: &Path, taxonomy: &str, name: &str, parent: EntityId, json: bool) -> anyhow::Result<()> {
    let mut catalog = load_catalog(root)?;
    let id = catalog
        .add_term(taxonomy, name, parent)
        .with_context(|| format!("failed to add term '{name}' to '{taxonomy}'"))?;
    catalog.save(root).context("failed to save catalog")?;

    if json {
        print_json(&serde_json::json!({
            "id": id,
            "taxonomy": taxonomy,
            "name": name,
            "parent": parent,
        }))?;
    } else {
        println!("Added term {id} '{name}' to '{taxonomy}'");
    }
    Ok(())
}

fn parents(root: &Path, taxonomy: &str, json: bool) -> anyhow::Result<()> {
    let settings = load_settings(root)?;
    settings.ensure_enabled(&GroupKey::term(taxonomy, ROOT_PARENT))?;
    let catalog = load_catalog(root)?;
    if catalog.taxonomy(taxonomy).is_none() {
        anyhow::bail!("unknown taxonomy '{taxonomy}'");
    }

    let store = MemoryStore::new(catalog);
    let choices = eligible_parents(&store, &store, taxonomy, settings.secondary_orderby)?;

    if json {
        return print_json(&choices);
    }
    if choices.is_empty() {
        println!("No group in '{taxonomy}' has two or more terms.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = choices
        .iter()
        .map(|c| vec![c.parent.to_string(), c.label.clone(), c.children.to_string()])
        .collect();
    print_table(&["PARENT", "LABEL", "CHILDREN"], &rows);
    Ok(())
}
