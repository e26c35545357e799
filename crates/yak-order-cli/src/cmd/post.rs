use crate::cmd::term::read_request;
use crate::cmd::{list as list_read, load_catalog, reorder, set_order};
use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;
use yak_order_core::types::{CollectionFilter, EntityId, EntityKind, GroupKey};

#[derive(Subcommand)]
pub enum PostSubcommand {
    /// Add a post
    Add { post_type: String, title: String },
    /// List posts, in manual order when ordering applies
    List {
        post_type: String,
        /// Read as the front end would
        #[arg(long)]
        frontend: bool,
    },
    /// Renumber every post of a post type
    Reorder {
        post_type: String,
        /// Post ids in desired order
        #[arg(required = true)]
        ids: Vec<EntityId>,
        /// User id recorded on the update
        #[arg(long)]
        actor: Option<u64>,
    },
    /// Set one post's menu order directly
    SetOrder {
        id: EntityId,
        #[arg(allow_negative_numbers = true)]
        value: i64,
    },
}

pub fn run(root: &Path, subcmd: PostSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        PostSubcommand::Add { post_type, title } => add(root, &post_type, &title, json),
        PostSubcommand::List {
            post_type,
            frontend,
        } => list_read(
            root,
            read_request(CollectionFilter::ByCollectionType { post_type }, frontend),
            json,
        ),
        PostSubcommand::Reorder {
            post_type,
            ids,
            actor,
        } => reorder(root, GroupKey::post_type(post_type), &ids, actor, json),
        PostSubcommand::SetOrder { id, value } => set_order(root, EntityKind::Post, id, value, json),
    }
}

fn add(root: &Path, post_type: &str, title: &str, json: bool) -> anyhow::Result<()> {
    let mut catalog = load_catalog(root)?;
    let id = catalog
        .add_post(post_type, title)
        .with_context(|| format!("failed to add post '{title}' to '{post_type}'"))?;
    catalog.save(root).context("failed to save catalog")?;

    if json {
        print_json(&serde_json::json!({
            "id": id,
            "post_type": post_type,
            "title": title,
        }))?;
    } else {
        println!("Added post {id} '{title}' to '{post_type}'");
    }
    Ok(())
}
