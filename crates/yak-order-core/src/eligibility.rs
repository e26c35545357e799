use crate::compare::SecondaryOrder;
use crate::error::Result;
use crate::resolver::resolve_with_store;
use crate::store::{EntitySource, OrderStore};
use crate::types::{CollectionFilter, EntityId, GroupKey, OrderableEntity, ROOT_PARENT};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A group needs at least this many direct members to be worth reordering.
pub const MIN_GROUP_SIZE: usize = 2;

pub const TOP_LEVEL_LABEL: &str = "Top level";

/// A parent whose children can be reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentChoice {
    pub parent: EntityId,
    pub label: String,
    pub children: usize,
}

pub fn is_eligible(member_count: usize) -> bool {
    member_count >= MIN_GROUP_SIZE
}

/// Parents in `taxonomy` with at least two direct children.
///
/// Top level comes first when it qualifies; the remaining parents follow in
/// resolved order.
pub fn eligible_parents(
    source: &dyn EntitySource,
    store: &dyn OrderStore,
    taxonomy: &str,
    by: SecondaryOrder,
) -> Result<Vec<ParentChoice>> {
    let all: Vec<OrderableEntity> = source.candidates(&CollectionFilter::ByTaxonomy {
        taxonomy: taxonomy.to_string(),
    })?;

    let mut children: HashMap<EntityId, usize> = HashMap::new();
    for e in &all {
        if let GroupKey::Term { parent, .. } = e.group {
            *children.entry(parent).or_default() += 1;
        }
    }

    let mut out = Vec::new();
    let roots = children.get(&ROOT_PARENT).copied().unwrap_or(0);
    if is_eligible(roots) {
        out.push(ParentChoice {
            parent: ROOT_PARENT,
            label: TOP_LEVEL_LABEL.to_string(),
            children: roots,
        });
    }

    for ranked in resolve_with_store(all, store, by)? {
        let count = children.get(&ranked.entity.id).copied().unwrap_or(0);
        if is_eligible(count) {
            out.push(ParentChoice {
                parent: ranked.entity.id,
                label: ranked.entity.name,
                children: count,
            });
        }
    }
    Ok(out)
}
