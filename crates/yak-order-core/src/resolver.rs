use crate::compare::{cmp_entities, SecondaryOrder};
use crate::error::Result;
use crate::store::OrderStore;
use crate::types::{EntityId, EntityKind, OrderableEntity};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An entity together with the manual order it was sorted by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntity {
    #[serde(flatten)]
    pub entity: OrderableEntity,
    pub manual_order: Option<i64>,
}

/// Sort `entities` by manual order, falling back to `by`.
///
/// `lookup` is called exactly once per entity. The sort is stable, so entities
/// that compare equal keep their input order.
pub fn resolve_ranked<F>(
    entities: Vec<OrderableEntity>,
    mut lookup: F,
    by: SecondaryOrder,
) -> Vec<RankedEntity>
where
    F: FnMut(&OrderableEntity) -> Option<i64>,
{
    let mut ranked: Vec<RankedEntity> = entities
        .into_iter()
        .map(|entity| {
            let manual_order = lookup(&entity);
            RankedEntity {
                entity,
                manual_order,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        cmp_entities(
            (&a.entity, a.manual_order),
            (&b.entity, b.manual_order),
            by,
        )
    });
    ranked
}

/// Same as [`resolve_ranked`] with the ranks dropped.
pub fn resolve<F>(entities: Vec<OrderableEntity>, mut lookup: F, by: SecondaryOrder) -> Vec<OrderableEntity>
where
    F: FnMut(EntityId) -> Option<i64>,
{
    resolve_ranked(entities, |e| lookup(e.id), by)
        .into_iter()
        .map(|r| r.entity)
        .collect()
}

/// Resolve against a store, fetching every manual order with one bulk read per
/// entity kind present in the input.
pub fn resolve_with_store(
    entities: Vec<OrderableEntity>,
    store: &dyn OrderStore,
    by: SecondaryOrder,
) -> Result<Vec<RankedEntity>> {
    let mut ids_by_kind: HashMap<EntityKind, Vec<EntityId>> = HashMap::new();
    for e in &entities {
        ids_by_kind.entry(e.kind()).or_default().push(e.id);
    }

    let mut orders: HashMap<(EntityKind, EntityId), i64> = HashMap::new();
    for (kind, ids) in ids_by_kind {
        for (id, v) in store.manual_orders(kind, &ids)? {
            orders.insert((kind, id), v);
        }
    }

    Ok(resolve_ranked(
        entities,
        |e| orders.get(&(e.kind(), e.id)).copied(),
        by,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
