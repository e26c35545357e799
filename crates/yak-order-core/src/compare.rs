use crate::types::OrderableEntity;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

// ---------------------------------------------------------------------------
// SecondaryOrder
// ---------------------------------------------------------------------------

/// Tie-breaker used when manual order does not decide.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondaryOrder {
    #[default]
    Name,
    #[serde(alias = "term_id")]
    Id,
}

impl SecondaryOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "name" => Some(SecondaryOrder::Name),
            "id" | "term_id" => Some(SecondaryOrder::Id),
            _ => None,
        }
    }
}

impl fmt::Display for SecondaryOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecondaryOrder::Name => f.write_str("name"),
            SecondaryOrder::Id => f.write_str("id"),
        }
    }
}

// ---------------------------------------------------------------------------
// Comparators
// ---------------------------------------------------------------------------

/// ASCII case-insensitive byte comparison (same ordering as C `strcasecmp`).
pub fn cmp_names(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
}

/// Manual-order rule: ranked before unranked, then ascending rank.
/// Returns `Equal` when both are unranked or share a rank.
pub fn cmp_manual(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn cmp_secondary(a: &OrderableEntity, b: &OrderableEntity, by: SecondaryOrder) -> Ordering {
    match by {
        SecondaryOrder::Name => cmp_names(&a.name, &b.name),
        SecondaryOrder::Id => a.id.cmp(&b.id),
    }
}

/// Full comparator over entities with pre-fetched manual orders.
pub fn cmp_entities(
    a: (&OrderableEntity, Option<i64>),
    b: (&OrderableEntity, Option<i64>),
    by: SecondaryOrder,
) -> Ordering {
    cmp_manual(a.1, b.1).then_with(|| cmp_secondary(a.0, b.0, by))
}
