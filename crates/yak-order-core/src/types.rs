use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque entity identifier (term id or post id).
pub type EntityId = u64;

/// Parent id used for top-level terms.
pub const ROOT_PARENT: EntityId = 0;

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

/// Which ordering backend an entity belongs to. Term ids and post ids live in
/// separate id spaces, so every store access is scoped by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Term,
    Post,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Term => "term",
            EntityKind::Post => "post",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// GroupKey
// ---------------------------------------------------------------------------

/// The unit of renumbering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GroupKey {
    /// Direct children of `parent` within a taxonomy (`parent == 0` for roots).
    Term { taxonomy: String, parent: EntityId },
    /// Every post of one post type.
    PostType { post_type: String },
}

impl GroupKey {
    pub fn term(taxonomy: impl Into<String>, parent: EntityId) -> Self {
        GroupKey::Term {
            taxonomy: taxonomy.into(),
            parent,
        }
    }

    pub fn post_type(post_type: impl Into<String>) -> Self {
        GroupKey::PostType {
            post_type: post_type.into(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            GroupKey::Term { .. } => EntityKind::Term,
            GroupKey::PostType { .. } => EntityKind::Post,
        }
    }

    /// Taxonomy or post-type key this group lives in.
    pub fn collection(&self) -> &str {
        match self {
            GroupKey::Term { taxonomy, .. } => taxonomy,
            GroupKey::PostType { post_type } => post_type,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Term { taxonomy, parent } => write!(f, "{taxonomy}/{parent}"),
            GroupKey::PostType { post_type } => write!(f, "{post_type}"),
        }
    }
}

// ---------------------------------------------------------------------------
// CollectionFilter
// ---------------------------------------------------------------------------

/// Typed selector understood by the query layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CollectionFilter {
    /// One sibling group of a taxonomy.
    ByParent { taxonomy: String, parent: EntityId },
    /// Every term of a taxonomy, regardless of parent.
    ByTaxonomy { taxonomy: String },
    /// Every post of a post type.
    ByCollectionType { post_type: String },
}

impl CollectionFilter {
    pub fn kind(&self) -> EntityKind {
        match self {
            CollectionFilter::ByParent { .. } | CollectionFilter::ByTaxonomy { .. } => {
                EntityKind::Term
            }
            CollectionFilter::ByCollectionType { .. } => EntityKind::Post,
        }
    }

    pub fn collection(&self) -> &str {
        match self {
            CollectionFilter::ByParent { taxonomy, .. }
            | CollectionFilter::ByTaxonomy { taxonomy } => taxonomy,
            CollectionFilter::ByCollectionType { post_type } => post_type,
        }
    }

    /// Whether entities of `group` can appear in results for this filter.
    pub fn covers(&self, group: &GroupKey) -> bool {
        match (self, group) {
            (
                CollectionFilter::ByParent { taxonomy, parent },
                GroupKey::Term {
                    taxonomy: t,
                    parent: p,
                },
            ) => taxonomy == t && parent == p,
            (CollectionFilter::ByTaxonomy { taxonomy }, GroupKey::Term { taxonomy: t, .. }) => {
                taxonomy == t
            }
            (
                CollectionFilter::ByCollectionType { post_type },
                GroupKey::PostType { post_type: p },
            ) => post_type == p,
            _ => false,
        }
    }
}

impl From<&GroupKey> for CollectionFilter {
    fn from(group: &GroupKey) -> Self {
        match group {
            GroupKey::Term { taxonomy, parent } => CollectionFilter::ByParent {
                taxonomy: taxonomy.clone(),
                parent: *parent,
            },
            GroupKey::PostType { post_type } => CollectionFilter::ByCollectionType {
                post_type: post_type.clone(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// OrderableEntity
// ---------------------------------------------------------------------------

/// An item participating in ordering, as returned by the query layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderableEntity {
    pub id: EntityId,
    pub name: String,
    pub group: GroupKey,
}

impl OrderableEntity {
    pub fn new(id: EntityId, name: impl Into<String>, group: GroupKey) -> Self {
        Self {
            id,
            name: name.into(),
            group,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.group.kind()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
