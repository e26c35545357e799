use crate::error::{OrderError, Result};
use crate::paths;
use crate::types::{
    CollectionFilter, EntityId, EntityKind, GroupKey, OrderableEntity, ROOT_PARENT,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Registered collections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyDef {
    pub key: String,
    pub label: String,
    #[serde(default = "default_hierarchical")]
    pub hierarchical: bool,
}

fn default_hierarchical() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostTypeDef {
    pub key: String,
    pub label: String,
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: EntityId,
    pub taxonomy: String,
    pub name: String,
    #[serde(default)]
    pub parent: EntityId,
    /// Absent key = no manual order record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl Term {
    pub fn group(&self) -> GroupKey {
        GroupKey::term(self.taxonomy.clone(), self.parent)
    }

    fn to_entity(&self) -> OrderableEntity {
        OrderableEntity::new(self.id, self.name.clone(), self.group())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: EntityId,
    pub post_type: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu_order: Option<i64>,
}

impl Post {
    pub fn group(&self) -> GroupKey {
        GroupKey::post_type(self.post_type.clone())
    }

    fn to_entity(&self) -> OrderableEntity {
        OrderableEntity::new(self.id, self.title.clone(), self.group())
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Entities and their manual-order records, persisted as `.yak/catalog.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub taxonomies: Vec<TaxonomyDef>,
    #[serde(default)]
    pub post_types: Vec<PostTypeDef>,
    #[serde(default)]
    pub terms: Vec<Term>,
    #[serde(default)]
    pub posts: Vec<Post>,
}

impl Catalog {
    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::catalog_path(root);
        if !path.exists() {
            return Err(OrderError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let catalog: Catalog = serde_yaml::from_str(&data)?;
        Ok(catalog)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::catalog_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // ---------------------------------------------------------------------------
    // Registration
    // ---------------------------------------------------------------------------

    pub fn taxonomy(&self, key: &str) -> Option<&TaxonomyDef> {
        self.taxonomies.iter().find(|t| t.key == key)
    }

    pub fn post_type(&self, key: &str) -> Option<&PostTypeDef> {
        self.post_types.iter().find(|p| p.key == key)
    }

    pub fn add_taxonomy(
        &mut self,
        key: &str,
        label: impl Into<String>,
        hierarchical: bool,
    ) -> Result<()> {
        paths::validate_key(key)?;
        if self.taxonomy(key).is_some() {
            return Err(OrderError::CollectionExists(key.to_string()));
        }
        self.taxonomies.push(TaxonomyDef {
            key: key.to_string(),
            label: label.into(),
            hierarchical,
        });
        Ok(())
    }

    pub fn add_post_type(&mut self, key: &str, label: impl Into<String>) -> Result<()> {
        paths::validate_key(key)?;
        if self.post_type(key).is_some() {
            return Err(OrderError::CollectionExists(key.to_string()));
        }
        self.post_types.push(PostTypeDef {
            key: key.to_string(),
            label: label.into(),
        });
        Ok(())
    }

    // ---------------------------------------------------------------------------
    // Entities
    // ---------------------------------------------------------------------------

    pub fn term(&self, id: EntityId) -> Option<&Term> {
        self.terms.iter().find(|t| t.id == id)
    }

    pub fn post(&self, id: EntityId) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    /// Add a term under `parent` (0 for top level). Returns the new id.
    pub fn add_term(
        &mut self,
        taxonomy: &str,
        name: impl Into<String>,
        parent: EntityId,
    ) -> Result<EntityId> {
        let def = self
            .taxonomy(taxonomy)
            .ok_or_else(|| OrderError::InvalidGroup(format!("unknown taxonomy '{taxonomy}'")))?;
        if parent != ROOT_PARENT {
            if !def.hierarchical {
                return Err(OrderError::InvalidGroup(format!(
                    "taxonomy '{taxonomy}' is flat; terms cannot have a parent"
                )));
            }
            match self.term(parent) {
                Some(p) if p.taxonomy == taxonomy => {}
                _ => {
                    return Err(OrderError::EntityNotFound {
                        kind: EntityKind::Term,
                        id: parent,
                    })
                }
            }
        }

        let id = self.terms.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        self.terms.push(Term {
            id,
            taxonomy: taxonomy.to_string(),
            name: name.into(),
            parent,
            order: None,
        });
        Ok(id)
    }

    pub fn add_post(&mut self, post_type: &str, title: impl Into<String>) -> Result<EntityId> {
        if self.post_type(post_type).is_none() {
            return Err(OrderError::InvalidGroup(format!(
                "unknown post type '{post_type}'"
            )));
        }
        let id = self.posts.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        self.posts.push(Post {
            id,
            post_type: post_type.to_string(),
            title: title.into(),
            menu_order: None,
        });
        Ok(id)
    }

    // ---------------------------------------------------------------------------
    // Manual order records
    // ---------------------------------------------------------------------------

    pub fn manual_order(&self, kind: EntityKind, id: EntityId) -> Option<i64> {
        match kind {
            EntityKind::Term => self.term(id).and_then(|t| t.order),
            EntityKind::Post => self.post(id).and_then(|p| p.menu_order),
        }
    }

    pub fn set_manual_order(&mut self, kind: EntityKind, id: EntityId, value: i64) -> Result<()> {
        let slot = match kind {
            EntityKind::Term => self
                .terms
                .iter_mut()
                .find(|t| t.id == id)
                .map(|t| &mut t.order),
            EntityKind::Post => self
                .posts
                .iter_mut()
                .find(|p| p.id == id)
                .map(|p| &mut p.menu_order),
        };
        match slot {
            Some(slot) => {
                *slot = Some(value);
                Ok(())
            }
            None => Err(OrderError::EntityNotFound { kind, id }),
        }
    }

    // ---------------------------------------------------------------------------
    // Query layer
    // ---------------------------------------------------------------------------

    pub fn has_collection(&self, group: &GroupKey) -> bool {
        match group {
            GroupKey::Term { taxonomy, .. } => self.taxonomy(taxonomy).is_some(),
            GroupKey::PostType { post_type } => self.post_type(post_type).is_some(),
        }
    }

    /// Entities matching `filter`, in catalog (insertion) order.
    pub fn candidates(&self, filter: &CollectionFilter) -> Vec<OrderableEntity> {
        match filter.kind() {
            EntityKind::Term => self
                .terms
                .iter()
                .filter(|t| filter.covers(&t.group()))
                .map(Term::to_entity)
                .collect(),
            EntityKind::Post => self
                .posts
                .iter()
                .filter(|p| filter.covers(&p.group()))
                .map(Post::to_entity)
                .collect(),
        }
    }

    pub fn entity(&self, kind: EntityKind, id: EntityId) -> Option<OrderableEntity> {
        match kind {
            EntityKind::Term => self.term(id).map(Term::to_entity),
            EntityKind::Post => self.post(id).map(Post::to_entity),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
