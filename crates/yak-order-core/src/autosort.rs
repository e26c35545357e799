//! Read-path gating: decides whether a query result is re-sorted by manual
//! order, and serves resolved results (optionally through a [`ReadCache`]).

use crate::cache::ReadCache;
use crate::config::Settings;
use crate::error::Result;
use crate::resolver::{resolve_with_store, RankedEntity};
use crate::store::{EntitySource, OrderStore};
use crate::types::{CollectionFilter, EntityKind};
use serde::{Deserialize, Serialize};

/// Explicit term orderings that manual order must not override.
const TERM_ORDERBY_PASSTHROUGH: &[&str] = &[
    "include",
    "slug",
    "id",
    "term_id",
    "term_group",
    "count",
    "none",
    "meta_value",
    "meta_value_num",
];

/// Post orderings that manual order may replace.
const POST_ORDERBY_REPLACEABLE: &[&str] = &["", "date", "menu_order"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadContext {
    #[default]
    Admin,
    Frontend,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadRequest {
    pub filter: CollectionFilter,
    #[serde(default)]
    pub context: ReadContext,
    /// Caller opted out of manual ordering for this read.
    #[serde(default)]
    pub ignore_order: bool,
    /// Ordering the caller asked the query layer for, if any.
    #[serde(default)]
    pub orderby: Option<String>,
}

impl ReadRequest {
    pub fn new(filter: CollectionFilter) -> Self {
        Self {
            filter,
            context: ReadContext::Admin,
            ignore_order: false,
            orderby: None,
        }
    }

    pub fn context(mut self, context: ReadContext) -> Self {
        self.context = context;
        self
    }
}

/// Whether `request` should be re-sorted under `settings`.
pub fn should_autosort(settings: &Settings, request: &ReadRequest) -> bool {
    if request.ignore_order {
        return false;
    }
    let orderby = request
        .orderby
        .as_deref()
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let collection = request.filter.collection();

    match request.filter.kind() {
        EntityKind::Term => {
            if !settings.taxonomy_enabled(collection) {
                return false;
            }
            if TERM_ORDERBY_PASSTHROUGH.contains(&orderby.as_str()) {
                return false;
            }
            match request.context {
                ReadContext::Admin => settings.admin_autosort,
                ReadContext::Frontend => settings.autosort_enabled,
            }
        }
        EntityKind::Post => {
            if !settings.post_type_enabled(collection) {
                return false;
            }
            if !POST_ORDERBY_REPLACEABLE.contains(&orderby.as_str()) {
                return false;
            }
            match request.context {
                ReadContext::Admin => true,
                ReadContext::Frontend => settings.post_autosort_frontend,
            }
        }
    }
}

/// Result of a gated read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedRead {
    /// Whether manual ordering was applied.
    pub sorted: bool,
    pub items: Vec<RankedEntity>,
}

/// Fetch candidates for `request` and resolve them when autosort applies.
///
/// Unsorted reads keep query-layer order but still carry manual orders.
pub fn read_ordered(
    source: &dyn EntitySource,
    store: &dyn OrderStore,
    settings: &Settings,
    request: &ReadRequest,
    cache: Option<&ReadCache>,
) -> Result<OrderedRead> {
    let sorted = should_autosort(settings, request);
    let by = settings.secondary_orderby;

    if !sorted {
        let candidates = source.candidates(&request.filter)?;
        let ids: Vec<_> = candidates.iter().map(|e| e.id).collect();
        let orders = store.manual_orders(request.filter.kind(), &ids)?;
        let items = candidates
            .into_iter()
            .map(|entity| RankedEntity {
                manual_order: orders.get(&entity.id).copied(),
                entity,
            })
            .collect();
        return Ok(OrderedRead { sorted, items });
    }

    let compute = || resolve_with_store(source.candidates(&request.filter)?, store, by);
    let items = match cache {
        Some(cache) => cache.get_or_try_insert_with(&request.filter, by, compute)?,
        None => compute()?,
    };
    Ok(OrderedRead { sorted, items })
}
