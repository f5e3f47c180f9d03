//! Ordered handler chains with cached resolution.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use super::{Category, Handler, NullHandler};
use crate::capabilities::Tier;
use crate::host::RecipientKind;

/// A fixed, ordered list of handlers for one category.
///
/// Resolution returns the first handler whose `is_available` accepts the
/// recipient kind and tier, or the null handler when none does. Both inputs
/// are stable for the life of the process, so results are cached without
/// invalidation; concurrent inserts of the same key store the same handler.
pub struct HandlerChain<P: 'static> {
    category: Category,
    handlers: Vec<Arc<dyn Handler<P>>>,
    null: Arc<dyn Handler<P>>,
    cache: Option<DashMap<(RecipientKind, Tier), Arc<dyn Handler<P>>>>,
}

impl<P: 'static> HandlerChain<P> {
    /// Build a chain. `handlers` must be ordered newest capability first.
    pub fn new(category: Category, handlers: Vec<Arc<dyn Handler<P>>>) -> Self {
        let chain = Self {
            category,
            handlers,
            null: Arc::new(NullHandler),
            cache: Some(DashMap::new()),
        };
        if !chain.has_fallback() {
            log::debug!(
                "Handler chain `{}` has gaps; unmatched recipients will get the null handler",
                category
            );
        }
        chain
    }

    /// Turn the resolution cache on or off.
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache = if enabled { Some(DashMap::new()) } else { None };
        self
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Handler names in declared order.
    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// The handler for `kind` on a `tier` host. Never fails.
    pub fn resolve(&self, kind: RecipientKind, tier: Tier) -> Arc<dyn Handler<P>> {
        let Some(cache) = &self.cache else {
            return self.walk(kind, tier);
        };

        if let Some(hit) = cache.get(&(kind, tier)) {
            return hit.value().clone();
        }

        let resolved = self.walk(kind, tier);
        cache.insert((kind, tier), resolved.clone());
        resolved
    }

    /// Whether a real (non-null) handler serves `kind` on `tier`.
    pub fn covers(&self, kind: RecipientKind, tier: Tier) -> bool {
        self.handlers.iter().any(|h| h.is_available(kind, tier))
    }

    /// Whether every kind that can display this category resolves to a real
    /// handler on every tier.
    pub fn has_fallback(&self) -> bool {
        RecipientKind::ALL
            .iter()
            .filter(|kind| self.category.supported_by(**kind))
            .all(|kind| Tier::ALL.iter().all(|tier| self.covers(*kind, *tier)))
    }

    fn walk(&self, kind: RecipientKind, tier: Tier) -> Arc<dyn Handler<P>> {
        self.handlers
            .iter()
            .find(|h| h.is_available(kind, tier))
            .cloned()
            .unwrap_or_else(|| self.null.clone())
    }
}

impl<P: 'static> fmt::Debug for HandlerChain<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerChain")
            .field("category", &self.category)
            .field("handlers", &self.handler_names())
            .field("cached", &self.cache.as_ref().map(|c| c.len()))
            .finish()
    }
}
