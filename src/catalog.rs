//! Accumulated collection of fetched records plus the pagination cursor that feeds it.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::api::{id_from_url, next_offset};
use crate::generation::RangeScope;
use crate::state::{ListPage, NamedRef, PokemonDetail};

/// Append-only name → detail map. A name is stored at most once and never replaced.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Catalog {
    order: Vec<String>,
    entries: HashMap<String, PokemonDetail>,
}

impl Catalog {
    /// Inserts `detail` under `name` unless the name is already present.
    /// Returns whether the collection grew.
    pub fn upsert(&mut self, name: &str, detail: PokemonDetail) -> bool {
        if self.entries.contains_key(name) {
            return false;
        }
        self.order.push(name.to_string());
        self.entries.insert(name.to_string(), detail);
        true
    }

    /// Merges a resolved batch in arrival order, returning how many entries were new.
    pub fn merge(&mut self, batch: Vec<PokemonDetail>) -> usize {
        let mut added = 0;
        for detail in batch {
            let name = detail.name.clone();
            if self.upsert(&name, detail) {
                added += 1;
            }
        }
        added
    }

    pub fn get(&self, name: &str) -> Option<&PokemonDetail> {
        self.entries.get(name)
    }

    pub fn find_by_id(&self, id: u32) -> Option<&PokemonDetail> {
        self.entries.values().find(|detail| detail.id == id)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries in insertion order.
    pub fn snapshot(&self) -> Vec<&PokemonDetail> {
        self.order
            .iter()
            .filter_map(|name| self.entries.get(name))
            .collect()
    }

    pub fn count_in_scope(&self, scope: RangeScope) -> usize {
        self.entries
            .values()
            .filter(|detail| scope.contains(detail.id))
            .count()
    }
}

/// Cursor state of the incrementally paged list endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Paginator {
    pub pages: Vec<ListPage>,
    /// Offset of the next page; `None` once the last page has been seen.
    pub next_offset: Option<u32>,
    pub in_flight: bool,
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            pages: Vec::new(),
            next_offset: Some(0),
            in_flight: false,
        }
    }
}

impl Paginator {
    pub fn has_next(&self) -> bool {
        self.next_offset.is_some()
    }

    /// Marks a request in flight and returns its offset, or `None` when nothing may be requested.
    pub fn begin_next(&mut self) -> Option<u32> {
        if self.in_flight {
            return None;
        }
        let offset = self.next_offset?;
        self.in_flight = true;
        Some(offset)
    }

    pub fn accept(&mut self, page: ListPage) {
        self.next_offset = page.next.as_deref().map(next_offset);
        self.pages.push(page);
        self.in_flight = false;
    }

    pub fn fail(&mut self) {
        self.in_flight = false;
    }
}

/// List entries across all pages whose id lies in `scope` (all entries when unscoped).
pub fn scoped_refs(pages: &[ListPage], scope: Option<RangeScope>) -> Vec<&NamedRef> {
    pages
        .iter()
        .flat_map(|page| page.results.iter())
        .filter(|entry| scope.map_or(true, |scope| scope.contains(id_from_url(&entry.url))))
        .collect()
}

/// Names that need a detail fetch: scoped, not yet collected, not already requested.
pub fn plan_batch(
    pages: &[ListPage],
    scope: Option<RangeScope>,
    catalog: &Catalog,
    pending: &HashSet<String>,
) -> Vec<String> {
    let mut seen = HashSet::new();
    scoped_refs(pages, scope)
        .into_iter()
        .filter(|entry| !catalog.contains(&entry.name) && !pending.contains(&entry.name))
        .filter(|entry| seen.insert(entry.name.clone()))
        .map(|entry| entry.name.clone())
        .collect()
}

/// Whether a scoped view should fetch another page without user input.
pub fn should_continue(scope: Option<RangeScope>, catalog: &Catalog, paginator: &Paginator) -> bool {
    let Some(scope) = scope else {
        return false;
    };
    catalog.count_in_scope(scope) < scope.size() && paginator.has_next() && !paginator.in_flight
}
