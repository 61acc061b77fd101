//! Derives the visible result set from the collection, the filters and the search text.

use std::collections::HashSet;

use crate::api::id_from_url;
use crate::catalog::{self, Catalog};
use crate::generation::RangeScope;
use crate::state::{ListPage, PokemonDetail, PokemonSummary};
use crate::types::ALL_TYPES;

#[derive(Clone, Debug, PartialEq)]
pub enum Visible<'a> {
    /// Name/id matches for an active search, sorted by id.
    Search(Vec<PokemonSummary>),
    /// Collected records passing the range and type filters, in collection order.
    Grid(Vec<&'a PokemonDetail>),
}

impl Visible<'_> {
    pub fn names(&self) -> Vec<String> {
        match self {
            Visible::Search(results) => results.iter().map(|entry| entry.name.clone()).collect(),
            Visible::Grid(details) => details.iter().map(|detail| detail.name.clone()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Visible::Search(results) => results.len(),
            Visible::Grid(details) => details.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_search(&self) -> bool {
        matches!(self, Visible::Search(_))
    }
}

/// Trimmed, lowercased query, or `None` when nothing is left after trimming.
pub fn normalize_query(query: &str) -> Option<String> {
    let trimmed = query.trim().to_lowercase();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Lightweight id/name projection of every listed entry, one per name.
pub fn summaries(pages: &[ListPage], scope: Option<RangeScope>) -> Vec<PokemonSummary> {
    let mut seen = HashSet::new();
    catalog::scoped_refs(pages, scope)
        .into_iter()
        .filter(|entry| seen.insert(entry.name.as_str()))
        .map(|entry| PokemonSummary {
            id: id_from_url(&entry.url),
            name: entry.name.clone(),
        })
        .collect()
}

/// Entries whose name contains the query (case-insensitive) or whose decimal id
/// contains it, sorted ascending by id. Empty for a blank query.
pub fn search(summaries: &[PokemonSummary], query: &str) -> Vec<PokemonSummary> {
    let Some(query) = normalize_query(query) else {
        return Vec::new();
    };
    let mut results: Vec<PokemonSummary> = summaries
        .iter()
        .filter(|entry| {
            entry.name.to_lowercase().contains(&query) || entry.id.to_string().contains(&query)
        })
        .cloned()
        .collect();
    results.sort_by_key(|entry| entry.id);
    results
}

/// Collected records inside `scope` that carry `type_filter` (`None` or `"all"` accept every type).
pub fn filter<'a>(
    catalog: &'a Catalog,
    type_filter: Option<&str>,
    scope: Option<RangeScope>,
) -> Vec<&'a PokemonDetail> {
    let type_filter = type_filter.filter(|name| *name != ALL_TYPES);
    catalog
        .snapshot()
        .into_iter()
        .filter(|detail| scope.map_or(true, |scope| scope.contains(detail.id)))
        .filter(|detail| type_filter.map_or(true, |name| detail.has_type(name)))
        .collect()
}

pub fn resolve<'a>(
    pages: &[ListPage],
    catalog: &'a Catalog,
    type_filter: Option<&str>,
    scope: Option<RangeScope>,
    query: &str,
) -> Visible<'a> {
    if normalize_query(query).is_some() {
        return Visible::Search(search(&summaries(pages, scope), query));
    }
    Visible::Grid(filter(catalog, type_filter, scope))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::state::NamedRef;

    fn detail(id: u32, name: &str, types: &[&str]) -> PokemonDetail {
        PokemonDetail {
            id,
            name: name.to_string(),
            types: types.iter().map(|t| t.to_string()).collect(),
            stats: Vec::new(),
            abilities: Vec::new(),
            height: 1,
            weight: 1,
            base_experience: 0,
            artwork: None,
        }
    }

    fn numbered_pages(ids: std::ops::RangeInclusive<u32>) -> Vec<ListPage> {
        vec![ListPage {
            results: ids
                .map(|id| NamedRef {
                    name: format!("mon-{id}"),
                    url: format!("https://pokeapi.co/api/v2/pokemon/{id}/"),
                })
                .collect(),
            next: None,
        }]
    }

    fn sample_catalog() -> Catalog {
        let mut catalog = Catalog::default();
        for detail in [
            detail(4, "charmander", &["fire"]),
            detail(1, "bulbasaur", &["grass", "poison"]),
            detail(7, "squirtle", &["water"]),
            detail(6, "charizard", &["fire", "flying"]),
            detail(152, "chikorita", &["grass"]),
        ] {
            let name = detail.name.clone();
            catalog.upsert(&name, detail);
        }
        catalog
    }

    fn names(details: &[&PokemonDetail]) -> Vec<String> {
        details.iter().map(|d| d.name.clone()).collect()
    }

    #[test]
    fn blank_query_is_no_search() {
        assert_eq!(normalize_query("   "), None);
        assert_eq!(normalize_query(" Pika "), Some("pika".to_string()));
        let catalog = sample_catalog();
        let visible = resolve(&[], &catalog, None, None, "  \t");
        assert!(!visible.is_search());
        assert_eq!(visible.len(), 5);
    }

    #[test]
    fn search_by_id_substring() {
        let summaries = summaries(&numbered_pages(1..=30), None);
        let results = search(&summaries, "25");
        assert_eq!(
            results,
            vec![PokemonSummary {
                id: 25,
                name: "mon-25".to_string()
            }]
        );

        let ids: Vec<u32> = search(&summaries, "2").iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 12, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29]);
    }

    #[test]
    fn search_by_name_is_case_insensitive_and_sorted() {
        let pages = vec![ListPage {
            results: vec![
                NamedRef {
                    name: "charizard".to_string(),
                    url: "https://pokeapi.co/api/v2/pokemon/6/".to_string(),
                },
                NamedRef {
                    name: "charmander".to_string(),
                    url: "https://pokeapi.co/api/v2/pokemon/4/".to_string(),
                },
                NamedRef {
                    name: "squirtle".to_string(),
                    url: "https://pokeapi.co/api/v2/pokemon/7/".to_string(),
                },
            ],
            next: None,
        }];
        let results = search(&summaries(&pages, None), "CHAR");
        let ids: Vec<u32> = results.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![4, 6]);
    }

    #[test]
    fn search_respects_scope_and_ignores_type() {
        let catalog = sample_catalog();
        let pages = numbered_pages(1..=200);
        let visible = resolve(&pages, &catalog, Some("fire"), Some(RangeScope::new(1, 151)), "15");
        let Visible::Search(results) = visible else {
            panic!("expected search results");
        };
        let ids: Vec<u32> = results.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![15, 115, 150, 151]);
    }

    #[test]
    fn duplicate_listings_match_once() {
        let mut pages = numbered_pages(1..=3);
        pages.extend(numbered_pages(3..=4));
        let results = search(&summaries(&pages, None), "mon-3");
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn grid_filters_by_scope_and_type() {
        let catalog = sample_catalog();
        let scope = Some(RangeScope::new(1, 151));

        let all = filter(&catalog, Some(ALL_TYPES), scope);
        assert_eq!(names(&all), vec!["charmander", "bulbasaur", "squirtle", "charizard"]);

        let fire = filter(&catalog, Some("fire"), scope);
        assert_eq!(names(&fire), vec!["charmander", "charizard"]);

        let grass = filter(&catalog, Some("grass"), None);
        assert_eq!(names(&grass), vec!["bulbasaur", "chikorita"]);

        let flying = filter(&catalog, Some("flying"), Some(RangeScope::new(1, 5)));
        assert!(flying.is_empty());
    }

    #[test]
    fn grid_only_holds_ids_in_scope() {
        let catalog = sample_catalog();
        for (start, end) in [(1, 5), (4, 7), (6, 6), (100, 200)] {
            let scope = RangeScope::new(start, end);
            for detail in filter(&catalog, None, Some(scope)) {
                assert!(scope.contains(detail.id), "{} outside {start}-{end}", detail.id);
            }
        }
    }

    #[test]
    fn inverted_scope_yields_nothing() {
        let catalog = sample_catalog();
        let scope = Some(RangeScope::new(151, 1));
        assert!(filter(&catalog, None, scope).is_empty());
        let pages = numbered_pages(1..=151);
        assert!(resolve(&pages, &catalog, None, scope, "1").is_empty());
    }
}
