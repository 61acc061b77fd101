//! Reducer flows driven through EffectStore and EffectStoreTestHarness
//!
//! Completions are fed back in by hand, the same way the runtime would after a
//! spawned task resolves.

use pretty_assertions::assert_eq;
use tui_dispatch::testing::*;
use tui_dispatch::{DataResource, EffectStore};
use pokedex_explorer::{
    action::Action,
    effect::Effect,
    evolution::EvolutionNode,
    generation::RangeScope,
    reducer::reducer,
    state::{AppState, DetailTab, ListPage, NamedRef, PokemonDetail, PokemonSpecies, Screen},
};

fn entry(id: u32, name: &str) -> NamedRef {
    NamedRef {
        name: name.to_string(),
        url: format!("https://pokeapi.co/api/v2/pokemon/{id}/"),
    }
}

fn page(entries: &[(u32, &str)], next: Option<u32>) -> ListPage {
    ListPage {
        results: entries.iter().map(|(id, name)| entry(*id, name)).collect(),
        next: next.map(|offset| {
            format!("https://pokeapi.co/api/v2/pokemon?offset={offset}&limit=3")
        }),
    }
}

fn detail(id: u32, name: &str, types: &[&str]) -> PokemonDetail {
    PokemonDetail {
        id,
        name: name.to_string(),
        types: types.iter().map(|t| t.to_string()).collect(),
        stats: Vec::new(),
        abilities: Vec::new(),
        height: 7,
        weight: 69,
        base_experience: 64,
        artwork: None,
    }
}

fn species(name: &str, chain_id: Option<u32>) -> PokemonSpecies {
    PokemonSpecies {
        name: name.to_string(),
        flavor_text: Some("A strange seed was planted on its back at birth.".to_string()),
        genus: Some("Seed Pokemon".to_string()),
        evolution_chain_url: chain_id
            .map(|id| format!("https://pokeapi.co/api/v2/evolution-chain/{id}/")),
    }
}

fn node(id: u32, name: &str, evolves_to: Vec<EvolutionNode>) -> EvolutionNode {
    EvolutionNode {
        species: NamedRef {
            name: name.to_string(),
            url: format!("https://pokeapi.co/api/v2/pokemon-species/{id}/"),
        },
        evolves_to,
    }
}

/// Generation view narrowed to ids 1..=5 with three entries per page.
fn scoped_state() -> AppState {
    let mut state = AppState::with_start(3, Some(1));
    state.dex.scope = Some(RangeScope::new(1, 5));
    state
}

fn starters() -> Vec<PokemonDetail> {
    vec![
        detail(1, "bulbasaur", &["grass", "poison"]),
        detail(4, "charmander", &["fire"]),
        detail(7, "squirtle", &["water"]),
    ]
}

/// Unscoped view holding the three starters.
fn loaded_national_state() -> AppState {
    let mut store = EffectStore::new(AppState::with_start(3, None), reducer);
    store.dispatch(Action::Init);
    store.dispatch(Action::PageDidLoad {
        session: 1,
        page: page(&[(1, "bulbasaur"), (4, "charmander"), (7, "squirtle")], Some(3)),
    });
    store.dispatch(Action::BatchDidLoad {
        session: 1,
        details: starters(),
    });
    store.state().clone()
}

#[test]
fn test_scoped_view_pages_until_scope_is_covered() {
    let mut store = EffectStore::new(scoped_state(), reducer);

    let result = store.dispatch(Action::Init);
    assert_eq!(
        result.effects,
        vec![Effect::LoadPage {
            session: 1,
            offset: 0,
            limit: 3
        }]
    );

    let result = store.dispatch(Action::PageDidLoad {
        session: 1,
        page: page(&[(1, "bulbasaur"), (2, "ivysaur"), (3, "venusaur")], Some(3)),
    });
    assert_eq!(
        result.effects,
        vec![
            Effect::LoadBatch {
                session: 1,
                seq: 0,
                names: vec!["bulbasaur".into(), "ivysaur".into(), "venusaur".into()],
            },
            Effect::LoadPage {
                session: 1,
                offset: 3,
                limit: 3
            },
        ]
    );

    // Only ids 4 and 5 of this page are in scope.
    let result = store.dispatch(Action::PageDidLoad {
        session: 1,
        page: page(&[(4, "charmander"), (5, "charmeleon"), (6, "charizard")], Some(6)),
    });
    assert_eq!(
        result.effects,
        vec![
            Effect::LoadBatch {
                session: 1,
                seq: 1,
                names: vec!["charmander".into(), "charmeleon".into()],
            },
            Effect::LoadPage {
                session: 1,
                offset: 6,
                limit: 3
            },
        ]
    );

    let result = store.dispatch(Action::BatchDidLoad {
        session: 1,
        details: vec![
            detail(1, "bulbasaur", &["grass", "poison"]),
            detail(2, "ivysaur", &["grass", "poison"]),
            detail(3, "venusaur", &["grass", "poison"]),
        ],
    });
    assert!(result.changed);
    assert!(result.effects.is_empty(), "page already in flight");

    let result = store.dispatch(Action::BatchDidLoad {
        session: 1,
        details: vec![
            detail(4, "charmander", &["fire"]),
            detail(5, "charmeleon", &["fire"]),
        ],
    });
    assert!(result.effects.is_empty());
    assert_eq!(store.state().dex.catalog.len(), 5);

    // Scope is covered: even with a next cursor nothing more is requested.
    let result = store.dispatch(Action::PageDidLoad {
        session: 1,
        page: page(&[(7, "squirtle"), (8, "wartortle"), (9, "blastoise")], Some(9)),
    });
    assert!(result.effects.is_empty());
    assert!(store.state().dex.paginator.has_next());
    assert!(!store.state().dex.paginator.in_flight);
    assert!(!store.state().is_busy());
}

#[test]
fn test_scoped_view_stops_at_last_page() {
    let mut store = EffectStore::new(scoped_state(), reducer);
    store.dispatch(Action::Init);
    let result = store.dispatch(Action::PageDidLoad {
        session: 1,
        page: page(&[(1, "bulbasaur"), (2, "ivysaur")], None),
    });
    assert_eq!(result.effects.len(), 1);
    assert!(matches!(result.effects[0], Effect::LoadBatch { .. }));
    assert!(!store.state().dex.paginator.has_next());
}

#[test]
fn test_batch_never_refetches_pending_or_collected_names() {
    let mut store = EffectStore::new(scoped_state(), reducer);
    store.dispatch(Action::Init);
    store.dispatch(Action::PageDidLoad {
        session: 1,
        page: page(&[(1, "bulbasaur"), (2, "ivysaur"), (3, "venusaur")], Some(3)),
    });

    // Same names again on the next page: already pending.
    let result = store.dispatch(Action::PageDidLoad {
        session: 1,
        page: page(&[(1, "bulbasaur"), (2, "ivysaur"), (3, "venusaur")], Some(6)),
    });
    assert!(result
        .effects
        .iter()
        .all(|effect| !matches!(effect, Effect::LoadBatch { .. })));
    assert_eq!(store.state().dex.pending.len(), 3);
}

#[test]
fn test_stale_page_after_leaving_view_is_dropped() {
    let mut store = EffectStore::new(scoped_state(), reducer);
    store.dispatch(Action::Init);
    store.dispatch(Action::PageDidLoad {
        session: 1,
        page: page(&[(1, "bulbasaur")], Some(1)),
    });

    let result = store.dispatch(Action::DexClose);
    assert_eq!(
        result.effects,
        vec![Effect::CancelSession {
            session: 1,
            batches: 1
        }]
    );
    assert_eq!(store.state().screen, Screen::Generations);

    let result = store.dispatch(Action::BatchDidLoad {
        session: 1,
        details: vec![detail(1, "bulbasaur", &["grass"])],
    });
    assert!(!result.changed);
    assert!(store.state().dex.catalog.is_empty());

    // A fresh view gets a new session; old completions still do not leak in.
    let result = store.dispatch(Action::GenerationOpen);
    assert_eq!(
        result.effects,
        vec![Effect::LoadPage {
            session: 2,
            offset: 0,
            limit: 3
        }]
    );
    let result = store.dispatch(Action::PageDidLoad {
        session: 1,
        page: page(&[(1, "bulbasaur")], None),
    });
    assert!(!result.changed);
    assert!(store.state().dex.paginator.pages.is_empty());
    assert!(store.state().dex.paginator.in_flight);
}

#[test]
fn test_page_error_then_retry_rebuilds_view() {
    let mut store = EffectStore::new(scoped_state(), reducer);
    store.dispatch(Action::Init);
    store.dispatch(Action::PageDidError {
        session: 1,
        error: "failed to fetch pokemon list at 0: timed out".into(),
    });
    assert!(store.state().dex.list_error.is_some());
    assert!(!store.state().dex.paginator.in_flight);

    let result = store.dispatch(Action::DexRetry);
    assert_eq!(
        result.effects,
        vec![
            Effect::CancelSession {
                session: 1,
                batches: 0
            },
            Effect::LoadPage {
                session: 2,
                offset: 0,
                limit: 3
            },
        ]
    );
    assert_eq!(store.state().dex.list_error, None);
    assert_eq!(store.state().dex.scope, Some(RangeScope::new(1, 5)));
}

#[test]
fn test_failed_batch_merges_nothing() {
    let mut store = EffectStore::new(scoped_state(), reducer);
    store.dispatch(Action::Init);
    store.dispatch(Action::PageDidLoad {
        session: 1,
        page: page(&[(1, "bulbasaur"), (2, "ivysaur")], Some(3)),
    });

    let result = store.dispatch(Action::BatchDidError {
        session: 1,
        names: vec!["bulbasaur".into(), "ivysaur".into()],
        error: "failed to fetch pokemon ivysaur: HTTP status 500".into(),
    });
    assert!(result.effects.is_empty());
    assert!(store.state().dex.catalog.is_empty());
    assert!(store.state().dex.pending.is_empty());
    assert_eq!(
        store.state().dex.list_error.as_deref(),
        Some("failed to fetch pokemon ivysaur: HTTP status 500")
    );
}

#[test]
fn test_national_dex_loads_more_only_on_request() {
    let mut store = EffectStore::new(AppState::with_start(3, None), reducer);
    store.dispatch(Action::Init);
    let result = store.dispatch(Action::PageDidLoad {
        session: 1,
        page: page(&[(1, "bulbasaur"), (2, "ivysaur"), (3, "venusaur")], Some(3)),
    });
    assert_eq!(result.effects.len(), 1);
    assert!(matches!(result.effects[0], Effect::LoadBatch { .. }));

    let result = store.dispatch(Action::DexLoadMore);
    assert_eq!(
        result.effects,
        vec![Effect::LoadPage {
            session: 1,
            offset: 3,
            limit: 3
        }]
    );

    let result = store.dispatch(Action::DexLoadMore);
    assert!(!result.changed, "one page request at a time");
}

#[test]
fn test_generation_selector_wraps_nothing() {
    let mut store = EffectStore::new(AppState::default(), reducer);
    assert!(!store.dispatch(Action::GenerationMove(-1)).changed);
    store.dispatch(Action::GenerationMove(20));
    assert_eq!(store.state().generation_index, 8);

    // The last slot is the National Dex.
    let result = store.dispatch(Action::GenerationOpen);
    assert_eq!(store.state().dex.scope, None);
    assert_eq!(store.state().dex.title(), "Pokedex");
    assert_eq!(result.effects.len(), 1);
}

#[test]
fn test_generation_open_uses_generation_range() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::GenerationSelect(1));
    harness.dispatch_collect(Action::GenerationOpen);
    harness.assert_state(|s| s.screen == Screen::Pokedex);
    harness.assert_state(|s| s.dex.scope == Some(RangeScope::new(152, 251)));

    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_first_matches(|e| matches!(e, Effect::LoadPage { offset: 0, .. }));
}

#[test]
fn test_type_filter_narrows_grid() {
    let mut store = EffectStore::new(loaded_national_state(), reducer);
    assert_eq!(
        store.state().dex.visible_names(),
        vec!["bulbasaur", "charmander", "squirtle"]
    );

    // all -> normal -> fire
    store.dispatch(Action::TypeFilterNext);
    assert!(store.state().dex.visible_names().is_empty());
    store.dispatch(Action::TypeFilterNext);
    assert_eq!(store.state().dex.type_filter.as_deref(), Some("fire"));
    assert_eq!(store.state().dex.visible_names(), vec!["charmander"]);

    store.dispatch(Action::TypeFilterClear);
    assert_eq!(store.state().dex.visible_names().len(), 3);
}

#[test]
fn test_search_ignores_type_filter_and_walks_list_entries() {
    let mut store = EffectStore::new(loaded_national_state(), reducer);
    store.dispatch(Action::TypeFilterNext);
    store.dispatch(Action::TypeFilterNext);

    store.dispatch(Action::SearchStart);
    for ch in "  SQU".chars() {
        store.dispatch(Action::SearchInput(ch));
    }
    assert!(store.state().dex.visible().is_search());
    assert_eq!(store.state().dex.visible_names(), vec!["squirtle"]);

    // Type cycling is inert while a query is active.
    assert!(!store.dispatch(Action::TypeFilterNext).changed);

    store.dispatch(Action::SearchSubmit);
    assert!(!store.state().dex.search.active);
    assert_eq!(store.state().dex.visible_names(), vec!["squirtle"]);

    store.dispatch(Action::SearchCancel);
    assert_eq!(store.state().dex.visible_names(), vec!["charmander"]);
}

#[test]
fn test_search_matches_id_substring() {
    let mut store = EffectStore::new(loaded_national_state(), reducer);
    store.dispatch(Action::SearchStart);
    store.dispatch(Action::SearchInput('4'));
    assert_eq!(store.state().dex.visible_names(), vec!["charmander"]);
}

#[test]
fn test_selection_is_clamped_to_visible_rows() {
    let mut store = EffectStore::new(loaded_national_state(), reducer);
    store.dispatch(Action::SelectionMove(10));
    assert_eq!(store.state().dex.selected_index, 2);
    store.dispatch(Action::SelectionJumpTop);
    assert_eq!(store.state().dex.selected_index, 0);
    assert!(!store.dispatch(Action::SelectionMove(-1)).changed);
    store.dispatch(Action::SelectionJumpBottom);
    assert_eq!(store.state().dex.selected_index, 2);
}

#[test]
fn test_open_detail_reuses_collected_record() {
    let mut store = EffectStore::new(loaded_national_state(), reducer);
    store.dispatch(Action::DexSelect(1));
    let result = store.dispatch(Action::DexActivate);
    assert_eq!(
        result.effects,
        vec![Effect::LoadSpecies {
            name: "charmander".into()
        }]
    );
    let detail = store.state().detail.as_ref().unwrap();
    assert_eq!(detail.tab, DetailTab::Stats);
    assert!(detail.pokemon.is_loaded());
    assert!(detail.is_loading());
}

#[test]
fn test_open_detail_fetches_unknown_entity() {
    let mut store = EffectStore::new(loaded_national_state(), reducer);
    let result = store.dispatch(Action::DetailOpen("pikachu".into()));
    assert_eq!(
        result.effects,
        vec![
            Effect::LoadPokemon {
                name: "pikachu".into()
            },
            Effect::LoadSpecies {
                name: "pikachu".into()
            },
        ]
    );

    store.dispatch(Action::PokemonDidError {
        name: "pikachu".into(),
        error: "failed to fetch pokemon pikachu: HTTP status 404".into(),
    });
    let detail = store.state().detail.as_ref().unwrap();
    assert_eq!(
        detail.error(),
        Some("failed to fetch pokemon pikachu: HTTP status 404")
    );
}

#[test]
fn test_species_without_chain_leaves_evolution_empty() {
    let mut store = EffectStore::new(loaded_national_state(), reducer);
    store.dispatch(Action::DetailOpen("squirtle".into()));
    let result = store.dispatch(Action::SpeciesDidLoad {
        name: "squirtle".into(),
        species: species("squirtle", None),
    });
    assert!(result.effects.is_empty());
    let detail = store.state().detail.as_ref().unwrap();
    assert!(detail.chain.is_empty());
    assert!(!detail.is_loading());
}

#[test]
fn test_evolution_steps_resolve_without_touching_catalog() {
    let mut store = EffectStore::new(loaded_national_state(), reducer);
    store.dispatch(Action::DetailOpen("bulbasaur".into()));

    let result = store.dispatch(Action::SpeciesDidLoad {
        name: "bulbasaur".into(),
        species: species("bulbasaur", Some(1)),
    });
    assert_eq!(
        result.effects,
        vec![Effect::LoadEvolutionChain {
            name: "bulbasaur".into(),
            id: 1
        }]
    );

    let chain = node(
        1,
        "bulbasaur",
        vec![node(2, "ivysaur", vec![node(3, "venusaur", vec![])])],
    );
    let result = store.dispatch(Action::EvolutionDidLoad {
        name: "bulbasaur".into(),
        chain,
    });
    assert_eq!(
        result.effects,
        vec![
            Effect::LoadEvolutionStep {
                name: "bulbasaur".into(),
                id: 2
            },
            Effect::LoadEvolutionStep {
                name: "bulbasaur".into(),
                id: 3
            },
        ]
    );

    store.dispatch(Action::EvolutionStepDidLoad {
        name: "bulbasaur".into(),
        id: 2,
        detail: detail(2, "ivysaur", &["grass", "poison"]),
    });
    let view = store.state().detail.as_ref().unwrap();
    assert!(view.steps[&1].is_loaded());
    assert!(view.steps[&2].is_loaded());
    assert!(view.steps[&3].is_loading());
    assert_eq!(store.state().dex.catalog.len(), 3);
    assert!(!store.state().dex.catalog.contains("ivysaur"));
}

#[test]
fn test_evolution_open_moves_detail_to_stage() {
    let mut store = EffectStore::new(loaded_national_state(), reducer);
    store.dispatch(Action::DetailOpen("bulbasaur".into()));
    store.dispatch(Action::SpeciesDidLoad {
        name: "bulbasaur".into(),
        species: species("bulbasaur", Some(1)),
    });
    store.dispatch(Action::EvolutionDidLoad {
        name: "bulbasaur".into(),
        chain: node(1, "bulbasaur", vec![node(2, "ivysaur", vec![])]),
    });

    store.dispatch(Action::EvolutionSelect(5));
    assert_eq!(store.state().detail.as_ref().unwrap().evolution_index, 1);

    let result = store.dispatch(Action::EvolutionOpen);
    let view = store.state().detail.as_ref().unwrap();
    assert_eq!(view.name, "ivysaur");
    assert_eq!(view.tab, DetailTab::Evolution);
    assert_eq!(result.effects.len(), 2);
}

#[test]
fn test_detail_completion_for_closed_view_is_dropped() {
    let mut store = EffectStore::new(loaded_national_state(), reducer);
    store.dispatch(Action::DetailOpen("bulbasaur".into()));
    store.dispatch(Action::DetailOpen("charmander".into()));

    let result = store.dispatch(Action::SpeciesDidLoad {
        name: "bulbasaur".into(),
        species: species("bulbasaur", Some(1)),
    });
    assert!(!result.changed);
    assert!(result.effects.is_empty());
    assert!(store.state().detail.as_ref().unwrap().species.is_loading());

    store.dispatch(Action::DetailClose);
    let result = store.dispatch(Action::SpeciesDidLoad {
        name: "charmander".into(),
        species: species("charmander", Some(2)),
    });
    assert!(!result.changed);
}

#[test]
fn test_detail_navigation_follows_filtered_order() {
    let mut store = EffectStore::new(loaded_national_state(), reducer);
    store.dispatch(Action::DetailOpen("charmander".into()));
    store.dispatch(Action::DetailTabNext);

    let navigation = store.state().navigation();
    assert_eq!(navigation.previous.as_deref(), Some("bulbasaur"));
    assert_eq!(navigation.next.as_deref(), Some("squirtle"));

    let result = store.dispatch(Action::DetailNext);
    assert_eq!(
        result.effects,
        vec![Effect::LoadSpecies {
            name: "squirtle".into()
        }]
    );
    let view = store.state().detail.as_ref().unwrap();
    assert_eq!(view.name, "squirtle");
    assert_eq!(view.tab, DetailTab::Abilities, "tab survives navigation");
    assert_eq!(store.state().dex.selected_index, 2);

    assert!(!store.dispatch(Action::DetailNext).changed);
}

#[test]
fn test_navigation_is_empty_in_search_mode() {
    let mut store = EffectStore::new(loaded_national_state(), reducer);
    store.dispatch(Action::SearchStart);
    store.dispatch(Action::SearchInput('a'));
    store.dispatch(Action::SearchSubmit);
    store.dispatch(Action::DetailOpen("charmander".into()));

    let navigation = store.state().navigation();
    assert!(!navigation.can_navigate_previous());
    assert!(!navigation.can_navigate_next());
    assert!(!store.dispatch(Action::DetailPrev).changed);
}

#[test]
fn test_page_flow_with_harness() {
    let mut harness = EffectStoreTestHarness::new(AppState::with_start(3, None), reducer);

    harness.dispatch_collect(Action::Init);
    harness.assert_state(|s| s.dex.is_initial_loading());
    let effects = harness.drain_effects();
    effects.effects_count(1);

    harness.complete_action(Action::PageDidLoad {
        session: 1,
        page: page(&[(25, "pikachu")], None),
    });
    harness.complete_action(Action::BatchDidLoad {
        session: 1,
        details: vec![detail(25, "pikachu", &["electric"])],
    });
    let (changed, total) = harness.process_emitted();
    assert_eq!(total, 2);
    assert_eq!(changed, 2);

    harness.assert_state(|s| s.dex.visible_names() == vec!["pikachu".to_string()]);
    harness.assert_state(|s| !s.dex.paginator.has_next());
}

#[test]
fn test_tick_only_rerenders_while_busy() {
    let mut store = EffectStore::new(loaded_national_state(), reducer);
    assert!(!store.dispatch(Action::Tick).changed);
    store.dispatch(Action::DexLoadMore);
    assert!(store.dispatch(Action::Tick).changed);
}

#[test]
fn test_detail_state_holds_loaded_resource() {
    let mut store = EffectStore::new(loaded_national_state(), reducer);
    store.dispatch(Action::DetailOpen("pikachu".into()));
    store.dispatch(Action::PokemonDidLoad {
        name: "pikachu".into(),
        detail: detail(25, "pikachu", &["electric"]),
    });
    let view = store.state().detail.as_ref().unwrap();
    assert_eq!(
        view.pokemon,
        DataResource::Loaded(detail(25, "pikachu", &["electric"]))
    );
    assert_eq!(view.description(), "No description available.");

    store.dispatch(Action::SpeciesDidLoad {
        name: "pikachu".into(),
        species: species("pikachu", Some(10)),
    });
    let view = store.state().detail.as_ref().unwrap();
    assert_eq!(
        view.description(),
        "A strange seed was planted on its back at birth."
    );
    assert!(view.chain.is_loading());
}
