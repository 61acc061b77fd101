use tui_dispatch::{DataResource, DispatchResult};

use crate::action::Action;
use crate::api::id_from_url;
use crate::catalog;
use crate::effect::Effect;
use crate::evolution;
use crate::generation::RangeScope;
use crate::state::{AppState, DetailTab, DetailView, DexView, Screen};
use crate::types::cycle_type;

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            if state.screen != Screen::Pokedex {
                return DispatchResult::unchanged();
            }
            let generation = state.dex.generation;
            let scope = state.dex.scope;
            open_dex(state, generation, scope)
        }

        Action::GenerationMove(delta) => {
            if state.screen != Screen::Generations {
                return DispatchResult::unchanged();
            }
            let index = clamp_index(
                state.generation_index,
                AppState::generation_choice_count(),
                delta,
            );
            select_generation(state, index)
        }

        Action::GenerationSelect(index) => {
            if state.screen != Screen::Generations {
                return DispatchResult::unchanged();
            }
            select_generation(state, index)
        }

        Action::GenerationOpen => {
            if state.screen != Screen::Generations {
                return DispatchResult::unchanged();
            }
            let generation = AppState::generation_choice(state.generation_index);
            let scope = generation
                .and_then(crate::generation::generation)
                .map(|gen| gen.scope());
            open_dex(state, generation, scope)
        }

        Action::DexClose => {
            if state.screen != Screen::Pokedex {
                return DispatchResult::unchanged();
            }
            let effects = cancel_current(state);
            tracing::info!(session = state.dex.session, "closed pokedex view");
            state.dex = DexView::default();
            state.detail = None;
            state.screen = Screen::Generations;
            changed_with(effects)
        }

        Action::DexRetry => {
            if state.screen != Screen::Pokedex || state.dex.list_error.is_none() {
                return DispatchResult::unchanged();
            }
            let generation = state.dex.generation;
            let scope = state.dex.scope;
            open_dex(state, generation, scope)
        }

        Action::DexLoadMore => {
            if state.screen != Screen::Pokedex
                || state.dex.scope.is_some()
                || state.dex.list_error.is_some()
                || state.dex.search.has_query()
            {
                return DispatchResult::unchanged();
            }
            match request_page(state) {
                Some(effect) => DispatchResult::changed_with(effect),
                None => DispatchResult::unchanged(),
            }
        }

        Action::DexSelect(index) => {
            if !state.dex.set_selected_index(index) {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::DexActivate => {
            let Some(name) = state.dex.visible_names().get(state.dex.selected_index).cloned()
            else {
                return DispatchResult::unchanged();
            };
            open_detail(state, &name, DetailTab::Stats)
        }

        Action::PageDidLoad { session, page } => {
            if is_stale(state, session) {
                return DispatchResult::unchanged();
            }
            let count = page.results.len();
            state.dex.paginator.accept(page);
            tracing::debug!(
                session,
                count,
                next = ?state.dex.paginator.next_offset,
                "page loaded"
            );
            let mut effects = Vec::new();
            effects.extend(plan_next_batch(state));
            effects.extend(auto_continue(state));
            state.dex.clamp_selection();
            changed_with(effects)
        }

        Action::PageDidError { session, error } => {
            if is_stale(state, session) {
                return DispatchResult::unchanged();
            }
            state.dex.paginator.fail();
            state.dex.list_error = Some(error);
            DispatchResult::changed()
        }

        Action::BatchDidLoad { session, details } => {
            if is_stale(state, session) {
                return DispatchResult::unchanged();
            }
            for detail in &details {
                state.dex.pending.remove(&detail.name);
            }
            let added = state.dex.catalog.merge(details);
            tracing::info!(
                session,
                added,
                total = state.dex.catalog.len(),
                "batch merged"
            );
            let mut effects = Vec::new();
            effects.extend(plan_next_batch(state));
            effects.extend(auto_continue(state));
            state.dex.clamp_selection();
            changed_with(effects)
        }

        Action::BatchDidError {
            session,
            names,
            error,
        } => {
            if is_stale(state, session) {
                return DispatchResult::unchanged();
            }
            for name in &names {
                state.dex.pending.remove(name);
            }
            tracing::warn!(session, size = names.len(), %error, "batch discarded");
            state.dex.list_error = Some(error);
            DispatchResult::changed()
        }

        Action::SelectionMove(delta) => {
            let len = state.dex.visible_names().len();
            let index = clamp_index(state.dex.selected_index, len, delta);
            if !state.dex.set_selected_index(index) {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::SelectionPage(delta) => {
            let page = list_page_size(state) as i16;
            let len = state.dex.visible_names().len();
            let index = clamp_index(state.dex.selected_index, len, delta.saturating_mul(page));
            if !state.dex.set_selected_index(index) {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::SelectionJumpTop => {
            if !state.dex.set_selected_index(0) {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::SelectionJumpBottom => {
            let last = state.dex.visible_names().len().saturating_sub(1);
            if !state.dex.set_selected_index(last) {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::TypeFilterNext => cycle_filter(state, 1),
        Action::TypeFilterPrev => cycle_filter(state, -1),

        Action::TypeFilterClear => {
            if state.dex.type_filter.is_none() {
                return DispatchResult::unchanged();
            }
            state.dex.type_filter = None;
            state.dex.selected_index = 0;
            DispatchResult::changed()
        }

        Action::SearchStart => {
            if state.screen != Screen::Pokedex || state.dex.search.active {
                return DispatchResult::unchanged();
            }
            state.dex.search.active = true;
            DispatchResult::changed()
        }

        Action::SearchCancel => {
            if !state.dex.search.active && state.dex.search.query.is_empty() {
                return DispatchResult::unchanged();
            }
            state.dex.search.active = false;
            state.dex.search.query.clear();
            state.dex.selected_index = 0;
            DispatchResult::changed()
        }

        Action::SearchSubmit => {
            if !state.dex.search.active {
                return DispatchResult::unchanged();
            }
            state.dex.search.active = false;
            if !state.dex.search.has_query() {
                state.dex.search.query.clear();
            }
            DispatchResult::changed()
        }

        Action::SearchInput(ch) => {
            state.dex.search.query.push(ch);
            state.dex.selected_index = 0;
            DispatchResult::changed()
        }

        Action::SearchBackspace => {
            if state.dex.search.query.pop().is_none() {
                return DispatchResult::unchanged();
            }
            state.dex.selected_index = 0;
            DispatchResult::changed()
        }

        Action::DetailOpen(name) => {
            let tab = state
                .detail
                .as_ref()
                .map(|detail| detail.tab)
                .unwrap_or(DetailTab::Stats);
            open_detail(state, &name, tab)
        }

        Action::DetailClose => {
            if state.detail.take().is_none() {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::DetailPrev => {
            let target = state.navigation().previous;
            navigate_detail(state, target)
        }

        Action::DetailNext => {
            let target = state.navigation().next;
            navigate_detail(state, target)
        }

        Action::DetailTabNext => cycle_detail_tab(state, 1),
        Action::DetailTabPrev => cycle_detail_tab(state, -1),

        Action::PokemonDidLoad { name, detail } => {
            let Some(view) = open_view(state, &name) else {
                return DispatchResult::unchanged();
            };
            view.pokemon = DataResource::Loaded(detail);
            DispatchResult::changed()
        }

        Action::PokemonDidError { name, error } => {
            let Some(view) = open_view(state, &name) else {
                return DispatchResult::unchanged();
            };
            view.pokemon = DataResource::Failed(error);
            DispatchResult::changed()
        }

        Action::SpeciesDidLoad { name, species } => {
            let Some(view) = open_view(state, &name) else {
                return DispatchResult::unchanged();
            };
            let chain_id = species
                .evolution_chain_url
                .as_deref()
                .map(id_from_url)
                .unwrap_or(0);
            view.species = DataResource::Loaded(species);
            if chain_id == 0 {
                view.chain = DataResource::Empty;
                return DispatchResult::changed();
            }
            view.chain = DataResource::Loading;
            DispatchResult::changed_with(Effect::LoadEvolutionChain { name, id: chain_id })
        }

        Action::SpeciesDidError { name, error } => {
            let Some(view) = open_view(state, &name) else {
                return DispatchResult::unchanged();
            };
            view.species = DataResource::Failed(error);
            DispatchResult::changed()
        }

        Action::EvolutionDidLoad { name, chain } => {
            let collected = &state.dex.catalog;
            let Some(view) = state.detail.as_mut().filter(|view| view.name == name) else {
                tracing::debug!(%name, "dropping evolution chain for closed detail");
                return DispatchResult::unchanged();
            };
            let tokens = evolution::flatten(&chain);
            let mut effects = Vec::new();
            for (id, _) in evolution::steps(&tokens) {
                if view.steps.contains_key(&id) {
                    continue;
                }
                let known = view
                    .pokemon
                    .data()
                    .filter(|detail| detail.id == id)
                    .or_else(|| collected.find_by_id(id))
                    .cloned();
                let step = match known {
                    Some(detail) => DataResource::Loaded(detail),
                    None if id == 0 => DataResource::Failed("unknown id".to_string()),
                    None => {
                        effects.push(Effect::LoadEvolutionStep {
                            name: name.clone(),
                            id,
                        });
                        DataResource::Loading
                    }
                };
                view.steps.insert(id, step);
            }
            view.evolution_index = evolution::steps(&tokens)
                .iter()
                .position(|(_, step)| *step == view.name)
                .unwrap_or(0);
            view.chain = DataResource::Loaded(chain);
            changed_with(effects)
        }

        Action::EvolutionDidError { name, error } => {
            let Some(view) = open_view(state, &name) else {
                return DispatchResult::unchanged();
            };
            view.chain = DataResource::Failed(error);
            DispatchResult::changed()
        }

        Action::EvolutionStepDidLoad { name, id, detail } => {
            let Some(view) = open_view(state, &name) else {
                return DispatchResult::unchanged();
            };
            view.steps.insert(id, DataResource::Loaded(detail));
            DispatchResult::changed()
        }

        Action::EvolutionStepDidError { name, id, error } => {
            let Some(view) = open_view(state, &name) else {
                return DispatchResult::unchanged();
            };
            view.steps.insert(id, DataResource::Failed(error));
            DispatchResult::changed()
        }

        Action::EvolutionSelect(index) => {
            let Some(view) = state.detail.as_mut() else {
                return DispatchResult::unchanged();
            };
            let count = evolution::steps(&view.tokens()).len();
            if count == 0 {
                return DispatchResult::unchanged();
            }
            let bounded = index.min(count - 1);
            if bounded == view.evolution_index {
                return DispatchResult::unchanged();
            }
            view.evolution_index = bounded;
            DispatchResult::changed()
        }

        Action::EvolutionOpen => {
            let Some(view) = state.detail.as_ref() else {
                return DispatchResult::unchanged();
            };
            let tokens = view.tokens();
            let Some(target) = evolution::steps(&tokens)
                .get(view.evolution_index)
                .map(|(_, name)| name.to_string())
            else {
                return DispatchResult::unchanged();
            };
            open_detail(state, &target, DetailTab::Evolution)
        }

        Action::UiTerminalResize(width, height) => {
            if state.terminal_size != (width, height) {
                state.terminal_size = (width, height);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Tick => {
            state.tick = state.tick.wrapping_add(1);
            if state.is_busy() {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

fn changed_with(effects: Vec<Effect>) -> DispatchResult<Effect> {
    if effects.is_empty() {
        DispatchResult::changed()
    } else {
        DispatchResult::changed_with_many(effects)
    }
}

fn select_generation(state: &mut AppState, index: usize) -> DispatchResult<Effect> {
    if index >= AppState::generation_choice_count() || index == state.generation_index {
        return DispatchResult::unchanged();
    }
    state.generation_index = index;
    DispatchResult::changed()
}

fn open_dex(
    state: &mut AppState,
    generation: Option<u8>,
    scope: Option<RangeScope>,
) -> DispatchResult<Effect> {
    let mut effects = cancel_current(state);
    state.session_counter += 1;
    let mut dex = DexView::new(state.session_counter, generation);
    dex.scope = scope;
    state.dex = dex;
    state.detail = None;
    state.screen = Screen::Pokedex;
    tracing::info!(
        session = state.dex.session,
        ?generation,
        ?scope,
        "opened pokedex view"
    );
    effects.extend(request_page(state));
    changed_with(effects)
}

fn cancel_current(state: &AppState) -> Vec<Effect> {
    if state.dex.session == 0 {
        return Vec::new();
    }
    vec![Effect::CancelSession {
        session: state.dex.session,
        batches: state.dex.batch_seq,
    }]
}

fn is_stale(state: &AppState, session: u64) -> bool {
    if state.screen == Screen::Pokedex && state.dex.session == session {
        return false;
    }
    tracing::debug!(
        session,
        current = state.dex.session,
        "dropping completion for disposed view"
    );
    true
}

fn request_page(state: &mut AppState) -> Option<Effect> {
    let offset = state.dex.paginator.begin_next()?;
    Some(Effect::LoadPage {
        session: state.dex.session,
        offset,
        limit: state.page_size,
    })
}

fn plan_next_batch(state: &mut AppState) -> Option<Effect> {
    let names = catalog::plan_batch(
        &state.dex.paginator.pages,
        state.dex.scope,
        &state.dex.catalog,
        &state.dex.pending,
    );
    if names.is_empty() {
        return None;
    }
    let seq = state.dex.batch_seq;
    state.dex.batch_seq += 1;
    state.dex.pending.extend(names.iter().cloned());
    tracing::info!(
        session = state.dex.session,
        seq,
        size = names.len(),
        "requesting batch"
    );
    Some(Effect::LoadBatch {
        session: state.dex.session,
        seq,
        names,
    })
}

fn auto_continue(state: &mut AppState) -> Option<Effect> {
    if state.dex.list_error.is_some() {
        return None;
    }
    if !catalog::should_continue(state.dex.scope, &state.dex.catalog, &state.dex.paginator) {
        return None;
    }
    tracing::debug!(
        session = state.dex.session,
        collected = state.dex.catalog.len(),
        "auto-continuing to next page"
    );
    request_page(state)
}

fn open_detail(state: &mut AppState, name: &str, tab: DetailTab) -> DispatchResult<Effect> {
    if state
        .detail
        .as_ref()
        .is_some_and(|detail| detail.name == name)
    {
        return DispatchResult::unchanged();
    }
    let mut view = DetailView::new(name, tab);
    let mut effects = Vec::new();
    match state.dex.catalog.get(name) {
        Some(detail) => view.pokemon = DataResource::Loaded(detail.clone()),
        None => {
            view.pokemon = DataResource::Loading;
            effects.push(Effect::LoadPokemon {
                name: name.to_string(),
            });
        }
    }
    view.species = DataResource::Loading;
    effects.push(Effect::LoadSpecies {
        name: name.to_string(),
    });
    state.detail = Some(view);
    changed_with(effects)
}

fn navigate_detail(state: &mut AppState, target: Option<String>) -> DispatchResult<Effect> {
    let Some(target) = target else {
        return DispatchResult::unchanged();
    };
    let tab = state
        .detail
        .as_ref()
        .map(|detail| detail.tab)
        .unwrap_or(DetailTab::Stats);
    if let Some(index) = state
        .dex
        .visible_names()
        .iter()
        .position(|name| *name == target)
    {
        state.dex.selected_index = index;
    }
    open_detail(state, &target, tab)
}

/// Detail view for `name`, if that entity is still the one shown.
fn open_view<'a>(state: &'a mut AppState, name: &str) -> Option<&'a mut DetailView> {
    let view = state.detail.as_mut().filter(|view| view.name == name);
    if view.is_none() {
        tracing::debug!(%name, "dropping detail completion for closed view");
    }
    view
}

fn cycle_filter(state: &mut AppState, step: i16) -> DispatchResult<Effect> {
    if state.screen != Screen::Pokedex || state.dex.search.has_query() {
        return DispatchResult::unchanged();
    }
    state.dex.type_filter = cycle_type(state.dex.type_filter.as_deref(), step);
    state.dex.selected_index = 0;
    DispatchResult::changed()
}

fn cycle_detail_tab(state: &mut AppState, step: i16) -> DispatchResult<Effect> {
    let Some(view) = state.detail.as_mut() else {
        return DispatchResult::unchanged();
    };
    view.tab = view.tab.cycle(step);
    DispatchResult::changed()
}

fn clamp_index(current: usize, len: usize, delta: i16) -> usize {
    if len == 0 {
        return 0;
    }
    let next = current as i64 + delta as i64;
    next.clamp(0, len as i64 - 1) as usize
}

fn list_page_size(state: &AppState) -> usize {
    state.terminal_size.1.saturating_sub(10).max(1) as usize
}
