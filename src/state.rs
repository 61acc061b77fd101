use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tui_dispatch::DataResource;
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::catalog::{Catalog, Paginator};
use crate::evolution::{self, EvolutionNode, EvolutionToken};
use crate::generation::{self, RangeScope, GENERATIONS};
use crate::navigator::{self, Navigation};
use crate::resolver::{self, Visible};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub name: String,
    pub url: String,
}

/// One page of the remote list endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ListPage {
    pub results: Vec<NamedRef>,
    pub next: Option<String>,
}

/// Id and name parsed from a list entry, without fetching the full record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonSummary {
    pub id: u32,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PokemonDetail {
    pub id: u32,
    pub name: String,
    /// Slot order; the first entry is the primary type.
    pub types: Vec<String>,
    pub stats: Vec<PokemonStat>,
    pub abilities: Vec<PokemonAbility>,
    /// Decimetres.
    pub height: u16,
    /// Hectograms.
    pub weight: u16,
    pub base_experience: u32,
    pub artwork: Option<String>,
}

impl PokemonDetail {
    pub fn primary_type(&self) -> &str {
        self.types.first().map(String::as_str).unwrap_or("normal")
    }

    pub fn has_type(&self, name: &str) -> bool {
        self.types.iter().any(|t| t == name)
    }

    pub fn stat_total(&self) -> u32 {
        self.stats.iter().map(|stat| stat.value as u32).sum()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PokemonStat {
    pub name: String,
    pub value: u16,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PokemonAbility {
    pub name: String,
    pub hidden: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PokemonSpecies {
    pub name: String,
    pub flavor_text: Option<String>,
    pub genus: Option<String>,
    pub evolution_chain_url: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    Generations,
    Pokedex,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetailTab {
    Stats,
    Abilities,
    Evolution,
}

impl DetailTab {
    pub const ALL: [DetailTab; 3] = [DetailTab::Stats, DetailTab::Abilities, DetailTab::Evolution];

    pub fn index(self) -> usize {
        match self {
            DetailTab::Stats => 0,
            DetailTab::Abilities => 1,
            DetailTab::Evolution => 2,
        }
    }

    pub fn cycle(self, step: i16) -> Self {
        let len = Self::ALL.len() as i16;
        let next = (self.index() as i16 + step).rem_euclid(len);
        Self::ALL[next as usize]
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    pub active: bool,
    pub query: String,
}

impl SearchState {
    pub fn has_query(&self) -> bool {
        resolver::normalize_query(&self.query).is_some()
    }
}

/// One open Pokedex view. Discarded wholesale when the view is left.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DexView {
    pub session: u64,
    pub generation: Option<u8>,
    pub scope: Option<RangeScope>,
    pub paginator: Paginator,
    pub catalog: Catalog,
    /// Names requested by a batch that has not completed yet.
    pub pending: HashSet<String>,
    pub batch_seq: u32,
    pub list_error: Option<String>,
    pub type_filter: Option<String>,
    pub search: SearchState,
    pub selected_index: usize,
}

impl DexView {
    pub fn new(session: u64, generation: Option<u8>) -> Self {
        let scope = generation
            .and_then(generation::generation)
            .map(|gen| gen.scope());
        Self {
            session,
            generation,
            scope,
            ..Self::default()
        }
    }

    pub fn title(&self) -> String {
        self.generation
            .and_then(generation::generation)
            .map(|gen| gen.title())
            .unwrap_or_else(|| "Pokedex".to_string())
    }

    pub fn visible(&self) -> Visible<'_> {
        resolver::resolve(
            &self.paginator.pages,
            &self.catalog,
            self.type_filter.as_deref(),
            self.scope,
            &self.search.query,
        )
    }

    /// Names of the visible rows, in display order.
    pub fn visible_names(&self) -> Vec<String> {
        self.visible().names()
    }

    /// Non-search result set, the one detail navigation walks.
    pub fn grid_names(&self) -> Vec<String> {
        if self.search.has_query() {
            return Vec::new();
        }
        resolver::filter(&self.catalog, self.type_filter.as_deref(), self.scope)
            .into_iter()
            .map(|detail| detail.name.clone())
            .collect()
    }

    pub fn is_initial_loading(&self) -> bool {
        self.paginator.in_flight && self.paginator.pages.is_empty() && self.catalog.is_empty()
    }

    pub fn set_selected_index(&mut self, index: usize) -> bool {
        let len = self.visible_names().len();
        if len == 0 {
            self.selected_index = 0;
            return false;
        }
        let bounded = index.min(len - 1);
        if bounded != self.selected_index {
            self.selected_index = bounded;
            return true;
        }
        false
    }

    pub fn clamp_selection(&mut self) {
        let len = self.visible_names().len();
        if self.selected_index >= len {
            self.selected_index = len.saturating_sub(1);
        }
    }
}

/// Detail modal for one entity; rebuilt whenever the shown entity changes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DetailView {
    pub name: String,
    pub pokemon: DataResource<PokemonDetail>,
    pub species: DataResource<PokemonSpecies>,
    /// `Empty` once species resolved without a chain reference.
    pub chain: DataResource<EvolutionNode>,
    pub steps: HashMap<u32, DataResource<PokemonDetail>>,
    pub tab: DetailTab,
    pub evolution_index: usize,
}

impl DetailView {
    pub fn new(name: &str, tab: DetailTab) -> Self {
        Self {
            name: name.to_string(),
            pokemon: DataResource::Empty,
            species: DataResource::Empty,
            chain: DataResource::Empty,
            steps: HashMap::new(),
            tab,
            evolution_index: 0,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.pokemon
            .error()
            .or_else(|| self.species.error())
            .or_else(|| self.chain.error())
    }

    pub fn is_loading(&self) -> bool {
        self.pokemon.is_loading() || self.species.is_loading()
    }

    pub fn tokens(&self) -> Vec<EvolutionToken> {
        self.chain.data().map(evolution::flatten).unwrap_or_default()
    }

    pub fn step_detail(&self, id: u32) -> Option<&PokemonDetail> {
        self.steps.get(&id).and_then(|step| step.data())
    }

    pub fn description(&self) -> String {
        self.species
            .data()
            .and_then(|species| species.flavor_text.clone())
            .unwrap_or_else(|| "No description available.".to_string())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppState {
    pub terminal_size: (u16, u16),
    pub screen: Screen,
    /// Cursor in the generation selector; the slot after the last generation is the National Dex.
    pub generation_index: usize,
    pub page_size: u32,
    pub session_counter: u64,
    pub dex: DexView,
    pub detail: Option<DetailView>,
    pub tick: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            terminal_size: (80, 24),
            screen: Screen::Generations,
            generation_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
            session_counter: 0,
            dex: DexView::default(),
            detail: None,
            tick: 0,
        }
    }
}

impl AppState {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    /// State that opens straight into a Pokedex view on `Init`.
    pub fn with_start(page_size: u32, generation: Option<u8>) -> Self {
        let mut state = Self::new(page_size);
        state.screen = Screen::Pokedex;
        state.dex = DexView::new(0, generation);
        if let Some(index) = generation.and_then(|number| {
            GENERATIONS.iter().position(|gen| gen.number == number)
        }) {
            state.generation_index = index;
        } else {
            state.generation_index = GENERATIONS.len();
        }
        state
    }

    pub fn generation_choice_count() -> usize {
        GENERATIONS.len() + 1
    }

    /// Generation number behind a selector slot; `None` is the National Dex.
    pub fn generation_choice(index: usize) -> Option<u8> {
        GENERATIONS.get(index).map(|gen| gen.number)
    }

    pub fn navigation(&self) -> Navigation {
        let Some(detail) = self.detail.as_ref() else {
            return Navigation::default();
        };
        navigator::navigate(&self.dex.grid_names(), &detail.name)
    }

    pub fn is_busy(&self) -> bool {
        self.dex.paginator.in_flight
            || !self.dex.pending.is_empty()
            || self.detail.as_ref().is_some_and(|detail| detail.is_loading())
    }
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        let navigation = self.navigation();
        vec![
            DebugSection::new("View")
                .entry("screen", ron_string(&self.screen))
                .entry("session", ron_string(&self.dex.session))
                .entry("generation", ron_string(&self.dex.generation))
                .entry("scope", ron_string(&self.dex.scope))
                .entry("page_size", ron_string(&self.page_size)),
            DebugSection::new("Collection")
                .entry("entries", ron_string(&self.dex.catalog.len()))
                .entry("pages", ron_string(&self.dex.paginator.pages.len()))
                .entry("next_offset", ron_string(&self.dex.paginator.next_offset))
                .entry("page_in_flight", ron_string(&self.dex.paginator.in_flight))
                .entry("pending", ron_string(&self.dex.pending.len()))
                .entry("error", ron_string(&self.dex.list_error)),
            DebugSection::new("Filters")
                .entry("type", ron_string(&self.dex.type_filter))
                .entry("search", ron_string(&self.dex.search.query))
                .entry("search_active", ron_string(&self.dex.search.active))
                .entry("selected", ron_string(&self.dex.selected_index)),
            DebugSection::new("Detail")
                .entry(
                    "entity",
                    ron_string(&self.detail.as_ref().map(|detail| detail.name.clone())),
                )
                .entry(
                    "tab",
                    ron_string(&self.detail.as_ref().map(|detail| detail.tab)),
                )
                .entry("previous", ron_string(&navigation.previous))
                .entry("next", ron_string(&navigation.next)),
        ]
    }
}
