use serde::{Deserialize, Serialize};

use crate::evolution::EvolutionNode;
use crate::state::{ListPage, PokemonDetail, PokemonSpecies};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[action(infer_categories)]
pub enum Action {
    Init,

    GenerationMove(i16),
    GenerationSelect(usize),
    GenerationOpen,

    DexClose,
    DexRetry,
    DexLoadMore,
    DexSelect(usize),
    DexActivate,

    PageDidLoad { session: u64, page: ListPage },
    PageDidError { session: u64, error: String },
    BatchDidLoad { session: u64, details: Vec<PokemonDetail> },
    BatchDidError { session: u64, names: Vec<String>, error: String },

    SelectionMove(i16),
    SelectionPage(i16),
    SelectionJumpTop,
    SelectionJumpBottom,

    TypeFilterNext,
    TypeFilterPrev,
    TypeFilterClear,

    SearchStart,
    SearchCancel,
    SearchSubmit,
    SearchInput(char),
    SearchBackspace,

    DetailOpen(String),
    DetailClose,
    DetailPrev,
    DetailNext,
    DetailTabNext,
    DetailTabPrev,

    PokemonDidLoad { name: String, detail: PokemonDetail },
    PokemonDidError { name: String, error: String },
    SpeciesDidLoad { name: String, species: PokemonSpecies },
    SpeciesDidError { name: String, error: String },
    EvolutionDidLoad { name: String, chain: EvolutionNode },
    EvolutionDidError { name: String, error: String },
    EvolutionStepDidLoad { name: String, id: u32, detail: PokemonDetail },
    EvolutionStepDidError { name: String, id: u32, error: String },
    EvolutionSelect(usize),
    EvolutionOpen,

    UiTerminalResize(u16, u16),
    Tick,
    Quit,
}
