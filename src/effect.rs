#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    LoadPage { session: u64, offset: u32, limit: u32 },
    LoadBatch { session: u64, seq: u32, names: Vec<String> },
    /// Abort the page task and batches `0..batches` issued for `session`.
    CancelSession { session: u64, batches: u32 },
    LoadPokemon { name: String },
    LoadSpecies { name: String },
    LoadEvolutionChain { name: String, id: u32 },
    LoadEvolutionStep { name: String, id: u32 },
}

pub fn page_task_key(session: u64) -> String {
    format!("page_{session}")
}

pub fn batch_task_key(session: u64, seq: u32) -> String {
    format!("batch_{session}_{seq}")
}
