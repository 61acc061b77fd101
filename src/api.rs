use std::sync::OnceLock;

use serde::Deserialize;
use tokio::task::JoinSet;
use url::Url;

use crate::config::ExplorerConfig;
use crate::evolution::EvolutionNode;
use crate::state::{
    ListPage, NamedRef, PokemonAbility, PokemonDetail, PokemonSpecies, PokemonStat,
};

/// Every remote failure collapses to this one kind; `target` names the operation and id.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
#[error("failed to fetch {target}: {reason}")]
pub struct ApiError {
    pub target: String,
    pub reason: String,
}

impl ApiError {
    fn new(target: &str, reason: impl ToString) -> Self {
        Self {
            target: target.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
struct ListResponse {
    results: Vec<NamedRef>,
    next: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonResponse {
    id: u32,
    name: String,
    height: u16,
    weight: u16,
    base_experience: Option<u32>,
    types: Vec<PokemonTypeSlot>,
    stats: Vec<PokemonStatSlot>,
    abilities: Vec<PokemonAbilitySlot>,
    sprites: serde_json::Value,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonTypeSlot {
    slot: u8,
    #[serde(rename = "type")]
    type_info: NamedRef,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonStatSlot {
    base_stat: u16,
    stat: NamedRef,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonAbilitySlot {
    ability: NamedRef,
    is_hidden: bool,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonSpeciesResponse {
    name: String,
    flavor_text_entries: Vec<FlavorTextEntry>,
    #[serde(default)]
    genera: Vec<GenusEntry>,
    evolution_chain: Option<ApiResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct FlavorTextEntry {
    flavor_text: String,
    language: NamedRef,
}

#[derive(Clone, Debug, Deserialize)]
struct GenusEntry {
    genus: String,
    language: NamedRef,
}

#[derive(Clone, Debug, Deserialize)]
struct ApiResource {
    url: String,
}

#[derive(Clone, Debug, Deserialize)]
struct EvolutionChainResponse {
    chain: ChainLink,
}

#[derive(Clone, Debug, Deserialize)]
struct ChainLink {
    species: NamedRef,
    evolves_to: Vec<ChainLink>,
}

impl From<ChainLink> for EvolutionNode {
    fn from(link: ChainLink) -> Self {
        EvolutionNode {
            species: link.species,
            evolves_to: link.evolves_to.into_iter().map(EvolutionNode::from).collect(),
        }
    }
}

/// Read-only client for the remote catalog.
#[derive(Clone, Debug)]
pub struct PokeClient {
    http: reqwest::Client,
    base: Url,
}

impl PokeClient {
    pub fn new(base: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base,
        }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base.as_str().trim_end_matches('/'), path)
    }

    pub async fn fetch_list_page(&self, offset: u32, limit: u32) -> Result<ListPage, ApiError> {
        let url = self.endpoint(&format!("pokemon?offset={offset}&limit={limit}"));
        let response: ListResponse = self.get_json(&url, &format!("pokemon list at {offset}")).await?;
        Ok(ListPage {
            results: response.results,
            next: response.next,
        })
    }

    pub async fn fetch_pokemon(&self, name_or_id: &str) -> Result<PokemonDetail, ApiError> {
        let url = self.endpoint(&format!("pokemon/{name_or_id}"));
        let response: PokemonResponse =
            self.get_json(&url, &format!("pokemon {name_or_id}")).await?;

        let mut type_slots = response.types;
        type_slots.sort_by_key(|slot| slot.slot);
        let types = type_slots
            .into_iter()
            .map(|slot| slot.type_info.name)
            .collect();
        let stats = response
            .stats
            .into_iter()
            .map(|slot| PokemonStat {
                name: slot.stat.name,
                value: slot.base_stat,
            })
            .collect();
        let abilities = response
            .abilities
            .into_iter()
            .map(|slot| PokemonAbility {
                name: slot.ability.name,
                hidden: slot.is_hidden,
            })
            .collect();
        let artwork = pointer_string(&response.sprites, "/other/official-artwork/front_default")
            .or_else(|| pointer_string(&response.sprites, "/front_default"));

        Ok(PokemonDetail {
            id: response.id,
            name: response.name,
            types,
            stats,
            abilities,
            height: response.height,
            weight: response.weight,
            base_experience: response.base_experience.unwrap_or(0),
            artwork,
        })
    }

    pub async fn fetch_species(&self, name_or_id: &str) -> Result<PokemonSpecies, ApiError> {
        let url = self.endpoint(&format!("pokemon-species/{name_or_id}"));
        let response: PokemonSpeciesResponse = self
            .get_json(&url, &format!("pokemon species {name_or_id}"))
            .await?;
        let flavor_text = response
            .flavor_text_entries
            .iter()
            .find(|entry| entry.language.name == "en")
            .map(|entry| sanitize_text(&entry.flavor_text));
        let genus = response
            .genera
            .iter()
            .find(|entry| entry.language.name == "en")
            .map(|entry| entry.genus.clone());
        Ok(PokemonSpecies {
            name: response.name,
            flavor_text,
            genus,
            evolution_chain_url: response.evolution_chain.map(|chain| chain.url),
        })
    }

    pub async fn fetch_evolution_chain(&self, id: u32) -> Result<EvolutionNode, ApiError> {
        let url = self.endpoint(&format!("evolution-chain/{id}"));
        let response: EvolutionChainResponse = self
            .get_json(&url, &format!("evolution chain {id}"))
            .await?;
        Ok(response.chain.into())
    }

    /// Fetches every name concurrently. Resolves only when all succeed; the first
    /// failure is returned and the remaining requests are dropped.
    pub async fn fetch_batch(&self, names: &[String]) -> Result<Vec<PokemonDetail>, ApiError> {
        let mut join_set = JoinSet::new();
        for (index, name) in names.iter().enumerate() {
            let client = self.clone();
            let name = name.clone();
            join_set.spawn(async move { (index, client.fetch_pokemon(&name).await) });
        }

        let mut details = Vec::with_capacity(names.len());
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, Ok(detail))) => details.push((index, detail)),
                Ok((_, Err(error))) => return Err(error),
                Err(error) => return Err(ApiError::new("pokemon batch", error)),
            }
        }
        details.sort_by_key(|(index, _)| *index);
        Ok(details.into_iter().map(|(_, detail)| detail).collect())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        target: &str,
    ) -> Result<T, ApiError> {
        tracing::debug!(%url, "GET");
        let result = async {
            let response = self
                .http
                .get(url)
                .send()
                .await
                .map_err(|err| ApiError::new(target, err))?;
            let response = response
                .error_for_status()
                .map_err(|err| ApiError::new(target, err))?;
            response
                .json::<T>()
                .await
                .map_err(|err| ApiError::new(target, err))
        }
        .await;
        if let Err(error) = &result {
            tracing::warn!(%url, %error, "request failed");
        }
        result
    }
}

/// Process-wide client; [`install_client`] replaces the default configuration.
static CLIENT: OnceLock<PokeClient> = OnceLock::new();

pub fn install_client(config: &ExplorerConfig) {
    let _ = CLIENT.set(PokeClient::new(config.api_base.clone()));
}

pub fn client() -> &'static PokeClient {
    CLIENT.get_or_init(|| PokeClient::new(ExplorerConfig::default().api_base))
}

/// Trailing numeric path segment of a resource URL (`.../pokemon/25/` → 25).
/// Anything else yields 0, which is never a valid entity id.
pub fn id_from_url(url: &str) -> u32 {
    let Some(trimmed) = url.strip_suffix('/') else {
        return 0;
    };
    let segment = trimmed.rsplit('/').next().unwrap_or_default();
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    segment.parse().unwrap_or(0)
}

/// `offset` query parameter of a pagination cursor, 0 when absent or malformed.
pub fn next_offset(next_url: &str) -> u32 {
    Url::parse(next_url)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "offset")
                .and_then(|(_, value)| value.parse().ok())
        })
        .unwrap_or(0)
}

fn sanitize_text(text: &str) -> String {
    text.replace('\n', " ").replace('\u{000C}', " ")
}

fn pointer_string(value: &serde_json::Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(|val| val.as_str())
        .map(|s| s.to_string())
}
