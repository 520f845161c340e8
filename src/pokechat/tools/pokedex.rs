//! Cached PokeAPI client.
//!
//! Every fetched endpoint is memoized in an in-memory map keyed by its path,
//! so repeated lookups of the same species, move, or type never hit the
//! network twice in one process lifetime. The raw payloads are kept as
//! `serde_json::Value`; the shapes the rest of the crate reasons about
//! (notably [`PokemonSummary`]) are parsed out of them on demand.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::pokechat::tool_protocol::ToolError;
use crate::pokechat::tools::roles::{Stat, StatSpread};
use crate::pokechat::tools::typechart::TypeKind;

const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";
const REQUEST_TIMEOUT_SECS: u64 = 20;

type BoxError = Box<dyn Error + Send + Sync>;

/// An ability slot on a Pokémon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilitySlot {
    pub name: String,
    pub is_hidden: bool,
}

/// The typed digest of one Pokémon the domain tools work with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokemonSummary {
    pub id: u32,
    pub name: String,
    pub types: Vec<TypeKind>,
    pub stats: StatSpread,
    pub abilities: Vec<AbilitySlot>,
    pub move_count: usize,
}

/// Stat-by-stat comparison of two Pokémon. Differences are
/// `pokemon2 - pokemon1`, positive when the second is higher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatComparison {
    pub pokemon1: ComparedPokemon,
    pub pokemon2: ComparedPokemon,
    pub differences: HashMap<String, i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparedPokemon {
    pub name: String,
    pub stats: StatSpread,
}

/// PokeAPI client with an endpoint-keyed response cache.
pub struct PokeApiClient {
    base_url: String,
    client: reqwest::Client,
    cache: RwLock<HashMap<String, serde_json::Value>>,
}

impl PokeApiClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Override the upstream base URL, mainly for tests against a local
    /// stand-in.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch one endpoint, serving from cache when possible.
    pub async fn fetch(&self, endpoint: &str) -> Result<serde_json::Value, BoxError> {
        {
            let cache = self.cache.read().await;
            if let Some(hit) = cache.get(endpoint) {
                return Ok(hit.clone());
            }
        }

        log::debug!("fetching {}/{}", self.base_url, endpoint);
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, endpoint))
            .send()
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("PokeAPI request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Box::new(ToolError::ExecutionFailed(format!(
                "PokeAPI returned status {} for {}",
                response.status(),
                endpoint
            ))));
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("undecodable PokeAPI reply: {}", e)))?;

        let mut cache = self.cache.write().await;
        cache.insert(endpoint.to_string(), value.clone());
        Ok(value)
    }

    /// Fetch and digest one Pokémon by name or numeric id.
    pub async fn get_pokemon(&self, name_or_id: &str) -> Result<PokemonSummary, BoxError> {
        let raw = self
            .fetch(&format!("pokemon/{}", name_or_id.trim().to_lowercase()))
            .await?;
        summarize(&raw)
    }

    pub async fn get_species(&self, name_or_id: &str) -> Result<serde_json::Value, BoxError> {
        self.fetch(&format!(
            "pokemon-species/{}",
            name_or_id.trim().to_lowercase()
        ))
        .await
    }

    pub async fn get_move(&self, name_or_id: &str) -> Result<serde_json::Value, BoxError> {
        self.fetch(&format!("move/{}", name_or_id.trim().to_lowercase()))
            .await
    }

    pub async fn get_ability(&self, name_or_id: &str) -> Result<serde_json::Value, BoxError> {
        self.fetch(&format!("ability/{}", name_or_id.trim().to_lowercase()))
            .await
    }

    pub async fn get_type(&self, name_or_id: &str) -> Result<serde_json::Value, BoxError> {
        self.fetch(&format!("type/{}", name_or_id.trim().to_lowercase()))
            .await
    }

    /// Paginated listing of the Pokédex.
    pub async fn search(&self, limit: u32, offset: u32) -> Result<serde_json::Value, BoxError> {
        self.fetch(&format!("pokemon?limit={}&offset={}", limit, offset))
            .await
    }

    /// Fetch two Pokémon and diff their base stats.
    pub async fn compare_stats(
        &self,
        pokemon1: &str,
        pokemon2: &str,
    ) -> Result<StatComparison, BoxError> {
        let first = self.get_pokemon(pokemon1).await?;
        let second = self.get_pokemon(pokemon2).await?;

        let mut differences = HashMap::new();
        for stat in Stat::ALL {
            differences.insert(
                stat.as_str().to_string(),
                second.stats.get(stat) as i64 - first.stats.get(stat) as i64,
            );
        }

        Ok(StatComparison {
            pokemon1: ComparedPokemon {
                name: first.name,
                stats: first.stats,
            },
            pokemon2: ComparedPokemon {
                name: second.name,
                stats: second.stats,
            },
            differences,
        })
    }

    #[cfg(test)]
    pub(crate) async fn prime_cache(&self, endpoint: &str, value: serde_json::Value) {
        self.cache.write().await.insert(endpoint.to_string(), value);
    }
}

impl Default for PokeApiClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Digest a raw PokeAPI `pokemon/{id}` payload into a typed summary.
fn summarize(raw: &serde_json::Value) -> Result<PokemonSummary, BoxError> {
    let field_err =
        |field: &str| ToolError::ExecutionFailed(format!("PokeAPI payload missing {}", field));

    let id = raw["id"].as_u64().ok_or_else(|| field_err("id"))? as u32;
    let name = raw["name"]
        .as_str()
        .ok_or_else(|| field_err("name"))?
        .to_string();

    let mut types = Vec::new();
    for slot in raw["types"].as_array().ok_or_else(|| field_err("types"))? {
        if let Some(type_name) = slot["type"]["name"].as_str() {
            match type_name.parse::<TypeKind>() {
                Ok(kind) => types.push(kind),
                Err(e) => log::warn!("skipping unrecognized type on {}: {}", name, e),
            }
        }
    }

    let mut stats = StatSpread::default();
    for entry in raw["stats"].as_array().ok_or_else(|| field_err("stats"))? {
        let api_name = entry["stat"]["name"].as_str().unwrap_or("");
        if let Some(stat) = Stat::from_api_name(api_name) {
            stats.set(stat, entry["base_stat"].as_u64().unwrap_or(0) as u32);
        }
    }

    let abilities = raw["abilities"]
        .as_array()
        .map(|slots| {
            slots
                .iter()
                .filter_map(|slot| {
                    slot["ability"]["name"].as_str().map(|n| AbilitySlot {
                        name: n.to_string(),
                        is_hidden: slot["is_hidden"].as_bool().unwrap_or(false),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let move_count = raw["moves"].as_array().map(|m| m.len()).unwrap_or(0);

    Ok(PokemonSummary {
        id,
        name,
        types,
        stats,
        abilities,
        move_count,
    })
}

/// Fabricate a raw `pokemon/{id}` payload for test fixtures.
#[cfg(test)]
pub(crate) fn raw_pokemon(
    id: u32,
    name: &str,
    types: &[&str],
    stats: [(u32, &str); 6],
) -> serde_json::Value {
    use serde_json::json;
    json!({
        "id": id,
        "name": name,
        "types": types.iter().map(|t| json!({"type": {"name": t}})).collect::<Vec<_>>(),
        "stats": stats.iter().map(|(v, n)| json!({"base_stat": v, "stat": {"name": n}})).collect::<Vec<_>>(),
        "abilities": [
            {"ability": {"name": "iron-barbs"}, "is_hidden": false},
            {"ability": {"name": "anticipation"}, "is_hidden": true},
        ],
        "moves": [{"move": {"name": "power-whip"}}, {"move": {"name": "gyro-ball"}}],
    })
}
