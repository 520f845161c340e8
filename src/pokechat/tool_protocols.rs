//! Concrete [`ToolProtocol`] implementations for the battle-strategy tools.
//!
//! Each protocol wraps one domain module and owns its tool names, parameter
//! schemas, and argument decoding. Domain failures come back as
//! `ToolResult::failure`; a name this protocol never advertised is a
//! `ToolError::NotFound`.

use async_trait::async_trait;
use serde_json::Value;
use std::error::Error;
use std::str::FromStr;
use std::sync::Arc;

use crate::pokechat::tool_protocol::{
    ToolError, ToolMetadata, ToolParameter, ToolParameterType, ToolProtocol, ToolResult,
};
use crate::pokechat::tools::pokedex::PokeApiClient;
use crate::pokechat::tools::roles;
use crate::pokechat::tools::team;
use crate::pokechat::tools::typechart::{self, TypeKind};

type BoxError = Box<dyn Error + Send + Sync>;

fn required_str(parameters: &Value, name: &str) -> Result<String, BoxError> {
    parameters[name]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| {
            Box::new(ToolError::InvalidParameters(format!(
                "missing required parameter: {}",
                name
            ))) as BoxError
        })
}

fn optional_str(parameters: &Value, name: &str, default: &str) -> String {
    parameters[name].as_str().unwrap_or(default).to_string()
}

fn str_array(parameters: &Value, name: &str) -> Vec<String> {
    parameters[name]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

fn parse_types(names: &[String]) -> Result<Vec<TypeKind>, BoxError> {
    names
        .iter()
        .map(|n| {
            TypeKind::from_str(n)
                .map_err(|e| Box::new(ToolError::InvalidParameters(e.to_string())) as BoxError)
        })
        .collect()
}

fn to_result<T: serde::Serialize>(value: &T) -> Result<ToolResult, BoxError> {
    Ok(ToolResult::success(serde_json::to_value(value)?))
}

/// Type-chart tools: pure calculations, no upstream calls.
pub struct TypeChartProtocol;

#[async_trait]
impl ToolProtocol for TypeChartProtocol {
    async fn execute(&self, tool_name: &str, parameters: Value) -> Result<ToolResult, BoxError> {
        match tool_name {
            "get_type_effectiveness" => {
                let attacking = TypeKind::from_str(&required_str(&parameters, "attacking_type")?)
                    .map_err(|e| ToolError::InvalidParameters(e.to_string()))?;
                let defending = parse_types(&str_array(&parameters, "defending_types"))?;
                if defending.is_empty() {
                    return Ok(ToolResult::failure(
                        "defending_types must name at least one type".to_string(),
                    ));
                }
                to_result(&typechart::analyze(attacking, &defending))
            }
            "get_defensive_profile" => {
                let types = parse_types(&str_array(&parameters, "types"))?;
                if types.is_empty() {
                    return Ok(ToolResult::failure(
                        "types must name at least one type".to_string(),
                    ));
                }
                to_result(&typechart::defensive_profile(&types))
            }
            other => Err(Box::new(ToolError::NotFound(other.to_string()))),
        }
    }

    async fn list_tools(&self) -> Result<Vec<ToolMetadata>, BoxError> {
        Ok(vec![
            ToolMetadata::new(
                "get_type_effectiveness",
                "Calculate the damage multiplier of an attacking type against a defender's type combination, with a per-type breakdown",
            )
            .with_parameter(
                ToolParameter::new("attacking_type", ToolParameterType::String)
                    .with_description("The attacking move's type, e.g. \"fire\"")
                    .required(),
            )
            .with_parameter(
                ToolParameter::new("defending_types", ToolParameterType::Array)
                    .with_description("The defender's types, e.g. [\"grass\", \"steel\"]")
                    .with_items(ToolParameterType::String)
                    .required(),
            ),
            ToolMetadata::new(
                "get_defensive_profile",
                "List the weaknesses, resistances, and immunities of a type combination",
            )
            .with_parameter(
                ToolParameter::new("types", ToolParameterType::Array)
                    .with_description("The type combination to profile")
                    .with_items(ToolParameterType::String)
                    .required(),
            ),
        ])
    }

    fn protocol_name(&self) -> &str {
        "typechart"
    }
}

/// Pokédex tools: cached PokeAPI lookups plus the role classifier.
pub struct PokedexProtocol {
    dex: Arc<PokeApiClient>,
}

impl PokedexProtocol {
    pub fn new(dex: Arc<PokeApiClient>) -> Self {
        Self { dex }
    }
}

#[async_trait]
impl ToolProtocol for PokedexProtocol {
    async fn execute(&self, tool_name: &str, parameters: Value) -> Result<ToolResult, BoxError> {
        let outcome = match tool_name {
            "get_pokemon" => {
                let name = required_str(&parameters, "name_or_id")?;
                self.dex
                    .get_pokemon(&name)
                    .await
                    .and_then(|summary| to_result(&summary))
            }
            "get_pokemon_species" => {
                let name = required_str(&parameters, "name_or_id")?;
                self.dex.get_species(&name).await.map(ToolResult::success)
            }
            "get_pokemon_move" => {
                let name = required_str(&parameters, "name_or_id")?;
                self.dex.get_move(&name).await.map(ToolResult::success)
            }
            "get_pokemon_ability" => {
                let name = required_str(&parameters, "name_or_id")?;
                self.dex.get_ability(&name).await.map(ToolResult::success)
            }
            "get_pokemon_type" => {
                let name = required_str(&parameters, "name_or_id")?;
                self.dex.get_type(&name).await.map(ToolResult::success)
            }
            "search_pokemon" => {
                let limit = parameters["limit"].as_u64().unwrap_or(20) as u32;
                let offset = parameters["offset"].as_u64().unwrap_or(0) as u32;
                self.dex.search(limit, offset).await.map(ToolResult::success)
            }
            "compare_pokemon_stats" => {
                let first = required_str(&parameters, "pokemon1")?;
                let second = required_str(&parameters, "pokemon2")?;
                self.dex
                    .compare_stats(&first, &second)
                    .await
                    .and_then(|comparison| to_result(&comparison))
            }
            "classify_role" => {
                let name = required_str(&parameters, "name_or_id")?;
                match self.dex.get_pokemon(&name).await {
                    Ok(summary) => to_result(&roles::classify(&summary.stats)),
                    Err(e) => Err(e),
                }
            }
            other => return Err(Box::new(ToolError::NotFound(other.to_string()))),
        };

        // Upstream failures are tool-level failures, not transport errors.
        match outcome {
            Ok(result) => Ok(result),
            Err(e) => Ok(ToolResult::failure(e.to_string())),
        }
    }

    async fn list_tools(&self) -> Result<Vec<ToolMetadata>, BoxError> {
        let name_param = || {
            ToolParameter::new("name_or_id", ToolParameterType::String)
                .with_description("Pokemon name or numeric id")
                .required()
        };
        Ok(vec![
            ToolMetadata::new(
                "get_pokemon",
                "Get a Pokemon's types, base stats, abilities, and move count",
            )
            .with_parameter(name_param()),
            ToolMetadata::new(
                "get_pokemon_species",
                "Get species information including flavor text and evolution chain",
            )
            .with_parameter(name_param()),
            ToolMetadata::new("get_pokemon_move", "Get information about a specific move")
                .with_parameter(name_param()),
            ToolMetadata::new(
                "get_pokemon_ability",
                "Get information about a specific ability",
            )
            .with_parameter(name_param()),
            ToolMetadata::new(
                "get_pokemon_type",
                "Get a type's damage relations from the Pokedex",
            )
            .with_parameter(name_param()),
            ToolMetadata::new("search_pokemon", "List Pokemon with pagination")
                .with_parameter(
                    ToolParameter::new("limit", ToolParameterType::Integer)
                        .with_description("Page size, default 20"),
                )
                .with_parameter(
                    ToolParameter::new("offset", ToolParameterType::Integer)
                        .with_description("Page offset, default 0"),
                ),
            ToolMetadata::new(
                "compare_pokemon_stats",
                "Compare base stats between two Pokemon, stat by stat",
            )
            .with_parameter(
                ToolParameter::new("pokemon1", ToolParameterType::String).required(),
            )
            .with_parameter(
                ToolParameter::new("pokemon2", ToolParameterType::String).required(),
            ),
            ToolMetadata::new(
                "classify_role",
                "Classify a Pokemon into a competitive role from its base stats",
            )
            .with_parameter(name_param()),
        ])
    }

    fn protocol_name(&self) -> &str {
        "pokedex"
    }
}

/// Team building and matchup tools.
pub struct TeamProtocol {
    dex: Arc<PokeApiClient>,
}

impl TeamProtocol {
    pub fn new(dex: Arc<PokeApiClient>) -> Self {
        Self { dex }
    }
}

#[async_trait]
impl ToolProtocol for TeamProtocol {
    async fn execute(&self, tool_name: &str, parameters: Value) -> Result<ToolResult, BoxError> {
        let outcome = match tool_name {
            "build_balanced_team" => {
                let core = required_str(&parameters, "core_pokemon")?;
                let format = optional_str(&parameters, "format", "OU");
                let style = optional_str(&parameters, "style", "balanced");
                let excluded = parse_types(&str_array(&parameters, "excluded_types"))?;
                team::build_team(&self.dex, &core, &format, &style, excluded)
                    .await
                    .and_then(|report| to_result(&report))
            }
            "get_team_archetype" => {
                let archetype = required_str(&parameters, "archetype")?;
                let format = optional_str(&parameters, "format", "OU");
                let style = optional_str(&parameters, "style", "balanced");
                let key_pokemon = parameters["key_pokemon"].as_str();
                team::get_team_suggestion(&self.dex, &archetype, &format, key_pokemon, &style)
                    .await
                    .and_then(|suggestion| to_result(&suggestion))
            }
            "predict_matchup" => {
                let team1 = str_array(&parameters, "team1");
                let team2 = str_array(&parameters, "team2");
                let format = optional_str(&parameters, "format", "OU");
                let priority = optional_str(&parameters, "scoring_priority", "overall");
                team::predict_matchup(&self.dex, &team1, &team2, &format, &priority)
                    .await
                    .and_then(|report| to_result(&report))
            }
            other => return Err(Box::new(ToolError::NotFound(other.to_string()))),
        };

        match outcome {
            Ok(result) => Ok(result),
            Err(e) => Ok(ToolResult::failure(e.to_string())),
        }
    }

    async fn list_tools(&self) -> Result<Vec<ToolMetadata>, BoxError> {
        Ok(vec![
            ToolMetadata::new(
                "build_balanced_team",
                "Build a balanced team around a core Pokemon: its profile, role, format rules, and meta context",
            )
            .with_parameter(
                ToolParameter::new("core_pokemon", ToolParameterType::String)
                    .with_description("The Pokemon to build around")
                    .required(),
            )
            .with_parameter(
                ToolParameter::new("format", ToolParameterType::String)
                    .with_description("Competitive format, default OU"),
            )
            .with_parameter(
                ToolParameter::new("style", ToolParameterType::String)
                    .with_description("balanced, offensive, or defensive"),
            )
            .with_parameter(
                ToolParameter::new("excluded_types", ToolParameterType::Array)
                    .with_description("Types to avoid on teammates")
                    .with_items(ToolParameterType::String),
            ),
            ToolMetadata::new(
                "get_team_archetype",
                "Get team suggestions for a specific archetype (rain, sun, sand, hail, trick_room, tailwind, hyper_offense, stall, volt_turn, dragon_spam)",
            )
            .with_parameter(
                ToolParameter::new("archetype", ToolParameterType::String)
                    .with_description("The archetype name")
                    .required(),
            )
            .with_parameter(
                ToolParameter::new("format", ToolParameterType::String)
                    .with_description("Competitive format, default OU"),
            )
            .with_parameter(
                ToolParameter::new("key_pokemon", ToolParameterType::String)
                    .with_description("Optional Pokemon to build the archetype around"),
            )
            .with_parameter(
                ToolParameter::new("style", ToolParameterType::String)
                    .with_description("balanced, offensive, or defensive"),
            ),
            ToolMetadata::new(
                "predict_matchup",
                "Predict the outcome of a battle between two teams, with a pairwise type-effectiveness grid",
            )
            .with_parameter(
                ToolParameter::new("team1", ToolParameterType::Array)
                    .with_description("First team's Pokemon names")
                    .with_items(ToolParameterType::String)
                    .required(),
            )
            .with_parameter(
                ToolParameter::new("team2", ToolParameterType::Array)
                    .with_description("Second team's Pokemon names")
                    .with_items(ToolParameterType::String)
                    .required(),
            )
            .with_parameter(
                ToolParameter::new("format", ToolParameterType::String)
                    .with_description("Competitive format, default OU"),
            )
            .with_parameter(
                ToolParameter::new("scoring_priority", ToolParameterType::String)
                    .with_description("overall, offense, or defense"),
            ),
        ])
    }

    fn protocol_name(&self) -> &str {
        "team"
    }
}
