//! Team building, archetype, and matchup analysis.
//!
//! The archetype catalog and format rules are static competitive knowledge;
//! the builders combine them with live Pokédex data and the type chart into
//! structured reports the model can reason over.

use serde::Serialize;
use std::error::Error;

use crate::pokechat::tool_protocol::ToolError;
use crate::pokechat::tools::pokedex::{PokeApiClient, PokemonSummary};
use crate::pokechat::tools::roles;
use crate::pokechat::tools::typechart::{self, DefensiveProfile, TypeKind};

type BoxError = Box<dyn Error + Send + Sync>;

/// A team archetype: requirements, key members, and playstyle.
#[derive(Debug, Clone, Serialize)]
pub struct ArchetypeProfile {
    pub name: &'static str,
    pub playstyle: &'static str,
    pub core_roles: &'static [&'static str],
    pub key_abilities: &'static [&'static str],
    pub recommended_moves: &'static [&'static str],
    pub key_pokemon: &'static [&'static str],
}

/// The supported archetype catalog.
pub const ARCHETYPES: &[ArchetypeProfile] = &[
    ArchetypeProfile {
        name: "rain",
        playstyle: "Offensive weather team focusing on water-type moves and Swift Swim",
        core_roles: &["Weather Setter", "Swift Swim Sweeper", "Thunder User"],
        key_abilities: &["Drizzle", "Swift Swim", "Rain Dish"],
        recommended_moves: &["Rain Dance", "Thunder", "Weather Ball", "Hurricane"],
        key_pokemon: &["pelipper", "barraskewda", "swampert"],
    },
    ArchetypeProfile {
        name: "sun",
        playstyle: "Weather team boosting fire moves and Chlorophyll speed",
        core_roles: &["Weather Setter", "Chlorophyll Sweeper"],
        key_abilities: &["Drought", "Chlorophyll", "Solar Power"],
        recommended_moves: &["Sunny Day", "Solar Beam", "Fire Blast", "Growth"],
        key_pokemon: &["torkoal", "venusaur", "charizard"],
    },
    ArchetypeProfile {
        name: "sand",
        playstyle: "Weather team grinding with sandstorm chip and Sand Rush speed",
        core_roles: &["Weather Setter", "Sand Rush Sweeper"],
        key_abilities: &["Sand Stream", "Sand Rush", "Sand Force"],
        recommended_moves: &["Sandstorm", "Earthquake", "Stone Edge"],
        key_pokemon: &["tyranitar", "excadrill", "hippowdon"],
    },
    ArchetypeProfile {
        name: "hail",
        playstyle: "Weather team built on snow and Slush Rush or Blizzard spam",
        core_roles: &["Weather Setter", "Slush Rush Sweeper"],
        key_abilities: &["Snow Warning", "Slush Rush", "Ice Body"],
        recommended_moves: &["Blizzard", "Aurora Veil", "Icicle Spear"],
        key_pokemon: &["abomasnow", "arctozolt", "ninetales-alola"],
    },
    ArchetypeProfile {
        name: "trick_room",
        playstyle: "Speed control team focusing on slow but powerful Pokemon",
        core_roles: &["TR Setter", "Slow Sweeper", "Redirection"],
        key_abilities: &["Levitate", "Terrify", "Magic Guard"],
        recommended_moves: &["Trick Room", "Gyro Ball", "Body Press"],
        key_pokemon: &["dusclops", "glastrier", "conkeldurr"],
    },
    ArchetypeProfile {
        name: "tailwind",
        playstyle: "Speed control team doubling speed for four turns of pressure",
        core_roles: &["Tailwind Setter", "Fast Attacker"],
        key_abilities: &["Gale Wings", "Prankster"],
        recommended_moves: &["Tailwind", "Brave Bird", "Dual Wingbeat"],
        key_pokemon: &["talonflame", "whimsicott", "zapdos"],
    },
    ArchetypeProfile {
        name: "hyper_offense",
        playstyle: "All-out offense keeping momentum with setup sweepers and breakers",
        core_roles: &["Lead", "Setup Sweeper", "Wallbreaker"],
        key_abilities: &["Intimidate", "Moxie", "Beast Boost"],
        recommended_moves: &["Swords Dance", "Nasty Plot", "Stealth Rock"],
        key_pokemon: &["garchomp", "dragapult", "weavile"],
    },
    ArchetypeProfile {
        name: "stall",
        playstyle: "Defensive attrition with walls, hazards, and recovery loops",
        core_roles: &["Physical Wall", "Special Wall", "Hazard Setter", "Cleric"],
        key_abilities: &["Regenerator", "Unaware", "Natural Cure"],
        recommended_moves: &["Toxic", "Recover", "Stealth Rock", "Wish"],
        key_pokemon: &["toxapex", "blissey", "skarmory"],
    },
    ArchetypeProfile {
        name: "volt_turn",
        playstyle: "Momentum cycling with Volt Switch and U-turn pivots",
        core_roles: &["Pivot", "Breaker", "Hazard Setter"],
        key_abilities: &["Regenerator", "Volt Absorb"],
        recommended_moves: &["Volt Switch", "U-turn", "Flip Turn"],
        key_pokemon: &["rotom-wash", "scizor", "cyclizar"],
    },
    ArchetypeProfile {
        name: "dragon_spam",
        playstyle: "Stacked dragon breakers overwhelming shared checks",
        core_roles: &["Dragon Breaker", "Steel Remover", "Fairy Lure"],
        key_abilities: &["Multiscale", "Clear Body"],
        recommended_moves: &["Outrage", "Draco Meteor", "Dragon Dance"],
        key_pokemon: &["dragonite", "dragapult", "garchomp"],
    },
];

pub fn find_archetype(name: &str) -> Option<&'static ArchetypeProfile> {
    let normalized = name.trim().to_lowercase();
    ARCHETYPES.iter().find(|a| a.name == normalized)
}

/// Competitive format rules.
#[derive(Debug, Clone, Serialize)]
pub struct FormatInfo {
    pub name: String,
    pub level_cap: u32,
    pub clauses: Vec<&'static str>,
    pub banlist: Vec<&'static str>,
}

const STANDARD_CLAUSES: [&str; 5] = [
    "Sleep Clause",
    "Species Clause",
    "OHKO Clause",
    "Evasion Clause",
    "Endless Battle Clause",
];

pub fn format_info(format: &str) -> FormatInfo {
    match format.trim().to_uppercase().as_str() {
        "OU" => FormatInfo {
            name: "OverUsed".to_string(),
            level_cap: 100,
            clauses: STANDARD_CLAUSES.to_vec(),
            banlist: vec![
                "Uber Pokemon",
                "Arena Trap",
                "Moody",
                "Power Construct",
                "Shadow Tag",
                "Baton Pass",
            ],
        },
        "UU" => FormatInfo {
            name: "UnderUsed".to_string(),
            level_cap: 100,
            clauses: STANDARD_CLAUSES.to_vec(),
            banlist: vec![
                "OU Pokemon",
                "UUBL Pokemon",
                "Arena Trap",
                "Drizzle",
                "Drought",
            ],
        },
        other => FormatInfo {
            name: other.to_string(),
            level_cap: 100,
            clauses: Vec::new(),
            banlist: Vec::new(),
        },
    }
}

/// One notable threat in the current metagame.
#[derive(Debug, Clone, Serialize)]
pub struct MetaThreat {
    pub pokemon: &'static str,
    pub usage: f64,
    pub common_moves: Vec<&'static str>,
}

/// Metagame context attached to every team report.
#[derive(Debug, Clone, Serialize)]
pub struct MetaContext {
    pub common_threats: Vec<MetaThreat>,
    /// Usage share per playstyle, in percent.
    pub meta_styles: Vec<(&'static str, u32)>,
    /// Prevalence of each speed-control strategy, in percent.
    pub speed_control: Vec<(&'static str, u32)>,
}

pub fn meta_context() -> MetaContext {
    MetaContext {
        common_threats: vec![
            MetaThreat {
                pokemon: "Dragapult",
                usage: 25.5,
                common_moves: vec!["Dragon Darts", "Shadow Ball"],
            },
            MetaThreat {
                pokemon: "Heatran",
                usage: 20.1,
                common_moves: vec!["Magma Storm", "Earth Power"],
            },
            MetaThreat {
                pokemon: "Toxapex",
                usage: 19.8,
                common_moves: vec!["Scald", "Toxic"],
            },
        ],
        meta_styles: vec![("hyper_offense", 35), ("balance", 40), ("stall", 25)],
        speed_control: vec![
            ("trick_room", 15),
            ("tailwind", 20),
            ("priority", 30),
            ("natural_speed", 35),
        ],
    }
}

/// Weighting profile for a requested team style.
#[derive(Debug, Clone, Serialize)]
pub struct StyleWeights {
    pub style: String,
    pub offensive_weight: f64,
    pub defensive_weight: f64,
    pub recommended_roles: Vec<&'static str>,
}

pub fn style_weights(style: &str) -> StyleWeights {
    match style.trim().to_lowercase().as_str() {
        "offensive" => StyleWeights {
            style: "offensive".to_string(),
            offensive_weight: 0.8,
            defensive_weight: 0.2,
            recommended_roles: vec!["Sweeper", "Wallbreaker", "Cleaner"],
        },
        "defensive" => StyleWeights {
            style: "defensive".to_string(),
            offensive_weight: 0.2,
            defensive_weight: 0.8,
            recommended_roles: vec!["Wall", "Support", "Pivot"],
        },
        _ => StyleWeights {
            style: "balanced".to_string(),
            offensive_weight: 0.5,
            defensive_weight: 0.5,
            recommended_roles: vec!["Sweeper", "Wall", "Support", "Breaker"],
        },
    }
}

/// Everything needed to build a team around one core Pokémon.
#[derive(Debug, Clone, Serialize)]
pub struct TeamBuildReport {
    pub core_pokemon: PokemonSummary,
    pub core_profile: DefensiveProfile,
    pub core_role: roles::RoleClassification,
    pub format_info: FormatInfo,
    pub team_style: StyleWeights,
    pub excluded_types: Vec<TypeKind>,
    pub meta_context: MetaContext,
}

pub async fn build_team(
    dex: &PokeApiClient,
    core_pokemon: &str,
    format: &str,
    style: &str,
    excluded_types: Vec<TypeKind>,
) -> Result<TeamBuildReport, BoxError> {
    let core = dex.get_pokemon(core_pokemon).await?;
    let core_profile = typechart::defensive_profile(&core.types);
    let core_role = roles::classify(&core.stats);

    Ok(TeamBuildReport {
        core_pokemon: core,
        core_profile,
        core_role,
        format_info: format_info(format),
        team_style: style_weights(style),
        excluded_types,
        meta_context: meta_context(),
    })
}

/// Archetype suggestion report: the catalog entry plus live data on its core
/// members.
#[derive(Debug, Clone, Serialize)]
pub struct ArchetypeSuggestion {
    pub archetype: ArchetypeProfile,
    pub core_pokemon: Vec<PokemonSummary>,
    pub format_info: FormatInfo,
    pub style: StyleWeights,
    pub meta_context: MetaContext,
}

pub async fn get_team_suggestion(
    dex: &PokeApiClient,
    archetype: &str,
    format: &str,
    key_pokemon: Option<&str>,
    style: &str,
) -> Result<ArchetypeSuggestion, BoxError> {
    let profile = find_archetype(archetype)
        .ok_or_else(|| ToolError::InvalidParameters(format!("invalid archetype: {}", archetype)))?;

    let mut core_pokemon = Vec::new();
    if let Some(key) = key_pokemon {
        core_pokemon.push(dex.get_pokemon(key).await?);
    }
    // The first two catalog members round out the core, skipping a duplicate
    // of the requested key Pokémon.
    for member in profile.key_pokemon.iter().take(2) {
        if key_pokemon.map(|k| k.eq_ignore_ascii_case(member)) == Some(true) {
            continue;
        }
        match dex.get_pokemon(member).await {
            Ok(summary) => core_pokemon.push(summary),
            Err(e) => log::warn!("skipping archetype member {}: {}", member, e),
        }
    }

    Ok(ArchetypeSuggestion {
        archetype: profile.clone(),
        core_pokemon,
        format_info: format_info(format),
        style: style_weights(style),
        meta_context: meta_context(),
    })
}

/// One cell of the pairwise matchup grid: the best STAB multiplier the
/// attacker has into the defender's type combination.
#[derive(Debug, Clone, Serialize)]
pub struct MatchupCell {
    pub attacker: String,
    pub defender: String,
    pub best_multiplier: f64,
}

/// One side of a matchup.
#[derive(Debug, Clone, Serialize)]
pub struct TeamSide {
    pub pokemon: Vec<PokemonSummary>,
    pub roles: Vec<String>,
}

/// Full matchup prediction payload.
#[derive(Debug, Clone, Serialize)]
pub struct MatchupReport {
    pub team1: TeamSide,
    pub team2: TeamSide,
    pub team1_offense: Vec<MatchupCell>,
    pub team2_offense: Vec<MatchupCell>,
    pub format_info: FormatInfo,
    pub meta_context: MetaContext,
    pub scoring_priority: String,
}

pub async fn predict_matchup(
    dex: &PokeApiClient,
    team1: &[String],
    team2: &[String],
    format: &str,
    scoring_priority: &str,
) -> Result<MatchupReport, BoxError> {
    if team1.is_empty() || team2.is_empty() {
        return Err(Box::new(ToolError::InvalidParameters(
            "both teams need at least one Pokemon".to_string(),
        )));
    }

    let mut side1 = Vec::with_capacity(team1.len());
    for name in team1 {
        side1.push(dex.get_pokemon(name).await?);
    }
    let mut side2 = Vec::with_capacity(team2.len());
    for name in team2 {
        side2.push(dex.get_pokemon(name).await?);
    }

    let team1_offense = offense_grid(&side1, &side2);
    let team2_offense = offense_grid(&side2, &side1);

    Ok(MatchupReport {
        team1: TeamSide {
            roles: side1
                .iter()
                .map(|p| roles::infer_attacker_role(&p.stats).to_string())
                .collect(),
            pokemon: side1,
        },
        team2: TeamSide {
            roles: side2
                .iter()
                .map(|p| roles::infer_attacker_role(&p.stats).to_string())
                .collect(),
            pokemon: side2,
        },
        team1_offense,
        team2_offense,
        format_info: format_info(format),
        meta_context: meta_context(),
        scoring_priority: scoring_priority.to_string(),
    })
}

fn offense_grid(attackers: &[PokemonSummary], defenders: &[PokemonSummary]) -> Vec<MatchupCell> {
    let mut grid = Vec::with_capacity(attackers.len() * defenders.len());
    for attacker in attackers {
        for defender in defenders {
            let best = attacker
                .types
                .iter()
                .map(|&t| typechart::analyze(t, &defender.types).combined_multiplier)
                .fold(0.0_f64, f64::max);
            grid.push(MatchupCell {
                attacker: attacker.name.clone(),
                defender: defender.name.clone(),
                best_multiplier: best,
            });
        }
    }
    grid
}
