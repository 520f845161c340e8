//! Competitive role classification over base-stat spreads.
//!
//! Roles are declared as stat requirements plus preferred stats; a spread is
//! scored against every role and classified by the best-scoring role among
//! those whose requirements it meets (falling back to the best score overall
//! when none qualify).

use serde::{Deserialize, Serialize};
use std::fmt;

/// The six base stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Hp,
    Attack,
    Defense,
    SpAttack,
    SpDefense,
    Speed,
}

impl Stat {
    pub const ALL: [Stat; 6] = [
        Stat::Hp,
        Stat::Attack,
        Stat::Defense,
        Stat::SpAttack,
        Stat::SpDefense,
        Stat::Speed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stat::Hp => "hp",
            Stat::Attack => "attack",
            Stat::Defense => "defense",
            Stat::SpAttack => "sp_attack",
            Stat::SpDefense => "sp_defense",
            Stat::Speed => "speed",
        }
    }

    /// Map a PokeAPI stat identifier ("special-attack" etc.) onto the enum.
    pub fn from_api_name(name: &str) -> Option<Stat> {
        match name {
            "hp" => Some(Stat::Hp),
            "attack" => Some(Stat::Attack),
            "defense" => Some(Stat::Defense),
            "special-attack" | "sp_attack" => Some(Stat::SpAttack),
            "special-defense" | "sp_defense" => Some(Stat::SpDefense),
            "speed" => Some(Stat::Speed),
            _ => None,
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complete base-stat spread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatSpread {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub sp_attack: u32,
    pub sp_defense: u32,
    pub speed: u32,
}

impl StatSpread {
    pub fn get(&self, stat: Stat) -> u32 {
        match stat {
            Stat::Hp => self.hp,
            Stat::Attack => self.attack,
            Stat::Defense => self.defense,
            Stat::SpAttack => self.sp_attack,
            Stat::SpDefense => self.sp_defense,
            Stat::Speed => self.speed,
        }
    }

    pub fn set(&mut self, stat: Stat, value: u32) {
        match stat {
            Stat::Hp => self.hp = value,
            Stat::Attack => self.attack = value,
            Stat::Defense => self.defense = value,
            Stat::SpAttack => self.sp_attack = value,
            Stat::SpDefense => self.sp_defense = value,
            Stat::Speed => self.speed = value,
        }
    }

    pub fn total(&self) -> u32 {
        Stat::ALL.iter().map(|&s| self.get(s)).sum()
    }
}

/// A competitive role declared as minimum stat requirements plus the stats
/// the role wants as high as possible.
#[derive(Debug, Clone)]
pub struct RoleDefinition {
    pub name: &'static str,
    pub stat_requirements: &'static [(Stat, u32)],
    pub preferred_stats: &'static [Stat],
    pub description: &'static str,
}

/// The role catalog scored against every spread.
pub const ROLE_DEFINITIONS: &[RoleDefinition] = &[
    RoleDefinition {
        name: "physical_wall",
        stat_requirements: &[(Stat::Defense, 90), (Stat::Hp, 60)],
        preferred_stats: &[Stat::Defense, Stat::Hp],
        description: "Absorbs physical hits and wears attackers down",
    },
    RoleDefinition {
        name: "special_wall",
        stat_requirements: &[(Stat::SpDefense, 90), (Stat::Hp, 60)],
        preferred_stats: &[Stat::SpDefense, Stat::Hp],
        description: "Absorbs special hits and wears attackers down",
    },
    RoleDefinition {
        name: "physical_sweeper",
        stat_requirements: &[(Stat::Attack, 100), (Stat::Speed, 80)],
        preferred_stats: &[Stat::Attack, Stat::Speed],
        description: "Outspeeds and overwhelms with physical attacks",
    },
    RoleDefinition {
        name: "special_sweeper",
        stat_requirements: &[(Stat::SpAttack, 100), (Stat::Speed, 80)],
        preferred_stats: &[Stat::SpAttack, Stat::Speed],
        description: "Outspeeds and overwhelms with special attacks",
    },
];

/// Distribution analysis of a spread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatAnalysis {
    pub total_stats: u32,
    pub highest_stat: Stat,
    pub lowest_stat: Stat,
    pub offensive_ratio: f64,
    pub defensive_ratio: f64,
    pub speed_ratio: f64,
    pub stat_focus: String,
}

/// Score for one role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleScore {
    pub role: String,
    pub score: f64,
}

/// Result of classifying one spread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleClassification {
    pub primary_role: String,
    pub role_score: f64,
    pub all_role_scores: Vec<RoleScore>,
    pub qualifying_roles: Vec<String>,
    pub role_description: String,
    pub stat_analysis: StatAnalysis,
}

/// Classify a spread against the role catalog.
pub fn classify(spread: &StatSpread) -> RoleClassification {
    let mut all_role_scores: Vec<RoleScore> = Vec::with_capacity(ROLE_DEFINITIONS.len());
    let mut qualifying_roles = Vec::new();

    for role in ROLE_DEFINITIONS {
        all_role_scores.push(RoleScore {
            role: role.name.to_string(),
            score: role_score(spread, role),
        });
        if meets_requirements(spread, role.stat_requirements) {
            qualifying_roles.push(role.name.to_string());
        }
    }

    let best_of = |names: &[String]| -> String {
        all_role_scores
            .iter()
            .filter(|rs| names.is_empty() || names.contains(&rs.role))
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .map(|rs| rs.role.clone())
            .unwrap_or_default()
    };
    let primary_role = if qualifying_roles.is_empty() {
        best_of(&[])
    } else {
        best_of(&qualifying_roles)
    };

    let role_score = all_role_scores
        .iter()
        .find(|rs| rs.role == primary_role)
        .map(|rs| rs.score)
        .unwrap_or(0.0);
    let role_description = ROLE_DEFINITIONS
        .iter()
        .find(|r| r.name == primary_role)
        .map(|r| r.description.to_string())
        .unwrap_or_default();

    RoleClassification {
        primary_role,
        role_score,
        all_role_scores,
        qualifying_roles,
        role_description,
        stat_analysis: analyze_stats(spread),
    }
}

/// Requirement score with a capped bonus for exceeding a requirement and a
/// scaled penalty for missing one, plus a preferred-stat bonus.
fn role_score(spread: &StatSpread, role: &RoleDefinition) -> f64 {
    let mut requirement_score = 0.0;
    for &(stat, min_value) in role.stat_requirements {
        let value = spread.get(stat) as f64;
        let min_value = min_value as f64;
        if value >= min_value {
            requirement_score += 1.0 + ((value - min_value) / 50.0).min(0.5);
        } else {
            requirement_score += (1.0 - (min_value - value) / 30.0).max(0.0);
        }
    }
    let base_score = if role.stat_requirements.is_empty() {
        0.0
    } else {
        requirement_score / role.stat_requirements.len() as f64
    };

    let preferred_total: u32 = role.preferred_stats.iter().map(|&s| spread.get(s)).sum();
    let preferred_bonus = (preferred_total as f64 / 300.0).min(0.3);

    let final_score = (base_score + preferred_bonus).min(1.0);
    (final_score * 1000.0).round() / 1000.0
}

fn meets_requirements(spread: &StatSpread, requirements: &[(Stat, u32)]) -> bool {
    requirements
        .iter()
        .all(|&(stat, min_value)| spread.get(stat) >= min_value)
}

fn analyze_stats(spread: &StatSpread) -> StatAnalysis {
    let total = spread.total();
    let highest_stat = Stat::ALL
        .into_iter()
        .max_by_key(|&s| spread.get(s))
        .unwrap_or(Stat::Hp);
    let lowest_stat = Stat::ALL
        .into_iter()
        .min_by_key(|&s| spread.get(s))
        .unwrap_or(Stat::Hp);

    let ratio = |n: u32| {
        if total > 0 {
            n as f64 / total as f64
        } else {
            0.0
        }
    };
    let offensive_ratio = ratio(spread.attack + spread.sp_attack);
    let defensive_ratio = ratio(spread.defense + spread.sp_defense + spread.hp);
    let speed_ratio = ratio(spread.speed);

    let stat_focus = if offensive_ratio > 0.4 {
        "offensive"
    } else if defensive_ratio > 0.6 {
        "defensive"
    } else if speed_ratio > 0.2 {
        "speed"
    } else {
        "balanced"
    };

    StatAnalysis {
        total_stats: total,
        highest_stat,
        lowest_stat,
        offensive_ratio: round3(offensive_ratio),
        defensive_ratio: round3(defensive_ratio),
        speed_ratio: round3(speed_ratio),
        stat_focus: stat_focus.to_string(),
    }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Quick role heuristic used in matchup summaries: physical or special
/// attacker, promoted to sweeper above base 100 speed.
pub fn infer_attacker_role(spread: &StatSpread) -> &'static str {
    if spread.attack > spread.sp_attack {
        if spread.speed > 100 {
            "physical_sweeper"
        } else {
            "physical_attacker"
        }
    } else if spread.speed > 100 {
        "special_sweeper"
    } else {
        "special_attacker"
    }
}

/// Convert a numeric role score into a human viability rating.
pub fn viability_rating(score: f64) -> &'static str {
    if score >= 0.8 {
        "Excellent"
    } else if score >= 0.6 {
        "Good"
    } else if score >= 0.4 {
        "Fair"
    } else {
        "Poor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Garchomp-like: fast, hard-hitting physical attacker.
    fn physical_sweeper_spread() -> StatSpread {
        StatSpread {
            hp: 108,
            attack: 130,
            defense: 95,
            sp_attack: 80,
            sp_defense: 85,
            speed: 102,
        }
    }

    // Chansey-like: enormous HP, huge special bulk, no offense.
    fn special_wall_spread() -> StatSpread {
        StatSpread {
            hp: 250,
            attack: 5,
            defense: 5,
            sp_attack: 35,
            sp_defense: 105,
            speed: 50,
        }
    }

    #[test]
    fn fast_physical_attacker_classifies_as_physical_sweeper() {
        let classification = classify(&physical_sweeper_spread());
        assert_eq!(classification.primary_role, "physical_sweeper");
        assert!(classification
            .qualifying_roles
            .contains(&"physical_sweeper".to_string()));
        assert!(classification.role_score > 0.8);
    }

    #[test]
    fn special_tank_classifies_as_special_wall() {
        let classification = classify(&special_wall_spread());
        assert_eq!(classification.primary_role, "special_wall");
        assert_eq!(classification.stat_analysis.highest_stat, Stat::Hp);
    }

    #[test]
    fn unqualified_spread_falls_back_to_best_score() {
        let weak = StatSpread {
            hp: 40,
            attack: 45,
            defense: 40,
            sp_attack: 45,
            sp_defense: 40,
            speed: 56,
        };
        let classification = classify(&weak);
        assert!(classification.qualifying_roles.is_empty());
        assert!(!classification.primary_role.is_empty());
        assert!(classification.role_score < 0.8);
    }

    #[test]
    fn scores_are_bounded() {
        for spread in [physical_sweeper_spread(), special_wall_spread()] {
            for rs in classify(&spread).all_role_scores {
                assert!(rs.score >= 0.0 && rs.score <= 1.0, "{}: {}", rs.role, rs.score);
            }
        }
    }

    #[test]
    fn attacker_role_heuristic_uses_speed_cutoff() {
        assert_eq!(
            infer_attacker_role(&physical_sweeper_spread()),
            "physical_sweeper"
        );
        let slow = StatSpread {
            attack: 134,
            sp_attack: 95,
            speed: 20,
            hp: 100,
            defense: 110,
            sp_defense: 65,
        };
        assert_eq!(infer_attacker_role(&slow), "physical_attacker");
    }

    #[test]
    fn api_stat_names_map_onto_the_enum() {
        assert_eq!(Stat::from_api_name("special-attack"), Some(Stat::SpAttack));
        assert_eq!(Stat::from_api_name("hp"), Some(Stat::Hp));
        assert_eq!(Stat::from_api_name("evasion"), None);
    }
}
