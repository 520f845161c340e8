//! The complete 18-type effectiveness chart (generation 6 onward) and the
//! analysis built on top of it. All lookups are pure and allocation-free;
//! the chart itself is a match over attacking type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the eighteen Pokémon types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Normal,
    Fire,
    Water,
    Electric,
    Grass,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

impl TypeKind {
    pub const ALL: [TypeKind; 18] = [
        TypeKind::Normal,
        TypeKind::Fire,
        TypeKind::Water,
        TypeKind::Electric,
        TypeKind::Grass,
        TypeKind::Ice,
        TypeKind::Fighting,
        TypeKind::Poison,
        TypeKind::Ground,
        TypeKind::Flying,
        TypeKind::Psychic,
        TypeKind::Bug,
        TypeKind::Rock,
        TypeKind::Ghost,
        TypeKind::Dragon,
        TypeKind::Dark,
        TypeKind::Steel,
        TypeKind::Fairy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Normal => "normal",
            TypeKind::Fire => "fire",
            TypeKind::Water => "water",
            TypeKind::Electric => "electric",
            TypeKind::Grass => "grass",
            TypeKind::Ice => "ice",
            TypeKind::Fighting => "fighting",
            TypeKind::Poison => "poison",
            TypeKind::Ground => "ground",
            TypeKind::Flying => "flying",
            TypeKind::Psychic => "psychic",
            TypeKind::Bug => "bug",
            TypeKind::Rock => "rock",
            TypeKind::Ghost => "ghost",
            TypeKind::Dragon => "dragon",
            TypeKind::Dark => "dark",
            TypeKind::Steel => "steel",
            TypeKind::Fairy => "fairy",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownType(pub String);

impl fmt::Display for UnknownType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown type: {}", self.0)
    }
}

impl std::error::Error for UnknownType {}

impl FromStr for TypeKind {
    type Err = UnknownType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(TypeKind::Normal),
            "fire" => Ok(TypeKind::Fire),
            "water" => Ok(TypeKind::Water),
            "electric" => Ok(TypeKind::Electric),
            "grass" => Ok(TypeKind::Grass),
            "ice" => Ok(TypeKind::Ice),
            "fighting" => Ok(TypeKind::Fighting),
            "poison" => Ok(TypeKind::Poison),
            "ground" => Ok(TypeKind::Ground),
            "flying" => Ok(TypeKind::Flying),
            "psychic" => Ok(TypeKind::Psychic),
            "bug" => Ok(TypeKind::Bug),
            "rock" => Ok(TypeKind::Rock),
            "ghost" => Ok(TypeKind::Ghost),
            "dragon" => Ok(TypeKind::Dragon),
            "dark" => Ok(TypeKind::Dark),
            "steel" => Ok(TypeKind::Steel),
            "fairy" => Ok(TypeKind::Fairy),
            other => Err(UnknownType(other.to_string())),
        }
    }
}

/// Damage multiplier of a single attacking type against a single defending
/// type.
pub fn multiplier(attacking: TypeKind, defending: TypeKind) -> f64 {
    use TypeKind::*;
    let (double, half, zero): (&[TypeKind], &[TypeKind], &[TypeKind]) = match attacking {
        Normal => (&[], &[Rock, Steel], &[Ghost]),
        Fire => (&[Grass, Ice, Bug, Steel], &[Fire, Water, Rock, Dragon], &[]),
        Water => (&[Fire, Ground, Rock], &[Water, Grass, Dragon], &[]),
        Electric => (&[Water, Flying], &[Electric, Grass, Dragon], &[Ground]),
        Grass => (
            &[Water, Ground, Rock],
            &[Fire, Grass, Poison, Flying, Bug, Dragon, Steel],
            &[],
        ),
        Ice => (
            &[Grass, Ground, Flying, Dragon],
            &[Fire, Water, Ice, Steel],
            &[],
        ),
        Fighting => (
            &[Normal, Ice, Rock, Dark, Steel],
            &[Poison, Flying, Psychic, Bug, Fairy],
            &[Ghost],
        ),
        Poison => (&[Grass, Fairy], &[Poison, Ground, Rock, Ghost], &[Steel]),
        Ground => (
            &[Fire, Electric, Poison, Rock, Steel],
            &[Grass, Bug],
            &[Flying],
        ),
        Flying => (&[Grass, Fighting, Bug], &[Electric, Rock, Steel], &[]),
        Psychic => (&[Fighting, Poison], &[Psychic, Steel], &[Dark]),
        Bug => (
            &[Grass, Psychic, Dark],
            &[Fire, Fighting, Poison, Flying, Ghost, Steel, Fairy],
            &[],
        ),
        Rock => (&[Fire, Ice, Flying, Bug], &[Fighting, Ground, Steel], &[]),
        Ghost => (&[Psychic, Ghost], &[Dark], &[Normal]),
        Dragon => (&[Dragon], &[Steel], &[Fairy]),
        Dark => (&[Psychic, Ghost], &[Fighting, Dark, Fairy], &[]),
        Steel => (&[Ice, Rock, Fairy], &[Fire, Water, Electric, Steel], &[]),
        Fairy => (&[Fighting, Dragon, Dark], &[Fire, Poison, Steel], &[]),
    };

    if zero.contains(&defending) {
        0.0
    } else if double.contains(&defending) {
        2.0
    } else if half.contains(&defending) {
        0.5
    } else {
        1.0
    }
}

/// Per-defending-type contribution to a combined multiplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeContribution {
    pub defending_type: TypeKind,
    pub multiplier: f64,
}

/// Full effectiveness report for one attacking type against a (possibly
/// dual-typed) defender.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectivenessReport {
    pub attacking_type: TypeKind,
    pub defending_types: Vec<TypeKind>,
    pub breakdown: Vec<TypeContribution>,
    /// Product of the per-type multipliers.
    pub combined_multiplier: f64,
    pub verdict: String,
}

/// Compute the combined multiplier against a defender carrying
/// `defending_types`, with the per-type breakdown. Dual-type defenders
/// multiply: fire against grass/steel is 2.0 × 2.0 = 4.0.
pub fn analyze(attacking: TypeKind, defending_types: &[TypeKind]) -> EffectivenessReport {
    let breakdown: Vec<TypeContribution> = defending_types
        .iter()
        .map(|&d| TypeContribution {
            defending_type: d,
            multiplier: multiplier(attacking, d),
        })
        .collect();
    let combined: f64 = breakdown.iter().map(|c| c.multiplier).product();

    EffectivenessReport {
        attacking_type: attacking,
        defending_types: defending_types.to_vec(),
        breakdown,
        combined_multiplier: combined,
        verdict: verdict(combined).to_string(),
    }
}

fn verdict(multiplier: f64) -> &'static str {
    if multiplier == 0.0 {
        "no effect"
    } else if multiplier >= 4.0 {
        "super effective (4x)"
    } else if multiplier >= 2.0 {
        "super effective"
    } else if multiplier >= 1.0 {
        "neutral"
    } else if multiplier >= 0.5 {
        "not very effective"
    } else {
        "barely effective"
    }
}

/// Defensive profile of a type combination: what hits it hard and what it
/// shrugs off, derived by running every attacking type through the chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefensiveProfile {
    pub types: Vec<TypeKind>,
    pub weaknesses: Vec<TypeKind>,
    pub resistances: Vec<TypeKind>,
    pub immunities: Vec<TypeKind>,
}

pub fn defensive_profile(types: &[TypeKind]) -> DefensiveProfile {
    let mut weaknesses = Vec::new();
    let mut resistances = Vec::new();
    let mut immunities = Vec::new();

    for attacking in TypeKind::ALL {
        let combined: f64 = types.iter().map(|&d| multiplier(attacking, d)).product();
        if combined == 0.0 {
            immunities.push(attacking);
        } else if combined > 1.0 {
            weaknesses.push(attacking);
        } else if combined < 1.0 {
            resistances.push(attacking);
        }
    }

    DefensiveProfile {
        types: types.to_vec(),
        weaknesses,
        resistances,
        immunities,
    }
}
