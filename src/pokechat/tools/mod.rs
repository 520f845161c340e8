//! Domain data and analysis behind the battle-strategy tools.

pub mod pokedex;
pub mod roles;
pub mod team;
pub mod typechart;
