//! Procedural generation of the city layout.
//!
//! - Seeded planning of every entity position (`plan`)
//! - Oriented connector geometry for pipes and power lines (`connector`)
//! - Distribution-network topology (`network`)
//! - Scene spawning and status refresh (`layout`)

use bevy::prelude::*;

pub mod connector;
pub mod layout;
pub mod network;
pub mod plan;

pub struct ProcgenPlugin;

impl Plugin for ProcgenPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(layout::LayoutPlugin);
    }
}
