//! Pointer tools for inspecting the scene.

use bevy::prelude::*;

pub mod inspect;

pub struct ToolsPlugin;

impl Plugin for ToolsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(inspect::InspectPlugin);
    }
}
