//! Rendering systems: day/night lighting and flow particle animation.

use bevy::prelude::*;

pub mod day_night;
pub mod flow;

pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(day_night::DayNightPlugin)
            .add_plugins(flow::FlowPlugin);
    }
}
