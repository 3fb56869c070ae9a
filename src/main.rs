//! UtiliSim - Real-time 3D city water & energy infrastructure visualization
//!
//! A Bevy-based procedural scene of typed infrastructure entities (buildings,
//! wells, solar panels, a powerhouse, pipes, power lines, a river, a garden)
//! with animated flow particles, a day/night cycle, and pointer inspection.

use bevy::prelude::*;

mod camera;
mod procgen;
mod registry;
mod render;
mod sim_state;
mod tools;
mod ui;

fn main() {
    // Force Vulkan backend on Windows (DX12 causes crashes on some systems)
    #[cfg(target_os = "windows")]
    std::env::set_var("WGPU_BACKEND", "vulkan");
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "UtiliSim".into(),
                resolution: (1280., 720.).into(),
                ..default()
            }),
            ..default()
        }))
        // Disruption flags (the externally owned state the scene reacts to)
        .add_plugins(sim_state::SimStatePlugin)
        // Core plugins
        .add_plugins(camera::CameraPlugin)
        .add_plugins(render::RenderPlugin)
        // Procedural city layout
        .add_plugins(procgen::ProcgenPlugin)
        // Hover/select inspection
        .add_plugins(tools::ToolsPlugin)
        // Overlay UI
        .add_plugins(ui::UiPlugin)
        .run();
}
