//! Overlay UI.

use bevy::prelude::*;

pub mod overlay;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(overlay::OverlayPlugin);
    }
}
