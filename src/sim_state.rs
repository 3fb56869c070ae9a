//! Disruption flags for the two resource networks.
//!
//! The flags are owned outside the scene core: here they are toggled from the
//! keyboard, but any collaborator may flip them. Scene systems only ever read
//! this resource; entity status is derived from it, never stored against it.

use bevy::prelude::*;

pub struct SimStatePlugin;

impl Plugin for SimStatePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DisruptionState>()
            .add_systems(Update, disruption_controls);
    }
}

/// Whether each distribution network is currently impaired.
#[derive(Resource, Default, Clone, Copy, PartialEq, Eq, Debug)]
pub struct DisruptionState {
    /// Water network impaired (wells, pipes, building supply).
    pub water_disrupted: bool,
    /// Energy network impaired (powerhouse, solar, power lines).
    pub energy_disrupted: bool,
}

/// Keyboard toggles: 1 = water, 2 = energy, 0 = clear both.
fn disruption_controls(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut state: ResMut<DisruptionState>,
) {
    if keyboard.just_pressed(KeyCode::Digit1) {
        state.water_disrupted = !state.water_disrupted;
        info!("Water network disrupted: {}", state.water_disrupted);
    }
    if keyboard.just_pressed(KeyCode::Digit2) {
        state.energy_disrupted = !state.energy_disrupted;
        info!("Energy network disrupted: {}", state.energy_disrupted);
    }
    if keyboard.just_pressed(KeyCode::Digit0) && *state != DisruptionState::default() {
        *state = DisruptionState::default();
        info!("Disruptions cleared");
    }
}
