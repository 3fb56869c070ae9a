//! Status overlay: network health plus hover/selection inspection.
//!
//! This panel is the external consumer of the scene's outputs. It reads the
//! disruption flags and resolves `InteractionState` to `{name, category,
//! status}`; it never writes scene state.

use bevy::prelude::*;

use crate::registry::{Infra, InfraName, InfraStatus};
use crate::sim_state::DisruptionState;
use crate::tools::inspect::InteractionState;

pub struct OverlayPlugin;

impl Plugin for OverlayPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_overlay)
            .add_systems(Update, (update_network_lines, update_inspection_lines));
    }
}

#[derive(Component)]
struct WaterLine;

#[derive(Component)]
struct EnergyLine;

#[derive(Component)]
struct HoverLine;

#[derive(Component)]
struct SelectedLine;

const PANEL_BG: Color = Color::srgba(0.03, 0.05, 0.04, 0.9);
const TEXT_COLOR: Color = Color::srgb(0.8, 0.95, 0.85);
const MUTED_TEXT: Color = Color::srgb(0.6, 0.7, 0.65);
const OK_COLOR: Color = Color::srgb(0.3, 0.9, 0.4);
const ALERT_COLOR: Color = Color::srgb(0.95, 0.4, 0.3);

fn setup_overlay(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(10.0),
                left: Val::Px(10.0),
                padding: UiRect::axes(Val::Px(14.0), Val::Px(10.0)),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(4.0),
                ..default()
            },
            BackgroundColor(PANEL_BG),
        ))
        .with_children(|panel| {
            panel.spawn((
                Text::new("SYSTEM STATUS"),
                TextFont {
                    font_size: 15.0,
                    ..default()
                },
                TextColor(MUTED_TEXT),
            ));
            panel.spawn((
                Text::new("WATER: OK"),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(OK_COLOR),
                WaterLine,
            ));
            panel.spawn((
                Text::new("ENERGY: OK"),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(OK_COLOR),
                EnergyLine,
            ));
            panel.spawn((
                Text::new("Hover: -"),
                TextFont {
                    font_size: 13.0,
                    ..default()
                },
                TextColor(TEXT_COLOR),
                HoverLine,
            ));
            panel.spawn((
                Text::new("Selected: -"),
                TextFont {
                    font_size: 13.0,
                    ..default()
                },
                TextColor(TEXT_COLOR),
                SelectedLine,
            ));
            panel.spawn((
                Text::new("1 water  2 energy  0 clear"),
                TextFont {
                    font_size: 11.0,
                    ..default()
                },
                TextColor(MUTED_TEXT),
            ));
        });
}

fn update_network_lines(
    disruption: Res<DisruptionState>,
    mut water: Query<(&mut Text, &mut TextColor), (With<WaterLine>, Without<EnergyLine>)>,
    mut energy: Query<(&mut Text, &mut TextColor), (With<EnergyLine>, Without<WaterLine>)>,
) {
    if !disruption.is_changed() {
        return;
    }

    for (mut text, mut color) in &mut water {
        if disruption.water_disrupted {
            text.0 = "WATER: DISRUPTED".into();
            color.0 = ALERT_COLOR;
        } else {
            text.0 = "WATER: OK".into();
            color.0 = OK_COLOR;
        }
    }
    for (mut text, mut color) in &mut energy {
        if disruption.energy_disrupted {
            text.0 = "ENERGY: DISRUPTED".into();
            color.0 = ALERT_COLOR;
        } else {
            text.0 = "ENERGY: OK".into();
            color.0 = OK_COLOR;
        }
    }
}

fn describe(
    entity: Option<Entity>,
    registry: &Query<(&Infra, &InfraStatus, &InfraName)>,
) -> String {
    match entity.and_then(|entity| registry.get(entity).ok()) {
        Some((infra, status, name)) => format!(
            "{} [{}] {}",
            name.0,
            infra.category.label(),
            status.label()
        ),
        None => "-".into(),
    }
}

fn update_inspection_lines(
    state: Res<InteractionState>,
    registry: Query<(&Infra, &InfraStatus, &InfraName)>,
    mut hover: Query<&mut Text, (With<HoverLine>, Without<SelectedLine>)>,
    mut selected: Query<&mut Text, (With<SelectedLine>, Without<HoverLine>)>,
) {
    for mut text in &mut hover {
        let line = format!("Hover: {}", describe(state.hovered, &registry));
        if text.0 != line {
            text.0 = line;
        }
    }
    for mut text in &mut selected {
        let line = format!("Selected: {}", describe(state.selected, &registry));
        if text.0 != line {
            text.0 = line;
        }
    }
}
