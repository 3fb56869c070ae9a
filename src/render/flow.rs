//! Flow particle animation along the distribution network.
//!
//! A fixed-capacity pool of particle entities is spawned once and reassigned
//! every frame by slot, so steady-state animation allocates nothing per
//! particle. The animation tick advances on the fixed-update timer, which
//! deliberately decouples apparent flow speed from display frame rate.
//!
//! Water runs river-to-garden on the trunk edge with a vertical sine bow;
//! energy runs straight down every power line. Disruption halves the density
//! and recolors the water stream.

use bevy::prelude::*;

use crate::procgen::layout::BuildingAnchors;
use crate::procgen::network::{FlowKind, FlowNetwork};
use crate::sim_state::DisruptionState;

/// Fixed animation tick rate, independent of render cadence.
pub const FLOW_TICK_HZ: f64 = 30.0;

pub struct FlowPlugin;

impl Plugin for FlowPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FlowTick>()
            .init_resource::<FlowConfig>()
            .insert_resource(Time::<Fixed>::from_hz(FLOW_TICK_HZ))
            .add_systems(FixedUpdate, advance_tick)
            .add_systems(PostStartup, spawn_particle_pool)
            .add_systems(Update, animate_flow);
    }
}

/// Monotonic animation tick driving particle phase.
#[derive(Resource, Default)]
pub struct FlowTick(pub u64);

#[derive(Resource)]
pub struct FlowConfig {
    /// Ticks for a particle to traverse its edge once. Tuning this changes
    /// apparent velocity without touching count or spacing.
    pub speed_constant: f32,
    pub water_count: usize,
    pub water_count_disrupted: usize,
    pub energy_per_line: usize,
    pub energy_per_line_disrupted: usize,
    /// Peak height of the water stream's sine bow.
    pub arc_height: f32,
    pub water_particle_radius: f32,
    pub energy_particle_radius: f32,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            speed_constant: 120.0,
            water_count: 10,
            water_count_disrupted: 5,
            energy_per_line: 2,
            energy_per_line_disrupted: 1,
            arc_height: 18.0,
            water_particle_radius: 1.6,
            energy_particle_radius: 1.0,
        }
    }
}

/// Pool membership; the slot indexes into the per-frame placement list.
#[derive(Component)]
pub struct FlowParticle {
    pub slot: usize,
}

#[derive(Resource)]
pub struct FlowPalette {
    pub water: Handle<StandardMaterial>,
    pub water_alert: Handle<StandardMaterial>,
    pub energy: Handle<StandardMaterial>,
}

/// Looping phase along an edge: `(tick / speed + index / count) mod 1`.
/// Particles on one edge stay evenly spaced at `1 / count` apart.
pub fn particle_phase(tick: u64, speed_constant: f32, index: usize, count: usize) -> f32 {
    let base = tick as f32 / speed_constant;
    (base + index as f32 / count.max(1) as f32).fract()
}

/// Interpolate along the segment with a vertical sine bow peaking mid-run.
pub fn arc_point(start: Vec3, end: Vec3, t: f32, arc_height: f32) -> Vec3 {
    let mut point = start.lerp(end, t);
    point.y += (t * std::f32::consts::PI).sin() * arc_height;
    point
}

pub fn water_particle_count(config: &FlowConfig, disrupted: bool) -> usize {
    if disrupted {
        config.water_count_disrupted
    } else {
        config.water_count
    }
}

pub fn energy_particles_per_line(config: &FlowConfig, disrupted: bool) -> usize {
    if disrupted {
        config.energy_per_line_disrupted
    } else {
        config.energy_per_line
    }
}

fn advance_tick(mut tick: ResMut<FlowTick>) {
    tick.0 = tick.0.wrapping_add(1);
}

/// Spawn the slot pool sized for the worst case across disruption states:
/// the full water stream plus two particles on both lines of every building.
fn spawn_particle_pool(
    mut commands: Commands,
    config: Res<FlowConfig>,
    anchors: Res<BuildingAnchors>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let water_peak = config.water_count.max(config.water_count_disrupted);
    let energy_peak = config.energy_per_line.max(config.energy_per_line_disrupted);
    let capacity = water_peak + anchors.0.len() * 2 * energy_peak;

    let palette = FlowPalette {
        water: materials.add(StandardMaterial {
            base_color: Color::srgb(0.25, 0.65, 1.0),
            emissive: LinearRgba::new(0.1, 0.3, 0.8, 1.0),
            ..default()
        }),
        water_alert: materials.add(StandardMaterial {
            base_color: Color::srgb(0.95, 0.35, 0.2),
            emissive: LinearRgba::new(0.8, 0.15, 0.05, 1.0),
            ..default()
        }),
        energy: materials.add(StandardMaterial {
            base_color: Color::srgb(1.0, 0.85, 0.2),
            emissive: LinearRgba::new(0.9, 0.7, 0.1, 1.0),
            ..default()
        }),
    };

    let sphere = meshes.add(Sphere::new(1.0));
    for slot in 0..capacity {
        commands.spawn((
            Mesh3d(sphere.clone()),
            MeshMaterial3d(palette.water.clone()),
            Transform::default(),
            Visibility::Hidden,
            FlowParticle { slot },
        ));
    }
    commands.insert_resource(palette);
    info!("Flow particle pool ready: {capacity} slots");
}

fn animate_flow(
    tick: Res<FlowTick>,
    config: Res<FlowConfig>,
    disruption: Res<DisruptionState>,
    network: Option<Res<FlowNetwork>>,
    palette: Option<Res<FlowPalette>>,
    mut particles: Query<(
        &FlowParticle,
        &mut Transform,
        &mut Visibility,
        &mut MeshMaterial3d<StandardMaterial>,
    )>,
) {
    let (Some(network), Some(palette)) = (network, palette) else {
        return;
    };

    let mut placements: Vec<(Vec3, &Handle<StandardMaterial>, f32)> = Vec::new();

    if let Some(trunk) = network.trunk() {
        let count = water_particle_count(&config, disruption.water_disrupted);
        let material = if disruption.water_disrupted {
            &palette.water_alert
        } else {
            &palette.water
        };
        for index in 0..count {
            let t = particle_phase(tick.0, config.speed_constant, index, count);
            placements.push((
                arc_point(trunk.start, trunk.end, t, config.arc_height),
                material,
                config.water_particle_radius,
            ));
        }
    }

    let per_line = energy_particles_per_line(&config, disruption.energy_disrupted);
    for edge in network.edges_of_kind(FlowKind::Energy) {
        for index in 0..per_line {
            let t = particle_phase(tick.0, config.speed_constant, index, per_line);
            placements.push((
                edge.start.lerp(edge.end, t),
                &palette.energy,
                config.energy_particle_radius,
            ));
        }
    }

    for (particle, mut transform, mut visibility, mut material) in &mut particles {
        match placements.get(particle.slot) {
            Some((position, handle, radius)) => {
                transform.translation = *position;
                transform.scale = Vec3::splat(*radius);
                if material.0 != **handle {
                    material.0 = (*handle).clone();
                }
                *visibility = Visibility::Visible;
            }
            None => {
                *visibility = Visibility::Hidden;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_loops_after_one_speed_constant_period() {
        let config = FlowConfig::default();
        let speed = config.speed_constant;
        for index in 0..10 {
            let before = particle_phase(7, speed, index, 10);
            let after = particle_phase(7 + speed as u64, speed, index, 10);
            assert!((before - after).abs() < 1e-4);
        }
    }

    #[test]
    fn particles_stay_evenly_spaced() {
        let count = 10;
        for index in 0..count - 1 {
            let a = particle_phase(33, 120.0, index, count);
            let b = particle_phase(33, 120.0, index + 1, count);
            let gap = (b - a).rem_euclid(1.0);
            assert!((gap - 1.0 / count as f32).abs() < 1e-4);
        }
    }

    #[test]
    fn disruption_changes_counts_but_not_speed() {
        let config = FlowConfig::default();
        assert_eq!(water_particle_count(&config, false), 10);
        assert_eq!(water_particle_count(&config, true), 5);
        assert_eq!(energy_particles_per_line(&config, false), 2);
        assert_eq!(energy_particles_per_line(&config, true), 1);

        // Speed constant is independent of the flag.
        let ok = particle_phase(50, config.speed_constant, 0, 10);
        let alert = particle_phase(50, config.speed_constant, 0, 5);
        assert!((ok - alert).abs() < 1e-6);
    }

    #[test]
    fn arc_touches_both_endpoints_and_bows_upward() {
        let start = Vec3::new(-220.0, 2.0, 0.0);
        let end = Vec3::new(0.0, 2.0, 150.0);

        assert!(arc_point(start, end, 0.0, 18.0).abs_diff_eq(start, 1e-4));
        assert!(arc_point(start, end, 1.0, 18.0).abs_diff_eq(end, 1e-3));

        let mid = arc_point(start, end, 0.5, 18.0);
        let flat_mid = start.lerp(end, 0.5);
        assert!((mid.y - flat_mid.y - 18.0).abs() < 1e-4);
    }
}
