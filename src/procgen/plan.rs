//! Deterministic, seed-driven planning of the whole city layout.
//!
//! Planning is pure: [`plan_city`] turns a [`LayoutConfig`] into a
//! [`CityPlan`] holding every position, size, and connector endpoint, and
//! [`build_network`] derives the distribution topology from the plan. The
//! spawn systems in `layout` only consume these results, which keeps the
//! placement invariants testable without a running app.
//!
//! Structural anchors (river, garden, powerhouse, well and solar rows) are
//! fixed; building heights and in-cell positions, tree jitter, and lamp
//! placement come from a seeded RNG so a given seed reproduces the scene
//! exactly.

use bevy::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};
use smallvec::SmallVec;

use crate::procgen::network::{FlowKind, FlowNetwork, NodeKind};

/// Fixed structural anchors, in world units on a 600x600 ground plane.
pub const RIVER_CENTER: Vec3 = Vec3::new(-240.0, 1.0, 0.0);
pub const RIVER_SIZE: Vec3 = Vec3::new(40.0, 2.0, 360.0);
/// Bank point where the surface stream toward the garden starts.
pub const RIVER_TAP: Vec3 = Vec3::new(-220.0, 2.0, 0.0);
pub const GARDEN_CENTER: Vec3 = Vec3::new(0.0, 1.0, 150.0);
pub const GARDEN_SIZE: f32 = 100.0;
pub const POWERHOUSE_ANCHOR: Vec3 = Vec3::new(240.0, 0.0, -120.0);
/// Height of the powerhouse stack tip, where power lines originate.
pub const POWERHOUSE_TAP_HEIGHT: f32 = 34.0;
/// Riverside walkway along the east bank.
pub const WALKWAY_CENTER: Vec3 = Vec3::new(-212.0, 2.5, 40.0);
pub const WALKWAY_SIZE: Vec3 = Vec3::new(14.0, 1.0, 100.0);

#[derive(Resource)]
pub struct LayoutConfig {
    /// Seed keeping placement deterministic between runs.
    pub seed: u64,
    pub building_count: usize,
    pub well_count: usize,
    pub solar_count: usize,
    pub tree_count: usize,
    pub lamp_count: usize,
    /// Grid cell pitch for building placement.
    pub block_spacing: f32,
    pub building_min_height: f32,
    pub building_max_height: f32,
    /// Maximum random in-cell offset on each horizontal axis.
    pub building_jitter: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            seed: 27182,
            building_count: 10,
            well_count: 3,
            solar_count: 5,
            tree_count: 12,
            lamp_count: 8,
            block_spacing: 60.0,
            building_min_height: 22.0,
            building_max_height: 58.0,
            building_jitter: 10.0,
        }
    }
}

/// Planned building body plus its decorative pattern.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildingPlan {
    /// Ground-level center of the footprint.
    pub position: Vec3,
    /// Footprint width/depth.
    pub footprint: Vec2,
    pub height: f32,
    pub window_rows: u32,
    pub window_cols: u32,
    pub color_index: usize,
    pub roof: RoofPlan,
}

/// Rooftop clutter, rolled per building from the layout seed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RoofPlan {
    pub water_tank: bool,
    pub ac_unit: bool,
    pub railing: bool,
    pub balconies: bool,
}

impl BuildingPlan {
    /// Roof point where power lines terminate.
    pub fn anchor(&self) -> Vec3 {
        self.position + Vec3::Y * self.height
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WellPlan {
    pub position: Vec3,
    /// Supply runs leaving this well (garden, then river bank).
    pub pipe_targets: SmallVec<[Vec3; 2]>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConnectorPlan {
    pub kind: FlowKind,
    pub start: Vec3,
    pub end: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreePlan {
    pub position: Vec3,
    /// Alternating conifer/broadleaf silhouettes, as in the garden rows.
    pub conifer: bool,
    pub foliage_scale: f32,
}

/// Complete placement result for one layout pass.
#[derive(Clone, Debug, Default)]
pub struct CityPlan {
    pub buildings: Vec<BuildingPlan>,
    pub wells: Vec<WellPlan>,
    pub solar: Vec<Vec3>,
    pub trees: Vec<TreePlan>,
    /// Park benches, one at the east end of each planted row.
    pub benches: Vec<Vec3>,
    pub lamps: Vec<Vec3>,
    pub pipes: Vec<ConnectorPlan>,
    pub power_lines: Vec<ConnectorPlan>,
}

/// Window grid rows grow with building height; columns are fixed at three,
/// matching the facade proportions.
pub fn window_grid(height: f32) -> (u32, u32) {
    let rows = (height / 12.0).floor() as u32;
    (rows.clamp(1, 6), 3)
}

pub fn plan_city(config: &LayoutConfig) -> CityPlan {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut plan = CityPlan::default();

    plan_buildings(config, &mut rng, &mut plan);
    plan_wells(config, &mut plan);
    plan_solar(config, &mut plan);
    plan_trees(config, &mut rng, &mut plan);
    plan_lamps(config, &mut rng, &mut plan);
    plan_power_lines(config, &mut plan);

    plan
}

fn plan_buildings(config: &LayoutConfig, rng: &mut StdRng, plan: &mut CityPlan) {
    // Two rows of five cells east of the river, jittered inside each cell.
    let cols = 5;
    for index in 0..config.building_count {
        let col = (index % cols) as f32;
        let row = (index / cols) as f32;
        let base = Vec3::new(
            -120.0 + col * config.block_spacing,
            0.0,
            -30.0 + row * config.block_spacing,
        );
        let jitter = Vec3::new(
            rng.gen_range(-config.building_jitter..config.building_jitter),
            0.0,
            rng.gen_range(-config.building_jitter..config.building_jitter),
        );
        let height = rng.gen_range(config.building_min_height..config.building_max_height);
        let footprint = Vec2::new(18.0 + rng.gen::<f32>() * 4.0, 18.0 + rng.gen::<f32>() * 4.0);
        let (window_rows, window_cols) = window_grid(height);
        let roof = RoofPlan {
            water_tank: rng.gen::<f32>() < 0.4,
            ac_unit: rng.gen::<f32>() < 0.2,
            railing: rng.gen::<f32>() < 0.15,
            balconies: rng.gen::<f32>() < 0.25,
        };

        plan.buildings.push(BuildingPlan {
            position: base + jitter,
            footprint,
            height,
            window_rows,
            window_cols,
            color_index: rng.gen_range(0..10),
            roof,
        });
    }
}

fn plan_wells(config: &LayoutConfig, plan: &mut CityPlan) {
    // A row along the north edge; every well feeds the garden and draws from
    // the nearest river bank point.
    for index in 0..config.well_count {
        let position = Vec3::new(-60.0 + index as f32 * 90.0, 0.0, -150.0);
        let bank = Vec3::new(RIVER_TAP.x, 1.0, position.z);
        let mut pipe_targets = SmallVec::new();
        pipe_targets.push(GARDEN_CENTER);
        pipe_targets.push(bank);

        for target in &pipe_targets {
            plan.pipes.push(ConnectorPlan {
                kind: FlowKind::Water,
                start: position + Vec3::Y * 2.0,
                end: *target + Vec3::Y * 1.0,
            });
        }
        plan.wells.push(WellPlan {
            position,
            pipe_targets,
        });
    }
}

fn plan_solar(config: &LayoutConfig, plan: &mut CityPlan) {
    for index in 0..config.solar_count {
        plan.solar
            .push(Vec3::new(90.0 + index as f32 * 32.0, 0.0, -100.0));
    }
}

fn plan_trees(config: &LayoutConfig, rng: &mut StdRng, plan: &mut CityPlan) {
    // Garden rows, four to a row, alternating silhouettes like a planted park.
    let cols = 4;
    let pitch_x = GARDEN_SIZE / (cols as f32 + 1.0);
    let rows = config.tree_count.div_ceil(cols);
    let pitch_z = GARDEN_SIZE / (rows as f32 + 1.0);
    for index in 0..config.tree_count {
        let row = index / cols;
        let col = index % cols;
        let position = Vec3::new(
            GARDEN_CENTER.x - GARDEN_SIZE / 2.0 + (col as f32 + 1.0) * pitch_x
                + rng.gen_range(-4.0..4.0),
            0.0,
            GARDEN_CENTER.z - GARDEN_SIZE / 2.0 + (row as f32 + 1.0) * pitch_z
                + rng.gen_range(-4.0..4.0),
        );
        plan.trees.push(TreePlan {
            position,
            conifer: (row + col) % 2 == 1,
            foliage_scale: 1.0 + rng.gen::<f32>() * 0.4,
        });
        if col == cols - 1 {
            plan.benches.push(position + Vec3::X * 8.0);
        }
    }
}

fn plan_lamps(config: &LayoutConfig, rng: &mut StdRng, plan: &mut CityPlan) {
    for _ in 0..config.lamp_count {
        plan.lamps.push(Vec3::new(
            rng.gen_range(-180.0..260.0),
            0.0,
            rng.gen_range(-180.0..180.0),
        ));
    }
}

fn plan_power_lines(config: &LayoutConfig, plan: &mut CityPlan) {
    // Every building hangs off the powerhouse and off its assigned panel
    // (nearest in index, wrapping over the row).
    let powerhouse_tap = POWERHOUSE_ANCHOR + Vec3::Y * POWERHOUSE_TAP_HEIGHT;
    for (index, building) in plan.buildings.iter().enumerate() {
        let panel = plan.solar[index % config.solar_count] + Vec3::Y * 4.0;
        plan.power_lines.push(ConnectorPlan {
            kind: FlowKind::Energy,
            start: powerhouse_tap,
            end: building.anchor(),
        });
        plan.power_lines.push(ConnectorPlan {
            kind: FlowKind::Energy,
            start: panel,
            end: building.anchor(),
        });
    }
}

/// Derive the flow topology from a finished plan. The graph mirrors the
/// visible connectors plus the river-to-garden trunk the water stream runs on.
pub fn build_network(plan: &CityPlan) -> FlowNetwork {
    let mut network = FlowNetwork::default();

    let river = network.add_node(NodeKind::River, RIVER_TAP);
    let garden = network.add_node(NodeKind::Garden, GARDEN_CENTER);
    let trunk = network.connect(
        river,
        garden,
        FlowKind::Water,
        RIVER_TAP,
        GARDEN_CENTER + Vec3::Y * 2.0,
    );
    network.set_trunk(trunk);

    for (index, well) in plan.wells.iter().enumerate() {
        let node = network.add_node(NodeKind::Well(index), well.position);
        network.connect(
            node,
            garden,
            FlowKind::Water,
            well.position + Vec3::Y * 2.0,
            GARDEN_CENTER + Vec3::Y * 1.0,
        );
        network.connect(
            river,
            node,
            FlowKind::Water,
            Vec3::new(RIVER_TAP.x, 1.0, well.position.z),
            well.position + Vec3::Y * 2.0,
        );
    }

    let powerhouse = network.add_node(NodeKind::Powerhouse, POWERHOUSE_ANCHOR);
    let solar: Vec<_> = plan
        .solar
        .iter()
        .enumerate()
        .map(|(index, position)| network.add_node(NodeKind::Solar(index), *position))
        .collect();

    for (index, building) in plan.buildings.iter().enumerate() {
        let node = network.add_node(NodeKind::Building(index), building.position);
        let panel_index = index % solar.len().max(1);
        network.connect(
            powerhouse,
            node,
            FlowKind::Energy,
            POWERHOUSE_ANCHOR + Vec3::Y * POWERHOUSE_TAP_HEIGHT,
            building.anchor(),
        );
        network.connect(
            solar[panel_index],
            node,
            FlowKind::Energy,
            plan.solar[panel_index] + Vec3::Y * 4.0,
            building.anchor(),
        );
    }

    network
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_respects_configured_counts() {
        let config = LayoutConfig::default();
        let plan = plan_city(&config);

        assert_eq!(plan.buildings.len(), 10);
        assert_eq!(plan.wells.len(), 3);
        assert_eq!(plan.solar.len(), 5);
        assert_eq!(plan.pipes.len(), config.well_count * 2);
        assert_eq!(plan.power_lines.len(), config.building_count * 2);
        for well in &plan.wells {
            assert_eq!(well.pipe_targets.len(), 2);
        }
    }

    #[test]
    fn equal_seeds_reproduce_the_layout() {
        let config = LayoutConfig::default();
        let first = plan_city(&config);
        let second = plan_city(&config);
        assert_eq!(first.buildings, second.buildings);
        assert_eq!(first.trees, second.trees);
        assert_eq!(first.lamps, second.lamps);

        let other = plan_city(&LayoutConfig {
            seed: 999,
            ..LayoutConfig::default()
        });
        assert_ne!(first.buildings, other.buildings);
    }

    #[test]
    fn decorative_details_are_seeded_and_stable() {
        let config = LayoutConfig::default();
        let first = plan_city(&config);
        let second = plan_city(&config);

        let roofs: Vec<RoofPlan> = first.buildings.iter().map(|b| b.roof).collect();
        let roofs_again: Vec<RoofPlan> = second.buildings.iter().map(|b| b.roof).collect();
        assert_eq!(roofs, roofs_again);
        assert_eq!(first.benches, second.benches);

        // One bench per planted row, sitting inside the garden with room for
        // its eastward offset.
        assert_eq!(first.benches.len(), config.tree_count.div_ceil(4));
        for bench in &first.benches {
            assert!((bench.x - GARDEN_CENTER.x).abs() <= GARDEN_SIZE / 2.0 + 12.0);
            assert!((bench.z - GARDEN_CENTER.z).abs() <= GARDEN_SIZE / 2.0);
        }
    }

    #[test]
    fn building_heights_stay_in_range() {
        let config = LayoutConfig::default();
        for building in plan_city(&config).buildings {
            assert!(building.height >= config.building_min_height);
            assert!(building.height < config.building_max_height);
        }
    }

    #[test]
    fn window_rows_scale_with_height() {
        let (short_rows, cols) = window_grid(22.0);
        let (tall_rows, _) = window_grid(58.0);
        assert_eq!(cols, 3);
        assert!(short_rows >= 1);
        assert!(tall_rows > short_rows);
        // Extremes clamp instead of degenerating.
        assert_eq!(window_grid(1.0).0, 1);
        assert_eq!(window_grid(500.0).0, 6);
    }

    #[test]
    fn network_mirrors_the_plan() {
        let plan = plan_city(&LayoutConfig::default());
        let network = build_network(&plan);

        assert_eq!(
            network.edges_of_kind(FlowKind::Energy).count(),
            plan.buildings.len() * 2
        );
        // Trunk plus two pipe runs per well.
        assert_eq!(
            network.edges_of_kind(FlowKind::Water).count(),
            1 + plan.wells.len() * 2
        );

        let trunk = network.trunk().expect("trunk edge registered");
        assert_eq!(trunk.start, RIVER_TAP);
        assert_eq!(trunk.end.x, GARDEN_CENTER.x);
        assert_eq!(trunk.end.z, GARDEN_CENTER.z);
    }
}
