//! Scene construction from a city plan, plus in-place status refresh.
//!
//! `build_city` runs once at startup: it plans the layout, spawns every
//! static entity (ground, river, garden, trees, street lamps, powerhouse,
//! solar row, well row, buildings with doors/windows/roofs, labels) and the
//! connector network, then publishes the flow topology and building anchors
//! for the animator. Connector colors and entity statuses are derived from
//! the same `DisruptionState` read in the same pass.
//!
//! Disruption changes never rebuild the scene: `refresh_status` rewrites the
//! status components and swaps connector material handles in place, so entity
//! counts are invariant across flag flips.

use bevy::prelude::*;

use crate::procgen::connector::connector_transform;
use crate::procgen::plan::{
    build_network, plan_city, BuildingPlan, CityPlan, LayoutConfig, GARDEN_CENTER, GARDEN_SIZE,
    POWERHOUSE_ANCHOR, RIVER_CENTER, RIVER_SIZE, WALKWAY_CENTER, WALKWAY_SIZE,
};
use crate::registry::{derive_status, Infra, InfraCategory, InfraName, InfraStatus, PickVolume};
use crate::sim_state::DisruptionState;

pub struct LayoutPlugin;

impl Plugin for LayoutPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LayoutConfig>()
            .add_systems(Startup, build_city)
            .add_systems(Update, refresh_status);
    }
}

const PIPE_RADIUS: f32 = 1.5;
const POWER_LINE_RADIUS: f32 = 0.6;

/// Roof anchors of every building, in plan order. The flow animator sizes its
/// particle pool from this list.
#[derive(Resource, Default)]
pub struct BuildingAnchors(pub Vec<Vec3>);

/// Shared material handles for connector recoloring. Swapping handles is the
/// whole cost of a palette change.
#[derive(Resource)]
pub struct InfraPalette {
    pub pipe_ok: Handle<StandardMaterial>,
    pub pipe_alert: Handle<StandardMaterial>,
    pub line_ok: Handle<StandardMaterial>,
    pub line_alert: Handle<StandardMaterial>,
}

impl InfraPalette {
    pub fn pipe(&self, flags: &DisruptionState) -> Handle<StandardMaterial> {
        if flags.water_disrupted {
            self.pipe_alert.clone()
        } else {
            self.pipe_ok.clone()
        }
    }

    pub fn line(&self, flags: &DisruptionState) -> Handle<StandardMaterial> {
        if flags.energy_disrupted {
            self.line_alert.clone()
        } else {
            self.line_ok.clone()
        }
    }
}

fn build_city(
    mut commands: Commands,
    config: Res<LayoutConfig>,
    disruption: Res<DisruptionState>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let plan = plan_city(&config);
    info!(
        "Building city: {} buildings, {} wells, {} solar panels",
        plan.buildings.len(),
        plan.wells.len(),
        plan.solar.len()
    );

    let palette = InfraPalette {
        pipe_ok: materials.add(StandardMaterial {
            base_color: Color::srgba(0.2, 0.6, 1.0, 0.7),
            alpha_mode: AlphaMode::Blend,
            metallic: 0.7,
            perceptual_roughness: 0.2,
            ..default()
        }),
        pipe_alert: materials.add(StandardMaterial {
            base_color: Color::srgba(0.91, 0.3, 0.24, 0.85),
            alpha_mode: AlphaMode::Blend,
            metallic: 0.5,
            perceptual_roughness: 0.3,
            ..default()
        }),
        line_ok: materials.add(StandardMaterial {
            base_color: Color::srgb(0.95, 0.77, 0.06),
            emissive: LinearRgba::new(0.4, 0.3, 0.0, 1.0),
            ..default()
        }),
        line_alert: materials.add(StandardMaterial {
            base_color: Color::srgb(0.9, 0.49, 0.13),
            emissive: LinearRgba::new(0.5, 0.15, 0.0, 1.0),
            ..default()
        }),
    };

    spawn_ground(&mut commands, &mut meshes, &mut materials);
    spawn_river(&mut commands, &mut meshes, &mut materials, &disruption);
    spawn_garden(&mut commands, &mut meshes, &mut materials, &plan, &disruption);
    spawn_lamps(&mut commands, &mut meshes, &mut materials, &plan);
    spawn_powerhouse(&mut commands, &mut meshes, &mut materials, &disruption);
    spawn_solar_row(&mut commands, &mut meshes, &mut materials, &plan, &disruption);
    spawn_wells(&mut commands, &mut meshes, &mut materials, &plan, &disruption);
    spawn_buildings(&mut commands, &mut meshes, &mut materials, &plan, &disruption);
    spawn_connectors(&mut commands, &mut meshes, &palette, &plan, &disruption);

    commands.insert_resource(BuildingAnchors(
        plan.buildings.iter().map(BuildingPlan::anchor).collect(),
    ));
    commands.insert_resource(build_network(&plan));
    commands.insert_resource(palette);
}

/// Swap statuses and connector palettes when the flags change. No entity is
/// created or destroyed here.
fn refresh_status(
    disruption: Res<DisruptionState>,
    palette: Option<Res<InfraPalette>>,
    mut infra: Query<(&Infra, &mut InfraStatus, &mut MeshMaterial3d<StandardMaterial>)>,
) {
    if !disruption.is_changed() {
        return;
    }
    let Some(palette) = palette else {
        return;
    };

    for (infra, mut status, mut material) in &mut infra {
        let next = derive_status(infra.category, &disruption);
        if *status != next {
            *status = next;
        }
        match infra.category {
            InfraCategory::Pipe => material.0 = palette.pipe(&disruption),
            InfraCategory::PowerLine => material.0 = palette.line(&disruption),
            _ => {}
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn spawn_infra(
    commands: &mut Commands,
    mesh: Handle<Mesh>,
    material: Handle<StandardMaterial>,
    transform: Transform,
    category: InfraCategory,
    flags: &DisruptionState,
    name: String,
    volume: PickVolume,
) {
    commands.spawn((
        Mesh3d(mesh),
        MeshMaterial3d(material),
        transform,
        Infra { category },
        derive_status(category, flags),
        InfraName(name),
        volume,
    ));
}

/// Floating name plate above an entity. Plates are registry entities of their
/// own (category `Label`) so the inspector can resolve them.
fn spawn_label(
    commands: &mut Commands,
    mesh: Handle<Mesh>,
    material: Handle<StandardMaterial>,
    position: Vec3,
    flags: &DisruptionState,
    text: &str,
) {
    spawn_infra(
        commands,
        mesh,
        material,
        Transform::from_translation(position),
        InfraCategory::Label,
        flags,
        format!("{text} (label)"),
        PickVolume::from_center_size(position, Vec3::new(16.0, 4.0, 0.6)),
    );
}

fn spawn_ground(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(600.0, 600.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.56, 0.84, 0.58),
            perceptual_roughness: 0.7,
            ..default()
        })),
        Transform::IDENTITY,
    ));
}

fn spawn_river(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    flags: &DisruptionState,
) {
    let water = materials.add(StandardMaterial {
        base_color: Color::srgba(0.2, 0.6, 1.0, 0.85),
        alpha_mode: AlphaMode::Blend,
        metallic: 0.2,
        perceptual_roughness: 0.25,
        ..default()
    });
    spawn_infra(
        commands,
        meshes.add(Cuboid::new(RIVER_SIZE.x, RIVER_SIZE.y, RIVER_SIZE.z)),
        water,
        Transform::from_translation(RIVER_CENTER),
        InfraCategory::River,
        flags,
        "Cauvery River".into(),
        PickVolume::from_center_size(RIVER_CENTER, RIVER_SIZE),
    );

    // Walkway strip along the east bank.
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(
            WALKWAY_SIZE.x,
            WALKWAY_SIZE.y,
            WALKWAY_SIZE.z,
        ))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.82, 0.71, 0.55),
            perceptual_roughness: 0.8,
            ..default()
        })),
        Transform::from_translation(WALKWAY_CENTER),
    ));

    let plate = label_plate(meshes, materials);
    spawn_label(
        commands,
        plate.0.clone(),
        plate.1.clone(),
        RIVER_CENTER + Vec3::Y * 14.0,
        flags,
        "Cauvery River",
    );
    spawn_label(
        commands,
        plate.0,
        plate.1,
        WALKWAY_CENTER + Vec3::Y * 8.0,
        flags,
        "Riverside Walk",
    );
}

fn label_plate(
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) -> (Handle<Mesh>, Handle<StandardMaterial>) {
    (
        meshes.add(Cuboid::new(16.0, 4.0, 0.6)),
        materials.add(StandardMaterial {
            base_color: Color::srgba(1.0, 1.0, 1.0, 0.85),
            alpha_mode: AlphaMode::Blend,
            unlit: true,
            ..default()
        }),
    )
}

fn spawn_garden(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    plan: &CityPlan,
    flags: &DisruptionState,
) {
    spawn_infra(
        commands,
        meshes.add(Cuboid::new(GARDEN_SIZE, 2.0, GARDEN_SIZE)),
        materials.add(StandardMaterial {
            base_color: Color::srgb(0.13, 0.55, 0.13),
            perceptual_roughness: 0.6,
            ..default()
        }),
        Transform::from_translation(GARDEN_CENTER),
        InfraCategory::Garden,
        flags,
        "Central Garden".into(),
        PickVolume::from_center_size(GARDEN_CENTER, Vec3::new(GARDEN_SIZE, 4.0, GARDEN_SIZE)),
    );

    // Pond and walking path, purely decorative.
    commands.spawn((
        Mesh3d(meshes.add(Cylinder::new(8.0, 1.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgba(0.31, 0.76, 0.97, 0.7),
            alpha_mode: AlphaMode::Blend,
            perceptual_roughness: 0.3,
            metallic: 0.5,
            ..default()
        })),
        Transform::from_translation(GARDEN_CENTER + Vec3::new(10.0, 1.6, -10.0)),
    ));
    commands.spawn((
        Mesh3d(meshes.add(Torus {
            minor_radius: 1.2,
            major_radius: 18.0,
        })),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.82, 0.71, 0.55),
            perceptual_roughness: 0.8,
            ..default()
        })),
        Transform::from_translation(GARDEN_CENTER + Vec3::Y * 1.2),
    ));

    spawn_trees(commands, meshes, materials, plan);

    let plate = label_plate(meshes, materials);
    spawn_label(
        commands,
        plate.0,
        plate.1,
        GARDEN_CENTER + Vec3::Y * 16.0,
        flags,
        "Central Garden",
    );
}

fn spawn_trees(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    plan: &CityPlan,
) {
    let trunk_mesh = meshes.add(Cylinder::new(1.2, 10.0));
    let trunk_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.49, 0.29, 0.01),
        perceptual_roughness: 0.8,
        ..default()
    });
    let foliage_mesh = meshes.add(Sphere::new(5.0));
    let foliage_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.23, 0.49, 0.23),
        perceptual_roughness: 0.4,
        ..default()
    });
    let cone_mesh = meshes.add(Cone {
        radius: 5.0,
        height: 5.0,
    });
    let conifer_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.18, 0.55, 0.34),
        perceptual_roughness: 0.4,
        ..default()
    });

    for tree in &plan.trees {
        commands.spawn((
            Mesh3d(trunk_mesh.clone()),
            MeshMaterial3d(trunk_material.clone()),
            Transform::from_translation(tree.position + Vec3::Y * 5.0),
        ));
        if tree.conifer {
            for tier in 0..3 {
                let scale = 1.0 - tier as f32 * 0.25;
                commands.spawn((
                    Mesh3d(cone_mesh.clone()),
                    MeshMaterial3d(conifer_material.clone()),
                    Transform::from_translation(
                        tree.position + Vec3::Y * (10.0 + tier as f32 * 3.5),
                    )
                    .with_scale(Vec3::new(scale, 1.0, scale)),
                ));
            }
        } else {
            commands.spawn((
                Mesh3d(foliage_mesh.clone()),
                MeshMaterial3d(foliage_material.clone()),
                Transform::from_translation(tree.position + Vec3::Y * 13.0).with_scale(Vec3::new(
                    1.2,
                    tree.foliage_scale * 1.3,
                    1.2,
                )),
            ));
        }
    }

    let bench_mesh = meshes.add(Cuboid::new(5.0, 1.0, 1.5));
    let bench_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.76, 0.7, 0.5),
        perceptual_roughness: 0.8,
        ..default()
    });
    for bench in &plan.benches {
        commands.spawn((
            Mesh3d(bench_mesh.clone()),
            MeshMaterial3d(bench_material.clone()),
            Transform::from_translation(*bench + Vec3::Y * 2.5),
        ));
    }
}

fn spawn_lamps(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    plan: &CityPlan,
) {
    let pole_mesh = meshes.add(Cylinder::new(0.3, 10.0));
    let pole_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.2, 0.2, 0.22),
        metallic: 0.4,
        perceptual_roughness: 0.6,
        ..default()
    });
    let head_mesh = meshes.add(Sphere::new(0.8));
    let head_material = materials.add(StandardMaterial {
        base_color: Color::srgb(1.0, 0.95, 0.8),
        emissive: LinearRgba::new(1.0, 0.9, 0.7, 1.0),
        ..default()
    });

    for lamp in &plan.lamps {
        commands.spawn((
            Mesh3d(pole_mesh.clone()),
            MeshMaterial3d(pole_material.clone()),
            Transform::from_translation(*lamp + Vec3::Y * 5.0),
        ));
        commands.spawn((
            Mesh3d(head_mesh.clone()),
            MeshMaterial3d(head_material.clone()),
            Transform::from_translation(*lamp + Vec3::Y * 10.8),
            PointLight {
                color: Color::srgb(1.0, 0.85, 0.6),
                intensity: 20_000.0,
                range: 45.0,
                shadows_enabled: false,
                ..default()
            },
        ));
    }
}

fn spawn_powerhouse(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    flags: &DisruptionState,
) {
    let hall_center = POWERHOUSE_ANCHOR + Vec3::Y * 12.0;
    spawn_infra(
        commands,
        meshes.add(Cuboid::new(40.0, 24.0, 30.0)),
        materials.add(StandardMaterial {
            base_color: Color::srgb(0.35, 0.35, 0.4),
            metallic: 0.3,
            perceptual_roughness: 0.5,
            ..default()
        }),
        Transform::from_translation(hall_center),
        InfraCategory::Powerhouse,
        flags,
        "Powerhouse".into(),
        PickVolume::from_center_size(
            POWERHOUSE_ANCHOR + Vec3::Y * 17.0,
            Vec3::new(40.0, 34.0, 30.0),
        ),
    );

    // Stack; its tip is where the power lines originate.
    commands.spawn((
        Mesh3d(meshes.add(Cylinder::new(3.0, 20.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.25, 0.25, 0.28),
            perceptual_roughness: 0.7,
            ..default()
        })),
        Transform::from_translation(POWERHOUSE_ANCHOR + Vec3::new(12.0, 24.0, 0.0)),
    ));

    let plate = label_plate(meshes, materials);
    spawn_label(
        commands,
        plate.0,
        plate.1,
        POWERHOUSE_ANCHOR + Vec3::Y * 50.0,
        flags,
        "Powerhouse",
    );
}

fn spawn_solar_row(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    plan: &CityPlan,
    flags: &DisruptionState,
) {
    let panel_mesh = meshes.add(Cuboid::new(14.0, 0.8, 10.0));
    let panel_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.13, 0.13, 0.67),
        metallic: 0.7,
        perceptual_roughness: 0.3,
        ..default()
    });
    let stand_mesh = meshes.add(Cylinder::new(0.8, 4.0));
    let stand_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.6, 0.6, 0.62),
        metallic: 0.5,
        ..default()
    });

    for (index, position) in plan.solar.iter().enumerate() {
        commands.spawn((
            Mesh3d(stand_mesh.clone()),
            MeshMaterial3d(stand_material.clone()),
            Transform::from_translation(*position + Vec3::Y * 2.0),
        ));
        spawn_infra(
            commands,
            panel_mesh.clone(),
            panel_material.clone(),
            Transform::from_translation(*position + Vec3::Y * 4.0)
                .with_rotation(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_8)),
            InfraCategory::Solar,
            flags,
            format!("Solar Panel {}", index + 1),
            PickVolume::from_center_size(*position + Vec3::Y * 4.0, Vec3::new(14.0, 8.0, 12.0)),
        );
    }
}

fn spawn_wells(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    plan: &CityPlan,
    flags: &DisruptionState,
) {
    let drum_mesh = meshes.add(Cylinder::new(7.0, 16.0));
    let drum_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.54, 0.61, 0.66),
        perceptual_roughness: 0.7,
        ..default()
    });
    let roof_mesh = meshes.add(Cone {
        radius: 8.0,
        height: 6.0,
    });
    let roof_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.49, 0.29, 0.01),
        ..default()
    });
    let bucket_mesh = meshes.add(Cylinder::new(1.2, 2.0));
    let bucket_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.35, 0.22, 0.08),
        perceptual_roughness: 0.9,
        ..default()
    });
    let plate = label_plate(meshes, materials);

    for (index, well) in plan.wells.iter().enumerate() {
        spawn_infra(
            commands,
            drum_mesh.clone(),
            drum_material.clone(),
            Transform::from_translation(well.position + Vec3::Y * 8.0),
            InfraCategory::Well,
            flags,
            format!("Well {}", index + 1),
            PickVolume::from_center_size(well.position + Vec3::Y * 9.5, Vec3::new(16.0, 22.0, 16.0)),
        );
        commands.spawn((
            Mesh3d(roof_mesh.clone()),
            MeshMaterial3d(roof_material.clone()),
            Transform::from_translation(well.position + Vec3::Y * 19.0),
        ));
        // Bucket hanging at the rim.
        commands.spawn((
            Mesh3d(bucket_mesh.clone()),
            MeshMaterial3d(bucket_material.clone()),
            Transform::from_translation(well.position + Vec3::new(0.0, 16.5, 5.0)),
        ));
        spawn_label(
            commands,
            plate.0.clone(),
            plate.1.clone(),
            well.position + Vec3::Y * 26.0,
            flags,
            &format!("Well {}", index + 1),
        );
    }
}

fn spawn_buildings(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    plan: &CityPlan,
    flags: &DisruptionState,
) {
    let body_mesh = meshes.add(Cuboid::new(1.0, 1.0, 1.0));
    let body_materials: Vec<_> = [
        Color::srgb_u8(0xf5, 0xf5, 0xf5),
        Color::srgb_u8(0xe0, 0xc0, 0x97),
        Color::srgb_u8(0xb0, 0xb0, 0xb0),
        Color::srgb_u8(0x8d, 0x99, 0xae),
        Color::srgb_u8(0x6d, 0x68, 0x75),
        Color::srgb_u8(0x45, 0x7b, 0x9d),
        Color::srgb_u8(0xa8, 0xda, 0xdc),
        Color::srgb_u8(0xf4, 0xa2, 0x61),
        Color::srgb_u8(0xe7, 0x6f, 0x51),
        Color::srgb_u8(0x26, 0x46, 0x53),
    ]
    .into_iter()
    .map(|color| {
        materials.add(StandardMaterial {
            base_color: color,
            metallic: 0.3,
            perceptual_roughness: 0.5,
            ..default()
        })
    })
    .collect();
    let roof_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.45, 0.45, 0.48),
        perceptual_roughness: 0.8,
        ..default()
    });
    let door_mesh = meshes.add(Cuboid::new(4.0, 8.0, 1.5));
    let door_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.4, 0.26, 0.13),
        ..default()
    });
    let window_mesh = meshes.add(Cuboid::new(2.5, 3.0, 0.7));
    let window_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.53, 0.81, 0.92),
        metallic: 0.1,
        perceptual_roughness: 0.2,
        emissive: LinearRgba::new(0.08, 0.08, 0.17, 1.0),
        ..default()
    });
    let tank_mesh = meshes.add(Cylinder::new(2.0, 4.0));
    let tank_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.8, 0.8, 0.8),
        ..default()
    });
    let ac_mesh = meshes.add(Cuboid::new(2.0, 1.2, 1.2));
    let ac_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.88, 0.88, 0.88),
        perceptual_roughness: 0.6,
        ..default()
    });
    let rail_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.53, 0.53, 0.53),
        ..default()
    });
    let balcony_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.69, 0.69, 0.69),
        perceptual_roughness: 0.5,
        ..default()
    });
    let plate = label_plate(meshes, materials);

    for (index, building) in plan.buildings.iter().enumerate() {
        let size = Vec3::new(building.footprint.x, building.height, building.footprint.y);
        let center = building.position + Vec3::Y * (building.height / 2.0);
        spawn_infra(
            commands,
            body_mesh.clone(),
            body_materials[building.color_index].clone(),
            Transform::from_translation(center).with_scale(size),
            InfraCategory::Building,
            flags,
            format!("Building {}", index + 1),
            PickVolume::from_center_size(center, size),
        );

        // Roof slab overhanging the body.
        commands.spawn((
            Mesh3d(body_mesh.clone()),
            MeshMaterial3d(roof_material.clone()),
            Transform::from_translation(building.position + Vec3::Y * (building.height + 0.75))
                .with_scale(Vec3::new(size.x + 2.0, 1.5, size.z + 2.0)),
        ));

        // Seeded rooftop clutter on top of the slab.
        let roof_top = building.height + 1.5;
        if building.roof.water_tank {
            commands.spawn((
                Mesh3d(tank_mesh.clone()),
                MeshMaterial3d(tank_material.clone()),
                Transform::from_translation(
                    building.position + Vec3::new(-4.0, roof_top + 2.0, 0.0),
                ),
            ));
        }
        if building.roof.ac_unit {
            commands.spawn((
                Mesh3d(ac_mesh.clone()),
                MeshMaterial3d(ac_material.clone()),
                Transform::from_translation(
                    building.position + Vec3::new(3.0, roof_top + 0.6, 0.0),
                ),
            ));
        }
        if building.roof.railing {
            commands.spawn((
                Mesh3d(body_mesh.clone()),
                MeshMaterial3d(rail_material.clone()),
                Transform::from_translation(
                    building.position + Vec3::new(0.0, roof_top + 0.25, size.z / 2.0 - 0.3),
                )
                .with_scale(Vec3::new(size.x - 2.0, 0.5, 0.5)),
            ));
        }
        if building.roof.balconies {
            for level in 0..2 {
                commands.spawn((
                    Mesh3d(body_mesh.clone()),
                    MeshMaterial3d(balcony_material.clone()),
                    Transform::from_translation(building.position
                        + Vec3::new(0.0, 10.0 + level as f32 * 10.0, size.z / 2.0 + 1.2))
                    .with_scale(Vec3::new(6.0, 0.7, 2.2)),
                ));
            }
        }

        let front = building.position.z + building.footprint.y / 2.0;
        commands.spawn((
            Mesh3d(door_mesh.clone()),
            MeshMaterial3d(door_material.clone()),
            Transform::from_xyz(building.position.x, 4.0, front + 0.8),
        ));

        // Window grid on the front facade; row count comes from the height.
        for row in 0..building.window_rows {
            for col in 0..building.window_cols {
                let x = building.position.x
                    + (col as f32 - (building.window_cols as f32 - 1.0) / 2.0) * 5.0;
                commands.spawn((
                    Mesh3d(window_mesh.clone()),
                    MeshMaterial3d(window_material.clone()),
                    Transform::from_xyz(x, 10.0 + row as f32 * 8.0, front + 0.8),
                ));
            }
        }

        spawn_label(
            commands,
            plate.0.clone(),
            plate.1.clone(),
            building.position + Vec3::Y * (building.height + 14.0),
            flags,
            &format!("Building {}", index + 1),
        );
    }
}

fn spawn_connectors(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    palette: &InfraPalette,
    plan: &CityPlan,
    flags: &DisruptionState,
) {
    // One unit cylinder shared by every pipe and power line.
    let unit_cylinder = meshes.add(Cylinder::new(1.0, 1.0));

    for pipe in &plan.pipes {
        spawn_infra(
            commands,
            unit_cylinder.clone(),
            palette.pipe(flags),
            connector_transform(pipe.start, pipe.end, PIPE_RADIUS),
            InfraCategory::Pipe,
            flags,
            "Water Pipe".into(),
            PickVolume::from_segment(pipe.start, pipe.end, PIPE_RADIUS),
        );
    }
    for line in &plan.power_lines {
        spawn_infra(
            commands,
            unit_cylinder.clone(),
            palette.line(flags),
            connector_transform(line.start, line.end, POWER_LINE_RADIUS),
            InfraCategory::PowerLine,
            flags,
            "Power Line".into(),
            PickVolume::from_segment(line.start, line.end, POWER_LINE_RADIUS),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    fn test_palette() -> InfraPalette {
        InfraPalette {
            pipe_ok: Handle::weak_from_u128(0xA1),
            pipe_alert: Handle::weak_from_u128(0xA2),
            line_ok: Handle::weak_from_u128(0xB1),
            line_alert: Handle::weak_from_u128(0xB2),
        }
    }

    #[test]
    fn palette_selects_per_network_flag() {
        let palette = test_palette();

        let calm = DisruptionState::default();
        assert_eq!(palette.pipe(&calm), palette.pipe_ok);
        assert_eq!(palette.line(&calm), palette.line_ok);

        let water_out = DisruptionState {
            water_disrupted: true,
            ..default()
        };
        assert_eq!(palette.pipe(&water_out), palette.pipe_alert);
        // A water outage leaves power lines alone.
        assert_eq!(palette.line(&water_out), palette.line_ok);

        let energy_out = DisruptionState {
            energy_disrupted: true,
            ..default()
        };
        assert_eq!(palette.pipe(&energy_out), palette.pipe_ok);
        assert_eq!(palette.line(&energy_out), palette.line_alert);
    }

    #[test]
    fn toggling_water_swaps_pipe_palette_without_changing_counts() {
        let mut world = World::new();
        let palette = test_palette();
        let pipe_ok = palette.pipe_ok.clone();
        let pipe_alert = palette.pipe_alert.clone();
        let line_ok = palette.line_ok.clone();
        world.insert_resource(palette);
        world.insert_resource(DisruptionState::default());

        let pipe = world
            .spawn((
                Infra {
                    category: InfraCategory::Pipe,
                },
                InfraStatus::Ok,
                MeshMaterial3d(pipe_ok.clone()),
            ))
            .id();
        let line = world
            .spawn((
                Infra {
                    category: InfraCategory::PowerLine,
                },
                InfraStatus::Ok,
                MeshMaterial3d(line_ok.clone()),
            ))
            .id();
        let before = world.query::<&Infra>().iter(&world).count();

        world.resource_mut::<DisruptionState>().water_disrupted = true;
        world.run_system_once(refresh_status).unwrap();

        assert_eq!(
            world
                .get::<MeshMaterial3d<StandardMaterial>>(pipe)
                .unwrap()
                .0,
            pipe_alert
        );
        assert_eq!(*world.get::<InfraStatus>(pipe).unwrap(), InfraStatus::Disrupted);
        // The energy side is untouched by a water outage.
        assert_eq!(
            world
                .get::<MeshMaterial3d<StandardMaterial>>(line)
                .unwrap()
                .0,
            line_ok
        );
        assert_eq!(*world.get::<InfraStatus>(line).unwrap(), InfraStatus::Ok);

        // No entity was created or destroyed by the swap.
        assert_eq!(world.query::<&Infra>().iter(&world).count(), before);

        // Clearing the flag swaps straight back.
        world.resource_mut::<DisruptionState>().water_disrupted = false;
        world.run_system_once(refresh_status).unwrap();
        assert_eq!(
            world
                .get::<MeshMaterial3d<StandardMaterial>>(pipe)
                .unwrap()
                .0,
            pipe_ok
        );
        assert_eq!(*world.get::<InfraStatus>(pipe).unwrap(), InfraStatus::Ok);
    }
}
