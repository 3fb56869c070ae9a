//! Hover/click picking against the entity registry.
//!
//! The cursor position is projected to a world-space ray through the camera,
//! slab-tested against every live pick volume, and resolved to the nearest
//! hit. Hover tracks the pointer continuously; click commits the hit (or the
//! miss) to the selection. Both writes are idempotent for identical inputs,
//! and despawned entities can never match because only live entities carry
//! volumes.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use smallvec::SmallVec;

use crate::camera::OrbitCamera;
use crate::registry::PickVolume;

pub struct InspectPlugin;

impl Plugin for InspectPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InteractionState>()
            .add_systems(Update, (update_hover, handle_click));
    }
}

/// Hover and selection, written only here, read by the overlay UI.
#[derive(Resource, Default)]
pub struct InteractionState {
    pub hovered: Option<Entity>,
    pub selected: Option<Entity>,
}

/// Slab test. Returns the entry distance along the ray, clamped to 0 for
/// rays starting inside the box; `None` on a miss. Zero direction components
/// get an explicit band check instead of a reciprocal, so a ray lying on a
/// face never produces NaN.
pub fn ray_aabb(origin: Vec3, direction: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let mut entry = 0.0_f32;
    let mut exit = f32::INFINITY;

    for axis in 0..3 {
        if direction[axis] == 0.0 {
            if origin[axis] < min[axis] || origin[axis] > max[axis] {
                return None;
            }
            continue;
        }
        let inverse = direction[axis].recip();
        let mut near = (min[axis] - origin[axis]) * inverse;
        let mut far = (max[axis] - origin[axis]) * inverse;
        if near > far {
            std::mem::swap(&mut near, &mut far);
        }
        entry = entry.max(near);
        exit = exit.min(far);
        if exit < entry {
            return None;
        }
    }

    Some(entry)
}

/// Nearest intersected entity, by smallest ray parameter.
pub fn pick_nearest<'a>(
    origin: Vec3,
    direction: Vec3,
    volumes: impl Iterator<Item = (Entity, &'a PickVolume)>,
) -> Option<Entity> {
    let mut hits: SmallVec<[(Entity, f32); 8]> = SmallVec::new();
    for (entity, volume) in volumes {
        if let Some(distance) = ray_aabb(origin, direction, volume.min, volume.max) {
            hits.push((entity, distance));
        }
    }
    hits.iter()
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(entity, _)| *entity)
}

fn cursor_ray(
    windows: &Query<&Window, With<PrimaryWindow>>,
    cameras: &Query<(&Camera, &GlobalTransform), With<OrbitCamera>>,
) -> Option<(Vec3, Vec3)> {
    let window = windows.get_single().ok()?;
    let cursor = window.cursor_position()?;
    let (camera, camera_transform) = cameras.get_single().ok()?;
    let ray = camera.viewport_to_world(camera_transform, cursor).ok()?;
    Some((ray.origin, *ray.direction))
}

fn update_hover(
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<OrbitCamera>>,
    volumes: Query<(Entity, &PickVolume)>,
    mut state: ResMut<InteractionState>,
) {
    let hovered = cursor_ray(&windows, &cameras)
        .and_then(|(origin, direction)| pick_nearest(origin, direction, volumes.iter()));
    if state.hovered != hovered {
        state.hovered = hovered;
    }
}

fn handle_click(
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<OrbitCamera>>,
    volumes: Query<(Entity, &PickVolume)>,
    mut state: ResMut<InteractionState>,
) {
    if !mouse_buttons.just_pressed(MouseButton::Left) {
        return;
    }

    // A miss is a valid result: clicking empty sky clears the selection.
    let selected = cursor_ray(&windows, &cameras)
        .and_then(|(origin, direction)| pick_nearest(origin, direction, volumes.iter()));
    if state.selected != selected {
        state.selected = selected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_hits_box_ahead_and_reports_entry_distance() {
        let distance = ray_aabb(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::NEG_Z,
            Vec3::splat(-1.0),
            Vec3::splat(1.0),
        )
        .expect("ray aimed at the box");
        assert!((distance - 9.0).abs() < 1e-4);
    }

    #[test]
    fn ray_misses_box_beside_it() {
        assert!(ray_aabb(
            Vec3::new(5.0, 0.0, 10.0),
            Vec3::NEG_Z,
            Vec3::splat(-1.0),
            Vec3::splat(1.0),
        )
        .is_none());
    }

    #[test]
    fn ray_behind_box_does_not_hit() {
        assert!(ray_aabb(
            Vec3::new(0.0, 0.0, -10.0),
            Vec3::NEG_Z,
            Vec3::splat(-1.0),
            Vec3::splat(1.0),
        )
        .is_none());
    }

    #[test]
    fn ray_on_a_face_with_zero_axis_component_still_hits() {
        // Origin exactly on the x = -1 face, direction parallel to it. The
        // x band degenerates to a containment check and must not poison the
        // interval with NaN.
        let distance = ray_aabb(
            Vec3::new(-1.0, 0.0, 10.0),
            Vec3::NEG_Z,
            Vec3::splat(-1.0),
            Vec3::splat(1.0),
        )
        .expect("coplanar ray");
        assert!((distance - 9.0).abs() < 1e-4);
    }

    #[test]
    fn ray_outside_a_zero_axis_band_misses() {
        assert!(ray_aabb(
            Vec3::new(1.5, 0.0, 10.0),
            Vec3::NEG_Z,
            Vec3::splat(-1.0),
            Vec3::splat(1.0),
        )
        .is_none());
    }

    #[test]
    fn origin_inside_box_clamps_to_zero() {
        let distance = ray_aabb(Vec3::ZERO, Vec3::X, Vec3::splat(-1.0), Vec3::splat(1.0))
            .expect("origin inside");
        assert_eq!(distance, 0.0);
    }

    #[test]
    fn nearest_of_two_boxes_wins() {
        let near = Entity::from_raw(1);
        let far = Entity::from_raw(2);
        let near_volume = PickVolume {
            min: Vec3::new(-1.0, -1.0, 4.0),
            max: Vec3::new(1.0, 1.0, 6.0),
        };
        let far_volume = PickVolume {
            min: Vec3::new(-1.0, -1.0, 14.0),
            max: Vec3::new(1.0, 1.0, 16.0),
        };

        let picked = pick_nearest(
            Vec3::ZERO,
            Vec3::Z,
            [(near, &near_volume), (far, &far_volume)].into_iter(),
        );
        assert_eq!(picked, Some(near));
    }

    #[test]
    fn picking_is_deterministic_for_identical_inputs() {
        let entity = Entity::from_raw(7);
        let volume = PickVolume {
            min: Vec3::new(-2.0, 0.0, -2.0),
            max: Vec3::new(2.0, 4.0, 2.0),
        };
        let origin = Vec3::new(0.0, 20.0, 0.0);
        let direction = Vec3::NEG_Y;

        let first = pick_nearest(origin, direction, [(entity, &volume)].into_iter());
        let second = pick_nearest(origin, direction, [(entity, &volume)].into_iter());
        assert_eq!(first, second);
        assert_eq!(first, Some(entity));
    }

    #[test]
    fn empty_registry_yields_no_hit() {
        assert_eq!(pick_nearest(Vec3::ZERO, Vec3::X, std::iter::empty()), None);
    }
}
