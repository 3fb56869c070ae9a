//! Perspective orbit camera with zoom, pan, and an explicit resize contract.
//!
//! The camera orbits a look-at target: right-drag orbits, scroll dollies,
//! WASD/arrow keys pan the target across the ground plane. Window resizes
//! update the projection aspect ratio in place; the render loop never
//! restarts.

use bevy::{input::mouse::MouseMotion, prelude::*, window::WindowResized};

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraConfig>()
            .add_systems(Startup, setup_camera)
            .add_systems(
                Update,
                (
                    camera_zoom,
                    camera_orbit,
                    camera_pan,
                    apply_camera_transform,
                    handle_resize,
                ),
            );
    }
}

#[derive(Resource)]
pub struct CameraConfig {
    pub min_distance: f32,
    pub max_distance: f32,
    pub zoom_speed: f32,
    pub orbit_speed: f32,
    pub pan_speed: f32,
    /// Pitch limits keep the camera above the ground plane.
    pub min_pitch: f32,
    pub max_pitch: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_distance: 60.0,
            max_distance: 1200.0,
            zoom_speed: 30.0,
            orbit_speed: 0.005,
            pan_speed: 120.0,
            min_pitch: 0.08,
            max_pitch: std::f32::consts::FRAC_PI_2 * 0.92,
        }
    }
}

/// Orbit state; the transform is recomputed from it every frame.
#[derive(Component)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 494.0,
            yaw: 0.0,
            pitch: 0.55,
        }
    }
}

fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: 75.0_f32.to_radians(),
            near: 0.1,
            far: 2000.0,
            ..default()
        }),
        Transform::from_xyz(0.0, 260.0, 420.0).looking_at(Vec3::ZERO, Vec3::Y),
        OrbitCamera::default(),
    ));
}

fn camera_zoom(
    config: Res<CameraConfig>,
    mut scroll_events: EventReader<bevy::input::mouse::MouseWheel>,
    mut query: Query<&mut OrbitCamera>,
) {
    let scroll: f32 = scroll_events.read().map(|event| event.y).sum();
    if scroll == 0.0 {
        return;
    }

    for mut orbit in &mut query {
        orbit.distance = (orbit.distance - scroll * config.zoom_speed)
            .clamp(config.min_distance, config.max_distance);
    }
}

fn camera_orbit(
    config: Res<CameraConfig>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut query: Query<&mut OrbitCamera>,
) {
    if !mouse_buttons.pressed(MouseButton::Right) {
        mouse_motion.clear();
        return;
    }

    let mut delta = Vec2::ZERO;
    for event in mouse_motion.read() {
        delta += event.delta;
    }
    if delta == Vec2::ZERO {
        return;
    }

    for mut orbit in &mut query {
        orbit.yaw -= delta.x * config.orbit_speed;
        orbit.pitch =
            (orbit.pitch + delta.y * config.orbit_speed).clamp(config.min_pitch, config.max_pitch);
    }
}

fn camera_pan(
    config: Res<CameraConfig>,
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut query: Query<&mut OrbitCamera>,
) {
    let mut direction = Vec3::ZERO;
    if keys.pressed(KeyCode::KeyW) || keys.pressed(KeyCode::ArrowUp) {
        direction.z -= 1.0;
    }
    if keys.pressed(KeyCode::KeyS) || keys.pressed(KeyCode::ArrowDown) {
        direction.z += 1.0;
    }
    if keys.pressed(KeyCode::KeyA) || keys.pressed(KeyCode::ArrowLeft) {
        direction.x -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) || keys.pressed(KeyCode::ArrowRight) {
        direction.x += 1.0;
    }
    if direction == Vec3::ZERO {
        return;
    }

    let step = direction.normalize() * config.pan_speed * time.delta_secs();
    for mut orbit in &mut query {
        // Pan in the camera's yaw frame so W always moves "away".
        let rotated = Quat::from_rotation_y(orbit.yaw) * step;
        orbit.target += rotated;
    }
}

fn apply_camera_transform(mut query: Query<(&OrbitCamera, &mut Transform)>) {
    for (orbit, mut transform) in &mut query {
        let rotation = Quat::from_euler(EulerRot::YXZ, orbit.yaw, -orbit.pitch, 0.0);
        let offset = rotation * Vec3::new(0.0, 0.0, orbit.distance);
        *transform =
            Transform::from_translation(orbit.target + offset).looking_at(orbit.target, Vec3::Y);
    }
}

/// Resize contract: keep the projection aspect in sync with the surface.
/// Bevy resizes the output buffer itself; the projection update here makes
/// the dependency explicit instead of relying on camera-driver defaults.
fn handle_resize(
    mut events: EventReader<WindowResized>,
    mut query: Query<&mut Projection, With<OrbitCamera>>,
) {
    let Some(resized) = events.read().last() else {
        return;
    };
    if resized.height <= 0.0 {
        return;
    }

    for mut projection in &mut query {
        if let Projection::Perspective(ref mut perspective) = *projection {
            perspective.aspect_ratio = resized.width / resized.height;
        }
    }
}
