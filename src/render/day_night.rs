//! Day/night cycle driving sky color and light intensities.
//!
//! The cycle is a single normalized phase wrapping modulo 1. Brightness is
//! `|sin(phase * pi)|`, so phase 0 and 1 are both night and 0.5 is peak day.
//! Sky color lerps between fixed night and day colors by that brightness;
//! ambient and directional intensities are rescaled independently so they do
//! not have to coincide with sky brightness numerically.

use bevy::prelude::*;

pub struct DayNightPlugin;

impl Plugin for DayNightPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DayPhase>()
            .init_resource::<DayNightConfig>()
            .add_systems(Startup, setup_lighting)
            .add_systems(Update, (advance_phase, apply_lighting).chain());
    }
}

/// Normalized time of day (0.0 = midnight, 0.5 = noon, wraps at 1.0).
#[derive(Resource)]
pub struct DayPhase {
    pub phase: f32,
    /// Speed multiplier over the configured cycle duration.
    pub speed: f32,
    pub paused: bool,
}

impl Default for DayPhase {
    fn default() -> Self {
        Self {
            phase: 0.35, // Start mid-morning
            speed: 1.0,
            paused: false,
        }
    }
}

#[derive(Resource)]
pub struct DayNightConfig {
    /// Seconds per full cycle at speed 1.0.
    pub cycle_seconds: f32,
    pub night_sky: Color,
    pub day_sky: Color,
    pub ambient_base: f32,
    pub ambient_range: f32,
    pub sun_base: f32,
    pub sun_range: f32,
}

impl Default for DayNightConfig {
    fn default() -> Self {
        Self {
            cycle_seconds: 240.0,
            night_sky: Color::srgb(0.02, 0.02, 0.05),
            day_sky: Color::srgb(0.5, 0.7, 0.9),
            ambient_base: 40.0,
            ambient_range: 360.0,
            sun_base: 500.0,
            sun_range: 99_500.0,
        }
    }
}

/// Marker component for the main directional light.
#[derive(Component)]
pub struct Sun;

/// Brightness bump over one phase cycle: 0 at phase 0 and 1, peak 1 at 0.5,
/// periodic with period 1.
pub fn brightness(phase: f32) -> f32 {
    (phase * std::f32::consts::PI).sin().abs()
}

pub fn sky_color(config: &DayNightConfig, brightness: f32) -> Color {
    lerp_color(config.night_sky, config.day_sky, brightness)
}

pub fn lerp_color(a: Color, b: Color, t: f32) -> Color {
    let a_linear = a.to_linear();
    let b_linear = b.to_linear();

    Color::linear_rgb(
        a_linear.red + (b_linear.red - a_linear.red) * t,
        a_linear.green + (b_linear.green - a_linear.green) * t,
        a_linear.blue + (b_linear.blue - a_linear.blue) * t,
    )
}

fn setup_lighting(mut commands: Commands) {
    // Ambient brightness is rewritten every frame by apply_lighting.
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 300.0,
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 100_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(80.0, 180.0, 80.0).looking_at(Vec3::ZERO, Vec3::Y),
        Sun,
    ));
}

fn advance_phase(
    time: Res<Time>,
    keyboard: Res<ButtonInput<KeyCode>>,
    config: Res<DayNightConfig>,
    mut day: ResMut<DayPhase>,
) {
    // Toggle pause with P, speed with [ and ]
    if keyboard.just_pressed(KeyCode::KeyP) {
        day.paused = !day.paused;
    }
    if keyboard.just_pressed(KeyCode::BracketLeft) {
        day.speed = (day.speed * 0.5).max(0.1);
    }
    if keyboard.just_pressed(KeyCode::BracketRight) {
        day.speed = (day.speed * 2.0).min(10.0);
    }

    if !day.paused {
        let delta = time.delta_secs() * day.speed;
        day.phase = (day.phase + delta / config.cycle_seconds).fract();
    }
}

fn apply_lighting(
    day: Res<DayPhase>,
    config: Res<DayNightConfig>,
    mut clear_color: ResMut<ClearColor>,
    mut ambient: ResMut<AmbientLight>,
    mut suns: Query<&mut DirectionalLight, With<Sun>>,
) {
    let level = brightness(day.phase);

    clear_color.0 = sky_color(&config, level);
    ambient.brightness = config.ambient_base + config.ambient_range * level;
    for mut sun in &mut suns {
        sun.illuminance = config.sun_base + config.sun_range * level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brightness_is_dark_at_cycle_edges_and_peaks_at_noon() {
        assert!(brightness(0.0).abs() < 1e-6);
        assert!(brightness(1.0).abs() < 1e-5);
        assert!((brightness(0.5) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn brightness_is_periodic_with_period_one() {
        for phase in [0.1, 0.25, 0.4, 0.73, 0.9] {
            assert!((brightness(phase) - brightness(phase + 1.0)).abs() < 1e-4);
        }
    }

    #[test]
    fn sky_interpolates_between_night_and_day() {
        let config = DayNightConfig::default();
        let night = sky_color(&config, 0.0).to_linear();
        let day = sky_color(&config, 1.0).to_linear();
        assert!((night.red - config.night_sky.to_linear().red).abs() < 1e-6);
        assert!((day.blue - config.day_sky.to_linear().blue).abs() < 1e-6);

        // Midpoint sits strictly between the two endpoints.
        let mid = sky_color(&config, 0.5).to_linear();
        assert!(mid.red > night.red && mid.red < day.red);
    }

    #[test]
    fn light_intensities_rescale_independently() {
        let config = DayNightConfig::default();
        let ambient_night = config.ambient_base;
        let ambient_noon = config.ambient_base + config.ambient_range;
        let sun_noon = config.sun_base + config.sun_range * brightness(0.5);
        assert!(ambient_noon > ambient_night);
        assert!((sun_noon - 100_000.0).abs() < 1.0);
    }
}
