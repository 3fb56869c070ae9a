//! Oriented connector geometry for pipes and power lines.
//!
//! Connectors share a single unit cylinder mesh (radius 1, height 1) that is
//! oriented and scaled per instance, so every pipe and power line reuses one
//! mesh handle regardless of length.

use bevy::prelude::*;

/// Substitute length for degenerate segments so the orientation math never
/// sees a zero direction.
pub const MIN_CONNECTOR_LENGTH: f32 = 0.01;

/// Transform placing a unit cylinder along the segment `start -> end` with
/// the given radius. Bevy cylinders are authored along +Y, so the rotation
/// maps +Y onto the segment direction and the translation lands the centroid
/// on the segment midpoint.
pub fn connector_transform(start: Vec3, end: Vec3, radius: f32) -> Transform {
    let delta = end - start;
    let length = delta.length();
    if length < MIN_CONNECTOR_LENGTH {
        return Transform {
            translation: start,
            rotation: Quat::IDENTITY,
            scale: Vec3::new(radius, MIN_CONNECTOR_LENGTH, radius),
        };
    }
    Transform {
        translation: start + delta * 0.5,
        rotation: Quat::from_rotation_arc(Vec3::Y, delta / length),
        scale: Vec3::new(radius, length, radius),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connector_spans_segment_midpoint_and_length() {
        let start = Vec3::new(-10.0, 2.0, 4.0);
        let end = Vec3::new(6.0, 10.0, -4.0);
        let transform = connector_transform(start, end, 1.5);

        assert!(transform.translation.abs_diff_eq((start + end) * 0.5, 1e-4));
        assert!((transform.scale.y - start.distance(end)).abs() < 1e-3);
        assert_eq!(transform.scale.x, 1.5);

        // The cylinder's +Y axis must line up with the segment direction.
        let axis = transform.rotation * Vec3::Y;
        assert!(axis.abs_diff_eq((end - start).normalize(), 1e-4));
    }

    #[test]
    fn degenerate_segment_short_circuits_without_nan() {
        let point = Vec3::new(3.0, 1.0, 3.0);
        let transform = connector_transform(point, point, 0.6);
        assert!(transform.translation.is_finite());
        assert!(transform.rotation.is_finite());
        assert_eq!(transform.scale.y, MIN_CONNECTOR_LENGTH);
    }

    #[test]
    fn antiparallel_segment_still_orients() {
        // Straight down is the degenerate case for rotation-arc construction.
        let transform = connector_transform(Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO, 1.0);
        let axis = transform.rotation * Vec3::Y;
        assert!(axis.abs_diff_eq(Vec3::NEG_Y, 1e-4));
        assert!(transform.rotation.is_finite());
    }
}
