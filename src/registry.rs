//! The entity registry: typed, status-bearing, pickable infrastructure.
//!
//! Every infrastructure entity carries an [`Infra`] category tag, a derived
//! [`InfraStatus`], a display name, and a world-space [`PickVolume`] for ray
//! tests. The ECS is the registry arena: a disruption change rewrites status
//! in place rather than tearing the scene down, and despawned entities can
//! never be matched by picking because queries only see live entities.

use bevy::prelude::*;

use crate::sim_state::DisruptionState;

/// Category of an infrastructure entity.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum InfraCategory {
    Building,
    Well,
    Solar,
    Powerhouse,
    Pipe,
    PowerLine,
    Garden,
    River,
    Label,
}

impl InfraCategory {
    pub fn label(self) -> &'static str {
        match self {
            InfraCategory::Building => "Building",
            InfraCategory::Well => "Well",
            InfraCategory::Solar => "Solar Panel",
            InfraCategory::Powerhouse => "Powerhouse",
            InfraCategory::Pipe => "Pipe",
            InfraCategory::PowerLine => "Power Line",
            InfraCategory::Garden => "Garden",
            InfraCategory::River => "River",
            InfraCategory::Label => "Label",
        }
    }

    /// Categories whose supply depends on the water network.
    pub fn water_dependent(self) -> bool {
        matches!(
            self,
            InfraCategory::Well | InfraCategory::Pipe | InfraCategory::Building
        )
    }

    /// Categories whose supply depends on the energy network.
    pub fn energy_dependent(self) -> bool {
        matches!(
            self,
            InfraCategory::Powerhouse
                | InfraCategory::Solar
                | InfraCategory::PowerLine
                | InfraCategory::Building
        )
    }
}

/// Operational status, always recomputable from category + flags.
#[derive(Component, Clone, Copy, Debug, Eq, PartialEq)]
pub enum InfraStatus {
    Ok,
    Disrupted,
}

impl InfraStatus {
    pub fn label(self) -> &'static str {
        match self {
            InfraStatus::Ok => "OK",
            InfraStatus::Disrupted => "DISRUPTED",
        }
    }
}

/// Status is a pure function of the category and the current flags. Buildings
/// sit on both networks, so either flag disrupts them.
pub fn derive_status(category: InfraCategory, flags: &DisruptionState) -> InfraStatus {
    let water = category.water_dependent() && flags.water_disrupted;
    let energy = category.energy_dependent() && flags.energy_disrupted;
    if water || energy {
        InfraStatus::Disrupted
    } else {
        InfraStatus::Ok
    }
}

/// Category tag for a registry entity.
#[derive(Component, Clone, Copy, Debug)]
pub struct Infra {
    pub category: InfraCategory,
}

/// Display name shown by the inspection overlay.
#[derive(Component, Clone, Debug)]
pub struct InfraName(pub String);

/// World-space axis-aligned bounds used by the picking ray test.
#[derive(Component, Clone, Copy, Debug)]
pub struct PickVolume {
    pub min: Vec3,
    pub max: Vec3,
}

impl PickVolume {
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Bounds of a segment inflated by a radius, for connector cylinders.
    pub fn from_segment(start: Vec3, end: Vec3, radius: f32) -> Self {
        Self {
            min: start.min(end) - Vec3::splat(radius),
            max: start.max(end) + Vec3::splat(radius),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(water: bool, energy: bool) -> DisruptionState {
        DisruptionState {
            water_disrupted: water,
            energy_disrupted: energy,
        }
    }

    #[test]
    fn water_categories_follow_water_flag() {
        for category in [InfraCategory::Well, InfraCategory::Pipe] {
            assert_eq!(derive_status(category, &flags(false, false)), InfraStatus::Ok);
            assert_eq!(
                derive_status(category, &flags(true, false)),
                InfraStatus::Disrupted
            );
            // Energy outages do not touch the water network.
            assert_eq!(derive_status(category, &flags(false, true)), InfraStatus::Ok);
        }
    }

    #[test]
    fn energy_categories_follow_energy_flag() {
        for category in [
            InfraCategory::Powerhouse,
            InfraCategory::Solar,
            InfraCategory::PowerLine,
        ] {
            assert_eq!(derive_status(category, &flags(false, false)), InfraStatus::Ok);
            assert_eq!(
                derive_status(category, &flags(false, true)),
                InfraStatus::Disrupted
            );
            assert_eq!(derive_status(category, &flags(true, false)), InfraStatus::Ok);
        }
    }

    #[test]
    fn buildings_are_disrupted_by_either_network() {
        let building = InfraCategory::Building;
        assert_eq!(derive_status(building, &flags(false, false)), InfraStatus::Ok);
        assert_eq!(
            derive_status(building, &flags(true, false)),
            InfraStatus::Disrupted
        );
        assert_eq!(
            derive_status(building, &flags(false, true)),
            InfraStatus::Disrupted
        );
        assert_eq!(
            derive_status(building, &flags(true, true)),
            InfraStatus::Disrupted
        );
    }

    #[test]
    fn passive_categories_are_always_ok() {
        for category in [InfraCategory::Garden, InfraCategory::River, InfraCategory::Label] {
            assert_eq!(derive_status(category, &flags(true, true)), InfraStatus::Ok);
        }
    }

    #[test]
    fn segment_volume_contains_both_endpoints() {
        let volume = PickVolume::from_segment(Vec3::new(10.0, 5.0, -3.0), Vec3::ZERO, 1.5);
        assert!(volume.min.cmple(Vec3::ZERO).all());
        assert!(volume.max.cmpge(Vec3::new(10.0, 5.0, -3.0)).all());
    }
}
