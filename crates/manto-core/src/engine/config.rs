use crate::core::models::descriptor::GroupKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown kernel index {0}, expected 0..=7")]
pub struct UnknownKernel(pub u8);

/// The eight distance-weighting kernels of the projection engine, indexed
/// 0-7 in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Kernel {
    /// `v / d`
    InverseDistance,
    /// `v * 10^(-d/2)`
    ExpHalfDistance,
    /// `v / (1 + d)`, the softened inverse
    SoftenedInverse,
    /// `v * 10^(-d)`
    ExpDistance,
    /// `v / d^6`, van-der-Waals-like
    InverseSixthPower,
    /// `v / (4 pi eps d^2)`
    Coulomb,
    /// Debye-Hueckel screened electrostatics, distance taken in nm
    DebyeHueckel,
    /// Coulomb form with Debye screening applied on the Angstrom distance
    ScreenedCoulomb,
}

impl TryFrom<u8> for Kernel {
    type Error = UnknownKernel;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Ok(match index {
            0 => Kernel::InverseDistance,
            1 => Kernel::ExpHalfDistance,
            2 => Kernel::SoftenedInverse,
            3 => Kernel::ExpDistance,
            4 => Kernel::InverseSixthPower,
            5 => Kernel::Coulomb,
            6 => Kernel::DebyeHueckel,
            7 => Kernel::ScreenedCoulomb,
            other => return Err(UnknownKernel(other)),
        })
    }
}

impl From<Kernel> for u8 {
    fn from(kernel: Kernel) -> u8 {
        match kernel {
            Kernel::InverseDistance => 0,
            Kernel::ExpHalfDistance => 1,
            Kernel::SoftenedInverse => 2,
            Kernel::ExpDistance => 3,
            Kernel::InverseSixthPower => 4,
            Kernel::Coulomb => 5,
            Kernel::DebyeHueckel => 6,
            Kernel::ScreenedCoulomb => 7,
        }
    }
}

/// The scalar field mapped onto the molecular surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceProperty {
    /// Electrostatic potential from per-atom charges (PQR occupancy).
    Esp,
    /// Hydrophobicity from per-residue Kyte-Doolittle constants.
    Hyd,
}

/// Whether the orientation search keeps the maximal or minimal statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectMode {
    Max,
    Min,
}

/// Surface-level parameters of a descriptor definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceParams {
    /// Surface point resolution in points per Angstrom.
    pub resolution: f64,
    /// Probe radius used by the surface provider, in Angstroms.
    pub probe_radius: f64,
    pub property: SurfaceProperty,
    /// Kernel used to map the atomic property onto the surface.
    pub kernel: Kernel,
}

/// Parameters of the plane/patch placement and orientation search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionParams {
    /// Plane edge length (or patch radius) in Angstroms.
    pub size: f64,
    /// Grid spacing in Angstroms.
    pub density: f64,
    /// Clearance distance between plane and surface in Angstroms.
    pub distance: f64,
    /// Kernel used to map surface values onto the plane.
    pub kernel: Kernel,
    /// Number of candidate orientations to evaluate.
    pub orientations: usize,
    /// Substring locating the statistic that drives orientation selection.
    pub select_id: String,
    pub select_mode: SelectMode,
    /// Reuse the orientation set of the previous descriptor set instead of
    /// sampling a fresh one.
    #[serde(default)]
    pub reuse_orientations: bool,
}

/// The closed set of descriptor definition kinds and their payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "projection", rename_all = "lowercase")]
pub enum DescriptorKind {
    Plane(ProjectionParams),
    Patch(ProjectionParams),
    Sphere(ProjectionParams),
    Surface,
    Shape,
}

/// Naming and histogram scaling of the produced descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptorScaling {
    /// Short property name appended to every descriptor label (e.g. "esp").
    pub name: String,
    /// Width of one histogram bin in value units.
    #[serde(default = "DescriptorScaling::default_bin_width")]
    pub bin_width: f64,
}

impl DescriptorScaling {
    fn default_bin_width() -> f64 {
        1.0
    }

    /// The label suffix: capitalized name with a leading underscore
    /// ("esp" becomes "_Esp").
    pub fn suffix(&self) -> String {
        let mut chars = self.name.chars();
        let mut suffix: String = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        if !suffix.starts_with('_') {
            suffix.insert(0, '_');
        }
        suffix
    }
}

/// One descriptor definition: immutable after load, one list of these drives
/// descriptor computation for every observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptorSet {
    pub surface: SurfaceParams,
    #[serde(flatten)]
    pub kind: DescriptorKind,
    pub descriptor: DescriptorScaling,
}

impl DescriptorSet {
    /// Projection parameters, present only for orientation-searching kinds.
    pub fn projection(&self) -> Option<&ProjectionParams> {
        match &self.kind {
            DescriptorKind::Plane(p) | DescriptorKind::Patch(p) | DescriptorKind::Sphere(p) => {
                Some(p)
            }
            DescriptorKind::Surface | DescriptorKind::Shape => None,
        }
    }

    pub fn group_kind(&self) -> GroupKind {
        match &self.kind {
            DescriptorKind::Plane(_) => GroupKind::Plane,
            DescriptorKind::Patch(_) => GroupKind::Patch,
            DescriptorKind::Sphere(_) => GroupKind::Sphere,
            DescriptorKind::Surface => GroupKind::Surface,
            DescriptorKind::Shape => GroupKind::Shape,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_indices_round_trip() {
        for index in 0u8..=7 {
            let kernel = Kernel::try_from(index).unwrap();
            assert_eq!(u8::from(kernel), index);
        }
        assert_eq!(Kernel::try_from(8), Err(UnknownKernel(8)));
    }

    #[test]
    fn suffix_capitalizes_and_prefixes() {
        let scaling = DescriptorScaling {
            name: "esp".to_string(),
            bin_width: 1.0,
        };
        assert_eq!(scaling.suffix(), "_Esp");

        let underscored = DescriptorScaling {
            name: "_hyd".to_string(),
            bin_width: 1.0,
        };
        assert_eq!(underscored.suffix(), "_hyd");
    }

    #[test]
    fn descriptor_set_deserializes_from_json() {
        let json = r#"{
            "surface": {"resolution": 0.5, "probe_radius": 1.4, "property": "esp", "kernel": 0},
            "kind": "plane",
            "projection": {
                "size": 100.0, "density": 5.0, "distance": 3.0, "kernel": 0,
                "orientations": 120, "select_id": "meanSurfA", "select_mode": "max"
            },
            "descriptor": {"name": "esp", "bin_width": 0.4}
        }"#;
        let set: DescriptorSet = serde_json::from_str(json).unwrap();
        assert!(matches!(set.kind, DescriptorKind::Plane(_)));
        let p = set.projection().unwrap();
        assert_eq!(p.orientations, 120);
        assert!(!p.reuse_orientations);
        assert_eq!(set.surface.kernel, Kernel::InverseDistance);
    }

    #[test]
    fn kindless_payloads_deserialize_without_projection() {
        let json = r#"{
            "surface": {"resolution": 0.5, "probe_radius": 1.4, "property": "hyd", "kernel": 2},
            "kind": "shape",
            "descriptor": {"name": "hyd"}
        }"#;
        let set: DescriptorSet = serde_json::from_str(json).unwrap();
        assert!(set.projection().is_none());
        assert_eq!(set.descriptor.bin_width, 1.0);
    }
}
