use serde::{Deserialize, Serialize};

/// A single named scalar summary value produced for one observation.
///
/// The stored value is kept raw; reads through [`Descriptor::value`] coerce
/// NaN to 0.0 and infinities to 1.0 so that degenerate arithmetic never
/// leaks past the descriptor boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    name: String,
    value: f64,
}

impl Descriptor {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The descriptor value with NaN coerced to 0.0 and ±∞ to 1.0.
    pub fn value(&self) -> f64 {
        if self.value.is_nan() {
            0.0
        } else if self.value.is_infinite() {
            1.0
        } else {
            self.value
        }
    }

    pub fn raw_value(&self) -> f64 {
        self.value
    }
}

/// The closed set of descriptor group kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    Plane,
    Patch,
    Sphere,
    Surface,
    Shape,
}

impl GroupKind {
    /// The fixed number of descriptors a group of this kind always carries.
    pub fn descriptor_count(&self) -> usize {
        match self {
            GroupKind::Plane => 32,
            GroupKind::Patch => 28,
            GroupKind::Sphere => 34,
            GroupKind::Surface => 28,
            GroupKind::Shape => 11,
        }
    }
}

/// The result of applying one descriptor definition to one observation.
///
/// `descriptors` is the public, fixed-count value vector. For
/// orientation-searching kinds `detail` holds one statistic row per candidate
/// orientation and `orientation_index` the row that was selected; for the
/// remaining kinds `detail` carries the single synthesized row and no
/// orientation is chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptorGroup {
    pub kind: GroupKind,
    pub descriptors: Vec<Descriptor>,
    pub detail: Vec<Vec<Descriptor>>,
    pub orientation_index: Option<usize>,
    /// The orientation set the group was evaluated against (unit vectors).
    pub orientations: Vec<[f64; 3]>,
}

impl DescriptorGroup {
    /// A zero-filled group of the kind's fixed descriptor count, substituted
    /// when a calculation fails so that row alignment survives.
    pub fn placeholder(kind: GroupKind) -> Self {
        let descriptors = (0..kind.descriptor_count())
            .map(|_| Descriptor::new("placeholder", 0.0))
            .collect();
        Self {
            kind,
            descriptors,
            detail: Vec::new(),
            orientation_index: None,
            orientations: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// The coerced descriptor values, in order.
    pub fn values(&self) -> Vec<f64> {
        self.descriptors.iter().map(|d| d.value()).collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.descriptors
            .iter()
            .map(|d| d.name().to_string())
            .collect()
    }
}
