use serde::{Deserialize, Serialize};

/// Experimental conditions under which an observation was measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "pH", default)]
    pub ph: Option<f64>,
    /// Ionic strength of the medium in mM; feeds the Debye screening length.
    #[serde(default = "Condition::default_ionic_strength")]
    pub ionic_strength: f64,
    #[serde(default)]
    pub concentration: Option<f64>,
}

impl Condition {
    fn default_ionic_strength() -> f64 {
        50.0
    }
}

impl Default for Condition {
    fn default() -> Self {
        Self {
            ph: None,
            ionic_strength: Self::default_ionic_strength(),
            concentration: None,
        }
    }
}

/// One molecule together with its experimental metadata.
///
/// An observation is only considered for model fitting when its `active` flag
/// is set *and* a response value is present; observations additionally flagged
/// `predict` are held out of fitting entirely and used for external
/// prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub name: String,
    /// Structure file path, relative to the project directory.
    pub file: String,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub condition: Condition,
    #[serde(default)]
    pub response: Option<f64>,
    #[serde(default = "Observation::default_active")]
    pub active: bool,
    #[serde(default)]
    pub predict: bool,
    #[serde(default)]
    pub note: Option<String>,
}

impl Observation {
    fn default_active() -> bool {
        true
    }

    /// An observation without a measured response is never active, whatever
    /// its flag says.
    pub fn is_active(&self) -> bool {
        self.active && self.response.is_some()
    }

    pub fn is_predict(&self) -> bool {
        self.predict
    }

    /// Active and not held out: the rows the model is fit against.
    pub fn is_model(&self) -> bool {
        self.is_active() && !self.predict
    }
}
