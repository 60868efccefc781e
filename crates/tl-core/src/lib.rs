pub mod air;
pub mod elements;
pub mod error;
pub mod frequency_response;
pub mod interface;
pub mod jca;
pub mod linalg;
pub mod panel;
pub mod poro;
pub mod reduce;
pub mod session;
pub mod solid;
pub mod stack;
pub mod transfer_matrix;

use std::collections::BTreeMap;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::info;

pub use error::{Result, TlError};
pub use frequency_response::SweepConfig;
pub use session::Session;
pub use stack::{LayerStack, StackModel};

use air::AirProperties;
use elements::{FrequencyState, LayerMatrices};

// ---------------------------------------------------------------------------
// Shared interface types
// ---------------------------------------------------------------------------

/// Physical domain of one stack element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerClass {
    /// Unbonded air gap. Also the domain of the two outer half-spaces.
    Fluid,
    PoroElastic,
    ElasticSolid,
    Panel,
}

impl LayerClass {
    /// Label used by the session file format.
    pub fn label(self) -> &'static str {
        match self {
            LayerClass::Fluid => "Unbonded",
            LayerClass::PoroElastic => "Poro-elastic",
            LayerClass::ElasticSolid => "Linear Elastic",
            LayerClass::Panel => "Viscoelastic",
        }
    }

    pub fn from_label(label: &str) -> Result<Self> {
        match label {
            "Unbonded" | "Unboned" => Ok(LayerClass::Fluid),
            "Poro-elastic" => Ok(LayerClass::PoroElastic),
            "Linear Elastic" => Ok(LayerClass::ElasticSolid),
            "Viscoelastic" => Ok(LayerClass::Panel),
            other => Err(TlError::UnknownLayerType {
                label: other.to_string(),
            }),
        }
    }
}

/// One element of a layer stack, as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub class: LayerClass,
    /// Thickness in metres.
    pub thickness: f64,
    /// Named material parameters in SI units.
    #[serde(default)]
    pub properties: BTreeMap<String, f64>,
}

impl Layer {
    pub fn new(class: LayerClass, thickness: f64) -> Self {
        Self {
            class,
            thickness,
            properties: BTreeMap::new(),
        }
    }

    /// Builder-style property setter.
    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.properties.insert(key.to_string(), value);
        self
    }
}

/// Ambient conditions and incidence of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// Static pressure in Pa.
    pub pressure_pa: f64,
    /// Air temperature in °C.
    pub temperature_c: f64,
    /// Relative humidity as a fraction in [0, 1].
    pub relative_humidity: f64,
    /// Angle of incidence from the normal, in degrees.
    pub incidence_deg: f64,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            pressure_pa: 101_325.0,
            temperature_c: 20.0,
            relative_humidity: 0.2,
            incidence_deg: 0.0,
        }
    }
}

impl Environment {
    /// Check the physical domain and derive the air properties.
    pub fn validate(&self) -> Result<AirProperties> {
        let angle = self.incidence_deg;
        if !(angle.is_finite() && (0.0..90.0).contains(&angle)) {
            return Err(TlError::InvalidEnvironment {
                parameter: "incidence_deg",
                value: angle,
            });
        }
        air::air_properties(self.pressure_pa, self.temperature_c, self.relative_humidity)
    }

    pub fn incidence_rad(&self) -> f64 {
        self.incidence_deg.to_radians()
    }
}

/// Output of a sweep, one entry per frequency bin.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    /// Frequency bins in Hz.
    pub frequency_hz: Vec<f64>,
    /// Transmission loss in dB; `+inf` where the stack fully reflects.
    pub transmission_loss_db: Vec<f64>,
    /// Energy fraction not reflected, 1 − |R|².
    pub absorption_coefficient: Vec<f64>,
    /// Complex pressure transmission coefficient τ.
    pub complex_transmission: Vec<Complex64>,
    /// Complex pressure reflection coefficient R.
    pub reflection: Vec<Complex64>,
}

impl SimulationResult {
    pub fn len(&self) -> usize {
        self.frequency_hz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequency_hz.is_empty()
    }
}

/// Wave description of a bonded layer at one frequency.
pub trait LayerWaveModel: Send + Sync {
    /// Basis and propagation matrices at the given frequency bin.
    fn wave_matrices(&self, freq: &FrequencyState, air: &AirProperties) -> LayerMatrices;
}

/// Run the full pipeline over the standard band (100–6400 Hz, 1000 bins).
pub fn compute(stack: &LayerStack, environment: &Environment) -> Result<SimulationResult> {
    compute_with(stack, environment, &SweepConfig::default())
}

/// Run the full pipeline over a custom frequency band.
pub fn compute_with(
    stack: &LayerStack,
    environment: &Environment,
    config: &SweepConfig,
) -> Result<SimulationResult> {
    config.validate()?;
    let model = StackModel::new(stack, environment)?;

    info!(
        layers = stack.len(),
        segments = model.segments().len(),
        angle_deg = environment.incidence_deg,
        points = config.points,
        "running transmission-loss sweep"
    );

    frequency_response::sweep(&model, &config.frequencies())
}
