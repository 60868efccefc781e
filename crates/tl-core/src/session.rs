//! Saved layer/environment sessions.
//!
//! ```json
//! {
//!   "layers": [
//!     { "type": "Viscoelastic", "thickness": 1.0,
//!       "values": { "material": "aluminium", "density": 2700, ... } }
//!   ],
//!   "environment": { "theta": 0, "P0": 101325, "T": 20, "RH": 0.5 }
//! }
//! ```
//!
//! Thickness is stored in millimetres; the solver works in metres.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::stack::LayerStack;
use crate::{Environment, Layer, LayerClass};

const MM_PER_M: f64 = 1000.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub layers: Vec<SessionLayer>,
    #[serde(default)]
    pub environment: SessionEnvironment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionLayer {
    /// Class label, e.g. `"Poro-elastic"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Thickness in millimetres.
    pub thickness: f64,
    #[serde(default)]
    pub values: LayerValues,
}

/// Material parameters of a saved layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerValues {
    /// Free-form material name; not used by the solver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(flatten)]
    pub numbers: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionEnvironment {
    /// Incidence angle in degrees.
    pub theta: f64,
    #[serde(rename = "P0")]
    pub p0: f64,
    #[serde(rename = "T")]
    pub t: f64,
    #[serde(rename = "RH")]
    pub rh: f64,
}

impl Default for SessionEnvironment {
    fn default() -> Self {
        Environment::default().into()
    }
}

impl From<Environment> for SessionEnvironment {
    fn from(env: Environment) -> Self {
        Self {
            theta: env.incidence_deg,
            p0: env.pressure_pa,
            t: env.temperature_c,
            rh: env.relative_humidity,
        }
    }
}

impl From<SessionEnvironment> for Environment {
    fn from(env: SessionEnvironment) -> Self {
        Self {
            pressure_pa: env.p0,
            temperature_c: env.t,
            relative_humidity: env.rh,
            incidence_deg: env.theta,
        }
    }
}

impl Session {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let session = serde_json::from_reader(BufReader::new(file))?;
        Ok(session)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Solver inputs, with thickness converted to metres.
    ///
    /// Labels are resolved here, so an unknown `type` fails before any
    /// property is checked.
    pub fn to_inputs(&self) -> Result<(LayerStack, Environment)> {
        let layers = self
            .layers
            .iter()
            .map(|entry| {
                let class = LayerClass::from_label(&entry.kind)?;
                let mut layer = Layer::new(class, entry.thickness / MM_PER_M);
                layer.properties = entry
                    .values
                    .numbers
                    .iter()
                    .filter(|(key, _)| key.as_str() != "thickness")
                    .map(|(key, &value)| (key.clone(), value))
                    .collect();
                Ok(layer)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok((LayerStack::new(layers), self.environment.into()))
    }

    /// Session for a stack and environment, with thickness in millimetres.
    pub fn from_inputs(stack: &LayerStack, environment: &Environment) -> Self {
        Self {
            layers: stack
                .layers
                .iter()
                .map(|layer| SessionLayer {
                    kind: layer.class.label().to_string(),
                    thickness: layer.thickness * MM_PER_M,
                    values: LayerValues {
                        material: None,
                        numbers: layer.properties.clone(),
                    },
                })
                .collect(),
            environment: (*environment).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TlError;
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    const SAVED: &str = r#"{
        "layers": [
            {"type": "Viscoelastic", "thickness": 1.0,
             "values": {"material": "aluminium", "thickness": 1.0, "density": 2700,
                        "youngs_modulus": 7e10, "poissons_ratio": 0.33, "loss_factor": 0.01}},
            {"type": "Unboned", "thickness": 20.0},
            {"type": "Poro-elastic", "thickness": 25.0,
             "values": {"airflow_resistivity": 10900, "tortuosity": 1.02,
                        "viscous_cl": 1e-4, "thermal_cl": 1.3e-4, "density": 8.8,
                        "youngs_modulus": 180000, "poissons_ratio": 0.3}}
        ],
        "environment": {"theta": 30, "P0": 100000, "T": 15, "RH": 0.5}
    }"#;

    #[test]
    fn test_saved_session_converts_to_si() {
        let session: Session = serde_json::from_str(SAVED).unwrap();
        let (stack, env) = session.to_inputs().unwrap();

        assert_eq!(stack.len(), 3);
        assert_eq!(stack.layers[0].class, LayerClass::Panel);
        assert_eq!(stack.layers[1].class, LayerClass::Fluid);
        assert_eq!(stack.layers[2].class, LayerClass::PoroElastic);
        assert_relative_eq!(stack.layers[0].thickness, 0.001);
        assert_relative_eq!(stack.layers[2].thickness, 0.025);

        // the name label and the duplicated thickness never reach the solver
        assert!(!stack.layers[0].properties.contains_key("thickness"));
        assert!(!stack.layers[0].properties.contains_key("material"));
        assert_eq!(stack.layers[0].properties["density"], 2700.0);
        assert_eq!(session.layers[0].values.material.as_deref(), Some("aluminium"));

        assert_eq!(env.incidence_deg, 30.0);
        assert_eq!(env.pressure_pa, 100_000.0);
        assert_eq!(env.temperature_c, 15.0);
        assert_eq!(env.relative_humidity, 0.5);
    }

    #[test]
    fn test_missing_environment_uses_defaults() {
        let session: Session = serde_json::from_str(r#"{"layers": []}"#).unwrap();
        let (stack, env) = session.to_inputs().unwrap();
        assert!(stack.is_empty());
        assert_eq!(env, Environment::default());

        let partial: Session =
            serde_json::from_str(r#"{"layers": [], "environment": {"theta": 45}}"#).unwrap();
        let (_, env) = partial.to_inputs().unwrap();
        assert_eq!(env.incidence_deg, 45.0);
        assert_eq!(env.pressure_pa, 101_325.0);
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        let session: Session =
            serde_json::from_str(r#"{"layers": [{"type": "Granite", "thickness": 5}]}"#).unwrap();
        match session.to_inputs() {
            Err(TlError::UnknownLayerType { label }) => assert_eq!(label, "Granite"),
            other => panic!("expected UnknownLayerType, got {other:?}"),
        }
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");

        let original: Session = serde_json::from_str(SAVED).unwrap();
        original.save(&path).unwrap();
        let loaded = Session::load(&path).unwrap();
        assert_eq!(loaded, original);

        // back from solver inputs, thickness returns to millimetres
        let (stack, env) = loaded.to_inputs().unwrap();
        let rebuilt = Session::from_inputs(&stack, &env);
        assert_eq!(rebuilt.layers[1].kind, "Unbonded");
        assert_relative_eq!(rebuilt.layers[2].thickness, 25.0);
        assert_eq!(rebuilt.environment, original.environment);
        let (again, _) = rebuilt.to_inputs().unwrap();
        for (a, b) in again.layers.iter().zip(&stack.layers) {
            assert_eq!(a.class, b.class);
            assert_eq!(a.properties, b.properties);
            assert_relative_eq!(a.thickness, b.thickness, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = Session::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, TlError::Io(_)));
    }
}
