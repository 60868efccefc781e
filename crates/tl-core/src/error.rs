use thiserror::Error;

use crate::LayerClass;

/// Result type alias for solver operations.
pub type Result<T> = std::result::Result<T, TlError>;

/// Everything that can stop a transmission-loss run.
///
/// Structural problems (`InvalidLayerProperty`, `UnsupportedInterface`,
/// `InvalidEnvironment`) are raised before any frequency work starts.
/// `SingularSystem` aborts the sweep at the lowest failing frequency bin.
#[derive(Error, Debug)]
pub enum TlError {
    #[error("layer {layer}: invalid property `{property}`: {reason}")]
    InvalidLayerProperty {
        layer: usize,
        property: String,
        reason: String,
    },

    #[error("no boundary conditions for {upper:?} above {lower:?} (porosity context: {porosity:?})")]
    UnsupportedInterface {
        upper: LayerClass,
        lower: LayerClass,
        porosity: Option<f64>,
    },

    #[error(
        "singular system while reducing layer {layer} at {frequency_hz:.2} Hz (condition ~ {condition:.3e})"
    )]
    SingularSystem {
        layer: usize,
        frequency_hz: f64,
        condition: f64,
    },

    #[error("invalid environment: {parameter} = {value}")]
    InvalidEnvironment { parameter: &'static str, value: f64 },

    #[error("unknown layer type label `{label}`")]
    UnknownLayerType { label: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session format error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TlError {
    pub(crate) fn property(layer: usize, property: &str, reason: impl Into<String>) -> Self {
        TlError::InvalidLayerProperty {
            layer,
            property: property.to_string(),
            reason: reason.into(),
        }
    }
}
