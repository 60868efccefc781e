use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::air::AirProperties;
use crate::elements::{FrequencyState, Material};
use crate::error::{Result, TlError};
use crate::interface::{boundary_conditions, BoundaryPair, Side};
use crate::linalg::IllConditioned;
use crate::reduce::{close_segment, reduce_layer};
use crate::transfer_matrix::{Coefficients, TransferMatrix};
use crate::{Environment, Layer, LayerClass};

/// An ordered list of layers from the incident side down to the
/// transmitted side. Both outer half-spaces are air.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerStack {
    pub layers: Vec<Layer>,
}

impl LayerStack {
    pub fn new(layers: Vec<Layer>) -> Self {
        Self { layers }
    }

    /// The same layers seen from the other side.
    pub fn reversed(&self) -> Self {
        Self {
            layers: self.layers.iter().rev().cloned().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl From<Vec<Layer>> for LayerStack {
    fn from(layers: Vec<Layer>) -> Self {
        Self::new(layers)
    }
}

/// A maximal run of bonded layers, as inclusive stack indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub first: usize,
    pub last: usize,
}

impl Segment {
    pub fn layers(&self) -> std::ops::RangeInclusive<usize> {
        self.first..=self.last
    }
}

/// Frequency-independent part of a run: validated materials, the interface
/// table for every boundary and the bonded segments.
#[derive(Debug, Clone)]
pub struct StackModel {
    materials: Vec<Material>,
    /// Interface `i` lies above layer `i`; the last one lies below the stack.
    interfaces: Vec<BoundaryPair>,
    segments: Vec<Segment>,
    air: AirProperties,
    incidence_rad: f64,
    /// Total thickness of the bonded layers, for the transmitted phase.
    bonded_thickness: f64,
}

impl StackModel {
    /// Validate the inputs and build the interface table.
    ///
    /// Every structural error is raised here, before any frequency work.
    pub fn new(stack: &LayerStack, environment: &Environment) -> Result<Self> {
        let air = environment.validate()?;
        let materials = stack
            .layers
            .iter()
            .enumerate()
            .map(|(i, layer)| Material::from_layer(i, layer))
            .collect::<Result<Vec<_>>>()?;

        let side = |index: Option<usize>| match index.and_then(|i| materials.get(i)) {
            Some(m) => Side {
                class: m.class(),
                porosity: m.porosity(),
            },
            None => Side::new(LayerClass::Fluid),
        };

        let mut interfaces = Vec::with_capacity(materials.len() + 1);
        for i in 0..=materials.len() {
            let upper = side(i.checked_sub(1));
            let lower = side(Some(i));
            let pair = boundary_conditions(upper, lower)?;
            debug!(
                interface = i,
                upper = ?upper.class,
                lower = ?lower.class,
                porosity_upper = ?upper.porosity,
                porosity_lower = ?lower.porosity,
                rows = pair.rows(),
                "boundary conditions"
            );
            interfaces.push(pair);
        }

        let segments = bonded_segments(&materials);
        let bonded_thickness: f64 = materials.iter().map(Material::acoustic_thickness).sum();
        debug!(segments = segments.len(), bonded_thickness, "stack partitioned");

        Ok(Self {
            materials,
            interfaces,
            segments,
            air,
            incidence_rad: environment.incidence_rad(),
            bonded_thickness,
        })
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn interfaces(&self) -> &[BoundaryPair] {
        &self.interfaces
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn air(&self) -> &AirProperties {
        &self.air
    }

    pub fn frequency_state(&self, frequency_hz: f64) -> FrequencyState {
        FrequencyState::new(frequency_hz, &self.air, self.incidence_rad)
    }

    /// Cascaded 2×2 transfer matrix of the whole stack at one frequency.
    pub fn global_transfer(&self, frequency_hz: f64) -> Result<TransferMatrix> {
        check_frequency(frequency_hz)?;
        let freq = self.frequency_state(frequency_hz);
        self.segments.iter().try_fold(TransferMatrix::identity(), |total, segment| {
            Ok(total.chain(&self.segment_transfer(segment, &freq)?))
        })
    }

    /// Fold the layers of one segment from the top down.
    fn segment_transfer(&self, segment: &Segment, freq: &FrequencyState) -> Result<TransferMatrix> {
        let frequency_hz = freq.frequency_hz;
        let singular = |layer: usize| {
            move |e: IllConditioned| TlError::SingularSystem {
                layer,
                frequency_hz,
                condition: e.condition,
            }
        };

        debug!(first = segment.first, last = segment.last, frequency_hz, "reducing segment");
        let mut upper = self.interfaces[segment.first].clone();
        for i in segment.layers() {
            let Some(model) = self.materials[i].wave_model() else {
                continue;
            };
            let layer = model.wave_matrices(freq, &self.air);
            let lower = &self.interfaces[i + 1];
            if i == segment.last {
                return close_segment(&upper, lower, &layer).map_err(singular(i));
            }
            upper = reduce_layer(&upper, lower, &layer).map_err(singular(i))?;
        }
        Ok(TransferMatrix::identity())
    }

    /// Transmission and reflection coefficients at one frequency.
    pub fn solve_bin(&self, frequency_hz: f64) -> Result<Coefficients> {
        let transfer = self.global_transfer(frequency_hz)?;
        let omega = 2.0 * std::f64::consts::PI * frequency_hz;
        let cos_theta = self.incidence_rad.cos();
        let phase = omega * self.bonded_thickness * cos_theta / self.air.sound_speed;
        Ok(transfer.coefficients(self.air.impedance(), cos_theta, phase))
    }
}

/// Bin frequencies must be finite and positive.
pub(crate) fn check_frequency(frequency_hz: f64) -> Result<()> {
    if frequency_hz.is_finite() && frequency_hz > 0.0 {
        Ok(())
    } else {
        Err(TlError::InvalidEnvironment {
            parameter: "frequency_hz",
            value: frequency_hz,
        })
    }
}

/// Maximal runs of non-fluid layers.
fn bonded_segments(materials: &[Material]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut start = None;
    for (i, material) in materials.iter().enumerate() {
        match (material.class(), start) {
            (LayerClass::Fluid, Some(first)) => {
                segments.push(Segment { first, last: i - 1 });
                start = None;
            }
            (LayerClass::Fluid, None) => {}
            (_, None) => start = Some(i),
            (_, Some(_)) => {}
        }
    }
    if let Some(first) = start {
        segments.push(Segment {
            first,
            last: materials.len() - 1,
        });
    }
    segments
}
