use num_complex::Complex64;

use crate::linalg::CMatrix;

/// Below this magnitude the transmission denominator is treated as zero.
pub const DENOMINATOR_TOLERANCE: f64 = 1e-12;

/// A 2×2 complex transfer matrix between the fluid states on the two sides
/// of a stack or segment.
///
/// ```text
/// [p  ]         [a  b] [p  ]
/// [v_z]_upper = [c  d] [v_z]_lower
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferMatrix {
    pub a: Complex64,
    pub b: Complex64,
    pub c: Complex64,
    pub d: Complex64,
}

/// Plane-wave coefficients of one frequency bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    /// Pressure transmission coefficient τ.
    pub transmission: Complex64,
    /// Pressure reflection coefficient R.
    pub reflection: Complex64,
}

impl Coefficients {
    /// Transmission loss in dB, `+inf` for a fully reflecting bin.
    pub fn transmission_loss(&self) -> f64 {
        -20.0 * self.transmission.norm().log10()
    }

    /// Fraction of incident energy that is not reflected.
    pub fn absorption(&self) -> f64 {
        1.0 - self.reflection.norm_sqr()
    }

    /// Whether the denominator vanished and τ was forced to zero.
    pub fn is_fully_reflecting(&self) -> bool {
        self.transmission == Complex64::new(0.0, 0.0)
    }
}

impl TransferMatrix {
    pub fn new(a: Complex64, b: Complex64, c: Complex64, d: Complex64) -> Self {
        Self { a, b, c, d }
    }

    /// Identity matrix (acoustically transparent element).
    pub fn identity() -> Self {
        Self {
            a: Complex64::new(1.0, 0.0),
            b: Complex64::new(0.0, 0.0),
            c: Complex64::new(0.0, 0.0),
            d: Complex64::new(1.0, 0.0),
        }
    }

    /// Read the leading 2×2 block of a dense matrix.
    pub fn from_matrix(m: &CMatrix) -> Self {
        Self {
            a: m[(0, 0)],
            b: m[(0, 1)],
            c: m[(1, 0)],
            d: m[(1, 1)],
        }
    }

    /// Chain (multiply) this matrix with another: self · other.
    pub fn chain(&self, other: &TransferMatrix) -> TransferMatrix {
        TransferMatrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
        }
    }

    pub fn determinant(&self) -> Complex64 {
        self.a * self.d - self.b * self.c
    }

    /// D = T₁₁ + T₁₂·cosθ/Z₀ + T₂₁·Z₀/cosθ + T₂₂
    pub fn incidence_denominator(&self, z0: f64, cos_theta: f64) -> Complex64 {
        self.a + self.b * (cos_theta / z0) + self.c * (z0 / cos_theta) + self.d
    }

    /// Transmission and reflection coefficients for a plane wave incident at
    /// angle θ between two half-spaces of impedance `z0`.
    ///
    /// `phase` is the phase reference ω·d·cosθ/c₀ of the total bonded
    /// thickness d. A denominator below [`DENOMINATOR_TOLERANCE`] yields
    /// τ = 0 and R = 1.
    pub fn coefficients(&self, z0: f64, cos_theta: f64, phase: f64) -> Coefficients {
        let denom = self.incidence_denominator(z0, cos_theta);
        if denom.norm() < DENOMINATOR_TOLERANCE {
            return Coefficients {
                transmission: Complex64::new(0.0, 0.0),
                reflection: Complex64::new(1.0, 0.0),
            };
        }
        let numerator = self.a + self.b * (cos_theta / z0) - self.c * (z0 / cos_theta) - self.d;
        Coefficients {
            transmission: 2.0 * Complex64::new(0.0, phase).exp() / denom,
            reflection: numerator / denom,
        }
    }

    /// Transmission loss (dB) for incidence at angle θ between half-spaces of
    /// impedance `z0`.
    pub fn transmission_loss(&self, z0: f64, cos_theta: f64) -> f64 {
        self.coefficients(z0, cos_theta, 0.0).transmission_loss()
    }
}
