use nalgebra::DMatrix;
use num_complex::Complex64;

/// Dense complex matrix used for boundary conditions and layer bases.
pub type CMatrix = DMatrix<Complex64>;

/// Largest accepted 1-norm condition number of an equilibrated block.
pub const CONDITION_LIMIT: f64 = 1e15;

/// A block that could not be inverted reliably.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IllConditioned {
    /// Estimated condition number (`inf` for an exactly singular block).
    pub condition: f64,
}

impl IllConditioned {
    fn singular() -> Self {
        Self {
            condition: f64::INFINITY,
        }
    }
}

/// Build a complex matrix from real row-major entries.
pub fn real(rows: usize, cols: usize, entries: &[f64]) -> CMatrix {
    CMatrix::from_row_slice(
        rows,
        cols,
        &entries.iter().map(|&x| Complex64::new(x, 0.0)).collect::<Vec<_>>(),
    )
}

pub fn identity(n: usize) -> CMatrix {
    CMatrix::identity(n, n)
}

pub fn diagonal(values: &[Complex64]) -> CMatrix {
    CMatrix::from_diagonal(&nalgebra::DVector::from_column_slice(values))
}

/// Owned copy of the `rows × cols` block starting at `(row, col)`.
pub fn block(m: &CMatrix, row: usize, col: usize, rows: usize, cols: usize) -> CMatrix {
    m.view((row, col), (rows, cols)).into_owned()
}

/// Overwrite the block of `m` starting at `(row, col)` with `src`.
pub fn set_block(m: &mut CMatrix, row: usize, col: usize, src: &CMatrix) {
    m.view_mut((row, col), src.shape()).copy_from(src);
}

/// Maximum absolute column sum.
fn norm1(m: &CMatrix) -> f64 {
    m.column_iter()
        .map(|col| col.iter().map(|z| z.norm()).sum::<f64>())
        .fold(0.0, f64::max)
}

/// Invert a square block after row and column equilibration.
///
/// The scaled matrix `S = Dr·M·Dc` has unit max-norm rows and columns, so its
/// condition number reflects the geometry of the system rather than the mix
/// of velocity and stress units. `M⁻¹ = Dc·S⁻¹·Dr`.
pub fn checked_inverse(m: &CMatrix) -> Result<CMatrix, IllConditioned> {
    let n = m.nrows();
    if n != m.ncols() || n == 0 {
        return Err(IllConditioned::singular());
    }

    let mut scaled = m.clone();

    let mut row_scale = vec![0.0; n];
    for (i, scale) in row_scale.iter_mut().enumerate() {
        let max = scaled.row(i).iter().map(|z| z.norm()).fold(0.0, f64::max);
        if max == 0.0 || !max.is_finite() {
            return Err(IllConditioned::singular());
        }
        *scale = 1.0 / max;
    }
    for i in 0..n {
        for j in 0..n {
            scaled[(i, j)] *= row_scale[i];
        }
    }

    let mut col_scale = vec![0.0; n];
    for (j, scale) in col_scale.iter_mut().enumerate() {
        let max = scaled.column(j).iter().map(|z| z.norm()).fold(0.0, f64::max);
        if max == 0.0 {
            return Err(IllConditioned::singular());
        }
        *scale = 1.0 / max;
    }
    for j in 0..n {
        for i in 0..n {
            scaled[(i, j)] *= col_scale[j];
        }
    }

    let inverse = scaled
        .clone()
        .try_inverse()
        .ok_or_else(IllConditioned::singular)?;

    let condition = norm1(&scaled) * norm1(&inverse);
    if !condition.is_finite() || condition > CONDITION_LIMIT {
        return Err(IllConditioned { condition });
    }

    let mut out = inverse;
    for i in 0..n {
        for j in 0..n {
            out[(i, j)] *= col_scale[i] * row_scale[j];
        }
    }
    Ok(out)
}
