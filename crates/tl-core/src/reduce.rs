//! Block elimination of a layer's wave amplitudes.
//!
//! Both routines assemble the same system: the rows of the interface above a
//! layer coupled to its upper face (`Φ·Λ·a`) and the rows of the interface
//! below coupled to its lower face (`Φ·a`), with the amplitudes `a` in the
//! middle block of unknowns.

use num_complex::Complex64;

use crate::elements::LayerMatrices;
use crate::interface::BoundaryPair;
use crate::linalg::{block, checked_inverse, set_block, CMatrix, IllConditioned};
use crate::transfer_matrix::TransferMatrix;

/// Fold one interior layer into its surrounding interfaces.
///
/// `upper` relates the outer state above the segment to the layer's upper
/// face, `lower` relates the layer's lower face to the next layer down. The
/// result relates the outer state directly to the next layer, with
/// `rows(upper) + rows(lower) − N` conditions remaining.
pub fn reduce_layer(
    upper: &BoundaryPair,
    lower: &BoundaryPair,
    layer: &LayerMatrices,
) -> Result<BoundaryPair, IllConditioned> {
    let n = layer.size();
    let r1 = upper.rows();
    let r2 = lower.rows();
    let col_st = upper.pos.ncols();
    let col_ed = col_st + n;
    let n_out = lower.neg.ncols();

    // Too few conditions to pin the amplitudes down.
    if r1 + r2 <= n {
        return Err(IllConditioned {
            condition: f64::INFINITY,
        });
    }

    let mut a = CMatrix::zeros(r1 + r2, col_ed + n_out);
    set_block(&mut a, 0, 0, &upper.pos);
    set_block(&mut a, 0, col_st, &-(&upper.neg * &layer.phi * &layer.lambda));
    set_block(&mut a, r1, col_st, &(&lower.pos * &layer.phi));
    set_block(&mut a, r1, col_ed, &-&lower.neg);
    pivot_rows_first(&mut a, col_st, n);

    let pivot = checked_inverse(&block(&a, 0, col_st, n, n))?;
    let rest_rows = r1 + r2 - n;
    let coupling = block(&a, n, col_st, rest_rows, n);
    let width = a.ncols();
    let projected = coupling * pivot * block(&a, 0, 0, n, width);
    let rest = block(&a, n, 0, rest_rows, width) - projected;

    Ok(BoundaryPair {
        pos: block(&rest, 0, 0, rest_rows, col_st),
        neg: -block(&rest, 0, col_ed, rest_rows, n_out),
    })
}

/// Reorder the rows of `a` so the leading `n` rows hold the best-conditioned
/// pivot block for the `n` columns starting at `col`.
///
/// Rows are compared after scaling each to unit max-norm, then picked by
/// partial pivoting. The row order of a linear system carries no meaning, so
/// only which rows end up in the pivot block matters.
fn pivot_rows_first(a: &mut CMatrix, col: usize, n: usize) {
    let mut middle = block(a, 0, col, a.nrows(), n);
    for mut row in middle.row_iter_mut() {
        let max = row.iter().map(|z| z.norm()).fold(0.0, f64::max);
        if max > 0.0 {
            row /= Complex64::new(max, 0.0);
        }
    }
    middle.lu().p().permute_rows(a);
}

/// Eliminate the last layer of a segment and read off its 2×2 transfer
/// matrix between the fluid above and the fluid below.
///
/// The system must be square: `rows(upper) + rows(lower) = 2 + N`.
pub fn close_segment(
    upper: &BoundaryPair,
    lower: &BoundaryPair,
    layer: &LayerMatrices,
) -> Result<TransferMatrix, IllConditioned> {
    let n = layer.size();
    let r1 = upper.rows();
    let r2 = lower.rows();
    let col_st = upper.pos.ncols();

    let mut a = CMatrix::zeros(r1 + r2, col_st + n);
    set_block(&mut a, 0, 0, &upper.pos);
    set_block(&mut a, 0, col_st, &-(&upper.neg * &layer.phi * &layer.lambda));
    set_block(&mut a, r1, col_st, &(&lower.pos * &layer.phi));

    let inverse = checked_inverse(&a)?;
    let transfer = block(&inverse, 0, r1, col_st, r2) * &lower.neg;
    Ok(TransferMatrix::from_matrix(&transfer))
}
