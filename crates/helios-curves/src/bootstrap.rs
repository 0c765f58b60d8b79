//! Linear bootstrap of atom prices from overlapping period quotes.

use helios_core::periods::{LoadShapedDateRange, ShapedRangeSet};
use nalgebra::{DMatrix, DVector};

use crate::error::{CurveError, CurveResult};

/// Solves for the price of each partition class given quoted period prices.
///
/// Builds the square system `M * x = prices` where
/// `M[i][j] = duration(class_j within quote_i) / duration(quote_i)`, with
/// durations supplied by `duration` (discounted for market curves, plain
/// for shape-ratio curves). Partition atoms either nest inside a quote or
/// miss it entirely, so a class's contribution is the sum of its nested
/// atoms' durations.
///
/// # Errors
///
/// `NonSquareSystem` when the partition yields a different number of
/// classes than quotes, `SingularSystem` when the LU solve fails, and any
/// error from the duration measure.
pub fn bootstrap_atom_prices<F>(
    quotes: &[(LoadShapedDateRange, f64)],
    duration: F,
) -> CurveResult<Vec<(ShapedRangeSet, f64)>>
where
    F: Fn(&LoadShapedDateRange) -> CurveResult<f64>,
{
    let classes = ShapedRangeSet::new(quotes.iter().map(|(p, _)| *p)).partition();
    if classes.len() != quotes.len() {
        return Err(CurveError::NonSquareSystem {
            quotes: quotes.len(),
            atoms: classes.len(),
        });
    }
    let n = quotes.len();
    let mut matrix = DMatrix::zeros(n, n);
    for (i, (quote, _)) in quotes.iter().enumerate() {
        let quoted_duration = duration(quote)?;
        for (j, class) in classes.iter().enumerate() {
            let mut nested = 0.0;
            for atom in class.iter() {
                if atom.intersects(quote) {
                    nested += duration(atom)?;
                }
            }
            matrix[(i, j)] = nested / quoted_duration;
        }
    }
    let rhs = DVector::from_iterator(n, quotes.iter().map(|(_, price)| *price));
    let solution = matrix
        .lu()
        .solve(&rhs)
        .ok_or(CurveError::SingularSystem { size: n })?;
    log::debug!("bootstrapped {n} atom prices from {n} quotes");
    Ok(classes
        .into_iter()
        .zip(solution.iter().copied())
        .collect())
}
