//! Dense matrix helpers used by graph construction and the bisection

use ndarray::{Array1, Array2, ArrayView2, Axis};

/// Check whether a square matrix equals its transpose exactly
pub fn is_symmetric(matrix: &ArrayView2<f64>) -> bool {
    let n = matrix.nrows();
    for i in 0..n {
        for j in (i + 1)..n {
            if matrix[[i, j]] != matrix[[j, i]] {
                return false;
            }
        }
    }
    true
}

/// Replace (i, j) and (j, i) by their mean
pub fn symmetrize(matrix: &mut Array2<f64>) {
    let n = matrix.nrows();
    for i in 0..n {
        for j in (i + 1)..n {
            let mean = (matrix[[i, j]] + matrix[[j, i]]) / 2.0;
            matrix[[i, j]] = mean;
            matrix[[j, i]] = mean;
        }
    }
}

/// Row sums of a matrix
pub fn row_sums(matrix: &ArrayView2<f64>) -> Array1<f64> {
    matrix.sum_axis(Axis(1))
}

/// Row sums restricted to entries accepted by `keep`
pub fn filtered_row_sums<F>(matrix: &ArrayView2<f64>, keep: F) -> Array1<f64>
where
    F: Fn(f64) -> bool,
{
    matrix.map_axis(Axis(1), |row| {
        row.iter().copied().filter(|&value| keep(value)).sum()
    })
}

/// Index of the first maximum, `None` on empty input
pub fn first_argmax<I>(values: I) -> Option<usize>
where
    I: IntoIterator<Item = f64>,
{
    let mut best: Option<(usize, f64)> = None;
    for (index, value) in values.into_iter().enumerate() {
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}

/// Index of the first minimum, `None` on empty input
pub fn first_argmin<I>(values: I) -> Option<usize>
where
    I: IntoIterator<Item = f64>,
{
    first_argmax(values.into_iter().map(|value| -value))
}
