use nalgebra::DVector;

/// Solves a tridiagonal system with the Thomas algorithm.
///
/// All four vectors have the system size `n`; `sub[0]` and `sup[n - 1]` are
/// ignored. Returns `None` when a pivot vanishes or the sizes disagree.
///
/// No pivoting is performed, so the matrix should be diagonally dominant
/// (the spline moment systems are).
pub fn solve_tridiagonal(
    sub: &DVector<f64>,
    diag: &DVector<f64>,
    sup: &DVector<f64>,
    rhs: &DVector<f64>,
) -> Option<DVector<f64>> {
    let n = diag.len();
    if sub.len() != n || sup.len() != n || rhs.len() != n {
        return None;
    }
    if n == 0 {
        return Some(DVector::zeros(0));
    }

    let mut c_prime = DVector::<f64>::zeros(n);
    let mut d_prime = DVector::<f64>::zeros(n);

    // 前向消去
    let mut pivot = diag[0];
    if !is_usable_pivot(pivot) {
        return None;
    }
    c_prime[0] = if n > 1 { sup[0] / pivot } else { 0.0 };
    d_prime[0] = rhs[0] / pivot;

    for i in 1..n {
        pivot = diag[i] - sub[i] * c_prime[i - 1];
        if !is_usable_pivot(pivot) {
            return None;
        }
        c_prime[i] = if i < n - 1 { sup[i] / pivot } else { 0.0 };
        d_prime[i] = (rhs[i] - sub[i] * d_prime[i - 1]) / pivot;
    }

    // 回代
    let mut solution = d_prime;
    for i in (0..(n - 1)).rev() {
        let next = solution[i + 1];
        solution[i] -= c_prime[i] * next;
    }
    Some(solution)
}

#[inline]
fn is_usable_pivot(pivot: f64) -> bool {
    pivot != 0.0 && pivot.is_finite()
}
