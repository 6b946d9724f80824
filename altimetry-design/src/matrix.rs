//! 3×3 matrix helpers for the design-time solver
//!
//! Fixed-size arrays only; the state dimension never changes.

/// 3×3 matrix, row-major
pub type Matrix3 = [[f64; 3]; 3];

/// 3-vector
pub type Vector3 = [f64; 3];

/// Identity matrix
pub const IDENTITY: Matrix3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Zero matrix
pub const ZERO: Matrix3 = [[0.0; 3]; 3];

/// Number of distinct entries of a symmetric 3×3 matrix
pub const SYMMETRIC_LEN: usize = 6;

/// Packed index of `(row, col)` in upper-triangular order:
///
/// ```text
/// (0,0)→0  (0,1)→1  (0,2)→2
///          (1,1)→3  (1,2)→4
///                   (2,2)→5
/// ```
pub const fn symmetric_index(row: usize, col: usize) -> usize {
    let (r, c) = if row <= col { (row, col) } else { (col, row) };
    match (r, c) {
        (0, c) => c,
        (1, c) => 2 + c,
        _ => 5,
    }
}

pub fn multiply(a: &Matrix3, b: &Matrix3) -> Matrix3 {
    let mut out = ZERO;
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

pub fn transpose(a: &Matrix3) -> Matrix3 {
    let mut out = ZERO;
    for i in 0..3 {
        for j in 0..3 {
            out[j][i] = a[i][j];
        }
    }
    out
}

pub fn add(a: &Matrix3, b: &Matrix3) -> Matrix3 {
    let mut out = *a;
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] += b[i][j];
        }
    }
    out
}

pub fn scale(a: &Matrix3, factor: f64) -> Matrix3 {
    let mut out = *a;
    out.iter_mut().flatten().for_each(|v| *v *= factor);
    out
}

/// `u·vᵀ`
pub fn outer(u: &Vector3, v: &Vector3) -> Matrix3 {
    let mut out = ZERO;
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = u[i] * v[j];
        }
    }
    out
}

pub fn matvec(a: &Matrix3, v: &Vector3) -> Vector3 {
    let mut out = [0.0; 3];
    for i in 0..3 {
        out[i] = (0..3).map(|k| a[i][k] * v[k]).sum();
    }
    out
}

pub fn dot(u: &Vector3, v: &Vector3) -> f64 {
    (0..3).map(|i| u[i] * v[i]).sum()
}

/// Average `a` with its transpose
pub fn make_symmetric(a: &mut Matrix3) {
    for i in 0..3 {
        for j in (i + 1)..3 {
            let mean = 0.5 * (a[i][j] + a[j][i]);
            a[i][j] = mean;
            a[j][i] = mean;
        }
    }
}

pub fn is_finite(a: &Matrix3) -> bool {
    a.iter().flatten().all(|v| v.is_finite())
}
