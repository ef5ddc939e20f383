use ::nalgebra::{Matrix3, Vector3};
use ::std::cmp::Ordering;

use ::IntPrecisionError;

/// Absolute tolerance for interpreting floats as integers.
#[derive(Debug, Copy, Clone)]
pub struct Tol(pub f64);

impl Tol {
    pub fn unfloat(&self, x: f64) -> Result<i64, IntPrecisionError>
    {Ok({
        let rounded = x.round();
        if (x - rounded).abs() > self.0 {
            return Err(IntPrecisionError::new(x));
        }
        rounded as i64
    })}

    pub fn unfloat_v3(&self, v: &Vector3<f64>) -> Result<Vector3<i64>, IntPrecisionError>
    {Ok({
        Vector3::new(self.unfloat(v.x)?, self.unfloat(v.y)?, self.unfloat(v.z)?)
    })}

    pub fn unfloat_m33(&self, m: &Matrix3<f64>) -> Result<Matrix3<i64>, IntPrecisionError>
    {Ok({
        let mut out = Matrix3::zeros();
        for r in 0..3 {
            for c in 0..3 {
                out[(r, c)] = self.unfloat(m[(r, c)])?;
            }
        }
        out
    })}
}

/// Total order on floats where values closer than `tol` compare equal.
///
/// Not transitive for pathological inputs; callers keep compared values
/// separated by more than `tol` or accept the usual tolerance-comparator
/// caveats.
pub fn tol_cmp(a: f64, b: f64, tol: f64) -> Ordering {
    if (a - b).abs() <= tol {
        Ordering::Equal
    } else if a < b {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

pub fn det_i64(m: &Matrix3<i64>) -> i64 {
    m[(0, 0)] * (m[(1, 1)] * m[(2, 2)] - m[(1, 2)] * m[(2, 1)])
        - m[(0, 1)] * (m[(1, 0)] * m[(2, 2)] - m[(1, 2)] * m[(2, 0)])
        + m[(0, 2)] * (m[(1, 0)] * m[(2, 1)] - m[(1, 1)] * m[(2, 0)])
}

/// Adjugate matrix, satisfying `m * adjugate(m) == det(m) * I` exactly.
pub fn adjugate_i64(m: &Matrix3<i64>) -> Matrix3<i64> {
    let mut out = Matrix3::zeros();
    for r in 0..3 {
        for c in 0..3 {
            let sign = if (r + c) % 2 == 0 { 1 } else { -1 };
            // transpose of the cofactor matrix
            out[(c, r)] = sign * minor(m, r, c);
        }
    }
    out
}

fn minor(m: &Matrix3<i64>, r: usize, c: usize) -> i64 {
    let rr: Vec<usize> = (0..3).filter(|&i| i != r).collect();
    let cc: Vec<usize> = (0..3).filter(|&i| i != c).collect();
    m[(rr[0], cc[0])] * m[(rr[1], cc[1])] - m[(rr[0], cc[1])] * m[(rr[1], cc[0])]
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    #[test]
    fn adjugate_inverts() {
        let m = Matrix3::new(
            2, 1, 0,
            -1, 1, 3,
            0, 0, 2,
        );
        let det = det_i64(&m);
        assert_eq!(det, 6);
        assert_eq!(m * adjugate_i64(&m), Matrix3::identity() * det);
    }

    #[test]
    fn unfloat_rejects_non_integers() {
        assert_eq!(Tol(1e-6).unfloat(3.0000000001).unwrap(), 3);
        assert!(Tol(1e-6).unfloat(3.01).is_err());
        assert_eq!(Tol(1e-6).unfloat(-2.0).unwrap(), -2);
    }

    #[test]
    fn tolerant_comparison() {
        assert_eq!(tol_cmp(1.0, 1.0 + 1e-9, 1e-6), Ordering::Equal);
        assert_eq!(tol_cmp(1.0, 2.0, 1e-6), Ordering::Less);
        assert_eq!(tol_cmp(2.0, 1.0, 1e-6), Ordering::Greater);
    }
}
