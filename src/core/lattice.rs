use ::failure::Backtrace;
use ::nalgebra::{Matrix3, Vector3};
use ::oper::symmops::SymOp;
use ::std::cmp::Ordering;
use ::util::{self, Tol};

/// Default absolute tolerance (cartesian) for lattice comparisons.
pub const DEFAULT_TOL: f64 = 1e-5;

/// A 3x3 matrix whose columns are lattice vectors, with a precomputed
/// inverse and a comparison tolerance.
#[derive(Debug, Clone)]
pub struct Lattice {
    matrix: Matrix3<f64>,
    inverse: Matrix3<f64>,
    tol: f64,
}

// Manual impl that doesn't compare the inverse or the tolerance.
impl PartialEq<Lattice> for Lattice {
    fn eq(&self, other: &Lattice) -> bool {
        self.matrix == other.matrix
    }
}

impl Lattice {
    /// Create a lattice from a matrix where the columns are lattice vectors.
    ///
    /// # Panics
    ///
    /// Panics if the matrix is singular.
    #[inline]
    pub fn new(matrix: Matrix3<f64>) -> Self
    { Self::with_tol(matrix, DEFAULT_TOL) }

    pub fn with_tol(matrix: Matrix3<f64>, tol: f64) -> Self {
        let inverse = matrix.try_inverse().expect("singular lattice matrix");
        Lattice { matrix: matrix, inverse: inverse, tol: tol }
    }

    /// Matrix where lattice vectors are columns.
    #[inline]
    pub fn matrix(&self) -> &Matrix3<f64>
    { &self.matrix }

    /// Inverse of the matrix where lattice vectors are columns.
    #[inline]
    pub fn inverse_matrix(&self) -> &Matrix3<f64>
    { &self.inverse }

    #[inline]
    pub fn tol(&self) -> f64
    { self.tol }

    /// Get the (positive) volume of the lattice cell.
    pub fn volume(&self) -> f64
    { self.matrix.determinant().abs() }

    pub fn frac_to_cart(&self, frac: &Vector3<f64>) -> Vector3<f64>
    { self.matrix * frac }

    pub fn cart_to_frac(&self, cart: &Vector3<f64>) -> Vector3<f64>
    { self.inverse * cart }

    pub fn column_norms(&self) -> [f64; 3]
    { [self.matrix.column(0).norm(), self.matrix.column(1).norm(), self.matrix.column(2).norm()] }
}

/// Helper constructors
impl Lattice {
    /// The identity lattice.
    #[inline]
    pub fn eye() -> Self
    { Self::cubic(1.0) }

    /// A cubic lattice ((a, a, a), (90, 90, 90))
    #[inline]
    pub fn cubic(a: f64) -> Self
    { Self::orthorhombic(a, a, a) }

    /// An orthorhombic lattice ((a, b, c), (90, 90, 90))
    #[inline]
    pub fn orthorhombic(a: f64, b: f64, c: f64) -> Self {
        Self::new(Matrix3::new(
            a, 0.0, 0.0,
            0.0, b, 0.0,
            0.0, 0.0, c,
        ))
    }

    /// The primitive cell of a face-centered cubic lattice with conventional
    /// cube edge `a`.
    #[inline]
    pub fn fcc(a: f64) -> Self {
        let h = 0.5 * a;
        // columns are (0, h, h), (h, 0, h), (h, h, 0)
        Self::new(Matrix3::new(
            0.0, h, h,
            h, 0.0, h,
            h, h, 0.0,
        ))
    }
}

impl Default for Lattice {
    #[inline]
    fn default() -> Self
    { Self::eye() }
}

/// Total order on lattices: lexicographic over the matrix entries in
/// column-major order, entries closer than `tol` comparing equal.
///
/// This is the fixed ordering behind the canonical-form operators; it is
/// point-group compatible in the sense that it is a fixed order on
/// matrices, applied uniformly to every point-group image.
pub fn lattice_cmp(a: &Lattice, b: &Lattice, tol: f64) -> Ordering {
    for c in 0..3 {
        for r in 0..3 {
            match util::tol_cmp(a.matrix[(r, c)], b.matrix[(r, c)], tol) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
    }
    Ordering::Equal
}

pub fn lattice_eq(a: &Lattice, b: &Lattice, tol: f64) -> bool
{ lattice_cmp(a, b, tol) == Ordering::Equal }

/// Indices of the operations whose rotation maps `lattice` onto an
/// equivalent lattice (one generating the same set of lattice points).
///
/// `R L` and `L` generate the same points iff `L⁻¹ R L` is integral with
/// determinant ±1.
pub fn invariant_subgroup_indices(lattice: &Lattice, ops: &[SymOp]) -> Vec<usize> {
    let tol = Tol(lattice.tol());
    let mut indices = vec![];
    for (ix, op) in ops.iter().enumerate() {
        let t = lattice.inverse_matrix() * op.matrix * lattice.matrix();
        if let Ok(t) = tol.unfloat_m33(&t) {
            if util::det_i64(&t).abs() == 1 {
                indices.push(ix);
            }
        }
    }
    indices
}

/// Canonical forms of lattices under a point group: the canonical lattice
/// is the `lattice_cmp`-greatest image of the orbit.
pub mod canonical {
    use super::{lattice_cmp, lattice_eq, Lattice};
    use ::oper::symmops::SymOp;
    use ::std::cmp::Ordering;

    /// True iff `lattice` compares `>=` every image of itself.
    pub fn check(lattice: &Lattice, ops: &[SymOp]) -> bool {
        ops.iter().all(|op| {
            lattice_cmp(&op.transform_lattice(lattice), lattice, lattice.tol())
                != Ordering::Greater
        })
    }

    /// The greatest image of `lattice` under `ops`, at tolerance `tol`.
    pub fn equivalent(lattice: &Lattice, ops: &[SymOp], tol: f64) -> Lattice {
        let mut best = lattice.clone();
        for op in ops {
            let image = op.transform_lattice(lattice);
            if lattice_cmp(&image, &best, tol) == Ordering::Greater {
                best = image;
            }
        }
        best
    }

    /// Index of the first operation carrying `lattice` to its canonical form.
    pub fn operation_index(lattice: &Lattice, ops: &[SymOp]) -> usize {
        let canonical = equivalent(lattice, ops, lattice.tol());
        for (ix, op) in ops.iter().enumerate() {
            if lattice_eq(&op.transform_lattice(lattice), &canonical, lattice.tol()) {
                return ix;
            }
        }
        panic!("canonical::operation_index: no operation found (BUG)");
    }
}

#[derive(Debug, Fail)]
pub enum SuperlatticeError {
    #[fail(display = "superlattice is not an integer multiple of the primitive lattice")]
    NotASuperlattice { backtrace: Backtrace },
    #[fail(display = "superlattice transformation matrix is singular")]
    Singular { backtrace: Backtrace },
}

/// A pair of lattices `(L, S)` related by `S = L * T` for an integer
/// matrix `T` with nonzero determinant.
#[derive(Debug, Clone, PartialEq)]
pub struct Superlattice {
    prim_lattice: Lattice,
    superlattice: Lattice,
    transformation_matrix: Matrix3<i64>,
}

impl Superlattice {
    pub fn new(prim_lattice: Lattice, superlattice: Lattice) -> Result<Superlattice, SuperlatticeError>
    {Ok({
        let t = prim_lattice.inverse_matrix() * superlattice.matrix();
        let t = Tol(prim_lattice.tol()).unfloat_m33(&t)
            .map_err(|_| SuperlatticeError::NotASuperlattice { backtrace: Backtrace::new() })?;
        if util::det_i64(&t) == 0 {
            return Err(SuperlatticeError::Singular { backtrace: Backtrace::new() });
        }
        Superlattice {
            prim_lattice: prim_lattice,
            superlattice: superlattice,
            transformation_matrix: t,
        }
    })}

    pub fn from_transformation_matrix(
        prim_lattice: Lattice,
        t: &Matrix3<i64>,
    ) -> Result<Superlattice, SuperlatticeError>
    {Ok({
        if util::det_i64(t) == 0 {
            return Err(SuperlatticeError::Singular { backtrace: Backtrace::new() });
        }
        let s = prim_lattice.matrix() * t.map(|x| x as f64);
        let superlattice = Lattice::with_tol(s, prim_lattice.tol());
        Superlattice {
            prim_lattice: prim_lattice,
            superlattice: superlattice,
            transformation_matrix: *t,
        }
    })}

    pub fn prim_lattice(&self) -> &Lattice
    { &self.prim_lattice }

    pub fn superlattice(&self) -> &Lattice
    { &self.superlattice }

    pub fn transformation_matrix(&self) -> &Matrix3<i64>
    { &self.transformation_matrix }

    /// Number of prim unit cells in the supercell, `|det T|`.
    pub fn size(&self) -> usize
    { util::det_i64(&self.transformation_matrix).abs() as usize }

    pub fn tol(&self) -> f64
    { self.prim_lattice.tol() }
}
