use ::core::cluster::IntegralCluster;
use ::core::coords::{UnitCell, UnitCellCoord};
use ::core::lattice::Lattice;
use ::core::prim::BasicStructure;
use ::failure::Backtrace;
use ::nalgebra::{Matrix3, Vector3};
use ::util::Tol;

/// A symmetry operation in cartesian form: `x -> matrix * x + translation`,
/// optionally composed with time reversal.
#[derive(Debug, Clone, PartialEq)]
pub struct SymOp {
    pub matrix: Matrix3<f64>,
    pub translation: Vector3<f64>,
    pub time_reversal: bool,
}

impl SymOp {
    pub fn new(matrix: Matrix3<f64>, translation: Vector3<f64>, time_reversal: bool) -> SymOp
    { SymOp { matrix: matrix, translation: translation, time_reversal: time_reversal } }

    pub fn identity() -> SymOp
    { SymOp::new(Matrix3::identity(), Vector3::zeros(), false) }

    /// Flipped group operator: `a.then(b)` is "apply `a`, then apply `b`".
    ///
    /// `a.then(b) == b.of(a)`.
    pub fn then(&self, other: &SymOp) -> SymOp {
        SymOp {
            matrix: other.matrix * self.matrix,
            translation: other.matrix * self.translation + other.translation,
            time_reversal: self.time_reversal != other.time_reversal,
        }
    }

    /// Conventional group operator.
    pub fn of(&self, other: &SymOp) -> SymOp
    { other.then(self) }

    pub fn transform(&self, x: &Vector3<f64>) -> Vector3<f64>
    { self.matrix * x + self.translation }

    /// Apply the rotation part to a lattice: the image has column matrix
    /// `matrix * L`.
    pub fn transform_lattice(&self, lattice: &Lattice) -> Lattice
    { Lattice::with_tol(self.matrix * lattice.matrix(), lattice.tol()) }
}

pub(crate) fn matrix_eq(a: &Matrix3<f64>, b: &Matrix3<f64>, tol: f64) -> bool {
    (0..3).all(|r| (0..3).all(|c| (a[(r, c)] - b[(r, c)]).abs() <= tol))
}

/// Exact equality of operations, at an absolute tolerance.
pub fn ops_match(a: &SymOp, b: &SymOp, tol: f64) -> bool {
    a.time_reversal == b.time_reversal
        && matrix_eq(&a.matrix, &b.matrix, tol)
        && (a.translation - b.translation).norm() <= tol
}

/// Equality of operations up to a lattice translation.
///
/// This is the equality of the factor group: two operations are the same
/// factor-group element when their rotations agree and their translations
/// differ by an integer lattice vector.
pub fn ops_match_mod_lattice(a: &SymOp, b: &SymOp, lattice: &Lattice) -> bool {
    if a.time_reversal != b.time_reversal || !matrix_eq(&a.matrix, &b.matrix, lattice.tol()) {
        return false;
    }
    let diff = lattice.cart_to_frac(&(a.translation - b.translation));
    (0..3).all(|i| (diff[i] - diff[i].round()).abs() <= lattice.tol())
}

/// The action of one symmetry operation restricted to integral site
/// coordinates.
///
/// A site `(b, u)` maps to
/// `(sublattice_index[b], point_matrix * u + unitcell_indices[b])`.
#[derive(Debug, Clone)]
pub struct UnitCellCoordRep {
    /// Fractional rotation matrix; integral because the operation maps the
    /// lattice onto itself.
    pub point_matrix: Matrix3<i64>,
    /// Where each sublattice lands.
    pub sublattice_index: Vec<usize>,
    /// The unit cell the transformed origin-cell site of each sublattice
    /// lands in.
    pub unitcell_indices: Vec<UnitCell>,
}

impl UnitCellCoordRep {
    pub fn identity(num_sublattices: usize) -> UnitCellCoordRep {
        UnitCellCoordRep {
            point_matrix: Matrix3::identity(),
            sublattice_index: (0..num_sublattices).collect(),
            unitcell_indices: vec![UnitCell::zero(); num_sublattices],
        }
    }

    pub fn apply(&self, site: &UnitCellCoord) -> UnitCellCoord {
        let rotated = self.point_matrix * site.unitcell.to_vector();
        UnitCellCoord {
            sublattice: self.sublattice_index[site.sublattice],
            unitcell: UnitCell::from_vector(&rotated) + self.unitcell_indices[site.sublattice],
        }
    }

    /// Elementwise application to a cluster.
    pub fn apply_in_place(&self, cluster: &mut IntegralCluster) {
        for site in cluster.elements_mut() {
            *site = self.apply(site);
        }
    }

    pub fn copy_apply(&self, mut cluster: IntegralCluster) -> IntegralCluster {
        self.apply_in_place(&mut cluster);
        cluster
    }
}

#[derive(Debug, Fail)]
pub enum RepresentationError {
    #[fail(display = "operation does not act integrally on the lattice")]
    NonIntegralRotation { backtrace: Backtrace },
    #[fail(display = "a transformed basis site matches no basis site")]
    NoMatchingSite { backtrace: Backtrace },
}

/// Restrict each operation to its action on integral site coordinates.
///
/// Fails if an operation is inconsistent with the structure: its fractional
/// rotation is not integral, or it carries some basis site to a position
/// occupied by no basis site.
pub fn make_unitcellcoord_symgroup_rep(
    ops: &[SymOp],
    structure: &BasicStructure,
) -> Result<Vec<UnitCellCoordRep>, RepresentationError> {
    ops.iter().map(|op| make_unitcellcoord_rep(op, structure)).collect()
}

pub fn make_unitcellcoord_rep(
    op: &SymOp,
    structure: &BasicStructure,
) -> Result<UnitCellCoordRep, RepresentationError>
{Ok({
    let lattice = structure.lattice();
    let tol = Tol(lattice.tol());

    let frac_rot = lattice.inverse_matrix() * op.matrix * lattice.matrix();
    let point_matrix = tol.unfloat_m33(&frac_rot)
        .map_err(|_| RepresentationError::NonIntegralRotation { backtrace: Backtrace::new() })?;
    let frac_trans = lattice.cart_to_frac(&op.translation);

    let num_sublattices = structure.num_sublattices();
    let mut sublattice_index = Vec::with_capacity(num_sublattices);
    let mut unitcell_indices = Vec::with_capacity(num_sublattices);

    'sublat: for b in 0..num_sublattices {
        let image = frac_rot * structure.frac_coords()[b] + frac_trans;
        for b2 in 0..num_sublattices {
            if let Ok(t) = tol.unfloat_v3(&(image - structure.frac_coords()[b2])) {
                sublattice_index.push(b2);
                unitcell_indices.push(UnitCell::from_vector(&t));
                continue 'sublat;
            }
        }
        return Err(RepresentationError::NoMatchingSite { backtrace: Backtrace::new() });
    }

    UnitCellCoordRep {
        point_matrix: point_matrix,
        sublattice_index: sublattice_index,
        unitcell_indices: unitcell_indices,
    }
})}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use ::core::cluster::IntegralCluster;

    #[test]
    fn composition_order() {
        // two operations that don't commute
        let quarter_turn = SymOp::new(
            Matrix3::new(
                0.0, -1.0, 0.0,
                1.0, 0.0, 0.0,
                0.0, 0.0, 1.0,
            ),
            Vector3::zeros(),
            false,
        );
        let shift = SymOp::new(Matrix3::identity(), Vector3::new(1.0, 0.0, 0.0), false);

        let x = Vector3::new(1.0, 2.0, 3.0);
        let rotate_then_shift = quarter_turn.then(&shift);
        assert!((rotate_then_shift.transform(&x) - (quarter_turn.transform(&x) + Vector3::new(1.0, 0.0, 0.0))).norm() < 1e-12);
        assert_eq!(rotate_then_shift, shift.of(&quarter_turn));
    }

    #[test]
    fn mod_lattice_matching() {
        let lattice = Lattice::cubic(1.0);
        let a = SymOp::identity();
        let b = SymOp::new(Matrix3::identity(), Vector3::new(2.0, -1.0, 0.0), false);
        let c = SymOp::new(Matrix3::identity(), Vector3::new(0.5, 0.0, 0.0), false);
        assert!(ops_match_mod_lattice(&a, &b, &lattice));
        assert!(!ops_match_mod_lattice(&a, &c, &lattice));
        assert!(!ops_match(&a, &b, lattice.tol()));
    }

    #[test]
    fn rep_of_a_quarter_turn_on_fcc_conventional() {
        let structure = BasicStructure::new(
            Lattice::cubic(1.0),
            vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(0.0, 0.5, 0.5),
                Vector3::new(0.5, 0.0, 0.5),
                Vector3::new(0.5, 0.5, 0.0),
            ],
            vec!["A".to_string(), "A".to_string(), "A".to_string(), "A".to_string()],
        );
        // quarter turn about z
        let op = SymOp::new(
            Matrix3::new(
                0.0, -1.0, 0.0,
                1.0, 0.0, 0.0,
                0.0, 0.0, 1.0,
            ),
            Vector3::zeros(),
            false,
        );
        let rep = make_unitcellcoord_rep(&op, &structure).unwrap();

        // (0, 1/2, 1/2) -> (-1/2, 0, 1/2) = (1/2, 0, 1/2) - (1, 0, 0)
        assert_eq!(rep.sublattice_index, vec![0, 2, 1, 3]);
        assert_eq!(rep.apply(&UnitCellCoord::new(1, 0, 0, 0)), UnitCellCoord::new(2, -1, 0, 0));

        // elementwise on clusters
        let cluster = IntegralCluster::new(vec![
            UnitCellCoord::new(0, 0, 0, 0),
            UnitCellCoord::new(1, 0, 0, 0),
        ]);
        let image = rep.copy_apply(cluster);
        assert_eq!(image.elements(), &[
            UnitCellCoord::new(0, 0, 0, 0),
            UnitCellCoord::new(2, -1, 0, 0),
        ]);
    }

    #[test]
    fn inconsistent_op_is_rejected() {
        let structure = BasicStructure::new(
            Lattice::cubic(1.0),
            vec![Vector3::new(0.0, 0.0, 0.0)],
            vec!["A".to_string()],
        );
        let bogus = SymOp::new(Matrix3::identity(), Vector3::new(0.25, 0.0, 0.0), false);
        assert!(make_unitcellcoord_rep(&bogus, &structure).is_err());
    }
}
