use ::algo::group::SymGroup;
use ::core::coords::UnitCellCoord;
use ::core::lattice::Lattice;
use ::nalgebra::{Matrix3, Vector3};
use ::oper::symmops::{make_unitcellcoord_symgroup_rep, matrix_eq, RepresentationError, SymOp,
                      UnitCellCoordRep};
use ::std::sync::Arc;
use ::util;

/// The primitive cell: a lattice plus basis sites given in fractional
/// coordinates, each carrying an occupant type label.
#[derive(Debug, Clone)]
pub struct BasicStructure {
    lattice: Lattice,
    frac_coords: Vec<Vector3<f64>>,
    types: Vec<String>,
}

impl BasicStructure {
    /// Basis coordinates are mapped into `[0, 1)`.
    pub fn new(lattice: Lattice, frac_coords: Vec<Vector3<f64>>, types: Vec<String>) -> BasicStructure {
        assert_eq!(frac_coords.len(), types.len(), "one occupant type per basis site");
        let frac_coords = frac_coords.into_iter().map(frac_within).collect();
        BasicStructure { lattice: lattice, frac_coords: frac_coords, types: types }
    }

    pub fn lattice(&self) -> &Lattice
    { &self.lattice }

    pub fn num_sublattices(&self) -> usize
    { self.frac_coords.len() }

    pub fn frac_coords(&self) -> &[Vector3<f64>]
    { &self.frac_coords }

    pub fn types(&self) -> &[String]
    { &self.types }

    pub fn site_frac(&self, site: &UnitCellCoord) -> Vector3<f64>
    { site.unitcell.cast() + self.frac_coords[site.sublattice] }

    pub fn site_cart(&self, site: &UnitCellCoord) -> Vector3<f64>
    { self.lattice.frac_to_cart(&self.site_frac(site)) }
}

fn frac_within(v: Vector3<f64>) -> Vector3<f64> {
    v.map(|x| {
        let y = x - x.floor();
        if y == 1.0 { 0.0 } else { y }
    })
}

lazy_static! {
    // a set of integral lattice coordinates large enough that, for a
    // reasonably reduced cell, it contains every vector equal in length to
    // a cell vector
    static ref LATTICE_POINTS: Vec<Vector3<i64>> = {
        const MAX: i64 = 3;
        let mut points = Vec::with_capacity(((2 * MAX + 1) as usize).pow(3));
        for i in -MAX..MAX + 1 {
            for j in -MAX..MAX + 1 {
                for k in -MAX..MAX + 1 {
                    points.push(Vector3::new(i, j, k));
                }
            }
        }
        points
    };
}

/// The point group of a lattice, as integral matrices acting on fractional
/// coordinates.
///
/// For each rotation `R` preserving the lattice there is an integral `W`
/// with `R L = L W`, and `W` must preserve the metric `G = Lᵀ L`.  The
/// candidate columns of `W` are the few lattice vectors with the right
/// length, which keeps the search space tiny.
///
/// The cell should be reasonably reduced (no basis vector very long
/// compared to the shortest ones); all the usual crystallographic cells
/// qualify.
pub fn make_lattice_point_group(lattice: &Lattice) -> Vec<Matrix3<i64>> {
    let metric = lattice.matrix().transpose() * lattice.matrix();
    let eff_tol = lattice.tol();

    let metric_dot = |a: &Vector3<i64>, b: &Vector3<i64>| -> f64 {
        let bf = b.map(|x| x as f64);
        a.map(|x| x as f64).dot(&(metric * bf))
    };

    // candidate columns: lattice vectors with the same length as each cell vector
    let candidates: Vec<Vec<Vector3<i64>>> = (0..3).map(|j| {
        let target = metric[(j, j)];
        LATTICE_POINTS.iter()
            .filter(|&w| (metric_dot(w, w) - target).abs() <= eff_tol)
            .cloned()
            .collect()
    }).collect();

    let mut point_group = vec![];
    for w0 in &candidates[0] {
        for w1 in &candidates[1] {
            // off-diagonal metric elements must match too
            if (metric_dot(w0, w1) - metric[(0, 1)]).abs() > eff_tol {
                continue;
            }
            for w2 in &candidates[2] {
                if (metric_dot(w0, w2) - metric[(0, 2)]).abs() > eff_tol {
                    continue;
                }
                if (metric_dot(w1, w2) - metric[(1, 2)]).abs() > eff_tol {
                    continue;
                }
                let w = Matrix3::from_columns(&[*w0, *w1, *w2]);
                if util::det_i64(&w).abs() != 1 {
                    continue;
                }
                point_group.push(w);
            }
        }
    }
    debug!("lattice point group contains {} operations", point_group.len());
    point_group
}

/// The factor group of a structure: every `(R, tau)` carrying each basis
/// site onto a same-type basis site, modulo lattice translations.
///
/// The candidate translations for each lattice point-group rotation are
/// the offsets carrying the first basis site onto each same-type site; a
/// candidate survives if it works for every site.  Operations are produced
/// in a deterministic order (rotation search order, then candidate order).
pub fn make_factor_group(structure: &BasicStructure) -> Vec<SymOp> {
    let lattice = structure.lattice();
    let ftol = lattice.tol();
    let mut elements = vec![];

    for w in make_lattice_point_group(lattice) {
        let frac_rot = w.map(|x| x as f64);
        let cart_rot = lattice.matrix() * frac_rot * lattice.inverse_matrix();

        let mut taken: Vec<Vector3<f64>> = vec![];
        for j in 0..structure.num_sublattices() {
            if structure.types()[j] != structure.types()[0] {
                continue;
            }
            let tau = frac_within(structure.frac_coords()[j] - frac_rot * structure.frac_coords()[0]);
            if taken.iter().any(|t| is_integer_v3(&(t - tau), ftol)) {
                continue;
            }
            if maps_structure_onto_itself(structure, &frac_rot, &tau, ftol) {
                elements.push(SymOp::new(cart_rot, lattice.frac_to_cart(&tau), false));
                taken.push(tau);
            }
        }
    }
    debug!("factor group contains {} operations", elements.len());
    elements
}

fn maps_structure_onto_itself(
    structure: &BasicStructure,
    frac_rot: &Matrix3<f64>,
    tau: &Vector3<f64>,
    ftol: f64,
) -> bool {
    'sites: for b in 0..structure.num_sublattices() {
        let image = frac_rot * structure.frac_coords()[b] + tau;
        for b2 in 0..structure.num_sublattices() {
            if structure.types()[b2] == structure.types()[b]
                && is_integer_v3(&(image - structure.frac_coords()[b2]), ftol)
            {
                continue 'sites;
            }
        }
        return false;
    }
    true
}

fn is_integer_v3(v: &Vector3<f64>, tol: f64) -> bool
{ (0..3).all(|i| (v[i] - v[i].round()).abs() <= tol) }

/// The prim point group: the distinct rotation parts of the factor group,
/// translations dropped, in first-occurrence order.
pub fn make_prim_point_group(factor_group: &[SymOp], tol: f64) -> Vec<SymOp> {
    let mut out: Vec<SymOp> = vec![];
    for op in factor_group {
        let rotation = SymOp::new(op.matrix, Vector3::zeros(), op.time_reversal);
        let duplicate = out.iter().any(|seen| {
            seen.time_reversal == rotation.time_reversal
                && matrix_eq(&seen.matrix, &rotation.matrix, tol)
        });
        if !duplicate {
            out.push(rotation);
        }
    }
    out
}

/// A primitive crystal with its symmetry information: the factor group,
/// the point group, and the restriction of every factor-group operation to
/// integral site coordinates.
#[derive(Debug)]
pub struct Prim {
    pub structure: BasicStructure,
    pub factor_group: Arc<SymGroup>,
    pub point_group: Arc<SymGroup>,
    /// One `UnitCellCoordRep` per factor-group element, in element order.
    pub basis_rep: Vec<UnitCellCoordRep>,
}

impl Prim {
    pub fn new(structure: BasicStructure) -> Result<Arc<Prim>, RepresentationError>
    {Ok({
        let elements = make_factor_group(&structure);
        let basis_rep = make_unitcellcoord_symgroup_rep(&elements, &structure)?;
        let point_elements = make_prim_point_group(&elements, structure.lattice().tol());
        Arc::new(Prim {
            factor_group: Arc::new(SymGroup::new_root(elements)),
            point_group: Arc::new(SymGroup::new_root(point_elements)),
            basis_rep: basis_rep,
            structure: structure,
        })
    })}
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    fn single_site(lattice: Lattice) -> BasicStructure {
        BasicStructure::new(lattice, vec![Vector3::zeros()], vec!["A".to_string()])
    }

    #[test]
    fn cubic_lattice_point_group_is_full_octahedral() {
        assert_eq!(make_lattice_point_group(&Lattice::cubic(1.0)).len(), 48);
    }

    #[test]
    fn fcc_primitive_point_group_is_full_octahedral() {
        assert_eq!(make_lattice_point_group(&Lattice::fcc(2.0)).len(), 48);
    }

    #[test]
    fn tetragonal_point_group() {
        assert_eq!(make_lattice_point_group(&Lattice::orthorhombic(1.0, 1.0, 2.0)).len(), 16);
    }

    #[test]
    fn cubic_single_site_factor_group() {
        let prim = Prim::new(single_site(Lattice::cubic(1.0))).unwrap();
        assert_eq!(prim.factor_group.len(), 48);
        assert_eq!(prim.point_group.len(), 48);
        assert_eq!(prim.basis_rep.len(), 48);
        // symmorphic: no fractional translations
        for op in &prim.factor_group.element {
            assert!(op.translation.norm() < 1e-9);
        }
    }

    #[test]
    fn fcc_conventional_factor_group_includes_centering() {
        let structure = BasicStructure::new(
            Lattice::cubic(1.0),
            vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(0.0, 0.5, 0.5),
                Vector3::new(0.5, 0.0, 0.5),
                Vector3::new(0.5, 0.5, 0.0),
            ],
            vec!["A".to_string(); 4],
        );
        let prim = Prim::new(structure).unwrap();
        // 48 rotations x 4 centering translations
        assert_eq!(prim.factor_group.len(), 192);
        assert_eq!(prim.point_group.len(), 48);
    }

    #[test]
    fn two_type_basis_restricts_the_factor_group() {
        // CsCl-like: corner and body center of different types; inversion
        // and all 48 cubic rotations survive, but no translation maps A to B
        let structure = BasicStructure::new(
            Lattice::cubic(1.0),
            vec![Vector3::zeros(), Vector3::new(0.5, 0.5, 0.5)],
            vec!["A".to_string(), "B".to_string()],
        );
        let prim = Prim::new(structure).unwrap();
        assert_eq!(prim.factor_group.len(), 48);
    }
}
