use ::core::coords::{UnitCell, UnitCellCoord};
use ::nalgebra::{Matrix3, Vector3};
use ::num_integer::Integer;
use ::std::collections::HashMap;
use ::util;

/// Bijection between linear indices and the integral unit cells of a
/// supercell of shape `T`.
///
/// Any integer tuple is accepted by the forward map: it is first reduced
/// into the supercell (`u - T * floor(T⁻¹ u)`, computed exactly through the
/// adjugate).  This reduction is what implements periodic boundary
/// conditions for everything built on top.
#[derive(Debug, Clone)]
pub struct UnitCellIndexConverter {
    transformation_matrix: Matrix3<i64>,
    adjugate: Matrix3<i64>,
    determinant: i64,
    unitcells: Vec<UnitCell>,
    index_of: HashMap<UnitCell, usize>,
}

impl UnitCellIndexConverter {
    pub fn new(transformation_matrix: &Matrix3<i64>) -> UnitCellIndexConverter {
        let determinant = util::det_i64(transformation_matrix);
        assert!(determinant != 0, "supercell transformation matrix is singular");

        let mut converter = UnitCellIndexConverter {
            transformation_matrix: *transformation_matrix,
            adjugate: util::adjugate_i64(transformation_matrix),
            determinant: determinant,
            unitcells: vec![],
            index_of: HashMap::new(),
        };

        // every residue representative lies in the bounding box of the
        // half-open parallelepiped spanned by the columns of T
        let corners: Vec<Vector3<i64>> = (0..8).map(|m| {
            let e = Vector3::new((m & 1) as i64, ((m >> 1) & 1) as i64, ((m >> 2) & 1) as i64);
            converter.transformation_matrix * e
        }).collect();

        let bound = |axis: usize| -> (i64, i64) {
            let lo = corners.iter().map(|c| c[axis]).min().unwrap();
            let hi = corners.iter().map(|c| c[axis]).max().unwrap();
            (lo, hi)
        };
        let (ilo, ihi) = bound(0);
        let (jlo, jhi) = bound(1);
        let (klo, khi) = bound(2);

        for i in ilo..ihi + 1 {
            for j in jlo..jhi + 1 {
                for k in klo..khi + 1 {
                    let unitcell = UnitCell::new(i, j, k);
                    if converter.bring_within(&unitcell) == unitcell {
                        converter.unitcells.push(unitcell);
                    }
                }
            }
        }
        assert_eq!(converter.unitcells.len() as i64, determinant.abs(),
            "(BUG) wrong number of residue classes");

        converter.unitcells.sort();
        converter.index_of = converter.unitcells.iter().enumerate()
            .map(|(ix, &unitcell)| (unitcell, ix))
            .collect();
        converter
    }

    /// Reduce integer coordinates into the supercell.  Exact; the result is
    /// the unique representative `r` of the residue class with
    /// `T⁻¹ r ∈ [0, 1)³`.
    pub fn bring_within(&self, unitcell: &UnitCell) -> UnitCell {
        let u = unitcell.to_vector();
        // det * T⁻¹ u, exactly
        let scaled = self.adjugate * u;
        let quotient = Vector3::new(
            Integer::div_floor(&scaled.x, &self.determinant),
            Integer::div_floor(&scaled.y, &self.determinant),
            Integer::div_floor(&scaled.z, &self.determinant),
        );
        UnitCell::from_vector(&(u - self.transformation_matrix * quotient))
    }

    pub fn total_unitcells(&self) -> usize
    { self.unitcells.len() }

    pub fn unitcell(&self, index: usize) -> UnitCell
    { self.unitcells[index] }

    pub fn index(&self, unitcell: &UnitCell) -> usize
    { self.index_of[&self.bring_within(unitcell)] }
}

/// Bijection between linear site indices and integral site coordinates
/// `(b, i, j, k)` of a supercell.
///
/// Sites are ordered in sublattice blocks: `l = b * N_unitcells + n`.
#[derive(Debug, Clone)]
pub struct UnitCellCoordIndexConverter {
    unitcell_converter: UnitCellIndexConverter,
    num_sublattices: usize,
}

impl UnitCellCoordIndexConverter {
    pub fn new(transformation_matrix: &Matrix3<i64>, num_sublattices: usize) -> UnitCellCoordIndexConverter {
        assert!(num_sublattices > 0, "structure with no basis sites");
        UnitCellCoordIndexConverter {
            unitcell_converter: UnitCellIndexConverter::new(transformation_matrix),
            num_sublattices: num_sublattices,
        }
    }

    pub fn total_sites(&self) -> usize
    { self.unitcell_converter.total_unitcells() * self.num_sublattices }

    pub fn unitcellcoord(&self, index: usize) -> UnitCellCoord {
        assert!(index < self.total_sites(), "site index {} out of range", index);
        let volume = self.unitcell_converter.total_unitcells();
        UnitCellCoord {
            sublattice: index / volume,
            unitcell: self.unitcell_converter.unitcell(index % volume),
        }
    }

    /// The `(i, j, k)` part is reduced into the supercell first.
    pub fn index(&self, site: &UnitCellCoord) -> usize {
        assert!(site.sublattice < self.num_sublattices,
            "sublattice index {} out of range", site.sublattice);
        site.sublattice * self.unitcell_converter.total_unitcells()
            + self.unitcell_converter.index(&site.unitcell)
    }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    fn non_diagonal() -> Matrix3<i64> {
        Matrix3::new(
            1, 1, 0,
            -1, 1, 0,
            0, 0, 2,
        )
    }

    #[test]
    fn unitcell_bijection() {
        let converter = UnitCellIndexConverter::new(&non_diagonal());
        assert_eq!(converter.total_unitcells(), 4);
        for ix in 0..converter.total_unitcells() {
            assert_eq!(converter.index(&converter.unitcell(ix)), ix);
        }
    }

    #[test]
    fn reduction_is_periodic() {
        use ::rand::Rng;

        let t = non_diagonal();
        let converter = UnitCellIndexConverter::new(&t);
        let mut rng = ::rand::thread_rng();
        for _ in 0..200 {
            let u = UnitCell::new(rng.gen_range(-6..7), rng.gen_range(-6..7), rng.gen_range(-6..7));
            let z = Vector3::new(rng.gen_range(-3..4), rng.gen_range(-3..4), rng.gen_range(-3..4));
            let shifted = UnitCell::from_vector(&(u.to_vector() + t * z));
            assert_eq!(converter.index(&u), converter.index(&shifted));
            assert_eq!(converter.bring_within(&u), converter.bring_within(&shifted));
        }
    }

    #[test]
    fn representatives_reduce_to_themselves() {
        let converter = UnitCellIndexConverter::new(&non_diagonal());
        for ix in 0..converter.total_unitcells() {
            let u = converter.unitcell(ix);
            assert_eq!(converter.bring_within(&u), u);
        }
        // the origin is always a representative
        assert_eq!(converter.bring_within(&UnitCell::zero()), UnitCell::zero());
    }

    #[test]
    fn site_bijection_with_sublattices() {
        let converter = UnitCellCoordIndexConverter::new(&non_diagonal(), 3);
        assert_eq!(converter.total_sites(), 12);
        for l in 0..converter.total_sites() {
            assert_eq!(converter.index(&converter.unitcellcoord(l)), l);
        }
        // out-of-cell coordinates reduce into the supercell
        let site = UnitCellCoord::new(2, 5, -3, 4);
        let reduced = converter.unitcellcoord(converter.index(&site));
        assert_eq!(reduced.sublattice, 2);
    }
}
