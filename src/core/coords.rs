use ::nalgebra::Vector3;
use ::std::cmp::Ordering;
use ::std::ops::{Add, AddAssign, Index, Neg, Sub, SubAssign};

/// Integral coordinates `(i, j, k)` of a lattice translation.
///
/// Values are multiples of the prim lattice vectors; arithmetic is
/// componentwise and the derived ordering is lexicographic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnitCell(pub [i64; 3]);

impl UnitCell {
    pub fn new(i: i64, j: i64, k: i64) -> UnitCell
    { UnitCell([i, j, k]) }

    pub fn zero() -> UnitCell
    { UnitCell([0, 0, 0]) }

    pub fn to_vector(&self) -> Vector3<i64>
    { Vector3::new(self.0[0], self.0[1], self.0[2]) }

    pub fn from_vector(v: &Vector3<i64>) -> UnitCell
    { UnitCell([v.x, v.y, v.z]) }

    pub fn cast(&self) -> Vector3<f64>
    { Vector3::new(self.0[0] as f64, self.0[1] as f64, self.0[2] as f64) }
}

impl Index<usize> for UnitCell {
    type Output = i64;

    fn index(&self, i: usize) -> &i64
    { &self.0[i] }
}

impl Add for UnitCell {
    type Output = UnitCell;

    fn add(mut self, other: UnitCell) -> UnitCell
    { self += other; self }
}

impl Sub for UnitCell {
    type Output = UnitCell;

    fn sub(mut self, other: UnitCell) -> UnitCell
    { self -= other; self }
}

impl Neg for UnitCell {
    type Output = UnitCell;

    fn neg(self) -> UnitCell
    { UnitCell([-self.0[0], -self.0[1], -self.0[2]]) }
}

impl AddAssign for UnitCell {
    fn add_assign(&mut self, other: UnitCell) {
        for i in 0..3 {
            self.0[i] += other.0[i];
        }
    }
}

impl SubAssign for UnitCell {
    fn sub_assign(&mut self, other: UnitCell) {
        for i in 0..3 {
            self.0[i] -= other.0[i];
        }
    }
}

/// One site of the infinite crystal: a sublattice index `b` plus the
/// integral coordinates of the unit cell containing the site.
///
/// The ordering is lexicographic on the unit cell with the sublattice as
/// the final tie-break.  Comparing unit cells first is what makes the
/// canonical (least) representative of a cluster orbit gather its sites
/// around the origin cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnitCellCoord {
    pub sublattice: usize,
    pub unitcell: UnitCell,
}

impl Ord for UnitCellCoord {
    fn cmp(&self, other: &UnitCellCoord) -> Ordering {
        self.unitcell.cmp(&other.unitcell)
            .then_with(|| self.sublattice.cmp(&other.sublattice))
    }
}

impl PartialOrd for UnitCellCoord {
    fn partial_cmp(&self, other: &UnitCellCoord) -> Option<Ordering>
    { Some(self.cmp(other)) }
}

impl UnitCellCoord {
    pub fn new(sublattice: usize, i: i64, j: i64, k: i64) -> UnitCellCoord
    { UnitCellCoord { sublattice: sublattice, unitcell: UnitCell::new(i, j, k) } }

    pub fn from_parts(sublattice: usize, unitcell: UnitCell) -> UnitCellCoord
    { UnitCellCoord { sublattice: sublattice, unitcell: unitcell } }

    pub fn unitcell(&self) -> UnitCell
    { self.unitcell }
}

/// Translating a site moves it to another image of the same sublattice.
impl Add<UnitCell> for UnitCellCoord {
    type Output = UnitCellCoord;

    fn add(mut self, translation: UnitCell) -> UnitCellCoord
    { self.unitcell += translation; self }
}

impl Sub<UnitCell> for UnitCellCoord {
    type Output = UnitCellCoord;

    fn sub(mut self, translation: UnitCell) -> UnitCellCoord
    { self.unitcell -= translation; self }
}

impl AddAssign<UnitCell> for UnitCellCoord {
    fn add_assign(&mut self, translation: UnitCell)
    { self.unitcell += translation; }
}

impl SubAssign<UnitCell> for UnitCellCoord {
    fn sub_assign(&mut self, translation: UnitCell)
    { self.unitcell -= translation; }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    #[test]
    fn unitcell_arithmetic() {
        let a = UnitCell::new(1, -2, 3);
        let b = UnitCell::new(0, 1, -1);
        assert_eq!(a + b, UnitCell::new(1, -1, 2));
        assert_eq!(a - b, UnitCell::new(1, -3, 4));
        assert_eq!(-a, UnitCell::new(-1, 2, -3));
        assert_eq!(a + UnitCell::zero(), a);
    }

    #[test]
    fn ordering_is_lexicographic() {
        assert!(UnitCell::new(0, 5, 5) < UnitCell::new(1, -5, -5));
        assert!(UnitCell::new(0, 0, -1) < UnitCell::new(0, 0, 0));
        // sites compare by unit cell first, sublattice last
        assert!(UnitCellCoord::new(1, 0, 0, 0) < UnitCellCoord::new(0, 0, 0, 1));
        assert!(UnitCellCoord::new(0, 0, 0, 0) < UnitCellCoord::new(1, 0, 0, 0));
        assert!(UnitCellCoord::new(1, 0, 0, 0) < UnitCellCoord::new(1, 0, 0, 1));
        assert!(UnitCellCoord::new(0, -1, 9, 9) < UnitCellCoord::new(0, 0, 0, 0));
    }

    #[test]
    fn site_translation() {
        let mut site = UnitCellCoord::new(2, 0, 0, 0);
        site += UnitCell::new(1, 1, -1);
        assert_eq!(site, UnitCellCoord::new(2, 1, 1, -1));
        site -= UnitCell::new(1, 1, -1);
        assert_eq!(site.unitcell(), UnitCell::zero());
        assert_eq!(site.sublattice, 2);
    }
}
