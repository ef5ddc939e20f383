use ::algo::group::SymGroup;
use ::algo::index::{UnitCellCoordIndexConverter, UnitCellIndexConverter};
use ::core::lattice::{invariant_subgroup_indices, Superlattice, SuperlatticeError};
use ::core::prim::Prim;
use ::nalgebra::Matrix3;
use ::oper::perm::Permutation;
use ::oper::symmops::UnitCellCoordRep;
use ::std::collections::BTreeSet;
use ::std::sync::Arc;

/// A supercell of a prim, with its index converters and symmetry
/// information.
#[derive(Debug)]
pub struct Supercell {
    pub prim: Arc<Prim>,
    pub superlattice: Superlattice,
    pub unitcell_index_converter: UnitCellIndexConverter,
    pub unitcellcoord_index_converter: UnitCellCoordIndexConverter,
    pub sym_info: SupercellSymInfo,
}

impl Supercell {
    pub fn new(prim: Arc<Prim>, superlattice: Superlattice) -> Supercell {
        let t = *superlattice.transformation_matrix();
        let unitcell_index_converter = UnitCellIndexConverter::new(&t);
        let unitcellcoord_index_converter =
            UnitCellCoordIndexConverter::new(&t, prim.structure.num_sublattices());
        let sym_info = SupercellSymInfo::new(
            &prim,
            &superlattice,
            &unitcell_index_converter,
            &unitcellcoord_index_converter,
        );
        Supercell {
            prim: prim,
            superlattice: superlattice,
            unitcell_index_converter: unitcell_index_converter,
            unitcellcoord_index_converter: unitcellcoord_index_converter,
            sym_info: sym_info,
        }
    }

    pub fn from_transformation_matrix(
        prim: Arc<Prim>,
        t: &Matrix3<i64>,
    ) -> Result<Supercell, SuperlatticeError>
    {Ok({
        let superlattice =
            Superlattice::from_transformation_matrix(prim.structure.lattice().clone(), t)?;
        Supercell::new(prim, superlattice)
    })}

    pub fn total_sites(&self) -> usize
    { self.unitcellcoord_index_converter.total_sites() }
}

/// Symmetry of a supercell in site-permutation form.
///
/// `factor_group` is the subgroup of the prim factor group compatible with
/// the super-lattice; the permutation tables describe how internal lattice
/// translations and factor-group operations rearrange the supercell's
/// sites.  All permutations obey `perm[new] = old`.
#[derive(Debug)]
pub struct SupercellSymInfo {
    pub factor_group: Arc<SymGroup>,
    /// One permutation per lattice point of the supercell, ordered by the
    /// unit cell converter's linear index.
    pub translation_permutations: Vec<Permutation>,
    /// One permutation per factor-group element, in element order.
    pub factor_group_permutations: Vec<Permutation>,
}

impl SupercellSymInfo {
    pub fn new(
        prim: &Arc<Prim>,
        superlattice: &Superlattice,
        unitcell_index_converter: &UnitCellIndexConverter,
        unitcellcoord_index_converter: &UnitCellCoordIndexConverter,
    ) -> SupercellSymInfo {
        let factor_group = Arc::new(make_supercell_factor_group(prim, superlattice));
        let translation_permutations =
            make_translation_permutations(unitcell_index_converter, unitcellcoord_index_converter);
        let factor_group_permutations = make_factor_group_permutations(
            &factor_group.head_group_index,
            &prim.basis_rep,
            unitcellcoord_index_converter,
        );
        SupercellSymInfo {
            factor_group: factor_group,
            translation_permutations: translation_permutations,
            factor_group_permutations: factor_group_permutations,
        }
    }
}

/// The subgroup of the prim factor group whose operations leave the
/// super-lattice invariant.
pub fn make_supercell_factor_group(prim: &Arc<Prim>, superlattice: &Superlattice) -> SymGroup {
    let head_group_index: BTreeSet<usize> =
        invariant_subgroup_indices(superlattice.superlattice(), &prim.factor_group.element)
            .into_iter()
            .collect();
    SymGroup::subgroup(&prim.factor_group, head_group_index)
}

/// Site permutations of the internal lattice translations of a supercell.
///
/// For the translation with linear index `t`, applying it carries the site
/// at index `old` to `new = index(site + t)`, recorded as
/// `perm[new] = old`.
pub fn make_translation_permutations(
    unitcell_index_converter: &UnitCellIndexConverter,
    unitcellcoord_index_converter: &UnitCellCoordIndexConverter,
) -> Vec<Permutation> {
    let total_sites = unitcellcoord_index_converter.total_sites();
    let mut translation_permutations = Vec::with_capacity(unitcell_index_converter.total_unitcells());

    for translation_ix in 0..unitcell_index_converter.total_unitcells() {
        let translation = unitcell_index_converter.unitcell(translation_ix);

        let mut permutation = vec![::std::usize::MAX; total_sites];
        for old_site_ix in 0..total_sites {
            let old_site = unitcellcoord_index_converter.unitcellcoord(old_site_ix);
            let new_site_ix = unitcellcoord_index_converter.index(&(old_site + translation));
            permutation[new_site_ix] = old_site_ix;
        }
        // every site must have been assigned exactly once
        debug_assert!(permutation.iter().all(|&ix| ix != ::std::usize::MAX));
        translation_permutations.push(Permutation::from_vec_unchecked(permutation));
    }
    translation_permutations
}

/// Site permutations of the factor-group operations compatible with a
/// supercell.
///
/// `head_group_index` selects which prim factor-group operations to
/// represent (ascending order, matching the supercell factor group's
/// element order); `basis_rep` is the prim's integral-site representation.
pub fn make_factor_group_permutations(
    head_group_index: &BTreeSet<usize>,
    basis_rep: &[UnitCellCoordRep],
    unitcellcoord_index_converter: &UnitCellCoordIndexConverter,
) -> Vec<Permutation> {
    let total_sites = unitcellcoord_index_converter.total_sites();
    let mut factor_group_permutations = Vec::with_capacity(head_group_index.len());

    for &operation_ix in head_group_index {
        let rep = &basis_rep[operation_ix];

        let mut permutation = vec![::std::usize::MAX; total_sites];
        for old_site_ix in 0..total_sites {
            let old_site = unitcellcoord_index_converter.unitcellcoord(old_site_ix);
            let new_site_ix = unitcellcoord_index_converter.index(&rep.apply(&old_site));
            permutation[new_site_ix] = old_site_ix;
        }
        debug_assert!(permutation.iter().all(|&ix| ix != ::std::usize::MAX));
        factor_group_permutations.push(Permutation::from_vec_unchecked(permutation));
    }
    factor_group_permutations
}

/// One element of the full supercell symmetry group: a factor-group
/// operation followed by an internal lattice translation.
#[derive(Debug, Clone, Copy)]
pub struct SupercellSymOp<'a> {
    sym_info: &'a SupercellSymInfo,
    pub factor_group_index: usize,
    pub translation_index: usize,
}

impl<'a> SupercellSymOp<'a> {
    pub fn new(
        sym_info: &'a SupercellSymInfo,
        factor_group_index: usize,
        translation_index: usize,
    ) -> SupercellSymOp<'a> {
        assert!(factor_group_index < sym_info.factor_group_permutations.len());
        assert!(translation_index < sym_info.translation_permutations.len());
        SupercellSymOp {
            sym_info: sym_info,
            factor_group_index: factor_group_index,
            translation_index: translation_index,
        }
    }

    /// The source site index whose value this operation moves into
    /// `site_index`.
    pub fn permute_index(&self, site_index: usize) -> usize {
        let trans = &self.sym_info.translation_permutations[self.translation_index];
        let factor = &self.sym_info.factor_group_permutations[self.factor_group_index];
        factor[trans[site_index]]
    }

    /// The combined permutation table (factor-group operation first, then
    /// the translation).
    pub fn permutation(&self) -> Permutation {
        let trans = &self.sym_info.translation_permutations[self.translation_index];
        let factor = &self.sym_info.factor_group_permutations[self.factor_group_index];
        factor.then(trans)
    }
}
