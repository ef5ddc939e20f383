//! Canonical-form operators on supercells.
//!
//! The canonical form of a super-lattice is the `lattice_cmp`-greatest
//! image of its orbit under the prim point group; a supercell is canonical
//! when its super-lattice compares `>=` every image.

use ::algo::supercell::{Supercell, SupercellSymOp};
use ::core::lattice::{canonical, invariant_subgroup_indices, lattice_cmp, lattice_eq,
                      Lattice, Superlattice};
use ::oper::symmops::SymOp;
use ::std::collections::BTreeSet;
use ::std::sync::Arc;

/// True iff the super-lattice compares `>=` all of its point-group images.
pub fn is_canonical(supercell: &Supercell) -> bool {
    canonical::check(
        supercell.superlattice.superlattice(),
        &supercell.prim.point_group.element,
    )
}

/// The supercell sharing this one's prim whose super-lattice is the
/// `>=`-maximum of the point-group orbit.
pub fn make_canonical_form(supercell: &Supercell) -> Arc<Supercell> {
    let superlattice = &supercell.superlattice;
    let canonical_lattice = canonical::equivalent(
        superlattice.superlattice(),
        &supercell.prim.point_group.element,
        superlattice.tol(),
    );
    let canonical_superlattice =
        Superlattice::new(superlattice.prim_lattice().clone(), canonical_lattice)
            .expect("(BUG) canonical lattice is not a superlattice");
    Arc::new(Supercell::new(supercell.prim.clone(), canonical_superlattice))
}

/// The first point-group operation carrying the super-lattice onto its
/// canonical form.  The "first" rule is the tie-break; the point group's
/// element order is never rearranged.
pub fn to_canonical(supercell: &Supercell) -> SymOp {
    let point_group = &supercell.prim.point_group.element;
    let ix = canonical::operation_index(supercell.superlattice.superlattice(), point_group);
    point_group[ix].clone()
}

/// The first point-group operation carrying the canonical super-lattice
/// back onto this supercell's super-lattice.
///
/// # Panics
///
/// Panics if no operation qualifies, which cannot happen for a well-formed
/// point group.
pub fn from_canonical(supercell: &Supercell) -> SymOp {
    let superlattice = supercell.superlattice.superlattice();
    let point_group = &supercell.prim.point_group.element;
    let canonical_lattice =
        canonical::equivalent(superlattice, point_group, supercell.superlattice.tol());

    for op in point_group {
        if lattice_eq(superlattice, &op.transform_lattice(&canonical_lattice), superlattice.tol()) {
            return op.clone();
        }
    }
    panic!("from_canonical: not found");
}

/// The distinct supercells with super-lattices symmetrically equivalent to
/// this one's.
///
/// Each point-group image is first put into a representation-prepared form
/// (canonicalised under the invariant subgroup of the transformed lattice),
/// which collapses images that generate the same lattice through different
/// basis matrices.  The result is sorted by the lattice order and free of
/// duplicates.
pub fn make_equivalents(supercell: &Supercell) -> Vec<Arc<Supercell>> {
    let prim = &supercell.prim;
    let point_group = &prim.point_group.element;
    let init_superlattice = supercell.superlattice.superlattice();
    let tol = supercell.superlattice.tol();

    let representation_prepare = |superlattice: Lattice| -> Lattice {
        let indices = invariant_subgroup_indices(&superlattice, point_group);
        let invariant_subgroup: Vec<SymOp> =
            indices.into_iter().map(|i| point_group[i].clone()).collect();
        canonical::equivalent(&superlattice, &invariant_subgroup, tol)
    };

    let mut superlattices: Vec<Lattice> = vec![];
    for op in point_group {
        let prepared = representation_prepare(op.transform_lattice(init_superlattice));
        if !superlattices.iter().any(|known| lattice_eq(known, &prepared, tol)) {
            superlattices.push(prepared);
        }
    }
    superlattices.sort_by(|a, b| lattice_cmp(a, b, tol));

    superlattices.into_iter().map(|superlattice| {
        let superlattice =
            Superlattice::new(supercell.superlattice.prim_lattice().clone(), superlattice)
                .expect("(BUG) equivalent lattice is not a superlattice");
        Arc::new(Supercell::new(prim.clone(), superlattice))
    }).collect()
}

/// True if the operation does not mix the given sites with other sites.
///
/// Applying the operation moves the value from site `op.permute_index(s)`
/// into site `s`; the set is invariant iff no source index lies outside it.
pub fn site_indices_are_invariant(op: &SupercellSymOp, site_indices: &BTreeSet<usize>) -> bool {
    site_indices.iter().all(|&s| site_indices.contains(&op.permute_index(s)))
}
