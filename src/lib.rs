//! Symmetry-orbit core of a crystallographic configuration library.
//!
//! Two tightly coupled problems are solved here, both on a periodic crystal
//! ("prim"):
//!
//! * Given a supercell (an integer-matrix enlargement of the prim cell),
//!   construct the site-permutation representation of the symmetries that
//!   map the supercell onto itself: internal lattice translations, and the
//!   prim factor-group operations compatible with the super-lattice.
//!   See `Supercell` and `SupercellSymInfo`.
//!
//! * Given the prim factor group, enumerate orbits of integral clusters of
//!   lattice sites, either with the periodic symmetry of the prim or with
//!   the local symmetry around a fixed "phenomenal" cluster.
//!   See `make_prim_periodic_orbits` and `make_local_orbits`.
//!
//! # Permutation convention
//!
//! Every permutation in this crate is stored as `perm[new] = old`: applying
//! the operation moves the value at index `old` to index `new`.  This is the
//! opposite of some textbook conventions.  Composition is value-flow:
//! `a.then(b)[n] == a[b[n]]`.  See `Permutation`.
//!
//! # Sharing
//!
//! Everything is immutable after construction.  `Prim`, `SymGroup` and the
//! supercells produced by the canonical-form operators are shared through
//! `Arc`, so results may be used freely from multiple threads once built;
//! construction itself is single-threaded.

#![deny(unused_must_use)]

extern crate nalgebra;
extern crate num_integer;
extern crate ordered_float;
#[macro_use] extern crate itertools;
#[macro_use] extern crate log;
#[macro_use] extern crate failure;
#[macro_use] extern crate lazy_static;
#[cfg(feature = "serde")]
#[macro_use] extern crate serde;
#[cfg(test)] extern crate rand;

#[derive(Debug, Fail)]
#[fail(display = "not nearly an integer: {}", value)]
pub struct IntPrecisionError {
    backtrace: ::failure::Backtrace,
    value: f64,
}

impl IntPrecisionError {
    pub(crate) fn new(value: f64) -> Self {
        IntPrecisionError { backtrace: ::failure::Backtrace::new(), value: value }
    }
}

mod core;
mod algo;
mod oper;
mod util;

//---------------------------
// public reexports; API

pub use ::core::lattice::canonical;
pub use ::core::lattice::{invariant_subgroup_indices, lattice_cmp, lattice_eq};
pub use ::core::lattice::{Lattice, Superlattice, SuperlatticeError};

pub use ::core::coords::{UnitCell, UnitCellCoord};
pub use ::core::cluster::{ClusterInvariants, CompareCluster, IntegralCluster};
pub use ::core::prim::{BasicStructure, Prim};
pub use ::core::prim::{make_factor_group, make_lattice_point_group, make_prim_point_group};

pub use ::oper::perm::{Permutation, PermutationError};
pub use ::oper::symmops::{ops_match, ops_match_mod_lattice, SymOp};
pub use ::oper::symmops::{make_unitcellcoord_rep, make_unitcellcoord_symgroup_rep};
pub use ::oper::symmops::{RepresentationError, UnitCellCoordRep};

pub use ::algo::index::{UnitCellCoordIndexConverter, UnitCellIndexConverter};

pub use ::algo::group::{generate_finite_group, make_canonical_element, make_equivalence_map,
                        make_inverse_indices, make_invariant_subgroups,
                        make_multiplication_table, make_orbit};
pub use ::algo::group::{SubgroupIndices, SymGroup};

pub use ::algo::supercell::{make_factor_group_permutations, make_supercell_factor_group,
                            make_translation_permutations};
pub use ::algo::supercell::{Supercell, SupercellSymInfo, SupercellSymOp};

pub use ::algo::canonical::{from_canonical, is_canonical, make_canonical_form,
                            make_equivalents, site_indices_are_invariant, to_canonical};

pub use ::algo::neighborhood::{all_clusters_filter, all_sites_filter, cutoff_radius_neighborhood,
                               max_length_cluster_filter, max_length_neighborhood,
                               origin_neighborhood};
pub use ::algo::neighborhood::{CandidateSitesFunction, ClusterFilterFunction, SiteFilterFunction};

pub use ::algo::orbits::{local_copy_apply, prim_periodic_copy_apply,
                         prim_periodic_frac_translation};
pub use ::algo::orbits::{make_cluster_group, make_cluster_groups, make_local_cluster_groups,
                         make_local_orbit, make_local_orbits, make_prim_periodic_orbit,
                         make_prim_periodic_orbits};
pub use ::algo::orbits::{IntegralClusterOrbitGenerator, SubClusterCounter};
