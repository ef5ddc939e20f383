//! Orbit engines for integral clusters: prim-periodic and local.
//!
//! The single most important design choice here is the treatment of
//! lattice translation.  Prim-periodic canonicalisation folds every
//! cluster into a single origin representative (the smallest element is
//! translated into the origin unit cell), so clusters related by a lattice
//! translation are identified.  Local canonicalisation does not: the
//! phenomenal cluster breaks translational symmetry, and two local
//! clusters differing only by a lattice translation stay distinct.

use ::algo::group::{self, SymGroup};
use ::algo::neighborhood::{all_clusters_filter, cutoff_radius_neighborhood,
                           max_length_cluster_filter, max_length_neighborhood,
                           origin_neighborhood, ClusterFilterFunction, SiteFilterFunction};
use ::core::cluster::{ClusterInvariants, CompareCluster, IntegralCluster};
use ::core::coords::{UnitCell, UnitCellCoord};
use ::core::lattice::Lattice;
use ::core::prim::BasicStructure;
use ::nalgebra::Matrix3;
use ::oper::symmops::{SymOp, UnitCellCoordRep};
use ::std::collections::BTreeSet;
use ::std::sync::Arc;

/// A cluster forced into the enumeration regardless of the site and
/// cluster filters, optionally together with all of its subclusters.
#[derive(Debug, Clone)]
pub struct IntegralClusterOrbitGenerator {
    pub prototype: IntegralCluster,
    pub include_subclusters: bool,
}

/// Non-restartable lazy sequence over every site-subset of a prototype
/// cluster (the empty subset included).
#[derive(Debug, Clone)]
pub struct SubClusterCounter {
    sites: Vec<UnitCellCoord>,
    mask: u64,
    count: u64,
}

impl SubClusterCounter {
    pub fn new(prototype: &IntegralCluster) -> SubClusterCounter {
        assert!(prototype.len() < 64, "prototype cluster too large to enumerate subclusters");
        SubClusterCounter {
            sites: prototype.elements().to_vec(),
            mask: 0,
            count: 1u64 << prototype.len(),
        }
    }

    pub fn valid(&self) -> bool
    { self.mask < self.count }

    pub fn value(&self) -> IntegralCluster {
        assert!(self.valid(), "SubClusterCounter used past its end");
        IntegralCluster::new(
            self.sites.iter().enumerate()
                .filter(|&(i, _)| self.mask & (1u64 << i) != 0)
                .map(|(_, &site)| site)
                .collect())
    }

    pub fn next(&mut self)
    { self.mask += 1; }
}

/// Apply an operation to a cluster and fold it into the origin coset:
/// sort, then translate so the first (smallest) element sits in the origin
/// unit cell.
pub fn prim_periodic_copy_apply(op: &UnitCellCoordRep, clust: IntegralCluster) -> IntegralCluster {
    if clust.is_empty() {
        return clust;
    }
    let mut clust = op.copy_apply(clust);
    clust.sort();
    let shift = clust[0].unitcell();
    clust -= shift;
    clust
}

/// The lattice translation that must follow `op` to bring the transformed
/// cluster back to the origin coset.
pub fn prim_periodic_frac_translation(op: &UnitCellCoordRep, clust: IntegralCluster) -> UnitCell {
    if clust.is_empty() {
        return UnitCell::zero();
    }
    let mut clust = clust;
    clust.sort();
    let pos_init = clust[0].unitcell();
    let mut clust = op.copy_apply(clust);
    clust.sort();
    let pos_final = clust[0].unitcell();
    pos_init - pos_final
}

/// Apply an operation to a local cluster: sort only, no translation to the
/// origin.
pub fn local_copy_apply(op: &UnitCellCoordRep, clust: IntegralCluster) -> IntegralCluster {
    if clust.is_empty() {
        return clust;
    }
    let mut clust = op.copy_apply(clust);
    clust.sort();
    clust
}

/// The orbit of a cluster under prim-periodic symmetry.
pub fn make_prim_periodic_orbit(
    orbit_element: &IntegralCluster,
    rep: &[UnitCellCoordRep],
) -> BTreeSet<IntegralCluster> {
    group::make_orbit(orbit_element, rep, |op, c| prim_periodic_copy_apply(op, c))
}

/// The orbit of a local cluster.
pub fn make_local_orbit(
    orbit_element: &IntegralCluster,
    rep: &[UnitCellCoordRep],
) -> BTreeSet<IntegralCluster> {
    group::make_orbit(orbit_element, rep, |op, c| local_copy_apply(op, c))
}

/// Per orbit element, the group of operations leaving its sites invariant,
/// each operation augmented with the cartesian translation that makes it
/// literally fix the cluster (not merely up to a lattice translation).
pub fn make_cluster_groups(
    orbit: &BTreeSet<IntegralCluster>,
    factor_group: &Arc<SymGroup>,
    lattice: &Lattice,
    rep: &[UnitCellCoordRep],
) -> Vec<Arc<SymGroup>> {
    let equivalence_map =
        group::make_equivalence_map(orbit, rep, |op, c| prim_periodic_copy_apply(op, c));
    let subgroup_indices = group::make_invariant_subgroups(&equivalence_map, factor_group, lattice);

    izip!(orbit, &subgroup_indices).map(|(element, indices)| {
        let elements = indices.iter().map(|&j| {
            let frac = prim_periodic_frac_translation(&rep[j], element.clone());
            let cart_translation =
                SymOp::new(Matrix3::identity(), lattice.frac_to_cart(&frac.cast()), false);
            factor_group.element[j].then(&cart_translation)
        }).collect();
        Arc::new(SymGroup::subgroup_with_elements(factor_group, elements, indices.clone()))
    }).collect()
}

/// The group leaving a single cluster invariant, with the cartesian
/// translations attached.  An empty cluster is fixed by the whole factor
/// group.
pub fn make_cluster_group(
    cluster: IntegralCluster,
    factor_group: &Arc<SymGroup>,
    lattice: &Lattice,
    rep: &[UnitCellCoordRep],
) -> Arc<SymGroup> {
    if cluster.is_empty() {
        return factor_group.clone();
    }
    let mut cluster = cluster;
    cluster.sort();

    let mut elements = vec![];
    let mut indices = BTreeSet::new();
    for (i, op) in rep.iter().enumerate() {
        let mut transformed = op.copy_apply(cluster.clone());
        transformed.sort();

        let frac = cluster[0].unitcell() - transformed[0].unitcell();
        transformed += frac;

        if transformed == cluster {
            let cart_translation =
                SymOp::new(Matrix3::identity(), lattice.frac_to_cart(&frac.cast()), false);
            elements.push(factor_group.element[i].then(&cart_translation));
            indices.insert(i);
        }
    }
    Arc::new(SymGroup::subgroup_with_elements(factor_group, elements, indices))
}

/// Per local-orbit element, the subgroup of the phenomenal group fixing
/// it.  No translation parts are added: phenomenal-group operations
/// already fix the phenomenal cluster literally.
pub fn make_local_cluster_groups(
    orbit: &BTreeSet<IntegralCluster>,
    phenomenal_group: &Arc<SymGroup>,
    lattice: &Lattice,
    rep: &[UnitCellCoordRep],
) -> Vec<Arc<SymGroup>> {
    let equivalence_map =
        group::make_equivalence_map(orbit, rep, |op, c| local_copy_apply(op, c));
    let subgroup_indices =
        group::make_invariant_subgroups(&equivalence_map, phenomenal_group, lattice);

    subgroup_indices.iter().map(|indices| {
        let elements = indices.iter().map(|&j| phenomenal_group.element[j].clone()).collect();
        Arc::new(SymGroup::subgroup_with_elements(phenomenal_group, elements, indices.clone()))
    }).collect()
}

// ordered set of (invariants, cluster) pairs, maintained by binary search
// under the tolerance comparator (a BTreeSet cannot carry one)
type ClusterSet = Vec<(ClusterInvariants, IntegralCluster)>;

fn insert_cluster(set: &mut ClusterSet, compare: &CompareCluster, pair: (ClusterInvariants, IntegralCluster)) {
    match set.binary_search_by(|probe| compare.cmp(probe, &pair)) {
        Ok(_) => {}
        Err(position) => set.insert(position, pair),
    }
}

/// Enumerate orbits of clusters with the periodic symmetry of the prim,
/// branch by branch.
///
/// `max_length[branch]` is the maximum site-to-site distance for clusters
/// of `branch` sites; the entries for branches 0 and 1 are ignored, and
/// the length of `max_length` fixes the maximum cluster size.  Custom
/// generators are inserted after the branch loop and bypass both filters.
///
/// The result is ordered by `CompareCluster` over the canonical orbit
/// representatives; the null cluster's orbit always comes first.
pub fn make_prim_periodic_orbits(
    structure: &BasicStructure,
    rep: &[UnitCellCoordRep],
    site_filter: &SiteFilterFunction,
    max_length: &[f64],
    custom_generators: &[IntegralClusterOrbitGenerator],
) -> Vec<BTreeSet<IntegralCluster>> {
    let compare = CompareCluster::new(structure.lattice().tol());
    let mut final_set: ClusterSet = vec![];
    let mut prev_branch: ClusterSet = vec![];

    // the null cluster is always included
    let null_cluster = IntegralCluster::default();
    insert_cluster(&mut final_set, &compare,
        (ClusterInvariants::new(&null_cluster, structure), null_cluster.clone()));
    insert_cluster(&mut prev_branch, &compare,
        (ClusterInvariants::new(&null_cluster, structure), null_cluster));

    let make_canonical = |cluster: &IntegralCluster| -> IntegralCluster {
        group::make_canonical_element(cluster, rep, |op, c| prim_periodic_copy_apply(op, c))
    };

    for branch in 1..max_length.len() {
        let candidate_sites = if branch == 1 {
            origin_neighborhood()(structure, site_filter)
        } else {
            max_length_neighborhood(max_length[branch])(structure, site_filter)
        };
        let cluster_filter: ClusterFilterFunction = if branch == 1 {
            all_clusters_filter()
        } else {
            max_length_cluster_filter(max_length[branch])
        };

        // grow every cluster of the previous branch by one candidate site
        let mut curr_branch: ClusterSet = vec![];
        for &(_, ref cluster) in &prev_branch {
            for site in &candidate_sites {
                if cluster.elements().contains(site) {
                    continue;
                }
                let mut test_cluster = cluster.clone();
                test_cluster.elements_mut().push(*site);

                let invariants = ClusterInvariants::new(&test_cluster, structure);
                if !cluster_filter(&invariants, &test_cluster) {
                    continue;
                }
                let test_cluster = make_canonical(&test_cluster);
                insert_cluster(&mut curr_branch, &compare, (invariants, test_cluster));
            }
        }
        trace!("branch {}: {} candidate sites, {} unique clusters",
            branch, candidate_sites.len(), curr_branch.len());

        for pair in &prev_branch {
            insert_cluster(&mut final_set, &compare, pair.clone());
        }
        prev_branch = curr_branch;
    }
    for pair in &prev_branch {
        insert_cluster(&mut final_set, &compare, pair.clone());
    }

    // custom generators bypass the site and cluster filters
    for generator in custom_generators {
        let prototype = make_canonical(&generator.prototype);
        insert_cluster(&mut final_set, &compare,
            (ClusterInvariants::new(&prototype, structure), prototype));

        if generator.include_subclusters {
            let mut counter = SubClusterCounter::new(&generator.prototype);
            while counter.valid() {
                let subcluster = make_canonical(&counter.value());
                insert_cluster(&mut final_set, &compare,
                    (ClusterInvariants::new(&subcluster, structure), subcluster));
                counter.next();
            }
        }
    }

    final_set.iter()
        .map(|&(_, ref cluster)| make_prim_periodic_orbit(cluster, rep))
        .collect()
}

/// Enumerate orbits of local clusters around a phenomenal cluster.
///
/// `rep` must represent a group of operations fixing the phenomenal
/// cluster (a cluster group or a subgroup of one); this is a caller
/// obligation and is not checked.  Candidate sites for every branch come
/// from `cutoff_radius[branch]` around the phenomenal sites; the cluster
/// filter still uses `max_length[branch]`.
pub fn make_local_orbits(
    structure: &BasicStructure,
    rep: &[UnitCellCoordRep],
    site_filter: &SiteFilterFunction,
    max_length: &[f64],
    custom_generators: &[IntegralClusterOrbitGenerator],
    phenomenal: &IntegralCluster,
    cutoff_radius: &[f64],
    include_phenomenal_sites: bool,
) -> Vec<BTreeSet<IntegralCluster>> {
    let compare = CompareCluster::new(structure.lattice().tol());
    let mut final_set: ClusterSet = vec![];
    let mut prev_branch: ClusterSet = vec![];

    let invariants = |cluster: &IntegralCluster| -> ClusterInvariants {
        ClusterInvariants::with_phenomenal(cluster, phenomenal, structure)
    };

    let null_cluster = IntegralCluster::default();
    insert_cluster(&mut final_set, &compare, (invariants(&null_cluster), null_cluster.clone()));
    insert_cluster(&mut prev_branch, &compare, (invariants(&null_cluster), null_cluster));

    let make_canonical = |cluster: &IntegralCluster| -> IntegralCluster {
        group::make_canonical_element(cluster, rep, |op, c| local_copy_apply(op, c))
    };

    for branch in 1..max_length.len() {
        let candidate_sites = cutoff_radius_neighborhood(
            phenomenal.clone(),
            cutoff_radius[branch],
            include_phenomenal_sites,
        )(structure, site_filter);

        let cluster_filter: ClusterFilterFunction = if branch == 1 {
            all_clusters_filter()
        } else {
            max_length_cluster_filter(max_length[branch])
        };

        let mut curr_branch: ClusterSet = vec![];
        for &(_, ref cluster) in &prev_branch {
            for site in &candidate_sites {
                if cluster.elements().contains(site) {
                    continue;
                }
                let mut test_cluster = cluster.clone();
                test_cluster.elements_mut().push(*site);

                let test_invariants = invariants(&test_cluster);
                if !cluster_filter(&test_invariants, &test_cluster) {
                    continue;
                }
                let test_cluster = make_canonical(&test_cluster);
                insert_cluster(&mut curr_branch, &compare, (test_invariants, test_cluster));
            }
        }
        trace!("local branch {}: {} candidate sites, {} unique clusters",
            branch, candidate_sites.len(), curr_branch.len());

        for pair in &prev_branch {
            insert_cluster(&mut final_set, &compare, pair.clone());
        }
        prev_branch = curr_branch;
    }
    for pair in &prev_branch {
        insert_cluster(&mut final_set, &compare, pair.clone());
    }

    for generator in custom_generators {
        let prototype = make_canonical(&generator.prototype);
        insert_cluster(&mut final_set, &compare, (invariants(&prototype), prototype));

        if generator.include_subclusters {
            let mut counter = SubClusterCounter::new(&generator.prototype);
            while counter.valid() {
                let subcluster = make_canonical(&counter.value());
                insert_cluster(&mut final_set, &compare, (invariants(&subcluster), subcluster));
                counter.next();
            }
        }
    }

    final_set.iter()
        .map(|&(_, ref cluster)| make_local_orbit(cluster, rep))
        .collect()
}
