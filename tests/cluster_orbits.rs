extern crate nalgebra;
extern crate xtal_orbits;

use nalgebra::{Matrix3, Vector3};
use std::collections::BTreeSet;
use std::sync::Arc;
use xtal_orbits::{all_sites_filter, cutoff_radius_neighborhood, local_copy_apply,
                  make_canonical_element, make_cluster_group, make_cluster_groups,
                  make_equivalence_map, make_invariant_subgroups, make_local_cluster_groups,
                  make_local_orbit, make_local_orbits, make_prim_periodic_orbit,
                  make_prim_periodic_orbits, make_unitcellcoord_symgroup_rep, ops_match,
                  prim_periodic_copy_apply};
use xtal_orbits::{BasicStructure, IntegralCluster, IntegralClusterOrbitGenerator, Lattice, Prim,
                  SymOp, UnitCell, UnitCellCoord};

fn fcc_conventional_prim() -> Arc<Prim> {
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
    Prim::new(structure).unwrap()
}

fn fcc_primitive_prim() -> Arc<Prim> {
    let structure = BasicStructure::new(
        Lattice::fcc(2.0),
        vec![Vector3::zeros()],
        vec!["A".to_string()],
    );
    Prim::new(structure).unwrap()
}

fn nearest_neighbor_pair() -> IntegralCluster {
    IntegralCluster::new(vec![
        UnitCellCoord::new(0, 0, 0, 0),
        UnitCellCoord::new(0, 1, 0, 0),
    ])
}

// scenario: point-pair orbits of fcc (conventional cell, four sublattices)
// up to the nearest-neighbor distance
#[test]
fn fcc_point_pair_orbits() {
    let prim = fcc_conventional_prim();
    let structure = &prim.structure;
    let rep = &prim.basis_rep;
    let site_filter = all_sites_filter();
    let nn = 0.5 * 2.0f64.sqrt();

    let orbits = make_prim_periodic_orbits(structure, rep, &site_filter, &[0.0, 0.0, nn], &[]);

    // null cluster, single site, nearest-neighbor pair
    assert_eq!(orbits.len(), 3);
    assert_eq!(orbits[0].len(), 1);
    assert!(orbits[0].iter().next().unwrap().is_empty());
    assert_eq!(orbits[1].len(), 4);
    assert_eq!(orbits[2].len(), 24);

    // cluster sizes never exceed the branch count
    for orbit in &orbits {
        for cluster in orbit {
            assert!(cluster.len() <= 2);
        }
    }

    // the canonical representative of the pair orbit has both sites in the
    // origin unit cell
    let canonical_pair = orbits[2].iter().next().unwrap();
    assert_eq!(canonical_pair.elements(), &[
        UnitCellCoord::new(0, 0, 0, 0),
        UnitCellCoord::new(1, 0, 0, 0),
    ]);
    for site in canonical_pair.elements() {
        assert_eq!(site.unitcell(), UnitCell::zero());
    }

    // every returned orbit is represented by the canonical (least) element
    // of its own orbit
    for orbit in &orbits {
        let some_element = orbit.iter().next_back().unwrap();
        let canonical = make_canonical_element(some_element, &rep[..], |op, c| {
            prim_periodic_copy_apply(op, c)
        });
        assert_eq!(&canonical, orbit.iter().next().unwrap());
    }
}

// invariant: the equivalence map partitions the group across the orbit,
// and the invariant subgroups are exactly the element stabilizers
#[test]
fn equivalence_map_and_invariant_subgroups() {
    let prim = fcc_primitive_prim();
    let structure = &prim.structure;
    let lattice = structure.lattice();
    let rep = &prim.basis_rep;
    assert_eq!(prim.factor_group.len(), 48);

    let orbit = make_prim_periodic_orbit(&nearest_neighbor_pair(), rep);
    assert_eq!(orbit.len(), 6);

    let eq_map = make_equivalence_map(&orbit, rep, |op, c| prim_periodic_copy_apply(op, c));
    assert_eq!(eq_map.len(), orbit.len());
    assert_eq!(eq_map.iter().map(|coset| coset.len()).sum::<usize>(), 48);
    for coset in &eq_map {
        assert_eq!(coset.len(), 8);
    }

    let subgroups = make_invariant_subgroups(&eq_map, &prim.factor_group, lattice);
    for (element, subgroup) in orbit.iter().zip(&subgroups) {
        assert_eq!(subgroup.len(), 8);
        for j in 0..rep.len() {
            let fixes = prim_periodic_copy_apply(&rep[j], element.clone()) == *element;
            assert_eq!(fixes, subgroup.contains(&j), "operation {}", j);
        }
    }
}

// scenario: the cluster group of the fcc nearest-neighbor pair carries the
// inversion through the bond midpoint with a non-zero cartesian translation
#[test]
fn cluster_group_of_the_nearest_neighbor_pair() {
    let prim = fcc_primitive_prim();
    let structure = &prim.structure;
    let lattice = structure.lattice();
    let rep = &prim.basis_rep;
    let tol = lattice.tol();

    let pair = nearest_neighbor_pair();
    let group = make_cluster_group(pair.clone(), &prim.factor_group, lattice, rep);
    assert_eq!(group.len(), 8);

    // the identity, with no translation attached
    assert!(group.element.iter().any(|op| ops_match(op, &SymOp::identity(), tol)));

    // inversion through the bond midpoint: rotation -I plus the lattice
    // translation bringing the inverted pair back onto itself
    let expected = SymOp::new(
        -Matrix3::identity(),
        lattice.frac_to_cart(&Vector3::new(1.0, 0.0, 0.0)),
        false,
    );
    assert!(expected.translation.norm() > 0.1);
    assert!(group.element.iter().any(|op| ops_match(op, &expected, tol)));

    // every cluster-group element literally maps the site set onto itself
    let carts: Vec<Vector3<f64>> =
        pair.elements().iter().map(|site| structure.site_cart(site)).collect();
    for op in &group.element {
        for cart in &carts {
            let image = op.transform(cart);
            assert!(carts.iter().any(|c| (c - image).norm() < 1e-9));
        }
    }

    // the empty cluster is fixed by the whole factor group
    let null_group = make_cluster_group(
        IntegralCluster::default(), &prim.factor_group, lattice, rep);
    assert_eq!(null_group.len(), 48);
}

// invariant: cluster groups over a whole orbit fix their elements
#[test]
fn cluster_groups_fix_their_orbit_elements() {
    let prim = fcc_primitive_prim();
    let structure = &prim.structure;
    let lattice = structure.lattice();
    let rep = &prim.basis_rep;

    let orbit = make_prim_periodic_orbit(&nearest_neighbor_pair(), rep);
    let groups = make_cluster_groups(&orbit, &prim.factor_group, lattice, rep);
    assert_eq!(groups.len(), orbit.len());

    for (element, group) in orbit.iter().zip(&groups) {
        assert_eq!(group.len(), 8);
        let carts: Vec<Vector3<f64>> =
            element.elements().iter().map(|site| structure.site_cart(site)).collect();
        for op in &group.element {
            for cart in &carts {
                let image = op.transform(cart);
                assert!(carts.iter().any(|c| (c - image).norm() < 1e-9));
            }
        }
    }
}

// custom generators bypass the filters and bring their subclusters along
#[test]
fn custom_generators_bypass_filters() {
    let prim = fcc_primitive_prim();
    let structure = &prim.structure;
    let rep = &prim.basis_rep;
    let site_filter = all_sites_filter();

    // no pair branch at all; the pair arrives only through the generator
    let generator = IntegralClusterOrbitGenerator {
        prototype: nearest_neighbor_pair(),
        include_subclusters: true,
    };
    let orbits = make_prim_periodic_orbits(structure, rep, &site_filter, &[0.0, 0.0], &[generator]);

    // null cluster, single site (also a subcluster), the custom pair
    assert_eq!(orbits.len(), 3);
    assert_eq!(orbits[2].len(), 6);
}

// scenario: local orbits around a phenomenal nearest-neighbor dimer, with
// a cutoff just beyond the second-neighbor distance
#[test]
fn local_orbits_around_a_dimer() {
    let prim = fcc_primitive_prim();
    let structure = &prim.structure;
    let lattice = structure.lattice();
    let rep = &prim.basis_rep;
    let site_filter = all_sites_filter();

    let phenomenal = nearest_neighbor_pair();
    let phenomenal_group = make_cluster_group(phenomenal.clone(), &prim.factor_group, lattice, rep);
    assert_eq!(phenomenal_group.len(), 8);

    let local_rep = make_unitcellcoord_symgroup_rep(&phenomenal_group.element, structure).unwrap();

    // second-neighbor distance is the conventional cube edge, 2.0
    let cutoff = 2.1;
    let orbits = make_local_orbits(
        structure,
        &local_rep,
        &site_filter,
        &[0.0, 0.0],
        &[],
        &phenomenal,
        &[0.0, cutoff],
        false,
    );

    // the null orbit, then one orbit per symmetry class of surrounding site
    assert!(orbits[0].iter().next().unwrap().is_empty());
    assert_eq!(orbits.len(), 7);

    let mut sizes: Vec<usize> = orbits[1..].iter().map(|orbit| orbit.len()).collect();
    sizes.sort();
    assert_eq!(sizes, vec![2, 4, 4, 4, 4, 8]);

    // the single-site orbits partition the candidate sites
    let candidates =
        cutoff_radius_neighborhood(phenomenal.clone(), cutoff, false)(structure, &site_filter);
    assert_eq!(candidates.len(), 26);

    let mut seen = BTreeSet::new();
    for orbit in &orbits[1..] {
        assert_eq!(8 % orbit.len(), 0);
        for cluster in orbit {
            assert_eq!(cluster.len(), 1);
            assert!(seen.insert(cluster[0]), "site in two orbits");
        }
    }
    assert_eq!(seen.len(), candidates.len());
    for site in &candidates {
        assert!(seen.contains(site));
    }

    // engine orbits agree with direct orbit computation
    for orbit in &orbits[1..] {
        let element = orbit.iter().next().unwrap();
        assert_eq!(&make_local_orbit(element, &local_rep), orbit);
    }

    // local cluster groups fix their elements literally
    let groups = make_local_cluster_groups(&orbits[1], &phenomenal_group, lattice, &local_rep);
    for (element, group) in orbits[1].iter().zip(&groups) {
        assert_eq!(group.len() * orbits[1].len(), 8);
        let carts: Vec<Vector3<f64>> =
            element.elements().iter().map(|site| structure.site_cart(site)).collect();
        for op in &group.element {
            for cart in &carts {
                let image = op.transform(cart);
                assert!(carts.iter().any(|c| (c - image).norm() < 1e-9));
            }
        }
    }
}

// invariant: local canonicalisation does not collapse lattice translations
#[test]
fn local_clusters_keep_their_translation() {
    let prim = fcc_primitive_prim();
    // any single operation will do; translations commute with all of them
    let op = &prim.basis_rep[0];

    let cluster = IntegralCluster::new(vec![UnitCellCoord::new(0, 0, 0, 1)]);
    let mut translated = cluster.clone();
    translated += UnitCell::new(1, 0, 0);

    let local_a = local_copy_apply(op, cluster.clone());
    let local_b = local_copy_apply(op, translated.clone());
    assert_ne!(local_a, local_b);

    let periodic_a = prim_periodic_copy_apply(op, cluster);
    let periodic_b = prim_periodic_copy_apply(op, translated);
    assert_eq!(periodic_a, periodic_b);
}
