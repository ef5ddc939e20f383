//! Site filters, candidate-site factories and cluster filters for the
//! orbit engines.
//!
//! These are boxed closures so the engines can swap strategies per orbit
//! branch without generic plumbing.

use ::core::cluster::{ClusterInvariants, IntegralCluster};
use ::core::coords::UnitCellCoord;
use ::core::prim::BasicStructure;
use ::nalgebra::Vector3;
use ::ordered_float::NotNan;

pub type SiteFilterFunction = Box<dyn Fn(&BasicStructure, usize) -> bool>;
pub type CandidateSitesFunction = Box<dyn Fn(&BasicStructure, &SiteFilterFunction) -> Vec<UnitCellCoord>>;
pub type ClusterFilterFunction = Box<dyn Fn(&ClusterInvariants, &IntegralCluster) -> bool>;

/// Accept every sublattice.
pub fn all_sites_filter() -> SiteFilterFunction
{ Box::new(|_, _| true) }

/// The accepted sites of the origin unit cell.
pub fn origin_neighborhood() -> CandidateSitesFunction {
    Box::new(|structure, site_filter| {
        (0..structure.num_sublattices())
            .filter(|&b| site_filter(structure, b))
            .map(|b| UnitCellCoord::new(b, 0, 0, 0))
            .collect()
    })
}

/// The accepted sites within `max_length` of any origin-cell site
/// (inclusive at the lattice tolerance).
pub fn max_length_neighborhood(max_length: f64) -> CandidateSitesFunction {
    Box::new(move |structure, site_filter| {
        let centers: Vec<Vector3<f64>> = (0..structure.num_sublattices())
            .map(|b| structure.site_cart(&UnitCellCoord::new(b, 0, 0, 0)))
            .collect();
        sites_within(structure, &centers, max_length, site_filter)
    })
}

/// The accepted sites within `cutoff_radius` of any phenomenal-cluster
/// site.  Sites of the phenomenal cluster itself are excluded unless
/// `include_phenomenal_sites` is set.
pub fn cutoff_radius_neighborhood(
    phenomenal: IntegralCluster,
    cutoff_radius: f64,
    include_phenomenal_sites: bool,
) -> CandidateSitesFunction {
    Box::new(move |structure, site_filter| {
        let centers: Vec<Vector3<f64>> = phenomenal.elements().iter()
            .map(|site| structure.site_cart(site))
            .collect();
        let mut sites = sites_within(structure, &centers, cutoff_radius, site_filter);
        if !include_phenomenal_sites {
            sites.retain(|site| !phenomenal.elements().contains(site));
        }
        sites
    })
}

/// Accept every cluster.
pub fn all_clusters_filter() -> ClusterFilterFunction
{ Box::new(|_, _| true) }

/// Accept clusters whose largest site-to-site distance is within
/// `max_length` (inclusive at the boundary).
pub fn max_length_cluster_filter(max_length: f64) -> ClusterFilterFunction {
    Box::new(move |invariants, _| {
        match invariants.site_distances().last() {
            Some(&longest) => longest <= max_length + 1e-8,
            None => true,
        }
    })
}

/// All accepted sites whose distance to the nearest of `centers` is within
/// `radius` (inclusive at the lattice tolerance), sorted by that distance
/// with the site order as tie-break.
fn sites_within(
    structure: &BasicStructure,
    centers: &[Vector3<f64>],
    radius: f64,
    site_filter: &SiteFilterFunction,
) -> Vec<UnitCellCoord> {
    let lattice = structure.lattice();
    let cutoff = radius + lattice.tol();

    // fractional bounding box holding every sphere around a center,
    // padded by one cell for the basis offsets
    let centers_frac: Vec<Vector3<f64>> =
        centers.iter().map(|c| lattice.cart_to_frac(c)).collect();
    let mut lo = [0i64; 3];
    let mut hi = [0i64; 3];
    for axis in 0..3 {
        let spread = cutoff * lattice.inverse_matrix().row(axis).norm();
        let min = centers_frac.iter().map(|f| f[axis]).fold(::std::f64::INFINITY, f64::min);
        let max = centers_frac.iter().map(|f| f[axis]).fold(::std::f64::NEG_INFINITY, f64::max);
        lo[axis] = (min - spread).floor() as i64 - 1;
        hi[axis] = (max + spread).ceil() as i64 + 1;
    }

    let mut found: Vec<(NotNan<f64>, UnitCellCoord)> = vec![];
    for b in 0..structure.num_sublattices() {
        if !site_filter(structure, b) {
            continue;
        }
        for i in lo[0]..hi[0] + 1 {
            for j in lo[1]..hi[1] + 1 {
                for k in lo[2]..hi[2] + 1 {
                    let site = UnitCellCoord::new(b, i, j, k);
                    let cart = structure.site_cart(&site);
                    let distance = centers.iter()
                        .map(|c| (cart - *c).norm())
                        .fold(::std::f64::INFINITY, f64::min);
                    if distance <= cutoff {
                        found.push((NotNan::new(distance).expect("non-finite site distance"), site));
                    }
                }
            }
        }
    }
    found.sort();
    found.into_iter().map(|(_, site)| site).collect()
}
