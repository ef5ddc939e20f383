use ::core::coords::{UnitCell, UnitCellCoord};
use ::core::prim::BasicStructure;
use ::nalgebra::Vector3;
use ::std::cmp::Ordering;
use ::std::ops::{AddAssign, Index, IndexMut, SubAssign};
use ::util;

/// An ordered sequence of integral site coordinates.
///
/// The derived total order is lexicographic on the element sequence as
/// stored; the orbit machinery always sorts clusters before comparing them.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IntegralCluster(Vec<UnitCellCoord>);

impl IntegralCluster {
    pub fn new(elements: Vec<UnitCellCoord>) -> IntegralCluster
    { IntegralCluster(elements) }

    pub fn len(&self) -> usize
    { self.0.len() }

    pub fn is_empty(&self) -> bool
    { self.0.is_empty() }

    pub fn elements(&self) -> &[UnitCellCoord]
    { &self.0 }

    pub fn elements_mut(&mut self) -> &mut Vec<UnitCellCoord>
    { &mut self.0 }

    /// Sort the elements into the `(b, i, j, k)` lexicographic order.
    pub fn sort(&mut self)
    { self.0.sort(); }
}

impl Index<usize> for IntegralCluster {
    type Output = UnitCellCoord;

    fn index(&self, i: usize) -> &UnitCellCoord
    { &self.0[i] }
}

impl IndexMut<usize> for IntegralCluster {
    fn index_mut(&mut self, i: usize) -> &mut UnitCellCoord
    { &mut self.0[i] }
}

/// Translating a cluster translates every element.
impl AddAssign<UnitCell> for IntegralCluster {
    fn add_assign(&mut self, translation: UnitCell) {
        for site in &mut self.0 {
            *site += translation;
        }
    }
}

impl SubAssign<UnitCell> for IntegralCluster {
    fn sub_assign(&mut self, translation: UnitCell) {
        for site in &mut self.0 {
            *site -= translation;
        }
    }
}

/// Symmetry-invariant summary of a cluster, used to prune inequivalent
/// clusters cheaply before the (much more expensive) canonicalisation.
///
/// Stores the cluster size and the sorted list of site-to-site distances;
/// for local clusters also the sorted distances from the cluster sites to
/// the phenomenal cluster sites.
#[derive(Debug, Clone)]
pub struct ClusterInvariants {
    size: usize,
    site_distances: Vec<f64>,
    phenomenal_distances: Option<Vec<f64>>,
}

impl ClusterInvariants {
    pub fn new(cluster: &IntegralCluster, structure: &BasicStructure) -> ClusterInvariants {
        ClusterInvariants {
            size: cluster.len(),
            site_distances: sorted_pair_distances(&site_carts(cluster, structure)),
            phenomenal_distances: None,
        }
    }

    pub fn with_phenomenal(
        cluster: &IntegralCluster,
        phenomenal: &IntegralCluster,
        structure: &BasicStructure,
    ) -> ClusterInvariants {
        let carts = site_carts(cluster, structure);
        let phenomenal_carts = site_carts(phenomenal, structure);

        let mut cross = Vec::with_capacity(carts.len() * phenomenal_carts.len());
        for a in &carts {
            for b in &phenomenal_carts {
                cross.push((a - b).norm());
            }
        }
        cross.sort_by(|a, b| a.partial_cmp(b).expect("non-finite site distance"));

        ClusterInvariants {
            size: cluster.len(),
            site_distances: sorted_pair_distances(&carts),
            phenomenal_distances: Some(cross),
        }
    }

    pub fn size(&self) -> usize
    { self.size }

    /// Site-to-site distances, ascending.
    pub fn site_distances(&self) -> &[f64]
    { &self.site_distances }

    pub fn phenomenal_distances(&self) -> Option<&[f64]>
    { self.phenomenal_distances.as_ref().map(|v| &v[..]) }

    /// Tolerant comparison: size first, then the distance lists.
    pub fn cmp(&self, other: &ClusterInvariants, tol: f64) -> Ordering {
        self.size.cmp(&other.size)
            .then_with(|| cmp_distances(&self.site_distances, &other.site_distances, tol))
            .then_with(|| match (&self.phenomenal_distances, &other.phenomenal_distances) {
                (&Some(ref a), &Some(ref b)) => cmp_distances(a, b, tol),
                (&None, &None) => Ordering::Equal,
                (&None, &Some(_)) => Ordering::Less,
                (&Some(_), &None) => Ordering::Greater,
            })
    }
}

fn site_carts(cluster: &IntegralCluster, structure: &BasicStructure) -> Vec<Vector3<f64>> {
    cluster.elements().iter().map(|site| structure.site_cart(site)).collect()
}

fn sorted_pair_distances(carts: &[Vector3<f64>]) -> Vec<f64> {
    let mut distances = Vec::with_capacity(carts.len() * (carts.len().saturating_sub(1)) / 2);
    for i in 0..carts.len() {
        for j in i + 1..carts.len() {
            distances.push((carts[i] - carts[j]).norm());
        }
    }
    distances.sort_by(|a, b| a.partial_cmp(b).expect("non-finite site distance"));
    distances
}

fn cmp_distances(a: &[f64], b: &[f64], tol: f64) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| {
        for (x, y) in a.iter().zip(b) {
            match util::tol_cmp(*x, *y, tol) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    })
}

/// Orders `(ClusterInvariants, IntegralCluster)` pairs: invariants first
/// (at tolerance), the cluster's own order as tie-break.  Equivalent
/// clusters that have been canonicalised collapse to a single entry under
/// this comparator.
#[derive(Debug, Clone, Copy)]
pub struct CompareCluster {
    pub tol: f64,
}

impl CompareCluster {
    pub fn new(tol: f64) -> CompareCluster
    { CompareCluster { tol: tol } }

    pub fn cmp(
        &self,
        a: &(ClusterInvariants, IntegralCluster),
        b: &(ClusterInvariants, IntegralCluster),
    ) -> Ordering {
        a.0.cmp(&b.0, self.tol).then_with(|| a.1.cmp(&b.1))
    }
}
