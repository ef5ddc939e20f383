use ::core::lattice::Lattice;
use ::oper::symmops::{self, SymOp};
use ::std::collections::{BTreeSet, HashSet, VecDeque};
use ::std::hash::Hash;
use ::std::sync::Arc;

/// A sorted set of indices into a parent group.
pub type SubgroupIndices = BTreeSet<usize>;

/// A group of symmetry operations, possibly a subgroup view of a parent
/// group.
///
/// `head_group_index` identifies which parent elements this group contains;
/// `element` stores the operations themselves, which for cluster-invariant
/// groups may carry translation parts that differ from the parent's.  The
/// two sequences correspond: `element[i]` belongs to the `i`-th smallest
/// head group index.
///
/// Groups form a DAG through `parent` handles (a subgroup is always created
/// from an existing group, so cycles cannot occur).  No closure property is
/// checked; callers supply index sets that are groups in context.
#[derive(Debug, Clone)]
pub struct SymGroup {
    parent: Option<Arc<SymGroup>>,
    pub head_group_index: BTreeSet<usize>,
    pub element: Vec<SymOp>,
}

impl SymGroup {
    /// A group that is its own head: indices are simply `0..n`.
    pub fn new_root(element: Vec<SymOp>) -> SymGroup {
        let head_group_index = (0..element.len()).collect();
        SymGroup { parent: None, head_group_index: head_group_index, element: element }
    }

    /// A subgroup whose elements are the parent's at the listed indices.
    pub fn subgroup(parent: &Arc<SymGroup>, head_group_index: BTreeSet<usize>) -> SymGroup {
        let element = head_group_index.iter().map(|&ix| parent.element[ix].clone()).collect();
        SymGroup {
            parent: Some(parent.clone()),
            head_group_index: head_group_index,
            element: element,
        }
    }

    /// A subgroup carrying its own elements, used where the operations gain
    /// translation parts the parent's elements lack (cluster-invariant
    /// groups).
    pub fn subgroup_with_elements(
        parent: &Arc<SymGroup>,
        element: Vec<SymOp>,
        head_group_index: BTreeSet<usize>,
    ) -> SymGroup {
        assert_eq!(element.len(), head_group_index.len(),
            "one element per head group index");
        assert!(head_group_index.iter().all(|&ix| ix < parent.element.len()),
            "head group index out of range of the parent group");
        SymGroup {
            parent: Some(parent.clone()),
            head_group_index: head_group_index,
            element: element,
        }
    }

    pub fn parent(&self) -> Option<&Arc<SymGroup>>
    { self.parent.as_ref() }

    pub fn len(&self) -> usize
    { self.element.len() }

    pub fn is_empty(&self) -> bool
    { self.element.is_empty() }
}

/// The orbit of `orbit_element`: its distinct images under every operation
/// of the representation, as an ordered set.
pub fn make_orbit<T, R, F>(orbit_element: &T, rep: &[R], mut copy_apply: F) -> BTreeSet<T>
where
    T: Ord + Clone,
    F: FnMut(&R, T) -> T,
{
    rep.iter().map(|op| copy_apply(op, orbit_element.clone())).collect()
}

/// The canonical element of an orbit: the least image under the element
/// order.
pub fn make_canonical_element<T, R, F>(element: &T, rep: &[R], mut copy_apply: F) -> T
where
    T: Ord + Clone,
    F: FnMut(&R, T) -> T,
{
    rep.iter()
        .map(|op| copy_apply(op, element.clone()))
        .min()
        .expect("empty group representation")
}

/// For each orbit element (in orbit order), the operations carrying the
/// first orbit element onto it.
pub fn make_equivalence_map<T, R, F>(orbit: &BTreeSet<T>, rep: &[R], mut copy_apply: F) -> Vec<Vec<usize>>
where
    T: Ord + Clone,
    F: FnMut(&R, T) -> T,
{
    let mut equivalence_map = vec![vec![]; orbit.len()];
    let first = orbit.iter().next().expect("empty orbit");
    for (j, op) in rep.iter().enumerate() {
        let image = copy_apply(op, first.clone());
        let i = orbit.iter().position(|element| *element == image)
            .expect("(BUG) orbit does not contain one of its own images");
        equivalence_map[i].push(j);
    }
    equivalence_map
}

/// Multiplication table over `elements`: `table[i][j]` is the index of
/// `elements[i] ∘ elements[j]` (apply `j` first), where membership is
/// decided by `eq`.
///
/// # Panics
///
/// Panics if some product matches no element; the input was not a group
/// under `eq`, which is a caller bug.
pub fn make_multiplication_table<F>(elements: &[SymOp], mut eq: F) -> Vec<Vec<usize>>
where F: FnMut(&SymOp, &SymOp) -> bool,
{
    let n = elements.len();
    let mut table = vec![Vec::with_capacity(n); n];
    for i in 0..n {
        for j in 0..n {
            let product = elements[j].then(&elements[i]);
            match elements.iter().position(|element| eq(element, &product)) {
                Some(k) => table[i].push(k),
                None => panic!("group is not closed under composition"),
            }
        }
    }
    table
}

/// Inverse of each element, from a multiplication table.
pub fn make_inverse_indices(table: &[Vec<usize>]) -> Vec<usize> {
    let n = table.len();
    let identity = (0..n)
        .find(|&e| table[e].iter().enumerate().all(|(j, &k)| j == k))
        .expect("group has no identity element");
    (0..n).map(|i| {
        table[i].iter().position(|&k| k == identity)
            .expect("group element has no inverse")
    }).collect()
}

/// Invariant subgroups from an equivalence map: for the `i`-th orbit
/// element, the indices of the parent elements that leave it fixed.
///
/// The stabilizer of the first orbit element is its own coset in the
/// equivalence map; every other stabilizer is that subgroup conjugated by
/// any operation reaching the element, `stab(x_i) = a · stab(x_0) · a⁻¹`.
/// Products of factor-group elements match elements only modulo lattice
/// translation, hence the lattice argument.
pub fn make_invariant_subgroups(
    equivalence_map: &[Vec<usize>],
    parent: &SymGroup,
    lattice: &Lattice,
) -> Vec<SubgroupIndices> {
    let table = make_multiplication_table(
        &parent.element,
        |a, b| symmops::ops_match_mod_lattice(a, b, lattice),
    );
    let inverse = make_inverse_indices(&table);

    let stabilizer = &equivalence_map[0];
    equivalence_map.iter().map(|coset| {
        let a = *coset.first().expect("(BUG) empty equivalence-map coset");
        stabilizer.iter().map(|&h| table[table[a][h]][inverse[a]]).collect()
    }).collect()
}

/// Generates a finite group from a non-empty set of generators.
///
/// The generators may contain duplicates or extraneous elements.  The
/// output order is arbitrary but deterministic for a given input.
pub fn generate_finite_group<G>(generators: &[G], mut compose: impl FnMut(&G, &G) -> G) -> Vec<G>
where G: Hash + Eq + Clone,
{
    assert!(!generators.is_empty(), "a group needs at least one generator");

    let mut seen = HashSet::new();
    let mut out = vec![];
    let mut queue: VecDeque<G> = generators.iter().cloned().collect();

    while let Some(g) = queue.pop_front() {
        if seen.insert(g.clone()) {
            queue.extend(generators.iter().map(|h| compose(&g, h)));
            out.push(g);
        }
    }
    out
}
