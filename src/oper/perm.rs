use ::failure::Backtrace;
use ::std::ops::Index;

#[derive(Debug, Fail)]
pub enum PermutationError {
    #[fail(display = "array is not a permutation of 0..n")]
    BadPermutation { backtrace: Backtrace },
}

/// A total map of `{0, .., N-1}` onto itself.
///
/// The stored array obeys `perm[new] = old`: applying the operation moves
/// the value at index `old` to index `new`.  Consequently composition is
/// value-flow, `a.then(b)[n] == a[b[n]]`, rather than the textbook
/// `(P ∘ Q)[n] == P[Q[n]]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Permutation(Vec<usize>);

impl Permutation {
    pub fn eye(n: usize) -> Permutation
    { Permutation((0..n).collect()) }

    pub fn len(&self) -> usize
    { self.0.len() }

    pub fn is_empty(&self) -> bool
    { self.0.is_empty() }

    /// This performs O(n log n) validation on the data
    /// to verify that it satisfies the invariants of Permutation.
    pub fn from_vec(vec: Vec<usize>) -> Result<Permutation, PermutationError>
    {Ok({
        if !Self::validate_perm(&vec) {
            return Err(PermutationError::BadPermutation { backtrace: Backtrace::new() });
        }
        Permutation(vec)
    })}

    /// This only checks the invariants of Permutation in debug builds.
    /// An invalid array leads to out-of-bounds panics on use.
    pub fn from_vec_unchecked(vec: Vec<usize>) -> Permutation {
        debug_assert!(Self::validate_perm(&vec));
        Permutation(vec)
    }

    fn validate_perm(xs: &[usize]) -> bool {
        let mut vec = xs.to_vec();
        vec.sort();
        vec.into_iter().eq(0..xs.len())
    }

    pub fn into_vec(self) -> Vec<usize>
    { self.0 }

    pub fn as_slice(&self) -> &[usize]
    { &self.0 }

    pub fn inverted(&self) -> Permutation {
        let mut out = vec![0; self.0.len()];
        for (new, &old) in self.0.iter().enumerate() {
            out[old] = new;
        }
        Permutation(out)
    }
}

impl Permutation {
    /// Flipped group operator: `a.then(b)` is "apply `a`, then apply `b`".
    ///
    /// `a.then(b) == b.of(a)`, and `a.then(b)[n] == a[b[n]]`.
    pub fn then(&self, other: &Permutation) -> Permutation {
        assert_eq!(self.len(), other.len(),
            "incompatible permutation lengths: {} vs {}", self.len(), other.len());
        Permutation(other.0.iter().map(|&m| self.0[m]).collect())
    }

    /// Conventional group operator.
    pub fn of(&self, other: &Permutation) -> Permutation
    { other.then(self) }
}

impl Index<usize> for Permutation {
    type Output = usize;

    /// `perm[new]` is the source index whose value lands at `new`.
    fn index(&self, new: usize) -> &usize
    { &self.0[new] }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    fn random_perm(n: usize) -> Permutation {
        use ::rand::seq::SliceRandom;

        let mut vec: Vec<usize> = (0..n).collect();
        vec.shuffle(&mut ::rand::thread_rng());
        Permutation::from_vec(vec).unwrap()
    }

    // apply a permutation the way the tables are meant to be read:
    // out[new] = xs[perm[new]]
    fn apply<T: Copy>(xs: &[T], perm: &Permutation) -> Vec<T> {
        (0..perm.len()).map(|new| xs[perm[new]]).collect()
    }

    #[test]
    fn invalid() {
        assert!(Permutation::from_vec(vec![0, 1, 3, 3]).is_err());
        assert!(Permutation::from_vec(vec![1, 2, 3]).is_err());
        assert!(Permutation::from_vec(vec![]).is_ok());
    }

    #[test]
    fn inverse() {
        let perm = random_perm(20);
        let inv = perm.inverted();

        assert_eq!(perm.then(&inv), Permutation::eye(20));
        assert_eq!(inv.then(&perm), Permutation::eye(20));
    }

    #[test]
    fn composition_is_value_flow() {
        let a = Permutation::from_vec(vec![1, 0, 2]).unwrap();
        let b = Permutation::from_vec(vec![2, 1, 0]).unwrap();

        let ab = a.then(&b);
        assert_eq!(ab, b.of(&a));

        let xs = vec!['x', 'y', 'z'];
        assert_eq!(apply(&apply(&xs, &a), &b), apply(&xs, &ab));

        for n in &[0usize, 1, 2] {
            assert_eq!(ab[*n], a[b[*n]]);
        }
    }

    #[test]
    fn composition_matches_sequential_application() {
        let a = random_perm(12);
        let b = random_perm(12);
        let xs: Vec<usize> = (100..112).collect();
        assert_eq!(apply(&apply(&xs, &a), &b), apply(&xs, &a.then(&b)));
    }
}
