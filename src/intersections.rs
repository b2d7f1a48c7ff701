//! Computes, for every combination of a `Dataset`'s sets, the number of hashes
//! that belong to exactly the sets of that combination and to no others.
//!
//! Each hash belongs to exactly one combination: the sets whose hash lists
//! contain it. So rather than looping over the power set of the sets, we
//! record each hash's combination in a `Membership`, and then count how many
//! hashes share each combination. Combinations that no hash belongs to never
//! show up.
use std::cmp::Reverse;

use bstr::{BStr, ByteSlice};
use fxhash::FxBuildHasher;
use indexmap::IndexMap;

use crate::dataset::Dataset;

/// A `Combination` says, for each set of a `Dataset` (by position), whether
/// that set is a member.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Combination(Box<[bool]>);

impl Combination {
    fn none_of(width: usize) -> Self {
        Combination(vec![false; width].into_boxed_slice())
    }

    fn include(&mut self, set: usize) {
        self.0[set] = true;
    }

    /// Is set number `set` a member of the combination?
    #[must_use]
    pub fn contains(&self, set: usize) -> bool {
        self.0.get(set).copied().unwrap_or(false)
    }

    /// The number of member sets
    #[must_use]
    pub fn degree(&self) -> usize {
        self.0.iter().filter(|&&member| member).count()
    }

    /// The positions of the member sets, in dataset order
    pub fn members(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().enumerate().filter_map(|(set, &member)| member.then_some(set))
    }
}

/// The `Membership` of a `Dataset` maps each distinct hash to the
/// `Combination` of sets that contain it. Hashes and set names are borrowed
/// from the `Dataset`.
pub struct Membership<'data> {
    names: Vec<&'data BStr>,
    totals: Vec<usize>,
    of_hash: IndexMap<&'data BStr, Combination, FxBuildHasher>,
}

impl<'data> Membership<'data> {
    /// Builds the `Membership` of every hash in `dataset`
    #[must_use]
    pub fn from_dataset(dataset: &'data Dataset) -> Self {
        let width = dataset.len();
        let mut names = Vec::with_capacity(width);
        let mut totals = Vec::with_capacity(width);
        let mut of_hash = IndexMap::<&BStr, Combination, FxBuildHasher>::default();
        for (set, (name, hashes)) in dataset.iter().enumerate() {
            names.push(name);
            totals.push(hashes.len());
            for hash in hashes {
                of_hash
                    .entry(hash.as_bstr())
                    .or_insert_with(|| Combination::none_of(width))
                    .include(set);
            }
        }
        Membership { names, totals, of_hash }
    }

    /// The set names, in dataset order
    #[must_use]
    pub fn names(&self) -> &[&'data BStr] {
        &self.names
    }

    /// The sets that contain `hash`, or `None` if no set does
    #[must_use]
    pub fn combination_of(&self, hash: impl AsRef<[u8]>) -> Option<&Combination> {
        self.of_hash.get(BStr::new(hash.as_ref()))
    }

    /// The number of distinct hashes over all sets
    #[must_use]
    pub fn hash_count(&self) -> usize {
        self.of_hash.len()
    }

    /// Counts the hashes belonging to each combination. Combinations appear in
    /// the order their first hash was seen.
    #[must_use]
    pub fn intersections(&self) -> Intersections<'data> {
        let mut sizes = IndexMap::<&Combination, usize, FxBuildHasher>::default();
        for combination in self.of_hash.values() {
            *sizes.entry(combination).or_insert(0) += 1;
        }
        let subsets = sizes
            .into_iter()
            .map(|(combination, size)| Intersection { combination: combination.clone(), size })
            .collect();
        Intersections { names: self.names.clone(), totals: self.totals.clone(), subsets }
    }
}

/// One bar of an UpSet plot: the number of hashes found in exactly the sets of
/// `combination`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intersection {
    /// The member sets
    pub combination: Combination,
    /// How many hashes belong to exactly those sets
    pub size: usize,
}

/// Every non-empty `Intersection` of a `Dataset`, along with the names and
/// sizes of its sets.
#[derive(Debug, Clone)]
pub struct Intersections<'data> {
    names: Vec<&'data BStr>,
    totals: Vec<usize>,
    subsets: Vec<Intersection>,
}

/// How to order the intersections (the columns of the plot)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubsetOrder {
    /// Fewest member sets first; ties go to combinations that contain
    /// sets higher in the set order
    #[default]
    Degree,
    /// Largest intersection first; ties are ordered as for `Degree`
    Cardinality,
    /// In the order each combination's first hash appeared
    Input,
}

/// How to order the sets (the rows of the plot)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetOrder {
    /// Largest set first; ties keep input order
    #[default]
    Cardinality,
    /// In the order each filename first appeared
    Input,
}

/// The rows and columns of a plot, in display order
#[derive(Debug)]
pub struct Arrangement<'a> {
    /// Set positions, top row first
    pub sets: Vec<usize>,
    /// Intersections, leftmost column first
    pub subsets: Vec<&'a Intersection>,
}

impl<'data> Intersections<'data> {
    /// The set names, in dataset order
    #[must_use]
    pub fn names(&self) -> &[&'data BStr] {
        &self.names
    }

    /// The size of each set, in dataset order
    #[must_use]
    pub fn totals(&self) -> &[usize] {
        &self.totals
    }

    /// The non-empty intersections, in the order their first hash was seen
    pub fn iter(&self) -> std::slice::Iter<'_, Intersection> {
        self.subsets.iter()
    }

    /// The number of non-empty intersections
    #[must_use]
    pub fn len(&self) -> usize {
        self.subsets.len()
    }

    /// True if no set has any hashes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subsets.is_empty()
    }

    /// The sum of all intersection sizes, which is the number of distinct hashes
    #[must_use]
    pub fn total(&self) -> usize {
        self.subsets.iter().map(|subset| subset.size).sum()
    }

    /// The number of hashes found in all the sets named by `members` and in no
    /// other set. Zero if some name isn't a set name.
    #[must_use]
    pub fn count<Name: AsRef<[u8]>>(&self, members: &[Name]) -> usize {
        let mut wanted = Combination::none_of(self.names.len());
        for name in members {
            match self.names.iter().position(|known| known.as_bytes() == name.as_ref()) {
                Some(set) => wanted.include(set),
                None => return 0,
            }
        }
        self.subsets.iter().find(|subset| subset.combination == wanted).map_or(0, |subset| subset.size)
    }

    /// Orders the sets by `set_order`, and then the intersections by
    /// `subset_order`
    #[must_use]
    pub fn arrange(&self, subset_order: SubsetOrder, set_order: SetOrder) -> Arrangement<'_> {
        let mut sets: Vec<usize> = (0..self.names.len()).collect();
        if set_order == SetOrder::Cardinality {
            // `sort_by_key` is stable, so ties stay in input order
            sets.sort_by_key(|&set| Reverse(self.totals[set]));
        }

        let degree_key = |subset: &Intersection| {
            let not_in: Vec<bool> = sets.iter().map(|&set| !subset.combination.contains(set)).collect();
            (subset.combination.degree(), not_in)
        };
        let mut subsets: Vec<&Intersection> = self.subsets.iter().collect();
        match subset_order {
            SubsetOrder::Input => {}
            SubsetOrder::Degree => subsets.sort_by_cached_key(|&subset| degree_key(subset)),
            SubsetOrder::Cardinality => {
                subsets.sort_by_cached_key(|&subset| (Reverse(subset.size), degree_key(subset)));
            }
        }
        Arrangement { sets, subsets }
    }
}
