/// Generic one-pass grouping over order lines.
///
/// `group_by` is parameterized over a key extractor and a fold function, so
/// every aggregator is just a choice of key, accumulator and fold. Groups are
/// returned in ascending key order, which is also the group-iteration order
/// downstream stable sorts fall back on for ties.

use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Grouping key for nullable text columns.
///
/// A missing value is a group of its own rather than being dropped. Variant
/// order makes `Missing` sort after every present value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKey {
    Value(String),
    Missing,
}

impl GroupKey {
    pub fn from_option(value: Option<&str>) -> Self {
        match value {
            Some(v) => GroupKey::Value(v.to_string()),
            None => GroupKey::Missing,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            GroupKey::Value(v) => Some(v),
            GroupKey::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, GroupKey::Missing)
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Value(v) => f.write_str(v),
            GroupKey::Missing => f.write_str("(missing)"),
        }
    }
}

impl Serialize for GroupKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            GroupKey::Value(v) => serializer.serialize_str(v),
            GroupKey::Missing => serializer.serialize_none(),
        }
    }
}

/// Counts distinct borrowed string values. Missing values are never counted.
#[derive(Debug, Default, Clone)]
pub struct DistinctCount<'a> {
    seen: HashSet<&'a str>,
}

impl<'a> DistinctCount<'a> {
    #[inline]
    pub fn insert(&mut self, value: Option<&'a str>) {
        if let Some(v) = value {
            self.seen.insert(v);
        }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Group `rows` by `key`, folding each row into its group's accumulator.
///
/// Accumulators start from `A::default()`. The result holds one entry per
/// distinct key, in ascending key order.
///
/// ```
/// use martdash::group_by;
///
/// let words = ["apple", "avocado", "banana", "blueberry", "cherry"];
/// let counts = group_by(words.iter(), |w: &&str| w.chars().next(), |n: &mut usize, _: &&str| *n += 1);
/// assert_eq!(counts, vec![(Some('a'), 2), (Some('b'), 2), (Some('c'), 1)]);
/// ```
pub fn group_by<T, I, K, A, KF, FF>(rows: I, key: KF, mut fold: FF) -> Vec<(K, A)>
where
    I: IntoIterator<Item = T>,
    T: Copy,
    K: Ord,
    A: Default,
    KF: Fn(T) -> K,
    FF: FnMut(&mut A, T),
{
    let mut groups: BTreeMap<K, A> = BTreeMap::new();
    for row in rows {
        fold(groups.entry(key(row)).or_default(), row);
    }
    groups.into_iter().collect()
}
