//! Lazy datasets and the operations that can be chained onto them.
//!
//! A [`Dataset`] is a boxed iterator of [`anyhow::Result`]s plus the
//! [`Context`] it was created from. Narrow steps (`map`, `filter`, ...) just
//! wrap the iterator. Wide steps (`reduce_by_key`, `sort_by_key`, ...) are
//! deferred until the first item is pulled, then drain their parent in one go.
//! Nothing is read or computed until an action such as [`Dataset::collect`]
//! runs, and the first error raised by any step is returned from that action.

use std::collections::hash_map;
use std::fmt;
use std::hash::Hash;

use anyhow::Result;
use fnv::FnvHashMap;
use itertools::Either;
use tracing::debug;

use crate::context::Context;
use crate::standalone::engine;

pub struct Dataset<'ctx, T> {
    ctx: &'ctx Context,
    iter: Box<dyn Iterator<Item = Result<T>> + 'ctx>,
}

impl<T> fmt::Debug for Dataset<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dataset")
            .field("app", &self.ctx.config().app_name)
            .finish_non_exhaustive()
    }
}

impl<'ctx, T: 'ctx> Dataset<'ctx, T> {
    pub(crate) fn new<I>(ctx: &'ctx Context, iter: I) -> Self
    where
        I: Iterator<Item = Result<T>> + 'ctx,
    {
        Self {
            ctx,
            iter: Box::new(iter),
        }
    }

    /// Runs `produce` the first time the dataset is pulled and yields its items.
    fn deferred<F>(ctx: &'ctx Context, produce: F) -> Self
    where
        F: FnOnce() -> Result<Vec<T>> + 'ctx,
    {
        let iter = std::iter::once_with(produce).flat_map(|produced| match produced {
            Ok(items) => Either::Left(items.into_iter().map(Ok)),
            Err(e) => Either::Right(std::iter::once(Err(e))),
        });
        Self::new(ctx, iter)
    }

    pub fn map<U, F>(self, mut f: F) -> Dataset<'ctx, U>
    where
        U: 'ctx,
        F: FnMut(T) -> U + 'ctx,
    {
        Dataset::new(self.ctx, self.iter.map(move |item| item.map(&mut f)))
    }

    /// Like [`Dataset::map`], for steps that can fail (parsing, mostly).
    pub fn try_map<U, F>(self, mut f: F) -> Dataset<'ctx, U>
    where
        U: 'ctx,
        F: FnMut(T) -> Result<U> + 'ctx,
    {
        Dataset::new(self.ctx, self.iter.map(move |item| item.and_then(&mut f)))
    }

    pub fn flat_map<U, I, F>(self, mut f: F) -> Dataset<'ctx, U>
    where
        U: 'ctx,
        I: IntoIterator<Item = U>,
        I::IntoIter: 'ctx,
        F: FnMut(T) -> I + 'ctx,
    {
        let iter = self.iter.flat_map(move |item| match item {
            Ok(value) => Either::Left(f(value).into_iter().map(Ok)),
            Err(e) => Either::Right(std::iter::once(Err(e))),
        });
        Dataset::new(self.ctx, iter)
    }

    /// Keeps the items `predicate` accepts. Errors are always kept.
    pub fn filter<F>(self, mut predicate: F) -> Self
    where
        F: FnMut(&T) -> bool + 'ctx,
    {
        let iter = self.iter.filter(move |item| match item {
            Ok(value) => predicate(value),
            Err(_) => true,
        });
        Self::new(self.ctx, iter)
    }

    /// Sorts the whole dataset by the key `f` extracts. Stable.
    pub fn sort_by<K, F>(self, f: F) -> Self
    where
        K: Ord,
        F: FnMut(&T) -> K + 'ctx,
    {
        let parent = self.iter;
        Self::deferred(self.ctx, move || {
            let mut items = parent.collect::<Result<Vec<_>>>()?;
            items.sort_by_key(f);
            Ok(items)
        })
    }

    /////////////////////////////////////////////////////////////////////////
    // Actions
    /////////////////////////////////////////////////////////////////////////

    pub fn collect(self) -> Result<Vec<T>> {
        self.iter.collect()
    }

    pub fn for_each<F>(self, mut f: F) -> Result<()>
    where
        F: FnMut(T) -> Result<()>,
    {
        for item in self.iter {
            f(item?)?;
        }
        Ok(())
    }

    pub fn count(mut self) -> Result<usize> {
        self.iter.try_fold(0, |n, item| item.map(|_| n + 1))
    }

    /// Number of occurrences of each distinct item.
    pub fn count_by_value(self) -> Result<FrequencyTable<T>>
    where
        T: Hash + Eq,
    {
        let mut table = FrequencyTable::new();
        for item in self.iter {
            table.add(item?);
        }
        debug!(distinct = table.len(), total = table.total(), "counted by value");
        Ok(table)
    }
}

impl<'ctx, K: 'ctx, V: 'ctx> Dataset<'ctx, (K, V)> {
    pub fn map_values<W, F>(self, mut f: F) -> Dataset<'ctx, (K, W)>
    where
        W: 'ctx,
        F: FnMut(V) -> W + 'ctx,
    {
        self.map(move |(key, value)| (key, f(value)))
    }

    /// Swaps every pair to `(value, key)`.
    pub fn flip(self) -> Dataset<'ctx, (V, K)> {
        self.map(|(key, value)| (value, key))
    }

    /// Merges the values of each key with `reduce_fn`, shuffling through
    /// the context's partitions.
    ///
    /// Output comes bucket by bucket, keys ascending within a bucket, which
    /// is not a global order. Follow with [`Dataset::sort_by_key`] for one.
    pub fn reduce_by_key<F>(self, reduce_fn: F) -> Self
    where
        K: Hash + Ord,
        F: FnMut(V, V) -> V + 'ctx,
    {
        let num_partitions = self.ctx.num_partitions();
        let parent = self.iter;
        Self::deferred(self.ctx, move || {
            let buckets = engine::partition(parent, num_partitions)?;
            Ok(engine::reduce_partitions(buckets, reduce_fn))
        })
    }

    pub fn sort_by_key(self, ascending: bool) -> Self
    where
        K: Ord,
    {
        let parent = self.iter;
        Self::deferred(self.ctx, move || {
            let mut pairs = parent.collect::<Result<Vec<_>>>()?;
            if ascending {
                pairs.sort_by(|a, b| a.0.cmp(&b.0));
            } else {
                pairs.sort_by(|a, b| b.0.cmp(&a.0));
            }
            Ok(pairs)
        })
    }
}

/////////////////////////////////////////////////////////////////////////////
// Frequency tables
/////////////////////////////////////////////////////////////////////////////

/// Occurrence count per distinct key.
///
/// Iteration order is unspecified; use [`FrequencyTable::into_sorted`] when
/// order matters.
#[derive(Clone, PartialEq, Eq)]
pub struct FrequencyTable<K: Hash + Eq> {
    counts: FnvHashMap<K, u64>,
}

impl<K: Hash + Eq> FrequencyTable<K> {
    pub fn new() -> Self {
        Self {
            counts: FnvHashMap::default(),
        }
    }

    pub fn add(&mut self, key: K) {
        *self.counts.entry(key).or_insert(0) += 1;
    }

    /// Count for `key`, zero when it never occurred.
    pub fn get(&self, key: &K) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, K, u64> {
        self.counts.iter()
    }

    pub fn into_sorted(self) -> Vec<(K, u64)>
    where
        K: Ord,
    {
        let mut pairs = self.counts.into_iter().collect::<Vec<_>>();
        pairs.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        pairs
    }
}

impl<K: Hash + Eq> Default for FrequencyTable<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq + fmt::Debug> fmt::Debug for FrequencyTable<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.counts.iter()).finish()
    }
}

impl<K: Hash + Eq> FromIterator<K> for FrequencyTable<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut table = Self::new();
        for key in iter {
            table.add(key);
        }
        table
    }
}

impl<K: Hash + Eq> IntoIterator for FrequencyTable<K> {
    type Item = (K, u64);
    type IntoIter = hash_map::IntoIter<K, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Config;
    use anyhow::bail;
    use std::cell::Cell;

    fn ctx(partitions: u32) -> Context {
        Context::new(Config::default().with_partitions(partitions)).unwrap()
    }

    #[test]
    fn transformations_run_only_on_action() -> Result<()> {
        let ctx = ctx(4);
        let calls = Cell::new(0);
        let doubled = ctx.parallelize(vec![1, 2, 3]).map(|x| {
            calls.set(calls.get() + 1);
            x * 2
        });
        assert_eq!(calls.get(), 0);
        assert_eq!(doubled.collect()?, vec![2, 4, 6]);
        assert_eq!(calls.get(), 3);
        Ok(())
    }

    #[test]
    fn shuffle_is_deferred_too() -> Result<()> {
        let ctx = ctx(4);
        let calls = Cell::new(0);
        let reduced = ctx
            .parallelize(vec![("a", 1), ("b", 1), ("a", 1)])
            .map(|kv| {
                calls.set(calls.get() + 1);
                kv
            })
            .reduce_by_key(|x, y| x + y);
        assert_eq!(calls.get(), 0);
        let mut pairs = reduced.collect()?;
        pairs.sort();
        assert_eq!(pairs, vec![("a", 2), ("b", 1)]);
        Ok(())
    }

    #[test]
    fn reduce_by_key_agrees_across_partition_counts() -> Result<()> {
        let words = "the quick brown fox jumps over the lazy dog the end";
        let mut tables = Vec::new();
        for partitions in [1, 3, 11] {
            let ctx = ctx(partitions);
            let pairs = ctx
                .parallelize(words.split(' ').collect::<Vec<_>>())
                .map(|w| (w, 1u64))
                .reduce_by_key(|x, y| x + y)
                .sort_by_key(true)
                .collect()?;
            tables.push(pairs);
        }
        assert_eq!(tables[0], tables[1]);
        assert_eq!(tables[1], tables[2]);
        assert!(tables[0].contains(&("the", 3)));
        Ok(())
    }

    #[test]
    fn sort_by_key_descending() -> Result<()> {
        let ctx = ctx(2);
        let pairs = ctx
            .parallelize(vec![(2, 'b'), (3, 'c'), (1, 'a')])
            .sort_by_key(false)
            .collect()?;
        assert_eq!(pairs, vec![(3, 'c'), (2, 'b'), (1, 'a')]);
        Ok(())
    }

    #[test]
    fn flat_map_filter_and_flip() -> Result<()> {
        let ctx = ctx(2);
        let pairs = ctx
            .parallelize(vec!["a b", "", "c"])
            .flat_map(|line| line.split_whitespace().map(str::to_string).collect::<Vec<_>>())
            .filter(|w| w != "b")
            .map(|w| (w, 1))
            .flip()
            .collect()?;
        assert_eq!(pairs, vec![(1, "a".to_string()), (1, "c".to_string())]);
        Ok(())
    }

    #[test]
    fn map_values_and_sort_by() -> Result<()> {
        let ctx = ctx(2);
        let pairs = ctx
            .parallelize(vec![("x", 3), ("y", 1), ("z", 2)])
            .map_values(|v| v * 10)
            .sort_by(|(_, v)| *v)
            .collect()?;
        assert_eq!(pairs, vec![("y", 10), ("z", 20), ("x", 30)]);
        Ok(())
    }

    #[test]
    fn first_error_surfaces_from_the_action() {
        let ctx = ctx(2);
        let seen = Cell::new(0);
        let result = ctx
            .parallelize(vec!["1", "x", "3"])
            .try_map(|s| {
                seen.set(seen.get() + 1);
                match s.parse::<u32>() {
                    Ok(n) => Ok((n, 1)),
                    Err(_) => bail!("not a number: {s}"),
                }
            })
            .reduce_by_key(|a, b| a + b)
            .collect();
        assert!(result.is_err());
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn for_each_and_count() -> Result<()> {
        let ctx = ctx(1);
        let mut sum = 0;
        ctx.parallelize(vec![1, 2, 3]).for_each(|x| {
            sum += x;
            Ok(())
        })?;
        assert_eq!(sum, 6);
        assert_eq!(ctx.parallelize(vec!['a'; 5]).count()?, 5);
        Ok(())
    }

    #[test]
    fn count_by_value_builds_a_table() -> Result<()> {
        let ctx = ctx(1);
        let table = ctx.parallelize(vec!["5", "3", "5"]).count_by_value()?;
        assert_eq!(table.get(&"5"), 2);
        assert_eq!(table.get(&"4"), 0);
        assert_eq!(table.total(), 3);
        assert_eq!(table.into_sorted(), vec![("3", 1), ("5", 2)]);

        let collected: FrequencyTable<_> = ["a", "b", "a"].into_iter().collect();
        assert_eq!(collected.iter().count(), 2);
        assert_eq!(collected.get(&"a"), 2);

        let empty = ctx.parallelize(Vec::<u8>::new()).count_by_value()?;
        assert!(empty.is_empty());
        Ok(())
    }
}
