use std::hash::Hash;

use anyhow::Result;
use dashmap::DashMap;
use itertools::Itertools;
use tracing::debug;

use crate::ihash;

// types related to this engine
type BucketIndex = u32;
pub type Buckets<K, V> = DashMap<BucketIndex, Vec<(K, V)>>;

/// Spreads key-value pairs over `num_partitions` buckets by `ihash(key)`.
///
/// Pairs keep their arrival order inside a bucket. Stops at the first error.
pub fn partition<K, V, I>(pairs: I, num_partitions: u32) -> Result<Buckets<K, V>>
where
    K: Hash,
    I: Iterator<Item = Result<(K, V)>>,
{
    let buckets: Buckets<K, V> = DashMap::new();
    for item in pairs {
        let (key, value) = item?;
        let bucket_no = ihash(&key) % num_partitions;

        #[allow(clippy::unwrap_or_default)]
        buckets
            .entry(bucket_no)
            .or_insert(Vec::new())
            .push((key, value));
    }
    Ok(buckets)
}

/// Reduces every bucket, lowest bucket index first.
///
/// Each bucket is sorted by key (stable, so values of one key stay in
/// arrival order) and every run of equal keys is folded with `reduce_fn`.
pub fn reduce_partitions<K, V, F>(buckets: Buckets<K, V>, mut reduce_fn: F) -> Vec<(K, V)>
where
    K: Ord,
    F: FnMut(V, V) -> V,
{
    let buckets = buckets
        .into_iter()
        .sorted_unstable_by_key(|(reduce_id, _)| *reduce_id);

    let mut reduced = Vec::new();
    for (reduce_id, mut bkt) in buckets {
        let pairs = bkt.len();
        bkt.sort_by(|a, b| a.0.cmp(&b.0));
        let before = reduced.len();
        reduced.extend(bkt.into_iter().coalesce(|(k1, v1), (k2, v2)| {
            if k1 == k2 {
                Ok((k1, reduce_fn(v1, v2)))
            } else {
                Err(((k1, v1), (k2, v2)))
            }
        }));
        debug!(reduce_id, pairs, keys = reduced.len() - before, "reduced bucket");
    }
    reduced
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_respects_bucket_count() -> Result<()> {
        let pairs = (0..100u32).map(|k| Ok((k, 1)));
        let buckets = partition(pairs, 7)?;
        assert!(buckets.len() <= 7);
        assert!(buckets.iter().all(|entry| *entry.key() < 7));
        let total: usize = buckets.iter().map(|entry| entry.value().len()).sum();
        assert_eq!(total, 100);
        Ok(())
    }

    #[test]
    fn same_key_lands_in_one_bucket() -> Result<()> {
        let pairs = vec![("movie", 1), ("other", 1), ("movie", 1)].into_iter().map(Ok);
        let buckets = partition(pairs, 5)?;
        let holding = buckets
            .iter()
            .filter(|entry| entry.value().iter().any(|(k, _)| *k == "movie"))
            .count();
        assert_eq!(holding, 1);
        Ok(())
    }

    #[test]
    fn reduce_keeps_arrival_order_within_key() -> Result<()> {
        let pairs = vec![("k", "a"), ("j", "x"), ("k", "b"), ("k", "c")]
            .into_iter()
            .map(|(k, v)| Ok((k, v.to_string())));
        let buckets = partition(pairs, 1)?;
        let reduced = reduce_partitions(buckets, |a, b| a + &b);
        assert_eq!(
            reduced,
            vec![("j", "x".to_string()), ("k", "abc".to_string())]
        );
        Ok(())
    }

    #[test]
    fn partition_stops_on_error() {
        let pairs = vec![Ok((1, 1)), Err(anyhow::anyhow!("bad line")), Ok((2, 1))];
        assert!(partition(pairs.into_iter(), 3).is_err());
    }
}
