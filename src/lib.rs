//! A local, single-process take on the RDD-style batch API.
//!
//! Users build a lazy [`Dataset`] from a [`Context`], chain map/filter/reduce
//! style transformations onto it, and materialize the result with an action.
//! Key-based reductions go through a small hash-bucketed shuffle, the same
//! map-then-bucket-then-reduce shape a MapReduce job has, minus the cluster.

use std::hash::{Hash, Hasher};

pub mod context;
pub mod dataset;
pub mod error;
pub mod record;
pub mod standalone;
pub mod utils;
pub mod workload;

pub use context::{Config, Context};
pub use dataset::{Dataset, FrequencyTable};
pub use error::PipelineError;

/////////////////////////////////////////////////////////////////////////////
// Workload types
/////////////////////////////////////////////////////////////////////////////

/// Entry point of a named batch job.
///
/// It takes the execution context, the input path (or glob), the
/// JSON-encoded auxiliary arguments and a sink for the printed results.
pub type RunFn = fn(
    ctx: &Context,
    input: &str,
    aux: bytes::Bytes,
    out: &mut dyn std::io::Write,
) -> anyhow::Result<()>;

/// A named batch application.
#[derive(Copy, Clone)]
pub struct Workload {
    pub name: &'static str,
    pub about: &'static str,
    pub run_fn: RunFn,
}

/// Hashes an intermediate key. Compute a shuffle bucket for a given key
/// by calculating `ihash(key) % num_partitions`.
///
/// FNV with a fixed key, so bucket assignment is stable across runs.
pub fn ihash<K: Hash + ?Sized>(key: &K) -> u32 {
    let mut hasher = fnv::FnvHasher::with_key(0);
    key.hash(&mut hasher);
    let value = hasher.finish() & 0x7fffffff;
    // masked to 31 bits above
    value as u32
}
