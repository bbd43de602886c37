//! Helpers for handing auxiliary arguments to workloads.
//!

use anyhow::Result;
use bytes::Bytes;

/// Encode workload arguments the way they are handed to a workload.
pub fn encode_args(args: &[String]) -> Result<Bytes> {
    Ok(Bytes::from(serde_json::to_string(args)?))
}

/// Decode what [`encode_args`] produced.
pub fn decode_args(aux: &Bytes) -> Result<Vec<String>> {
    Ok(serde_json::from_slice::<Vec<String>>(aux)?)
}
