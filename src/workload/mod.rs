//! Converts batch application names to actual application code.
//!
//! # Example
//!
//! To get the rating histogram application:
//! ```
//! # use anyhow::Result;
//! use sparklite::workload;
//! # fn main() -> Result<()> {
//! let ratings = workload::named("ratings")?;
//! assert_eq!(ratings.name, "ratings");
//! # Ok(())
//! # }
//! ```

use crate::error::PipelineError;
use crate::Workload;
use anyhow::Result;

pub mod friends;
pub mod ratings;
pub mod spend;
pub mod temperature;
pub mod wc;

const WORKLOADS: [Workload; 5] = [
    Workload {
        name: "ratings",
        about: "per-movie and per-rating counts of a ratings dataset",
        run_fn: ratings::run,
    },
    Workload {
        name: "friends",
        about: "average friend count by age",
        run_fn: friends::run,
    },
    Workload {
        name: "temperature",
        about: "extreme temperature per weather station",
        run_fn: temperature::run,
    },
    Workload {
        name: "wc",
        about: "word count, rarest first",
        run_fn: wc::run,
    },
    Workload {
        name: "spend",
        about: "total amount spent per customer",
        run_fn: spend::run,
    },
];

/// Every registered [`Workload`].
pub fn all() -> &'static [Workload] {
    &WORKLOADS
}

/// Gets the [`Workload`] named `name`.
///
/// Returns [`None`] if no application with the given name was found.
pub fn try_named(name: &str) -> Option<Workload> {
    WORKLOADS.iter().find(|w| w.name == name).copied()
}

/// Gets the [`Workload`] named `name`.
///
/// Returns a [`PipelineError::UnknownWorkload`] if no application with the
/// given name was found.
pub fn named(name: &str) -> Result<Workload> {
    match try_named(name) {
        Some(app) => Ok(app),
        None => Err(PipelineError::UnknownWorkload(name.to_string()).into()),
    }
}
