//! Group aliasing for extractors that fill statistics groups themselves.
//!
//! Stan-style extractors derive `sample_stats` from the posterior run and
//! `sample_stats_prior` from the prior run, so a value staged under a
//! statistics group really is that run.

use crate::ir::{ArgumentBag, GroupName};

/// Moves a value staged under a statistics group to the run it comes from.
///
/// Pure and idempotent: routing a bag twice gives the same bag, and a bag
/// without the aliased key passes through unchanged.
pub fn route(group: GroupName, bag: ArgumentBag) -> ArgumentBag {
    let target = group.routed();
    if target == group {
        return bag;
    }
    tracing::debug!(from = %group, to = %target, "routing staged value");
    bag.rename(group.as_str(), target.as_str())
}
