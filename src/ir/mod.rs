//! Intermediate Representation (IR) for inferconv.
//!
//! This module defines the canonical container every conversion produces,
//! the labeled data it holds, the dynamic input values the dispatcher
//! accepts, and the per-engine extractors that turn sampler output into
//! containers.
//!
//! # Design Principles
//!
//! 1. **Labeled axes**: every axis of every variable is bound to a named
//!    coordinate; [`Dataset`] rejects arrays whose lengths disagree with
//!    the coordinates already present.
//!
//! 2. **Closed group set**: groups are keyed by [`GroupName`], so a typo in a
//!    group name is a parse error rather than a silently new group.
//!
//! 3. **One extractor per engine**: each `io_*` module owns its argument
//!    record and accepts exactly its own keywords.
//!
//! # Example
//!
//! ```
//! use inferconv::ir::{Dataset, GroupName, InferenceData};
//! use ndarray::arr2;
//! use std::collections::BTreeMap;
//!
//! let mut arrays = BTreeMap::new();
//! arrays.insert("mu".to_string(), arr2(&[[0.1, 0.2], [0.3, 0.4]]).into_dyn());
//!
//! let posterior = Dataset::from_arrays(arrays, None, None, 0).unwrap();
//! let idata = InferenceData::single(GroupName::Posterior, posterior);
//!
//! let mu = idata.group(GroupName::Posterior).unwrap().variable("mu").unwrap();
//! assert_eq!(mu.dims, vec!["chain", "draw"]);
//! ```

mod args;
mod assemble;
mod container;
mod coords;
mod dataset;
mod group;
pub mod io_beanmachine;
pub mod io_cmdstan_csv;
pub mod io_emcee;
pub mod io_json;
pub mod io_pyro;
pub mod io_stan;
mod value;

// Re-export core types for convenient access
pub use args::{ArgumentBag, KeywordReader};
pub use assemble::ArrayMap;
pub use container::InferenceData;
pub use coords::{Coords, Dims, Label};
pub use dataset::{DataArray, Dataset, Variable, DEFAULT_VARIABLE_NAME, SAMPLE_DIMS};
pub use group::GroupName;
pub use value::{Keywords, Record, SamplerDraws, SamplerObject, Value};
