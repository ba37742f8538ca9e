//! The canonical grouped container.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::dataset::Dataset;
use super::group::GroupName;
use super::io_json;
use crate::error::InferConvError;

/// A set of labeled datasets keyed by [`GroupName`].
///
/// Every conversion path produces one of these. Group names are unique by
/// construction; inserting a group that already exists replaces it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InferenceData {
    groups: BTreeMap<GroupName, Dataset>,
}

impl InferenceData {
    pub fn new() -> Self {
        Self::default()
    }

    /// A container holding exactly one group.
    pub fn single(group: GroupName, dataset: Dataset) -> Self {
        Self::new().with_group(group, dataset)
    }

    /// Returns the container with `group` set to `dataset`.
    pub fn with_group(mut self, group: GroupName, dataset: Dataset) -> Self {
        self.groups.insert(group, dataset);
        self
    }

    pub fn group(&self, group: GroupName) -> Option<&Dataset> {
        self.groups.get(&group)
    }

    pub fn has_group(&self, group: GroupName) -> bool {
        self.groups.contains_key(&group)
    }

    /// Takes one group out of the container, consuming it.
    pub fn into_group(mut self, group: GroupName) -> Option<Dataset> {
        self.groups.remove(&group)
    }

    pub fn groups(&self) -> impl Iterator<Item = (GroupName, &Dataset)> {
        self.groups.iter().map(|(k, v)| (*k, v))
    }

    pub fn group_names(&self) -> impl Iterator<Item = GroupName> + '_ {
        self.groups.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Loads a container previously written with [`InferenceData::to_file`].
    pub fn from_file(path: &Path) -> Result<Self, InferConvError> {
        io_json::read_container_json(path)
    }

    pub fn to_file(&self, path: &Path) -> Result<(), InferConvError> {
        io_json::write_container_json(path, self)
    }

    /// Checks the coordinate invariant of every group.
    pub fn check_consistency(&self) -> Result<(), InferConvError> {
        self.groups
            .values()
            .try_for_each(Dataset::check_consistency)
    }
}
