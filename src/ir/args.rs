//! The keyword argument bag handed from the dispatcher to an extractor.
//!
//! Each extractor accepts its own keyword set; [`ArgumentBag::into_keywords`]
//! checks the bag against that set and hands back a [`KeywordReader`] for
//! typed access.

use ndarray::ArrayD;
use std::collections::BTreeMap;

use super::coords::{Coords, Dims};
use super::group::GroupName;
use super::value::{Keywords, SamplerObject, Value};
use crate::error::InferConvError;

/// Keyword arguments for one conversion call.
///
/// Built fresh for every call and moved, never shared: routing consumes the
/// bag and returns a new one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArgumentBag {
    entries: BTreeMap<String, Value>,
    coords: Option<Coords>,
    dims: Option<Dims>,
}

impl ArgumentBag {
    /// Stages `value` under the keyword named after `group`, on top of the
    /// pass-through `options`.
    pub fn stage(
        group: GroupName,
        value: Value,
        coords: Option<Coords>,
        dims: Option<Dims>,
        options: Keywords,
    ) -> Self {
        let mut entries = options;
        entries.insert(group.as_str().to_string(), value);
        Self {
            entries,
            coords,
            dims,
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Removes a keyword from the bag.
    pub fn take(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Moves the entry under `from` to `to`. A missing `from` is a no-op.
    pub fn rename(mut self, from: &str, to: &str) -> Self {
        if let Some(value) = self.entries.remove(from) {
            self.entries.insert(to.to_string(), value);
        }
        self
    }

    pub fn coords(&self) -> Option<&Coords> {
        self.coords.as_ref()
    }

    pub fn dims(&self) -> Option<&Dims> {
        self.dims.as_ref()
    }

    pub fn has_coords_or_dims(&self) -> bool {
        self.coords.is_some() || self.dims.is_some()
    }

    /// Checks every keyword against `accepted` and opens the bag for typed
    /// reads on behalf of `extractor`.
    ///
    /// Keywords holding [`Value::None`] count as absent and are accepted
    /// anywhere.
    pub fn into_keywords(
        self,
        extractor: &'static str,
        accepted: &[&str],
    ) -> Result<KeywordReader, InferConvError> {
        if let Some(unexpected) = self
            .entries
            .iter()
            .find(|(k, v)| !v.is_none() && !accepted.contains(&k.as_str()))
        {
            return Err(InferConvError::UnexpectedKeyword {
                extractor,
                keyword: unexpected.0.clone(),
            });
        }

        Ok(KeywordReader {
            extractor,
            entries: self
                .entries
                .into_iter()
                .filter(|(_, v)| !v.is_none())
                .collect(),
            coords: self.coords,
            dims: self.dims,
        })
    }
}

/// Typed access to a checked keyword set.
#[derive(Debug)]
pub struct KeywordReader {
    extractor: &'static str,
    entries: BTreeMap<String, Value>,
    coords: Option<Coords>,
    dims: Option<Dims>,
}

impl KeywordReader {
    pub fn take(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn take_object(&mut self, key: &str) -> Result<Option<SamplerObject>, InferConvError> {
        match self.take(key) {
            None => Ok(None),
            Some(Value::Object(obj)) => Ok(Some(obj)),
            Some(_) => Err(self.invalid(key, "a sampler result object")),
        }
    }

    pub fn take_str_list(&mut self, key: &str) -> Result<Option<Vec<String>>, InferConvError> {
        match self.take(key) {
            None => Ok(None),
            Some(value) => value
                .as_str_list()
                .map(|names| Some(names.into_iter().map(str::to_string).collect()))
                .ok_or_else(|| self.invalid(key, "a string or a list of strings")),
        }
    }

    pub fn take_array_map(
        &mut self,
        key: &str,
    ) -> Result<Option<BTreeMap<String, ArrayD<f64>>>, InferConvError> {
        match self.take(key) {
            None => Ok(None),
            Some(value) => value
                .as_array_map()
                .map(Some)
                .ok_or_else(|| self.invalid(key, "a mapping of arrays")),
        }
    }

    pub fn take_usize(&mut self, key: &str) -> Result<Option<usize>, InferConvError> {
        match self.take(key) {
            None => Ok(None),
            Some(Value::Int(n)) if n > 0 => Ok(Some(n as usize)),
            Some(_) => Err(self.invalid(key, "a positive integer")),
        }
    }

    pub fn take_int(&mut self, key: &str) -> Result<Option<i64>, InferConvError> {
        match self.take(key) {
            None => Ok(None),
            Some(Value::Int(n)) => Ok(Some(n)),
            Some(_) => Err(self.invalid(key, "an integer")),
        }
    }

    pub fn coords(&self) -> Option<&Coords> {
        self.coords.as_ref()
    }

    pub fn dims(&self) -> Option<&Dims> {
        self.dims.as_ref()
    }

    /// Hands the coordinate and dimension maps over to the extractor's
    /// argument record.
    pub fn take_coords_dims(&mut self) -> (Option<Coords>, Option<Dims>) {
        (self.coords.take(), self.dims.take())
    }

    fn invalid(&self, key: &str, expected: &'static str) -> InferConvError {
        InferConvError::InvalidKeyword {
            extractor: self.extractor,
            keyword: key.to_string(),
            expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staging_places_value_under_group_keyword() {
        let options: Keywords = [("prior".to_string(), Value::from("prior.csv"))]
            .into_iter()
            .collect();
        let bag = ArgumentBag::stage(
            GroupName::SampleStats,
            Value::from("fit.csv"),
            None,
            None,
            options,
        );

        assert_eq!(bag.get("sample_stats"), Some(&Value::from("fit.csv")));
        assert_eq!(bag.get("prior"), Some(&Value::from("prior.csv")));
        assert!(!bag.has_coords_or_dims());
    }

    #[test]
    fn rename_of_missing_key_is_noop() {
        let bag = ArgumentBag::default().with("posterior", "a.csv");
        let renamed = bag.clone().rename("sample_stats", "posterior");
        assert_eq!(renamed, bag);
    }

    #[test]
    fn unexpected_keyword_names_extractor() {
        let bag = ArgumentBag::default()
            .with("sampler", Value::None)
            .with("var_names", "a");
        let err = bag.into_keywords("from_beanmachine", &["sampler"]).unwrap_err();
        assert!(err
            .to_string()
            .contains("from_beanmachine() got an unexpected keyword argument 'var_names'"));
    }

    #[test]
    fn none_valued_keywords_are_absent() {
        let bag = ArgumentBag::default().with("prior", Value::None);
        let mut reader = bag.into_keywords("from_cmdstan", &["posterior"]).unwrap();
        assert!(reader.take("prior").is_none());
    }

    #[test]
    fn typed_reads_reject_wrong_kinds() {
        let bag = ArgumentBag::default().with("num_chains", "four");
        let mut reader = bag.into_keywords("from_pyro", &["num_chains"]).unwrap();
        let err = reader.take_usize("num_chains").unwrap_err();
        assert!(matches!(err, InferConvError::InvalidKeyword { .. }));
    }
}
