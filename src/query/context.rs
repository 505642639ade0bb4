//! Parameter values handed to data sources.

use std::collections::BTreeMap;

/// Already-resolved upstream parameter values, keyed by parameter name.
///
/// Cascading parameters receive the selections of the parameters they
/// depend on through this context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterContext {
    values: BTreeMap<String, Vec<String>>,
}

impl ParameterContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.values.insert(name.into(), values);
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.values.get(name).map(Vec::as_slice)
    }

    /// First value of a parameter, used for scalar statement bindings.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.first()).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}
