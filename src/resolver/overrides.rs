use std::collections::BTreeMap;

/// Caller-supplied parameter values, keyed by parameter name.
///
/// Overrides pre-select values in list parameters and replace the defaults
/// of plain parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterOverrides {
    values: BTreeMap<String, Vec<String>>,
}

impl ParameterOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one value for `name`, keeping earlier ones.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values
            .entry(name.into())
            .or_default()
            .push(value.into());
    }

    /// Replace all values of `name`.
    pub fn set_all<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.values.get(name).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterOverrides
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut overrides = Self::new();
        for (name, value) in iter {
            overrides.push(name, value);
        }
        overrides
    }
}
