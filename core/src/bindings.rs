//! Variable bindings for formula evaluation.
//!
//! Values are converted to `f64` when they are inserted, so a binding that is
//! not a finite number is reported to whoever builds the map rather than in
//! the middle of an evaluation.

use hashbrown::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("value for `{name}` is not a number: {value:?}")]
    NotANumber { name: String, value: String },

    #[error("value for `{name}` is not finite: {value}")]
    NotFinite { name: String, value: String },
}

/// A value that can be bound to a variable name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BindingValue<'v> {
    Number(f64),
    /// Numeric text such as `"1274"` or `" 3.5e2 "`.
    Text(&'v str),
}

impl From<f64> for BindingValue<'_> {
    fn from(value: f64) -> Self {
        BindingValue::Number(value)
    }
}

impl From<f32> for BindingValue<'_> {
    fn from(value: f32) -> Self {
        BindingValue::Number(value.into())
    }
}

impl From<i32> for BindingValue<'_> {
    fn from(value: i32) -> Self {
        BindingValue::Number(value.into())
    }
}

impl From<u32> for BindingValue<'_> {
    fn from(value: u32) -> Self {
        BindingValue::Number(value.into())
    }
}

impl From<i64> for BindingValue<'_> {
    fn from(value: i64) -> Self {
        // Rounds to the nearest representable value past 2^53.
        BindingValue::Number(value as f64)
    }
}

impl<'v> From<&'v str> for BindingValue<'v> {
    fn from(value: &'v str) -> Self {
        BindingValue::Text(value)
    }
}

impl<'v> From<&'v String> for BindingValue<'v> {
    fn from(value: &'v String) -> Self {
        BindingValue::Text(value.as_str())
    }
}

impl BindingValue<'_> {
    fn to_f64(self, name: &str) -> Result<f64, BindingError> {
        let value = match self {
            BindingValue::Number(value) => value,
            BindingValue::Text(text) => {
                text.trim()
                    .replace('_', "")
                    .parse::<f64>()
                    .map_err(|_| BindingError::NotANumber {
                        name: name.to_string(),
                        value: text.to_string(),
                    })?
            }
        };
        if !value.is_finite() {
            return Err(BindingError::NotFinite {
                name: name.to_string(),
                value: value.to_string(),
            });
        }
        Ok(value)
    }
}

/// Case-sensitive mapping from variable names to finite `f64` values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    values: HashMap<String, f64>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build bindings from `(name, value)` pairs, stopping at the first value
    /// that is not a finite number.
    ///
    /// # Example
    ///
    /// ```
    /// use batpy_core::Bindings;
    ///
    /// let bindings = Bindings::from_pairs([("a", 1274), ("b", 3), ("c", 91)]).unwrap();
    /// assert_eq!(bindings.get("b"), Some(3.0));
    /// ```
    pub fn from_pairs<'v, I, K, V>(pairs: I) -> Result<Self, BindingError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<BindingValue<'v>>,
    {
        let mut bindings = Self::new();
        for (name, value) in pairs {
            bindings.insert(name, value)?;
        }
        Ok(bindings)
    }

    /// Bind `name` to `value`, returning the previous value if there was one.
    pub fn insert<'v>(
        &mut self,
        name: impl Into<String>,
        value: impl Into<BindingValue<'v>>,
    ) -> Result<Option<f64>, BindingError> {
        let name = name.into();
        let value = value.into().to_f64(&name)?;
        Ok(self.values.insert(name, value))
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }
}
