use super::raw::RawValidator;
use crate::error::DefinitionError;
use crate::model::PropertyValue;
use regex::Regex;
use std::fmt;
use std::sync::Arc;

type Predicate = dyn Fn(&PropertyValue) -> Result<(), String> + Send + Sync;

/// A predicate a property value must satisfy, producing a message on failure.
#[derive(Clone)]
pub struct Validator {
    label: String,
    predicate: Arc<Predicate>,
}

impl Validator {
    pub fn new<F>(label: &str, predicate: F) -> Self
    where
        F: Fn(&PropertyValue) -> Result<(), String> + Send + Sync + 'static,
    {
        Self {
            label: label.to_string(),
            predicate: Arc::new(predicate),
        }
    }

    /// Inclusive numeric bounds. Non-numeric values pass.
    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        let label = match (min, max) {
            (Some(lo), Some(hi)) => format!("range [{}, {}]", lo, hi),
            (Some(lo), None) => format!("min {}", lo),
            (None, Some(hi)) => format!("max {}", hi),
            (None, None) => "any".to_string(),
        };
        Self::new(&label, move |value| {
            let Some(n) = value.as_f64() else {
                return Ok(());
            };
            if min.is_some_and(|lo| n < lo) {
                return Err(format!("must be at least {}", min.unwrap_or_default()));
            }
            if max.is_some_and(|hi| n > hi) {
                return Err(format!("must be at most {}", max.unwrap_or_default()));
            }
            Ok(())
        })
    }

    /// Whole-string regular expression match on string values.
    pub fn pattern(regex: Regex) -> Self {
        let label = format!("pattern {}", regex.as_str());
        Self::new(&label, move |value| match value {
            PropertyValue::String(s) if !regex.is_match(s) => {
                Err(format!("must match {}", regex.as_str()))
            }
            _ => Ok(()),
        })
    }

    pub fn from_raw(raw: &RawValidator) -> Result<Self, DefinitionError> {
        let range = (raw.min.is_some() || raw.max.is_some()).then(|| Self::range(raw.min, raw.max));
        let pattern = raw
            .pattern
            .as_deref()
            .map(|p| {
                Regex::new(&format!("^(?:{})$", p)).map_err(|e| {
                    DefinitionError::Invalid(format!("invalid validator pattern '{}': {}", p, e))
                })
            })
            .transpose()?
            .map(Self::pattern);

        Ok(match (range, pattern) {
            (Some(r), Some(p)) => {
                let label = format!("{} and {}", r.label, p.label);
                Self::new(&label, move |value| {
                    r.check(value)?;
                    p.check(value)
                })
            }
            (Some(v), None) | (None, Some(v)) => v,
            (None, None) => Self::new("any", |_| Ok(())),
        })
    }

    pub fn check(&self, value: &PropertyValue) -> Result<(), String> {
        (self.predicate)(value)
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Validator").field(&self.label).finish()
    }
}
