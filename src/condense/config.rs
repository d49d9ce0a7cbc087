use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_CHARS, DEFAULT_TOP_N};

use super::error::CondenseError;

/// Per-call condensation parameters. Also the `condense` options object of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CondensationConfig {
    /// Highest-scoring sentences considered per chunk. Default: `6`.
    pub top_n: usize,

    /// Character budget per chunk. Default: `1000`.
    pub max_chars: usize,

    /// Boost sentences carrying citation markers. Default: `false`.
    pub preserve_references: bool,
}

impl Default for CondensationConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            max_chars: DEFAULT_MAX_CHARS,
            preserve_references: false,
        }
    }
}

impl CondensationConfig {
    pub fn new(top_n: usize, max_chars: usize) -> Self {
        Self {
            top_n,
            max_chars,
            preserve_references: false,
        }
    }

    pub fn with_preserve_references(mut self, preserve: bool) -> Self {
        self.preserve_references = preserve;
        self
    }

    pub fn validate(&self) -> Result<(), CondenseError> {
        if self.top_n == 0 {
            return Err(CondenseError::invalid("top_n must be greater than zero"));
        }
        if self.max_chars == 0 {
            return Err(CondenseError::invalid("max_chars must be greater than zero"));
        }
        Ok(())
    }
}
