use serde::{Deserialize, Serialize};

use crate::pattern::shape::MAX_LEAVES;

/// Knobs of a compile pass.
///
/// Can be read from a configuration file, missing fields take their default value:
///
/// ```rust
/// use clibcomp::CompileOptions;
/// let options: CompileOptions = serde_json::from_str(r#"{ "max_pattern_inputs": 6 }"#).unwrap();
/// assert_eq!(options.max_pattern_inputs, 6);
/// assert_eq!(options.max_automorphism_inputs, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Functions with more inputs get no pattern. Clamped to `2..=8`.
    pub max_pattern_inputs: usize,
    /// Classes whose canonical function has more inputs get no automorphism list.
    pub max_automorphism_inputs: usize,
    /// Register the expression of every eligible cell, not only the first one of each group.
    pub register_all_expressions: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            max_pattern_inputs: MAX_LEAVES,
            max_automorphism_inputs: 5,
            register_all_expressions: false,
        }
    }
}

impl CompileOptions {
    pub(crate) fn pattern_input_limit(&self) -> usize {
        self.max_pattern_inputs.clamp(2, MAX_LEAVES)
    }
}
