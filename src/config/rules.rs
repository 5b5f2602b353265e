//! Competition rules configuration.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct RulesConfig {
    /// Whether a submitted result may be a tie. Single-elimination
    /// progression needs a winner, so this defaults off.
    #[serde(default)]
    pub allow_ties: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self { allow_ties: false }
    }
}
