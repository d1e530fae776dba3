//! Scheduling and admission configuration.

use serde::{Deserialize, Serialize};

/// Settings governing reservation admission and listing behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingConfig {
    /// How many times an admission transaction is retried after a
    /// serialization or deadlock failure before the request is denied.
    #[serde(default = "default_admission_max_retries")]
    pub admission_max_retries: u32,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            admission_max_retries: default_admission_max_retries(),
        }
    }
}

fn default_admission_max_retries() -> u32 {
    3
}
