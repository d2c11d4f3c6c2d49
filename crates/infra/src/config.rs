//! Service configuration from environment variables.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const OPTIMISTIC_CONCURRENCY_VAR: &str = "DISPO_OPTIMISTIC_CONCURRENCY";
pub const STRICT_JOURNAL_VAR: &str = "DISPO_STRICT_JOURNAL";
pub const SEED_DIR_VAR: &str = "DISPO_SEED_DIR";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispositionConfig {
    /// Replace inventory items only if the stored version is the one read.
    pub optimistic_concurrency: bool,
    /// Surface journal append failures as errors (the write still stands).
    pub strict_journal: bool,
    /// Directory with `companies.json` / `materials.json` sample data.
    pub seed_dir: Option<PathBuf>,
}

impl DispositionConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from any variable source; unset or unparseable flags are `false`.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |key: &str| {
            let raw = var(key).unwrap_or_else(|| "false".to_string());
            raw.trim().parse::<bool>().unwrap_or_else(|_| {
                tracing::warn!(variable = key, value = %raw, "not a boolean; using false");
                false
            })
        };

        Self {
            optimistic_concurrency: flag(OPTIMISTIC_CONCURRENCY_VAR),
            strict_journal: flag(STRICT_JOURNAL_VAR),
            seed_dir: var(SEED_DIR_VAR)
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> DispositionConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DispositionConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn unset_flags_default_to_false() {
        assert_eq!(config(&[]), DispositionConfig::default());
    }

    #[test]
    fn flags_parse_as_booleans() {
        let cfg = config(&[(OPTIMISTIC_CONCURRENCY_VAR, "true"), (STRICT_JOURNAL_VAR, " true ")]);
        assert!(cfg.optimistic_concurrency);
        assert!(cfg.strict_journal);
    }

    #[test]
    fn blank_seed_dir_is_ignored() {
        assert_eq!(config(&[(SEED_DIR_VAR, " ")]).seed_dir, None);
        assert_eq!(
            config(&[(SEED_DIR_VAR, "/srv/dispo")]).seed_dir,
            Some(PathBuf::from("/srv/dispo"))
        );
    }

    #[test]
    fn garbage_falls_back_to_false() {
        let cfg = config(&[(OPTIMISTIC_CONCURRENCY_VAR, "yes please")]);
        assert!(!cfg.optimistic_concurrency);
    }
}
