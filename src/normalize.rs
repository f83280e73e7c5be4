use serde::{Deserialize, Serialize};
use tracing::debug;

/// Rewrites a path prefix, e.g. a machine share exposed under a different name:
///
/// ```toml
/// [[path_rules]]
/// pattern = '\\win10-model-2\D\'
/// replacement = '\\win10-model-2\D_model_run\'
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PathRule {
    pub pattern: String,
    pub replacement: String,
}

impl PathRule {
    pub fn new(pattern: &str, replacement: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
        }
    }

    /// Prefix comparison ignores ASCII case, matching Windows share semantics.
    fn apply(&self, path: &str) -> Option<String> {
        if self.pattern.is_empty() {
            return None;
        }
        let head = path.get(..self.pattern.len())?;
        if head.eq_ignore_ascii_case(&self.pattern) {
            Some(format!("{}{}", self.replacement, &path[self.pattern.len()..]))
        } else {
            None
        }
    }
}

/// Apply the first matching rule. The same normalization is used for ledger keys
/// at catalog time and for lookups at rebuild time.
pub fn normalize_path(path: &str, rules: &[PathRule]) -> String {
    let trimmed = path.trim();
    for rule in rules {
        if let Some(rewritten) = rule.apply(trimmed) {
            debug!("Normalized '{}' to '{}'", trimmed, rewritten);
            return rewritten;
        }
    }
    trimmed.to_string()
}
