//! User-domain configuration

use serde::Deserialize;

/// Configuration for the user domain.
#[derive(Debug, Clone, Deserialize)]
pub struct UsersConfig {
    /// Minutes of inactivity after which operational tooling treats a user
    /// as dormant. Accepted for environment compatibility with the pull-based
    /// dispatcher variant; no background sweep consumes it here.
    #[serde(default = "default_inactivity_threshold_minutes")]
    pub inactivity_threshold_minutes: i64,
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            inactivity_threshold_minutes: default_inactivity_threshold_minutes(),
        }
    }
}

fn default_inactivity_threshold_minutes() -> i64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_threshold_is_thirty_minutes() {
        assert_eq!(UsersConfig::default().inactivity_threshold_minutes, 30);
    }
}
