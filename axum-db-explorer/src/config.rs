//! Explorer configuration
//!
//! The host application constructs an [`ExplorerConfig`] and hands it to
//! [`DbExplorerLayer`](crate::DbExplorerLayer); nothing here reads ambient
//! global state.

use crate::schema::SortDirection;

/// Configuration for the explorer, injected by the host application.
#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    /// Master switch. When false every explorer route responds 404.
    pub enabled: bool,

    /// The host application's environment name (e.g. "local", "production").
    pub environment: String,

    /// Environments in which the explorer is reachable at all.
    pub allowed_environments: Vec<String>,

    /// Whether create/update/delete endpoints are enabled. When unset, writes
    /// are enabled only in the "local" environment.
    pub write_enabled: Option<bool>,

    /// Table name prefix shared by the inspected schema (e.g. "wp_"). Routes
    /// use logical names with this prefix stripped. Empty string disables
    /// prefix handling.
    pub table_prefix: String,

    /// Rows per page when browsing a table. Zero falls back to the default.
    pub per_page: u32,

    /// chrono format string applied to DATE cells in HTML views.
    pub date_format: String,

    /// chrono format string applied to DATETIME/TIMESTAMP cells in HTML views.
    pub datetime_format: String,

    /// Direction used when the request does not carry a valid `direction`.
    pub default_sort_direction: SortDirection,

    /// User id the presentation overrides are keyed by. `None` stores shared
    /// overrides visible to everyone using the explorer.
    pub user_scope: Option<u64>,
}

pub(crate) const DEFAULT_PER_PAGE: u32 = 25;

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            environment: "production".into(),
            allowed_environments: vec!["local".into()],
            write_enabled: None,
            table_prefix: String::new(),
            per_page: DEFAULT_PER_PAGE,
            date_format: "%b %-d, %Y".into(),
            datetime_format: "%b %-d, %Y %H:%M:%S".into(),
            default_sort_direction: SortDirection::Desc,
            user_scope: None,
        }
    }
}

impl ExplorerConfig {
    /// Effective write flag: explicit setting wins, otherwise writes are only
    /// allowed in the "local" environment.
    pub fn write_enabled(&self) -> bool {
        self.write_enabled.unwrap_or(self.environment == "local")
    }

    /// Whether the configured environment is in the allowed list.
    pub fn environment_allowed(&self) -> bool {
        self.allowed_environments
            .iter()
            .any(|allowed| allowed == &self.environment)
    }

    /// Page size with the non-positive fallback applied.
    pub fn per_page(&self) -> u32 {
        if self.per_page > 0 {
            self.per_page
        } else {
            DEFAULT_PER_PAGE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_defaults_to_local_environment_only() {
        let mut config = ExplorerConfig {
            environment: "local".into(),
            ..Default::default()
        };
        assert!(config.write_enabled());

        config.environment = "production".into();
        assert!(!config.write_enabled());

        config.write_enabled = Some(true);
        assert!(config.write_enabled());

        config.environment = "local".into();
        config.write_enabled = Some(false);
        assert!(!config.write_enabled());
    }

    #[test]
    fn environment_gate_uses_allowed_list() {
        let mut config = ExplorerConfig {
            environment: "staging".into(),
            allowed_environments: vec!["local".into(), "staging".into()],
            ..Default::default()
        };
        assert!(config.environment_allowed());

        config.environment = "production".into();
        assert!(!config.environment_allowed());
    }

    #[test]
    fn per_page_falls_back_on_zero() {
        let config = ExplorerConfig {
            per_page: 0,
            ..Default::default()
        };
        assert_eq!(config.per_page(), DEFAULT_PER_PAGE);

        let config = ExplorerConfig {
            per_page: 50,
            ..Default::default()
        };
        assert_eq!(config.per_page(), 50);
    }
}
