// Per-metric view state for the dashboard
use super::error::FetchError;
use serde::Serialize;

/// Rendered in place of a metric that has no value
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricKind {
    LicenseCount,
    UserCount,
    SessionCount,
    DailyUsage,
}

impl MetricKind {
    pub const ALL: [MetricKind; 4] = [
        MetricKind::LicenseCount,
        MetricKind::UserCount,
        MetricKind::SessionCount,
        MetricKind::DailyUsage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::LicenseCount => "license_count",
            MetricKind::UserCount => "user_count",
            MetricKind::SessionCount => "session_count",
            MetricKind::DailyUsage => "daily_usage",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "camelCase")]
pub enum MetricState<T> {
    Idle,
    Loading,
    Loaded(T),
    Failed(FetchError),
}

impl<T> Default for MetricState<T> {
    fn default() -> Self {
        MetricState::Idle
    }
}

impl<T> MetricState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, MetricState::Loading)
    }

    /// Loaded or Failed; nothing further will be written for this activation
    pub fn is_settled(&self) -> bool {
        matches!(self, MetricState::Loaded(_) | MetricState::Failed(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            MetricState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            MetricState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

impl<T: std::fmt::Display> MetricState<T> {
    pub fn display_value(&self) -> String {
        self.value()
            .map(|v| v.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}

impl<T> From<Result<T, FetchError>> for MetricState<T> {
    fn from(result: Result<T, FetchError>) -> Self {
        match result {
            Ok(value) => MetricState::Loaded(value),
            Err(err) => MetricState::Failed(err),
        }
    }
}
