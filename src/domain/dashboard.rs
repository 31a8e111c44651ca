// Dashboard view-model: four independent metric slots
use super::metric::{MetricKind, MetricState};
use super::usage::{CalendarView, UsageSeries};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub license_count: MetricState<u64>,
    pub user_count: MetricState<u64>,
    pub session_count: MetricState<u64>,
    pub daily_usage: MetricState<UsageSeries>,
    /// Present once daily usage has loaded
    pub calendar: Option<CalendarView>,
}

impl DashboardSnapshot {
    pub fn new(
        license_count: MetricState<u64>,
        user_count: MetricState<u64>,
        session_count: MetricState<u64>,
        daily_usage: MetricState<UsageSeries>,
    ) -> Self {
        let calendar = daily_usage.value().map(CalendarView::from);
        Self {
            license_count,
            user_count,
            session_count,
            daily_usage,
            calendar,
        }
    }

    pub fn failed_count(&self) -> usize {
        [
            self.license_count.error().is_some(),
            self.user_count.error().is_some(),
            self.session_count.error().is_some(),
            self.daily_usage.error().is_some(),
        ]
        .into_iter()
        .filter(|failed| *failed)
        .count()
    }
}

/// A single metric slot settling
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "metric", rename_all = "camelCase")]
pub enum MetricUpdate {
    LicenseCount {
        state: MetricState<u64>,
    },
    UserCount {
        state: MetricState<u64>,
    },
    SessionCount {
        state: MetricState<u64>,
    },
    DailyUsage {
        state: MetricState<UsageSeries>,
        calendar: Option<CalendarView>,
    },
}

impl MetricUpdate {
    pub fn daily_usage(state: MetricState<UsageSeries>) -> Self {
        let calendar = state.value().map(CalendarView::from);
        MetricUpdate::DailyUsage { state, calendar }
    }

    pub fn kind(&self) -> MetricKind {
        match self {
            MetricUpdate::LicenseCount { .. } => MetricKind::LicenseCount,
            MetricUpdate::UserCount { .. } => MetricKind::UserCount,
            MetricUpdate::SessionCount { .. } => MetricKind::SessionCount,
            MetricUpdate::DailyUsage { .. } => MetricKind::DailyUsage,
        }
    }

    pub fn is_failed(&self) -> bool {
        match self {
            MetricUpdate::LicenseCount { state }
            | MetricUpdate::UserCount { state }
            | MetricUpdate::SessionCount { state } => state.error().is_some(),
            MetricUpdate::DailyUsage { state, .. } => state.error().is_some(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionEvent {
    pub metrics: usize,
    pub failed: usize,
    pub duration_ms: u64,
}

/// Frames of a progressively loaded dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DashboardEvent {
    Skeleton { metrics: Vec<MetricKind> },
    MetricUpdate { update: MetricUpdate },
    Complete { completion: CompletionEvent },
}
