// Dashboard service - Fires the four metric fetches and tracks each one independently
use crate::application::license_repository::{FetchResult, LicenseRepository};
use crate::domain::dashboard::{CompletionEvent, DashboardEvent, DashboardSnapshot, MetricUpdate};
use crate::domain::error::FetchError;
use crate::domain::metric::{MetricKind, MetricState};
use crate::domain::usage::UsageSeries;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, watch};
use tokio::task::AbortHandle;

const STREAM_BUFFER: usize = 16;

#[derive(Clone)]
pub struct DashboardService {
    repository: Arc<dyn LicenseRepository>,
}

impl DashboardService {
    pub fn new(repository: Arc<dyn LicenseRepository>) -> Self {
        Self { repository }
    }

    /// Start a dashboard activation. All four slots begin in `Loading` and
    /// each is written by its own task, with no join between them.
    pub fn activate(&self) -> DashboardView {
        let (license_tx, license_count) = watch::channel(MetricState::Loading);
        let (user_tx, user_count) = watch::channel(MetricState::Loading);
        let (session_tx, session_count) = watch::channel(MetricState::Loading);
        let (usage_tx, daily_usage) = watch::channel(MetricState::Loading);

        let repo = self.repository.clone();
        let license_task = spawn_metric(MetricKind::LicenseCount, license_tx, async move {
            repo.license_count().await
        });

        let repo = self.repository.clone();
        let user_task = spawn_metric(MetricKind::UserCount, user_tx, async move {
            repo.user_count().await
        });

        let repo = self.repository.clone();
        let session_task = spawn_metric(MetricKind::SessionCount, session_tx, async move {
            repo.session_count().await
        });

        let repo = self.repository.clone();
        let usage_task = spawn_metric(MetricKind::DailyUsage, usage_tx, async move {
            let totals = repo.daily_usage().await?;
            Ok::<_, FetchError>(UsageSeries::from_daily_totals(&totals))
        });

        tracing::debug!("Dashboard activated, {} fetches in flight", MetricKind::ALL.len());

        DashboardView {
            license_count,
            user_count,
            session_count,
            daily_usage,
            tasks: vec![license_task, user_task, session_task, usage_task],
            activated_at: Instant::now(),
        }
    }

    /// Activate, wait for every slot to settle, then tear down
    pub async fn snapshot(&self) -> DashboardSnapshot {
        let view = self.activate();
        view.settled().await
    }

    /// Progressive loading: a skeleton, one update per metric as it settles,
    /// then a completion frame. Closing the receiver tears the activation down.
    pub fn stream_dashboard(&self) -> mpsc::Receiver<DashboardEvent> {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let view = self.activate();

        tokio::spawn(async move {
            let skeleton = DashboardEvent::Skeleton {
                metrics: MetricKind::ALL.to_vec(),
            };
            if tx.send(skeleton).await.is_err() {
                return;
            }

            let updates = async {
                tokio::join!(
                    forward(view.watch_license_count(), &tx, |state| {
                        MetricUpdate::LicenseCount { state }
                    }),
                    forward(view.watch_user_count(), &tx, |state| {
                        MetricUpdate::UserCount { state }
                    }),
                    forward(view.watch_session_count(), &tx, |state| {
                        MetricUpdate::SessionCount { state }
                    }),
                    forward(view.watch_daily_usage(), &tx, MetricUpdate::daily_usage),
                )
            };

            tokio::select! {
                (license, user, session, usage) = updates => {
                    let failed = [license, user, session, usage]
                        .into_iter()
                        .filter(|failed| *failed)
                        .count();
                    let completion = CompletionEvent {
                        metrics: MetricKind::ALL.len(),
                        failed,
                        duration_ms: view.elapsed_ms(),
                    };
                    tracing::info!(
                        "Dashboard stream complete: {} metrics, {} failed, {}ms",
                        completion.metrics, completion.failed, completion.duration_ms
                    );
                    let _ = tx.send(DashboardEvent::Complete { completion }).await;
                }
                _ = tx.closed() => {
                    tracing::debug!("Dashboard stream receiver dropped, tearing down");
                }
            }

            view.deactivate();
        });

        rx
    }
}

/// One dashboard activation. Dropping it aborts any fetch still in flight,
/// so no late result is written after teardown.
pub struct DashboardView {
    license_count: watch::Receiver<MetricState<u64>>,
    user_count: watch::Receiver<MetricState<u64>>,
    session_count: watch::Receiver<MetricState<u64>>,
    daily_usage: watch::Receiver<MetricState<UsageSeries>>,
    tasks: Vec<AbortHandle>,
    activated_at: Instant,
}

impl DashboardView {
    /// Current state of every slot, without waiting
    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot::new(
            self.license_count.borrow().clone(),
            self.user_count.borrow().clone(),
            self.session_count.borrow().clone(),
            self.daily_usage.borrow().clone(),
        )
    }

    /// Wait until each slot is Loaded or Failed. Partial failure stays partial.
    pub async fn settled(&self) -> DashboardSnapshot {
        let (license_count, user_count, session_count, daily_usage) = tokio::join!(
            wait_settled(self.watch_license_count()),
            wait_settled(self.watch_user_count()),
            wait_settled(self.watch_session_count()),
            wait_settled(self.watch_daily_usage()),
        );
        DashboardSnapshot::new(license_count, user_count, session_count, daily_usage)
    }

    pub fn watch_license_count(&self) -> watch::Receiver<MetricState<u64>> {
        self.license_count.clone()
    }

    pub fn watch_user_count(&self) -> watch::Receiver<MetricState<u64>> {
        self.user_count.clone()
    }

    pub fn watch_session_count(&self) -> watch::Receiver<MetricState<u64>> {
        self.session_count.clone()
    }

    pub fn watch_daily_usage(&self) -> watch::Receiver<MetricState<UsageSeries>> {
        self.daily_usage.clone()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.activated_at.elapsed().as_millis() as u64
    }

    pub fn deactivate(self) {}
}

impl Drop for DashboardView {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

fn spawn_metric<T, F>(metric: MetricKind, slot: watch::Sender<MetricState<T>>, fetch: F) -> AbortHandle
where
    T: Send + Sync + 'static,
    F: Future<Output = FetchResult<T>> + Send + 'static,
{
    tokio::spawn(async move {
        let result = fetch.await;
        match &result {
            Ok(_) => tracing::debug!("Fetched {}", metric),
            Err(e) => tracing::warn!("Failed to fetch {}: {}", metric, e),
        }
        slot.send_replace(result.into());
    })
    .abort_handle()
}

/// Resolves once the slot settles. If the writer is gone (aborted) the last
/// state seen is returned as-is.
async fn wait_settled<T: Clone>(mut rx: watch::Receiver<MetricState<T>>) -> MetricState<T> {
    let settled = rx
        .wait_for(|state| state.is_settled())
        .await
        .map(|state| (*state).clone());
    settled.unwrap_or_else(|_| rx.borrow().clone())
}

/// Forward one slot's settled state as a stream frame; returns whether it failed
async fn forward<T: Clone>(
    rx: watch::Receiver<MetricState<T>>,
    tx: &mpsc::Sender<DashboardEvent>,
    wrap: impl FnOnce(MetricState<T>) -> MetricUpdate,
) -> bool {
    let update = wrap(wait_settled(rx).await);
    let failed = update.is_failed();
    let _ = tx.send(DashboardEvent::MetricUpdate { update }).await;
    failed
}
