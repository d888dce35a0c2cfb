//! Status Poller
//!
//! Two independent loops share one [`MonitorState`]:
//!
//! ```text
//! fetch loop (≈30 s)                 trigger loop (≈0.5 s)
//! ──────────────────                 ─────────────────────
//! source.fetch() ──retry/backoff──┐  triggers.check_and_consume(kind)
//!                                 │        │
//!                                 ▼        ▼
//!                     MonitorState::apply_poll / inject
//!                                 │
//!                                 └──► optional JSON export
//! ```
//!
//! A slow or failing fetch never delays manual triggers. A cycle that
//! exhausts its retries is logged and leaves the state untouched; the next
//! tick starts fresh.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::ConfigError;
use crate::error::PollError;
use crate::events::AnimationKind;
use crate::export::HostExporter;
use crate::host::{HostObservation, HostState};
use crate::shutdown::ShutdownSignal;
use crate::source::StatusSource;
use crate::state::{MonitorState, PollSummary};
use crate::theme::SharedTheme;
use crate::triggers::TriggerSource;

// ============================================================================
// Configuration
// ============================================================================

/// Retry behavior within one poll cycle
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Attempts per cycle, including the first
    pub max_attempts: u32,
    /// Wait after the first failure
    pub initial_backoff: Duration,
    /// Growth factor between consecutive waits
    pub multiplier: f64,
    /// Upper bound for any single wait
    pub max_backoff: Duration,
}

/// Most attempts a single cycle may make
pub const MAX_ATTEMPTS_LIMIT: u32 = 10;

/// Largest accepted backoff growth factor
pub const MAX_MULTIPLIER: f64 = 10.0;

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
            multiplier: 2.0,
            max_backoff: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Wait before retrying after failed attempt number `attempt` (0-based)
    ///
    /// Saturates at `max_backoff`, including when the product overflows.
    #[must_use]
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.initial_backoff.as_secs_f64() * self.multiplier.powi(exponent);
        Duration::try_from_secs_f64(secs)
            .map_or(self.max_backoff, |wait| wait.min(self.max_backoff))
    }
}

/// Poller timing
#[derive(Clone, Debug, PartialEq)]
pub struct PollerConfig {
    /// Time between fetch cycles
    pub fetch_interval: Duration,
    /// Time between trigger checks
    pub trigger_interval: Duration,
    /// Retry behavior within a fetch cycle
    pub retry: RetryPolicy,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            fetch_interval: Duration::from_secs(30),
            trigger_interval: Duration::from_millis(500),
            retry: RetryPolicy::default(),
        }
    }
}

impl PollerConfig {
    /// Check the timing values
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for zero intervals, attempts
    /// outside `1..=MAX_ATTEMPTS_LIMIT`, a multiplier outside
    /// `1.0..=MAX_MULTIPLIER`, or a backoff cap below the initial backoff.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch_interval.is_zero() {
            return Err(ConfigError::ValidationError(
                "poller.interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.trigger_interval.is_zero() {
            return Err(ConfigError::ValidationError(
                "poller.trigger_interval_ms must be greater than zero".to_string(),
            ));
        }
        if !(1..=MAX_ATTEMPTS_LIMIT).contains(&self.retry.max_attempts) {
            return Err(ConfigError::ValidationError(format!(
                "poller.max_attempts must be between 1 and {MAX_ATTEMPTS_LIMIT} (got {})",
                self.retry.max_attempts
            )));
        }
        if !(1.0..=MAX_MULTIPLIER).contains(&self.retry.multiplier) {
            return Err(ConfigError::ValidationError(format!(
                "poller.backoff_multiplier must be between 1.0 and {MAX_MULTIPLIER} (got {})",
                self.retry.multiplier
            )));
        }
        if self.retry.max_backoff.is_zero() || self.retry.initial_backoff > self.retry.max_backoff {
            return Err(ConfigError::ValidationError(format!(
                "poller.max_backoff_ms must be non-zero and at least initial_backoff_ms (got {:?} < {:?})",
                self.retry.max_backoff, self.retry.initial_backoff
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Poller
// ============================================================================

/// Outcome of one successful poll cycle
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollReport {
    /// Attempts it took to get a response
    pub attempts: u32,
    /// State changes applied
    pub summary: PollSummary,
}

/// Drives fetching, diffing and manual triggers
pub struct StatusPoller {
    source: Arc<dyn StatusSource>,
    triggers: Arc<dyn TriggerSource>,
    state: Arc<MonitorState>,
    config: PollerConfig,
    theme: Option<SharedTheme>,
    exporter: Option<HostExporter>,
    cycles: AtomicU64,
    failures: AtomicU64,
}

impl StatusPoller {
    /// Create a poller
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `config` is invalid.
    pub fn new(
        source: Arc<dyn StatusSource>,
        triggers: Arc<dyn TriggerSource>,
        state: Arc<MonitorState>,
        config: PollerConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            source,
            triggers,
            state,
            config,
            theme: None,
            exporter: None,
            cycles: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        })
    }

    /// Apply theme requests from the trigger source to `theme`
    #[must_use]
    pub fn with_theme(mut self, theme: SharedTheme) -> Self {
        self.theme = Some(theme);
        self
    }

    /// Export the host list after every successful cycle
    #[must_use]
    pub fn with_exporter(mut self, exporter: HostExporter) -> Self {
        self.exporter = Some(exporter);
        self
    }

    /// Shared state this poller writes to
    #[must_use]
    pub fn state(&self) -> &Arc<MonitorState> {
        &self.state
    }

    /// Completed fetch cycles, successful or not
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    /// Fetch cycles that exhausted their retries
    #[must_use]
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Run a single fetch cycle with retries and apply the result
    ///
    /// # Errors
    ///
    /// Returns [`PollError::Exhausted`] if every attempt failed. The shared
    /// state is not modified in that case.
    pub async fn poll_once(&self) -> Result<PollReport, PollError> {
        self.poll_cycle(None).await
    }

    async fn poll_cycle(&self, shutdown: Option<&ShutdownSignal>) -> Result<PollReport, PollError> {
        let result = self.fetch_with_retry(shutdown).await;
        self.cycles.fetch_add(1, Ordering::Relaxed);

        let (hosts, attempts) = match result {
            Ok(ok) => ok,
            Err(e) => {
                if matches!(e, PollError::Exhausted { .. }) {
                    self.failures.fetch_add(1, Ordering::Relaxed);
                }
                return Err(e);
            }
        };

        let summary = self.state.apply_poll(hosts, Instant::now());

        if summary.new_events.is_empty() {
            tracing::debug!(hosts = summary.hosts, swept = summary.swept, "Poll applied");
        } else {
            tracing::info!(
                hosts = summary.hosts,
                events = ?summary.new_events,
                swept = summary.swept,
                "Poll applied with transitions"
            );
        }

        if let Some(ref exporter) = self.exporter {
            if let Err(e) = exporter.write(&self.state.export()) {
                tracing::warn!(path = %exporter.path().display(), error = %e, "Host export failed");
            }
        }

        Ok(PollReport { attempts, summary })
    }

    async fn fetch_with_retry(
        &self,
        shutdown: Option<&ShutdownSignal>,
    ) -> Result<(Vec<HostObservation>, u32), PollError> {
        let max_attempts = self.config.retry.max_attempts;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let error = match self.source.fetch().await {
                Ok(hosts) => return Ok((hosts, attempt)),
                Err(e) => e,
            };

            if attempt >= max_attempts {
                return Err(PollError::Exhausted {
                    attempts: attempt,
                    last: error,
                });
            }

            let backoff = self.config.retry.backoff_for_attempt(attempt - 1);
            tracing::warn!(
                source = self.source.name(),
                attempt,
                max_attempts,
                backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
                error = %error,
                "Status fetch failed, retrying"
            );

            match shutdown {
                Some(signal) => {
                    tokio::select! {
                        () = tokio::time::sleep(backoff) => {}
                        () = signal.wait() => return Err(PollError::Cancelled),
                    }
                }
                None => tokio::time::sleep(backoff).await,
            }
        }
    }

    /// Consume pending manual triggers and apply them
    ///
    /// Returns the kinds that produced an event.
    pub fn check_triggers(&self) -> Vec<AnimationKind> {
        let now = Instant::now();
        let mut fired = Vec::new();

        for kind in AnimationKind::ALL {
            if !self.triggers.check_and_consume(kind) {
                continue;
            }
            match self.state.inject(kind, now) {
                Some(host) => {
                    tracing::info!(kind = %kind, host = %host, "Manual trigger fired");
                    fired.push(kind);
                }
                None => tracing::warn!(kind = %kind, "Manual trigger ignored, no hosts known yet"),
            }
        }

        if let Some(name) = self.triggers.take_theme_request() {
            match self.theme {
                Some(ref theme) => {
                    theme.set_builtin(&name);
                }
                None => tracing::warn!(theme = %name, "Theme request ignored, theme is fixed"),
            }
        }

        if self.triggers.take_hostlist_request() {
            self.log_host_list();
        }

        fired
    }

    fn log_host_list(&self) {
        let hosts = self.state.host_snapshot();
        let count = |state: HostState| hosts.iter().filter(|h| h.state == state).count();

        for host in &hosts {
            tracing::info!(
                cell = host.cell_index,
                state = %host.state,
                priority = host.priority,
                host = %host.name,
                "Host"
            );
        }
        tracing::info!(
            total = hosts.len(),
            ok = count(HostState::Ok),
            warn = count(HostState::Warn),
            crit = count(HostState::Crit),
            unknown = count(HostState::Unknown),
            "Host list"
        );
    }

    /// Run both loops until shutdown is requested
    pub async fn run(&self, shutdown: ShutdownSignal) {
        tracing::info!(
            source = self.source.name(),
            interval_secs = self.config.fetch_interval.as_secs(),
            trigger_interval_ms = u64::try_from(self.config.trigger_interval.as_millis()).unwrap_or(u64::MAX),
            max_attempts = self.config.retry.max_attempts,
            "Starting status poller"
        );

        tokio::join!(self.fetch_loop(&shutdown), self.trigger_loop(&shutdown));

        tracing::info!(
            cycles = self.cycles(),
            failures = self.failures(),
            "Status poller stopped"
        );
    }

    async fn fetch_loop(&self, shutdown: &ShutdownSignal) {
        let mut interval = tokio::time::interval(self.config.fetch_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                () = shutdown.wait() => break,
            }
            if shutdown.is_requested() {
                break;
            }

            match self.poll_cycle(Some(shutdown)).await {
                Ok(_) => {}
                Err(PollError::Cancelled) => break,
                Err(e) => tracing::error!(error = %e, "Status poll cycle failed"),
            }
        }
    }

    async fn trigger_loop(&self, shutdown: &ShutdownSignal) {
        let mut interval = tokio::time::interval(self.config.trigger_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                () = shutdown.wait() => break,
            }
            if shutdown.is_requested() {
                break;
            }
            self.check_triggers();
        }
    }
}

impl std::fmt::Debug for StatusPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusPoller")
            .field("source", &self.source.name())
            .field("config", &self.config)
            .field("cycles", &self.cycles())
            .field("failures", &self.failures())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::triggers::MemoryTriggers;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicU32;

    /// Fails the first `failures` calls, then returns `hosts`
    struct FlakySource {
        failures: u32,
        calls: AtomicU32,
        hosts: Vec<HostObservation>,
    }

    #[async_trait]
    impl StatusSource for FlakySource {
        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn fetch(&self) -> Result<Vec<HostObservation>, TransportError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(TransportError::Unavailable(format!("call {call}")))
            } else {
                Ok(self.hosts.clone())
            }
        }
    }

    fn fast_config() -> PollerConfig {
        PollerConfig {
            fetch_interval: Duration::from_millis(20),
            trigger_interval: Duration::from_millis(5),
            retry: RetryPolicy {
                max_attempts: 3,
                initial_backoff: Duration::from_millis(1),
                multiplier: 2.0,
                ..RetryPolicy::default()
            },
        }
    }

    fn poller(failures: u32) -> (StatusPoller, Arc<FlakySource>, Arc<MemoryTriggers>) {
        let source = Arc::new(FlakySource {
            failures,
            calls: AtomicU32::new(0),
            hosts: vec![HostObservation::new("srv", HostState::Ok)],
        });
        let triggers = Arc::new(MemoryTriggers::new());
        let poller = StatusPoller::new(
            source.clone(),
            triggers.clone(),
            Arc::new(MonitorState::new()),
            fast_config(),
        )
        .unwrap();
        (poller, source, triggers)
    }

    #[test]
    fn test_backoff_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_for_attempt(0), Duration::from_secs(1));
        assert_eq!(policy.backoff_for_attempt(1), Duration::from_secs(2));
        assert_eq!(policy.backoff_for_attempt(2), Duration::from_secs(4));
    }

    #[test]
    fn test_backoff_saturates_at_cap() {
        let policy = RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(1),
            multiplier: 1e30,
            max_backoff: Duration::from_secs(60),
        };
        assert_eq!(policy.backoff_for_attempt(0), Duration::from_millis(1));
        assert_eq!(policy.backoff_for_attempt(1), Duration::from_secs(60));
        assert_eq!(policy.backoff_for_attempt(2), Duration::from_secs(60));
        assert_eq!(policy.backoff_for_attempt(u32::MAX), Duration::from_secs(60));

        let doubling = RetryPolicy::default();
        assert_eq!(doubling.backoff_for_attempt(65), Duration::from_secs(60));
        assert_eq!(doubling.backoff_for_attempt(5000), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_huge_multiplier_is_rejected_not_fatal() {
        let mut config = fast_config();
        config.retry.multiplier = 1e30;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));

        // Even an unvalidated policy only exhausts the cycle
        let source = Arc::new(FlakySource {
            failures: u32::MAX,
            calls: AtomicU32::new(0),
            hosts: Vec::new(),
        });
        let poller = StatusPoller {
            source: source.clone(),
            triggers: Arc::new(MemoryTriggers::new()),
            state: Arc::new(MonitorState::new()),
            config: PollerConfig {
                retry: RetryPolicy {
                    max_attempts: 3,
                    initial_backoff: Duration::from_millis(1),
                    multiplier: 1e30,
                    max_backoff: Duration::from_millis(5),
                },
                ..fast_config()
            },
            theme: None,
            exporter: None,
            cycles: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        };

        let result = tokio::spawn(async move { poller.poll_once().await })
            .await
            .expect("poll cycle must not panic");
        assert!(matches!(result, Err(PollError::Exhausted { attempts: 3, .. })));
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_config_validation() {
        assert!(PollerConfig::default().validate().is_ok());

        let mut config = PollerConfig::default();
        config.retry.max_attempts = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));

        let mut config = PollerConfig::default();
        config.fetch_interval = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = PollerConfig::default();
        config.retry.multiplier = 0.5;
        assert!(config.validate().is_err());

        let mut config = PollerConfig::default();
        config.retry.max_attempts = MAX_ATTEMPTS_LIMIT + 1;
        assert!(config.validate().is_err());

        let mut config = PollerConfig::default();
        config.retry.max_backoff = Duration::from_millis(10);
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_retry_recovers_within_cycle() {
        let (poller, source, _) = poller(2);
        let report = poller.poll_once().await.unwrap();
        assert_eq!(report.attempts, 3);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        assert_eq!(poller.state().host_snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_cycle_leaves_state_untouched() {
        let (poller, source, _) = poller(10);
        let err = poller.poll_once().await.unwrap_err();
        assert!(matches!(err, PollError::Exhausted { attempts: 3, .. }));
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        assert!(poller.state().host_snapshot().is_empty());
        assert_eq!(poller.failures(), 1);
    }

    #[tokio::test]
    async fn test_triggers_are_consumed_once() {
        let (poller, _, triggers) = poller(0);
        poller.poll_once().await.unwrap();

        triggers.fire(AnimationKind::Warning);
        assert_eq!(poller.check_triggers(), vec![AnimationKind::Warning]);
        assert!(poller.check_triggers().is_empty());
        assert_eq!(poller.state().event_count(), 1);
    }

    #[tokio::test]
    async fn test_theme_request_applies_to_shared_theme() {
        let (poller, _, triggers) = poller(0);
        let theme = SharedTheme::default();
        let poller = poller.with_theme(theme.clone());

        triggers.request_theme("ocean");
        poller.check_triggers();
        assert_eq!(theme.name(), "ocean");
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let (poller, source, _) = poller(0);
        let poller = Arc::new(poller);
        let shutdown = ShutdownSignal::new();

        let task = {
            let poller = Arc::clone(&poller);
            let shutdown = shutdown.clone();
            tokio::spawn(async move { poller.run(shutdown).await })
        };

        tokio::time::sleep(Duration::from_millis(60)).await;
        shutdown.request();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("poller should stop")
            .unwrap();

        assert!(source.calls.load(Ordering::SeqCst) >= 1);
        assert!(poller.cycles() >= 1);
    }
}
