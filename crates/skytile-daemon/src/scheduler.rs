//! Boot sequence and periodic refresh scheduling
//!
//! One logical loop: a housekeeping tick drives presenter redraws and,
//! when the configured interval has elapsed, a location check followed by
//! a weather refresh. Position adoption is gated on the distance
//! threshold; the weather refresh itself is not.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{info, warn};

use skytile_core::{
    aggregate, changed_enough, distance_km, Coordinate, CurrentReading, Position, Presenter,
    WeatherSnapshot, WeatherSource,
};
use skytile_locate::Positioner;

use crate::net;

/// Boot and steady-state phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingNetwork,
    AwaitingLocation,
    AwaitingTime,
    AwaitingFirstWeather,
    Steady,
    NetworkFailed,
    LocationFailed,
}

/// Scheduler tuning knobs from configuration
pub struct Settings {
    pub update_interval: Duration,
    pub threshold_km: f64,
    pub fallback: Option<Coordinate>,
}

/// Housekeeping tick driving redraws and refresh checks
const TICK: Duration = Duration::from_secs(1);

/// Accuracy recorded when the fallback coordinate stands in for a fix
const FALLBACK_ACCURACY_M: f64 = 5_000.0;

/// System clocks before this instant have clearly not been set yet
/// (2020-01-01T00:00:00Z)
const CLOCK_SANITY_EPOCH: i64 = 1_577_836_800;
const CLOCK_RETRIES: u32 = 20;
const CLOCK_BACKOFF: Duration = Duration::from_millis(500);

pub struct Scheduler {
    positioner: Box<dyn Positioner>,
    source: Box<dyn WeatherSource>,
    presenter: Box<dyn Presenter>,
    settings: Settings,
    phase: Phase,
    position: Option<Position>,
    snapshot: Option<WeatherSnapshot>,
    last_update: Option<DateTime<Utc>>,
}

impl Scheduler {
    pub fn new(
        positioner: Box<dyn Positioner>,
        source: Box<dyn WeatherSource>,
        presenter: Box<dyn Presenter>,
        settings: Settings,
    ) -> Self {
        Self {
            positioner,
            source,
            presenter,
            settings,
            phase: Phase::AwaitingNetwork,
            position: None,
            snapshot: None,
            last_update: None,
        }
    }

    #[allow(dead_code)]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Run the boot sequence, then the steady refresh loop
    pub async fn run(&mut self) -> Result<()> {
        self.bring_up().await?;

        let mut ticker = interval(TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Steady state: refresh every {}s",
            self.settings.update_interval.as_secs()
        );

        loop {
            ticker.tick().await;
            let now = Utc::now();

            if let Err(e) = self.presenter.tick(now).await {
                warn!("Presenter tick failed: {}", e);
            }

            if self.refresh_due(now) {
                self.cycle(now).await;
            }
        }
    }

    /// Network, location fix, clock sanity, first weather fetch. Network
    /// or location failure is terminal; a failed first fetch leaves
    /// placeholder tiles and retries on the normal cadence.
    async fn bring_up(&mut self) -> Result<()> {
        self.phase = Phase::AwaitingNetwork;
        self.show("Connecting...").await;
        if !net::wait_for_network().await {
            self.phase = Phase::NetworkFailed;
            self.show("Network Failed!").await;
            return Err(anyhow!("network unreachable"));
        }

        self.phase = Phase::AwaitingLocation;
        self.show("Finding Location...").await;
        let fix = match self.positioner.lookup().await {
            Ok(position) if position.is_valid() => Some(position),
            Ok(position) => {
                warn!("Discarding fix with accuracy {}m", position.accuracy_m);
                None
            }
            Err(e) => {
                warn!("Location lookup failed: {}", e);
                None
            }
        };
        match (fix, self.settings.fallback) {
            (Some(position), _) => {
                info!(
                    "Location: {:.6}, {:.6} (accuracy {:.0}m)",
                    position.coordinate.latitude,
                    position.coordinate.longitude,
                    position.accuracy_m
                );
                self.position = Some(position);
            }
            (None, Some(coordinate)) => {
                info!(
                    "Using fallback coordinate {:.6}, {:.6}",
                    coordinate.latitude, coordinate.longitude
                );
                self.position = Some(Position {
                    coordinate,
                    accuracy_m: FALLBACK_ACCURACY_M,
                    timestamp: Utc::now(),
                });
            }
            (None, None) => {
                self.phase = Phase::LocationFailed;
                self.show("Location Failed!").await;
                return Err(anyhow!("no position fix and no fallback coordinate"));
            }
        }

        self.phase = Phase::AwaitingTime;
        self.show("Syncing Time...").await;
        if !wait_for_clock().await {
            warn!("System clock still looks unset; continuing anyway");
        }

        self.phase = Phase::AwaitingFirstWeather;
        self.show("Fetching Weather...").await;
        if let Err(e) = self.refresh(Utc::now()).await {
            // Placeholder tiles stay up until the first success; the
            // steady loop finds the refresh still due and retries
            warn!("Initial weather fetch failed: {}", e);
            self.show("Weather Fetch Failed").await;
        }

        self.phase = Phase::Steady;
        Ok(())
    }

    fn refresh_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_update {
            Some(last) => {
                (now - last).num_seconds() >= self.settings.update_interval.as_secs() as i64
            }
            None => true,
        }
    }

    /// One periodic update: re-check the location, then refresh weather
    /// for whatever coordinate is current
    async fn cycle(&mut self, now: DateTime<Utc>) {
        info!("Periodic update: checking location before weather refresh");
        match self.positioner.lookup().await {
            Ok(candidate) if candidate.is_valid() => self.consider(candidate),
            Ok(candidate) => warn!("Ignoring fix with accuracy {}m", candidate.accuracy_m),
            Err(e) => warn!("Location lookup failed: {}; keeping previous position", e),
        }

        if let Err(e) = self.refresh(now).await {
            // Previous snapshot stays on the panel; last_update is
            // untouched so the next tick retries
            warn!("Weather refresh failed: {}", e);
        }
    }

    /// Adopt a new fix only when it moved past the distance gate. The
    /// first-ever fix bypasses the gate.
    fn consider(&mut self, candidate: Position) {
        match &self.position {
            Some(previous) => {
                let distance = distance_km(previous.coordinate, candidate.coordinate);
                if changed_enough(
                    previous.coordinate,
                    candidate.coordinate,
                    self.settings.threshold_km,
                ) {
                    info!("Location moved {:.2} km; adopting new position", distance);
                    self.position = Some(candidate);
                } else {
                    info!(
                        "Location unchanged ({:.2} km); refreshing weather in place",
                        distance
                    );
                }
            }
            None => self.position = Some(candidate),
        }
    }

    /// Fetch current conditions and forecast, aggregate, publish. Either
    /// request failing aborts the whole refresh; nothing partial is
    /// adopted.
    async fn refresh(&mut self, now: DateTime<Utc>) -> Result<()> {
        let coordinate = self
            .position
            .as_ref()
            .map(|p| p.coordinate)
            .context("no position available for weather refresh")?;

        let current = self.source.current(coordinate).await?;
        let fetch = self.source.forecast(coordinate).await?;

        let summary = aggregate(&fetch.samples, fetch.utc_offset, current.temperature, now);

        let snapshot = WeatherSnapshot {
            days: summary.days,
            current: CurrentReading {
                temperature: summary.current_temp,
                ..current
            },
            fetched_at: now,
        };

        self.presenter.publish(&snapshot).await?;
        self.snapshot = Some(snapshot);
        self.last_update = Some(now);
        Ok(())
    }

    async fn show(&mut self, message: &str) {
        if let Err(e) = self.presenter.status(message).await {
            warn!("Presenter status failed: {}", e);
        }
    }
}

/// Wait for the system clock to pass a sanity epoch, like the firmware's
/// NTP wait loop. Hosted systems normally pass on the first check.
async fn wait_for_clock() -> bool {
    for _ in 0..CLOCK_RETRIES {
        if Utc::now().timestamp() >= CLOCK_SANITY_EPOCH {
            return true;
        }
        sleep(CLOCK_BACKOFF).await;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    use skytile_core::{ForecastFetch, ForecastSample};
    use skytile_locate::{LocateError, LocateResult};

    fn position(latitude: f64, longitude: f64) -> Position {
        Position {
            coordinate: Coordinate::new(latitude, longitude),
            accuracy_m: 100.0,
            timestamp: Utc::now(),
        }
    }

    struct ScriptedPositioner {
        fixes: VecDeque<LocateResult<Position>>,
    }

    impl ScriptedPositioner {
        fn new(fixes: Vec<LocateResult<Position>>) -> Self {
            Self {
                fixes: fixes.into(),
            }
        }
    }

    #[async_trait::async_trait]
    impl Positioner for ScriptedPositioner {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn lookup(&mut self) -> LocateResult<Position> {
            self.fixes
                .pop_front()
                .unwrap_or(Err(LocateError::NoFix(0.0)))
        }
    }

    struct FakeSource {
        fail: Arc<AtomicBool>,
        fetches: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl WeatherSource for FakeSource {
        async fn current(&self, _coordinate: Coordinate) -> Result<CurrentReading> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(anyhow!("provider down"));
            }
            Ok(CurrentReading {
                temperature: 72,
                condition: "clear sky".to_string(),
                city: None,
                fetched_at: Utc::now(),
            })
        }

        async fn forecast(&self, _coordinate: Coordinate) -> Result<ForecastFetch> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(anyhow!("provider down"));
            }
            Ok(ForecastFetch {
                utc_offset: 0,
                samples: vec![ForecastSample {
                    timestamp: Utc::now().timestamp(),
                    temperature: 70.0,
                    humidity: 40,
                    condition: "clear sky".to_string(),
                }],
            })
        }
    }

    struct RecordingPresenter {
        published: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl Presenter for RecordingPresenter {
        async fn status(&mut self, _message: &str) -> Result<()> {
            Ok(())
        }

        async fn publish(&mut self, _snapshot: &WeatherSnapshot) -> Result<()> {
            self.published.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Harness {
        scheduler: Scheduler,
        fail: Arc<AtomicBool>,
        fetches: Arc<AtomicUsize>,
        published: Arc<AtomicUsize>,
    }

    fn harness(fixes: Vec<LocateResult<Position>>) -> Harness {
        let fail = Arc::new(AtomicBool::new(false));
        let fetches = Arc::new(AtomicUsize::new(0));
        let published = Arc::new(AtomicUsize::new(0));

        let scheduler = Scheduler::new(
            Box::new(ScriptedPositioner::new(fixes)),
            Box::new(FakeSource {
                fail: fail.clone(),
                fetches: fetches.clone(),
            }),
            Box::new(RecordingPresenter {
                published: published.clone(),
            }),
            Settings {
                update_interval: Duration::from_secs(1800),
                threshold_km: 5.0,
                fallback: None,
            },
        );

        Harness {
            scheduler,
            fail,
            fetches,
            published,
        }
    }

    #[tokio::test]
    async fn test_first_fix_bypasses_gate() {
        let mut h = harness(vec![Ok(position(47.6, -117.4))]);

        h.scheduler.cycle(Utc::now()).await;

        let adopted = h.scheduler.position.as_ref().unwrap();
        assert_eq!(adopted.coordinate, Coordinate::new(47.6, -117.4));
    }

    #[tokio::test]
    async fn test_unchanged_fix_still_refreshes_weather() {
        let mut h = harness(vec![Ok(position(47.6001, -117.4001))]);
        h.scheduler.position = Some(position(47.6, -117.4));

        h.scheduler.cycle(Utc::now()).await;

        // Coordinate kept, but both provider round-trips still happened
        let kept = h.scheduler.position.as_ref().unwrap();
        assert_eq!(kept.coordinate, Coordinate::new(47.6, -117.4));
        assert_eq!(h.fetches.load(Ordering::SeqCst), 2);
        assert_eq!(h.published.load(Ordering::SeqCst), 1);
        assert!(h.scheduler.last_update.is_some());
    }

    #[tokio::test]
    async fn test_distant_fix_is_adopted() {
        let mut h = harness(vec![Ok(position(48.0, -117.4))]);
        h.scheduler.position = Some(position(47.6, -117.4));

        h.scheduler.cycle(Utc::now()).await;

        let adopted = h.scheduler.position.as_ref().unwrap();
        assert_eq!(adopted.coordinate, Coordinate::new(48.0, -117.4));
        assert_eq!(h.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_lookup_keeps_position_and_refreshes() {
        let mut h = harness(vec![Err(LocateError::Timeout)]);
        h.scheduler.position = Some(position(47.6, -117.4));

        h.scheduler.cycle(Utc::now()).await;

        assert!(h.scheduler.position.is_some());
        assert_eq!(h.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_snapshot_and_cadence() {
        let mut h = harness(vec![
            Ok(position(47.6, -117.4)),
            Ok(position(47.6, -117.4)),
        ]);

        let first = Utc::now();
        h.scheduler.cycle(first).await;
        assert!(h.scheduler.snapshot.is_some());
        assert_eq!(h.scheduler.last_update, Some(first));
        let before = h.scheduler.snapshot.clone();

        h.fail.store(true, Ordering::SeqCst);
        let second = first + chrono::Duration::seconds(1800);
        h.scheduler.cycle(second).await;

        assert_eq!(h.scheduler.snapshot, before);
        assert_eq!(h.scheduler.last_update, Some(first));
        assert_eq!(h.published.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_due_respects_interval() {
        let h = harness(vec![]);
        let now = Utc::now();

        assert!(h.scheduler.refresh_due(now));

        let mut h = harness(vec![]);
        h.scheduler.last_update = Some(now);
        assert!(!h.scheduler.refresh_due(now + chrono::Duration::seconds(10)));
        assert!(h.scheduler.refresh_due(now + chrono::Duration::seconds(1800)));
    }

    #[tokio::test]
    async fn test_refresh_without_position_fails() {
        let mut h = harness(vec![]);
        assert!(h.scheduler.refresh(Utc::now()).await.is_err());
        assert_eq!(h.published.load(Ordering::SeqCst), 0);
    }
}
