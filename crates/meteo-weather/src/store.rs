//! Cache and refresh controller.
//!
//! `WeatherStore` owns the last successful result, the parameters that
//! produced it and its fetch time. Requests with the same parameters inside
//! the cache window are answered from memory. With auto-refresh enabled, a
//! background task re-fetches at every local midnight of the data's timezone.
//!
//! Public methods never return errors; failures are stored and read back
//! through [`WeatherStore::error`].
//!
//! Inside a tokio runtime a fetch runs on its own task, which also writes the
//! outcome back. Dropping the `fetch_weather` future does not stop it, and a
//! panicking fetcher is stored as an error. Outside a runtime the fetcher is
//! awaited inline on the caller's executor and a panic unwinds to the caller.

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use meteo_core::WeatherConfig;
use parking_lot::{Mutex, MutexGuard};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::cache::{PersistedState, StatePersistence};
use crate::error::FetchError;
use crate::provider::{WeatherFetcher, WeatherProvider};
use crate::types::{DailyRecord, FetchParams, HourlyRecord, StructuredWeather};

/// Handle to a shared controller. Clones refer to the same state.
#[derive(Clone)]
pub struct WeatherStore {
    inner: Arc<Inner>,
}

struct Inner {
    fetcher: Arc<dyn WeatherFetcher>,
    persistence: Arc<dyn StatePersistence>,
    cache_duration: Duration,
    state: Mutex<State>,
    /// Held from snapshot to save so writes land in snapshot order.
    saving: Mutex<()>,
}

#[derive(Default)]
struct State {
    loading: bool,
    error: Option<FetchError>,
    persisted: PersistedState,
    /// Cancels the pending auto-refresh task, if any.
    timer: Option<CancellationToken>,
}

impl Inner {
    /// Snapshot the persisted state, release the state lock, then save.
    fn persist(&self, state: MutexGuard<'_, State>) {
        let snapshot = state.persisted.clone();
        let _saving = self.saving.lock();
        drop(state);

        if let Err(e) = self.persistence.save(&snapshot) {
            tracing::warn!("Failed to persist weather state: {}", e);
        }
    }

    fn is_fresh(&self, state: &PersistedState, params: &FetchParams, now: DateTime<Utc>) -> bool {
        let (Some(last_params), Some(_), Some(fetched_at)) = (
            state.last_params.as_ref(),
            state.last_result.as_ref(),
            state.last_fetch_time,
        ) else {
            return false;
        };

        if last_params != params {
            return false;
        }

        match (now - fetched_at).to_std() {
            Ok(age) => age < self.cache_duration,
            // fetched_at is in the future
            Err(_) => true,
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(token) = self.state.get_mut().timer.take() {
            token.cancel();
        }
    }
}

impl WeatherStore {
    /// Build a store, restoring any previously persisted state.
    ///
    /// If the restored state has auto-refresh enabled and a tokio runtime is
    /// running, the refresh timer is armed right away.
    pub fn new(
        fetcher: Arc<dyn WeatherFetcher>,
        persistence: Arc<dyn StatePersistence>,
        cache_duration: Duration,
    ) -> Self {
        let persisted = match persistence.load() {
            Ok(Some(state)) => {
                tracing::debug!(
                    "Restored weather state (last fetch: {:?})",
                    state.last_fetch_time
                );
                state
            }
            Ok(None) => PersistedState::default(),
            Err(e) => {
                tracing::warn!("Ignoring unreadable weather state: {}", e);
                PersistedState::default()
            }
        };
        let auto_refresh = persisted.auto_refresh;

        let store = Self {
            inner: Arc::new(Inner {
                fetcher,
                persistence,
                cache_duration,
                state: Mutex::new(State {
                    persisted,
                    ..State::default()
                }),
                saving: Mutex::new(()),
            }),
        };

        if auto_refresh {
            store.schedule_auto_refresh();
        }
        store
    }

    /// Store backed by the HTTP provider described by `config`.
    ///
    /// `auto_refresh = true` in the config enables auto-refresh; `false`
    /// leaves the persisted setting alone.
    pub fn from_config(
        config: &WeatherConfig,
        persistence: Arc<dyn StatePersistence>,
    ) -> Result<Self, FetchError> {
        let provider = WeatherProvider::from_config(config)?;
        let store = Self::new(Arc::new(provider), persistence, config.cache_duration());
        if config.auto_refresh && !store.auto_refresh_enabled() {
            store.set_auto_refresh(true);
        }
        Ok(store)
    }

    pub fn cache_duration(&self) -> Duration {
        self.inner.cache_duration
    }

    /// Fetch weather for `params`, or serve the cached result when the same
    /// parameters were fetched within the cache window.
    ///
    /// On failure the previous result is kept and the error is stored. The
    /// store settles even if this future is dropped before completion.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_weather(&self, params: &FetchParams) {
        {
            let mut state = self.inner.state.lock();
            if self.inner.is_fresh(&state.persisted, params, Utc::now()) {
                tracing::debug!("Serving cached weather");
                return;
            }
            state.loading = true;
            state.error = None;
            state.persisted.last_params = Some(params.clone());
            self.inner.persist(state);
        }

        let Ok(handle) = Handle::try_current() else {
            let outcome = self.inner.fetcher.fetch(params).await;
            self.settle(outcome);
            return;
        };

        let fetcher = Arc::clone(&self.inner.fetcher);
        let request = params.clone();
        let fetch = handle.spawn(async move { fetcher.fetch(&request).await });

        // A panicking fetcher surfaces here as a JoinError.
        let store = self.clone();
        let settle = handle.spawn(async move {
            let outcome = match fetch.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("Weather fetch task failed: {}", e);
                    Err(FetchError::unknown(format!("Weather fetch task failed: {e}")))
                }
            };
            store.settle(outcome);
        });

        if let Err(e) = settle.await {
            tracing::error!("Weather settle task failed: {}", e);
        }
    }

    /// Record the outcome of a fetch and clear `loading`.
    fn settle(&self, outcome: Result<StructuredWeather, FetchError>) {
        let mut state = self.inner.state.lock();
        state.loading = false;
        let arm_timer = match outcome {
            Ok(weather) => {
                tracing::info!(
                    "Weather updated for {}, {}",
                    weather.latitude,
                    weather.longitude
                );
                state.persisted.last_result = Some(weather);
                state.persisted.last_fetch_time = Some(Utc::now());
                state.error = None;
                state.persisted.auto_refresh && state.timer.is_none()
            }
            Err(e) => {
                tracing::warn!("Weather fetch failed: {}", e);
                state.error = Some(e);
                false
            }
        };
        self.inner.persist(state);

        if arm_timer {
            self.schedule_auto_refresh();
        }
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.lock().loading
    }

    pub fn has_error(&self) -> bool {
        self.inner.state.lock().error.is_some()
    }

    pub fn error(&self) -> Option<FetchError> {
        self.inner.state.lock().error.clone()
    }

    pub fn clear_error(&self) {
        self.inner.state.lock().error = None;
    }

    pub fn auto_refresh_enabled(&self) -> bool {
        self.inner.state.lock().persisted.auto_refresh
    }

    pub fn last_fetch_time(&self) -> Option<DateTime<Utc>> {
        self.inner.state.lock().persisted.last_fetch_time
    }

    pub fn last_params(&self) -> Option<FetchParams> {
        self.inner.state.lock().persisted.last_params.clone()
    }

    /// Turn the midnight re-fetch on or off. Enabling (re)arms the timer;
    /// disabling cancels it. Enabled before any result is stored, the timer
    /// is armed by the first successful fetch.
    pub fn set_auto_refresh(&self, enabled: bool) {
        {
            let mut state = self.inner.state.lock();
            state.persisted.auto_refresh = enabled;
            if !enabled {
                if let Some(token) = state.timer.take() {
                    token.cancel();
                    tracing::debug!("Auto-refresh cancelled");
                }
            }
            self.inner.persist(state);
        }

        if enabled {
            self.schedule_auto_refresh();
        }
    }

    /// Arm a one-shot timer for the next local midnight of the stored
    /// result's timezone, replacing any pending timer. When it fires the last
    /// parameters are fetched again and the timer re-arms itself.
    ///
    /// Does nothing until a result and its parameters are stored, or outside
    /// a tokio runtime.
    pub fn schedule_auto_refresh(&self) {
        let Ok(handle) = Handle::try_current() else {
            tracing::debug!("No async runtime; auto-refresh not armed");
            return;
        };

        let token = CancellationToken::new();
        let delay = {
            let mut state = self.inner.state.lock();
            let tz = match (&state.persisted.last_result, &state.persisted.last_params) {
                (Some(result), Some(_)) => result.tz(),
                _ => {
                    tracing::debug!("No weather fetched yet; auto-refresh not armed");
                    return;
                }
            };
            if let Some(previous) = state.timer.replace(token.clone()) {
                previous.cancel();
            }

            let now = Utc::now();
            (next_local_midnight(now, tz) - now)
                .to_std()
                .unwrap_or(Duration::ZERO)
        };

        tracing::info!("Auto-refresh scheduled in {:?}", delay);
        let weak = Arc::downgrade(&self.inner);
        handle.spawn(run_timer(weak, token, delay));
    }

    /// Cancel the pending auto-refresh timer. The flag itself is unchanged,
    /// so the next successful fetch arms a new timer while it is set.
    pub fn shutdown(&self) {
        if let Some(token) = self.inner.state.lock().timer.take() {
            token.cancel();
            tracing::debug!("Auto-refresh timer stopped");
        }
    }

    pub fn all_weather_data(&self) -> Option<StructuredWeather> {
        self.inner.state.lock().persisted.last_result.clone()
    }

    pub fn current_day_weather(&self) -> Option<DailyRecord> {
        self.read_result(|w| w.current_day().clone())
    }

    pub fn past_day_weather(&self) -> Option<Vec<DailyRecord>> {
        self.read_result(|w| w.past_days().to_vec())
    }

    pub fn forecast_weather(&self) -> Option<Vec<DailyRecord>> {
        self.read_result(|w| w.forecast().to_vec())
    }

    pub fn current_hour_weather(&self) -> Option<HourlyRecord> {
        self.current_hour_weather_at(Utc::now())
    }

    pub fn current_hour_weather_at(&self, now: DateTime<Utc>) -> Option<HourlyRecord> {
        self.inner
            .state
            .lock()
            .persisted
            .last_result
            .as_ref()
            .and_then(|w| w.hour_at(now).cloned())
    }

    fn read_result<T>(&self, read: impl FnOnce(&StructuredWeather) -> T) -> Option<T> {
        self.inner.state.lock().persisted.last_result.as_ref().map(read)
    }
}

async fn run_timer(inner: Weak<Inner>, token: CancellationToken, delay: Duration) {
    tokio::select! {
        _ = token.cancelled() => {}
        _ = tokio::time::sleep(delay) => {
            let Some(inner) = inner.upgrade() else {
                return;
            };
            let store = WeatherStore { inner };
            let Some(params) = store.last_params() else {
                return;
            };

            tracing::info!("Auto-refresh timer fired");
            store.fetch_weather(&params).await;

            if !token.is_cancelled() && store.auto_refresh_enabled() {
                store.schedule_auto_refresh();
            }
        }
    }
}

/// First instant of the next calendar day in `tz`, as UTC.
///
/// When local midnight does not exist (a DST gap), the first existing hour
/// after it is used.
pub fn next_local_midnight(now: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let fallback = now + chrono::Duration::days(1);
    let Some(tomorrow) = now.with_timezone(&tz).date_naive().succ_opt() else {
        return fallback;
    };

    (0..4)
        .find_map(|hour| {
            let time = NaiveTime::from_hms_opt(hour, 0, 0)?;
            tz.from_local_datetime(&tomorrow.and_time(time)).earliest()
        })
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or(fallback)
}
