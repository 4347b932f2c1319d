//! Audio alert controller: load/ready/play/stop lifecycle
//!
//! State transitions are synchronous and immediately observable; the
//! actual load and playback work runs on spawned tasks. A generation
//! counter invalidates in-flight work on stop() and release(), so no
//! sound outlives a stop command and stale completions never clobber
//! newer state.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::types::{MonitorError, ResourceState};

/// How long the terminal bell counts as "playing" (milliseconds)
const BELL_AUDIBLE_MS: u64 = 400;

/// Playback backend contract. The controller depends only on this
/// shape; real audio output, the terminal bell, and test doubles all
/// fit behind it.
#[async_trait]
pub trait AudioBackend: Send + Sync {
    /// Load the resource named by an opaque locator
    async fn load(&self, locator: &str) -> Result<(), String>;

    /// Play the loaded resource through to completion
    async fn play(&self) -> Result<(), String>;

    /// Halt any audible playback. Must return quickly.
    fn stop(&self);

    /// Release the underlying resource
    fn release(&self);
}

/// Result of a trigger command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Playback was started
    Started,
    /// Resource not ready; nothing played
    NotReady(ResourceState),
}

#[derive(Debug)]
struct AudioInner {
    state: ResourceState,
    /// Bumped on every trigger/stop/release; in-flight tasks compare
    /// against it and discard themselves when stale
    generation: u64,
    playback_failures: u64,
}

/// Handle to the alert sound resource. Clones share one resource.
#[derive(Clone)]
pub struct AudioController {
    backend: Arc<dyn AudioBackend>,
    inner: Arc<Mutex<AudioInner>>,
}

impl std::fmt::Debug for AudioController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("AudioController")
            .field("state", &inner.state)
            .field("generation", &inner.generation)
            .finish()
    }
}

impl AudioController {
    /// Create a controller over a backend. Starts UNLOADED.
    pub fn new(backend: Arc<dyn AudioBackend>) -> Self {
        Self {
            backend,
            inner: Arc::new(Mutex::new(AudioInner {
                state: ResourceState::Unloaded,
                generation: 0,
                playback_failures: 0,
            })),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ResourceState {
        self.inner.lock().state.clone()
    }

    /// Playback attempts that failed since construction
    pub fn playback_failures(&self) -> u64 {
        self.inner.lock().playback_failures
    }

    /// Kick a load. The LOADING transition is observable when this
    /// returns; the outcome lands on the returned task. Loads are
    /// never retried automatically - a FAILED resource stays failed
    /// until someone calls preload again.
    pub fn preload(&self, locator: &str) -> JoinHandle<Result<(), MonitorError>> {
        let generation = {
            let mut inner = self.inner.lock();
            let loadable = matches!(
                inner.state,
                ResourceState::Unloaded | ResourceState::Failed(_)
            );
            if !loadable {
                debug!(state = %inner.state, "preload skipped");
                return tokio::spawn(async { Ok(()) });
            }
            inner.generation += 1;
            inner.state = ResourceState::Loading;
            inner.generation
        };

        debug!(locator, "loading alert sound");
        let controller = self.clone();
        let locator = locator.to_string();
        tokio::spawn(async move { controller.run_load(generation, &locator).await })
    }

    async fn run_load(self, generation: u64, locator: &str) -> Result<(), MonitorError> {
        let result = self.backend.load(locator).await;

        let mut inner = self.inner.lock();
        if inner.generation == generation {
            match &result {
                Ok(()) => {
                    inner.state = ResourceState::Ready;
                    info!("alert sound ready");
                }
                Err(reason) => {
                    inner.state = ResourceState::Failed(reason.clone());
                    warn!(%reason, "alert sound failed to load");
                }
            }
        }
        result.map_err(MonitorError::AudioLoadFailed)
    }

    /// Begin playback. Synchronous and non-blocking; the playing
    /// itself runs on a spawned task. No-op unless READY or PLAYING.
    /// When already PLAYING the current sound is stopped first so the
    /// alert restarts cleanly instead of overlapping.
    pub fn trigger(&self) -> TriggerOutcome {
        let mut inner = self.inner.lock();
        if !inner.state.is_ready() {
            warn!(state = %inner.state, "trigger ignored; alert sound not ready");
            return TriggerOutcome::NotReady(inner.state.clone());
        }

        if inner.state == ResourceState::Playing {
            self.backend.stop();
        }
        inner.generation += 1;
        inner.state = ResourceState::Playing;
        let generation = inner.generation;
        drop(inner);

        let controller = self.clone();
        tokio::spawn(controller.run_playback(generation));
        TriggerOutcome::Started
    }

    async fn run_playback(self, generation: u64) {
        // A stop or release may have raced ahead of this task
        {
            let inner = self.inner.lock();
            if inner.generation != generation {
                return;
            }
        }

        let result = self.backend.play().await;

        let mut inner = self.inner.lock();
        if inner.generation != generation {
            return;
        }
        // Completion returns to READY whether playback succeeded or
        // not; the resource itself is presumed still loaded
        inner.state = ResourceState::Ready;
        if let Err(reason) = result {
            inner.playback_failures += 1;
            warn!(%reason, "alert playback failed");
        }
    }

    /// Halt playback. No sound continues after this returns. No-op
    /// unless PLAYING.
    pub fn stop(&self) {
        let mut inner = self.inner.lock();
        if inner.state == ResourceState::Playing {
            inner.generation += 1;
            inner.state = ResourceState::Ready;
            self.backend.stop();
            debug!("playback stopped");
        }
    }

    /// Release the underlying resource. Valid from any state and safe
    /// to call more than once; later commands see UNLOADED and must go
    /// through preload from scratch.
    pub fn release(&self) {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        if inner.state == ResourceState::Playing {
            self.backend.stop();
        }
        self.backend.release();
        inner.state = ResourceState::Unloaded;
        debug!("alert sound released");
    }
}

/// Terminal-bell backend: "playback" is the ASCII BEL character.
/// Loads instantly and works wherever a terminal does, which makes it
/// the default for the CLI.
#[derive(Debug, Default)]
pub struct BellBackend;

#[async_trait]
impl AudioBackend for BellBackend {
    async fn load(&self, _locator: &str) -> Result<(), String> {
        Ok(())
    }

    async fn play(&self) -> Result<(), String> {
        use std::io::Write;
        print!("\x07");
        let _ = std::io::stdout().flush();
        // Hold PLAYING long enough to be observable
        tokio::time::sleep(std::time::Duration::from_millis(BELL_AUDIBLE_MS)).await;
        Ok(())
    }

    fn stop(&self) {}

    fn release(&self) {}
}

// =============================================================================
// TESTS
// =============================================================================


#[cfg(test)]
mod tests {
    use super::testing::MockBackend;
    use super::*;
    use std::sync::atomic::Ordering;
    use tokio::task::yield_now;
    use tokio::time::{advance, Duration};

    async fn ready_controller() -> (AudioController, Arc<MockBackend>) {
        let backend = MockBackend::new();
        let controller = AudioController::new(backend.clone());
        controller
            .preload("mock://alert")
            .await
            .unwrap()
            .unwrap();
        (controller, backend)
    }

    #[test]
    fn test_initial_state_is_unloaded() {
        let controller = AudioController::new(MockBackend::new());
        assert_eq!(controller.state(), ResourceState::Unloaded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_preload_success_reaches_ready() {
        let (controller, backend) = ready_controller().await;
        assert_eq!(controller.state(), ResourceState::Ready);
        assert_eq!(backend.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_is_observable_before_completion() {
        let backend = MockBackend::new();
        backend.load_delay_ms.store(500, Ordering::SeqCst);
        let controller = AudioController::new(backend.clone());

        let task = controller.preload("mock://alert");
        assert_eq!(controller.state(), ResourceState::Loading);

        advance(Duration::from_millis(600)).await;
        task.await.unwrap().unwrap();
        assert_eq!(controller.state(), ResourceState::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_preload_failure_reaches_failed() {
        let backend = MockBackend::failing("404 not found");
        let controller = AudioController::new(backend.clone());

        let result = controller.preload("mock://alert").await.unwrap();
        assert_eq!(
            result,
            Err(MonitorError::AudioLoadFailed("404 not found".to_string()))
        );
        assert_eq!(
            controller.state(),
            ResourceState::Failed("404 not found".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_load_is_not_retried_automatically() {
        let backend = MockBackend::failing("unreachable");
        let controller = AudioController::new(backend.clone());

        let _ = controller.preload("mock://alert").await.unwrap();
        yield_now().await;
        assert_eq!(backend.loads.load(Ordering::SeqCst), 1);
        assert!(matches!(controller.state(), ResourceState::Failed(_)));

        // An explicit preload from FAILED does retry
        backend.set_load_result(Ok(()));
        controller.preload("mock://alert").await.unwrap().unwrap();
        assert_eq!(backend.loads.load(Ordering::SeqCst), 2);
        assert_eq!(controller.state(), ResourceState::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_preload_skipped_when_already_ready() {
        let (controller, backend) = ready_controller().await;

        controller.preload("mock://alert").await.unwrap().unwrap();
        assert_eq!(backend.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_before_load_is_a_noop() {
        let backend = MockBackend::new();
        let controller = AudioController::new(backend.clone());

        let outcome = controller.trigger();
        assert_eq!(outcome, TriggerOutcome::NotReady(ResourceState::Unloaded));
        yield_now().await;
        assert_eq!(backend.plays.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_transitions_to_playing_synchronously() {
        let (controller, _backend) = ready_controller().await;

        assert_eq!(controller.trigger(), TriggerOutcome::Started);
        // Observable before the playback task has run at all
        assert_eq!(controller.state(), ResourceState::Playing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_playback_completion_returns_to_ready() {
        let (controller, backend) = ready_controller().await;

        controller.trigger();
        yield_now().await;
        assert!(backend.audible.load(Ordering::SeqCst));

        advance(Duration::from_millis(150)).await;
        yield_now().await;
        assert_eq!(controller.state(), ResourceState::Ready);
        assert!(!backend.audible.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_playback_failure_keeps_ready() {
        let (controller, backend) = ready_controller().await;
        backend.set_play_result(Err("device glitch".to_string()));

        controller.trigger();
        yield_now().await;
        advance(Duration::from_millis(150)).await;
        yield_now().await;

        assert_eq!(controller.state(), ResourceState::Ready);
        assert_eq!(controller.playback_failures(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_playing() {
        let (controller, backend) = ready_controller().await;

        controller.trigger();
        yield_now().await;
        assert!(backend.audible.load(Ordering::SeqCst));

        controller.stop();
        assert_eq!(controller.state(), ResourceState::Ready);
        assert!(!backend.audible.load(Ordering::SeqCst));

        // The superseded playback task must not clobber state later
        advance(Duration::from_millis(150)).await;
        yield_now().await;
        assert_eq!(controller.state(), ResourceState::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_before_playback_task_runs_kills_it() {
        let (controller, backend) = ready_controller().await;

        controller.trigger();
        // Stop races ahead of the spawned task
        controller.stop();

        yield_now().await;
        advance(Duration::from_millis(200)).await;
        yield_now().await;

        assert_eq!(backend.plays.load(Ordering::SeqCst), 0);
        assert!(!backend.audible.load(Ordering::SeqCst));
        assert_eq!(controller.state(), ResourceState::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_when_not_playing_is_a_noop() {
        let (controller, backend) = ready_controller().await;

        controller.stop();
        assert_eq!(controller.state(), ResourceState::Ready);
        assert_eq!(backend.stops.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retrigger_restarts_playback() {
        let (controller, backend) = ready_controller().await;

        controller.trigger();
        yield_now().await;
        assert_eq!(backend.plays.load(Ordering::SeqCst), 1);

        // Second trigger while PLAYING stops the first sound
        assert_eq!(controller.trigger(), TriggerOutcome::Started);
        assert_eq!(backend.stops.load(Ordering::SeqCst), 1);
        yield_now().await;
        assert_eq!(backend.plays.load(Ordering::SeqCst), 2);
        assert_eq!(controller.state(), ResourceState::Playing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_from_playing() {
        let (controller, backend) = ready_controller().await;

        controller.trigger();
        yield_now().await;
        controller.release();

        assert_eq!(controller.state(), ResourceState::Unloaded);
        assert_eq!(backend.releases.load(Ordering::SeqCst), 1);
        assert!(!backend.audible.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_twice_then_reload() {
        let (controller, backend) = ready_controller().await;

        controller.release();
        controller.release();
        assert_eq!(controller.state(), ResourceState::Unloaded);
        assert_eq!(backend.releases.load(Ordering::SeqCst), 2);

        // Post-release commands re-enter the lifecycle from scratch
        controller.preload("mock://alert").await.unwrap().unwrap();
        assert_eq!(controller.state(), ResourceState::Ready);
        assert_eq!(backend.loads.load(Ordering::SeqCst), 2);
    }
}
