//! Rodio file playback backend (feature "playback")
//!
//! The locator is a filesystem path to an audio file. load() reads and
//! decodes the file once to validate it and keeps the raw bytes in
//! memory; play() opens an output stream on a blocking thread, decodes
//! from the cached bytes, and blocks that thread until the sink drains
//! or stop() kills it. The output stream is not Send, so it never
//! leaves the blocking thread; only the Sink handle is shared.

use std::io::Cursor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rodio::{Decoder, OutputStream, Sink};
use tokio::sync::oneshot;
use tracing::debug;

use crate::core::audio::AudioBackend;

/// Plays a local audio file through the default output device
#[derive(Default)]
pub struct RodioBackend {
    /// Loaded-once, replayed-many file bytes
    bytes: Mutex<Option<Arc<[u8]>>>,
    /// Sink of the in-flight playback, if any
    sink: Mutex<Option<Arc<Sink>>>,
    /// Bumped on every stop(); closes the window where a stop lands
    /// between sink creation and sink publication
    stop_epoch: AtomicU64,
}

impl RodioBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AudioBackend for RodioBackend {
    async fn load(&self, locator: &str) -> Result<(), String> {
        let path = locator.to_string();
        let bytes = tokio::task::spawn_blocking(move || {
            let bytes = std::fs::read(&path).map_err(|e| format!("read {}: {}", path, e))?;
            // Validate up front so trigger-time failures are playback
            // failures, not undiagnosed format errors
            Decoder::new(Cursor::new(bytes.clone()))
                .map_err(|e| format!("decode {}: {}", path, e))?;
            Ok::<_, String>(bytes)
        })
        .await
        .map_err(|e| format!("load task failed: {}", e))??;

        debug!(size = bytes.len(), "alert sound file loaded");
        *self.bytes.lock() = Some(bytes.into());
        Ok(())
    }

    async fn play(&self) -> Result<(), String> {
        let bytes = self
            .bytes
            .lock()
            .clone()
            .ok_or_else(|| "no sound loaded".to_string())?;

        let epoch = self.stop_epoch.load(Ordering::SeqCst);
        let (sink_tx, sink_rx) = oneshot::channel::<Arc<Sink>>();

        let task = tokio::task::spawn_blocking(move || {
            let (_stream, handle) =
                OutputStream::try_default().map_err(|e| format!("output device: {}", e))?;
            let sink = Arc::new(Sink::try_new(&handle).map_err(|e| format!("sink: {}", e))?);
            let source = Decoder::new(Cursor::new(bytes.to_vec()))
                .map_err(|e| format!("decode: {}", e))?;
            let _ = sink_tx.send(sink.clone());
            sink.append(source);
            // Blocks until the source drains or stop() empties the sink
            sink.sleep_until_end();
            Ok::<_, String>(())
        });

        if let Ok(sink) = sink_rx.await {
            *self.sink.lock() = Some(sink.clone());
            // A stop may have arrived before the sink was published
            if self.stop_epoch.load(Ordering::SeqCst) != epoch {
                sink.stop();
            }
        }

        let outcome = task
            .await
            .map_err(|e| format!("play task failed: {}", e))?;
        *self.sink.lock() = None;
        outcome
    }

    fn stop(&self) {
        self.stop_epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(sink) = self.sink.lock().take() {
            sink.stop();
            debug!("playback sink stopped");
        }
    }

    fn release(&self) {
        self.stop();
        *self.bytes.lock() = None;
    }
}
