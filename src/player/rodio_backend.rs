//! `rodio` implementation of the audio-session capability.
//!
//! Each session owns one `Sink` on the shared output stream plus a ticker
//! thread that samples it and sends `StatusEvent`s to the controller.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use lofty::prelude::AudioFile;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tracing::debug;

use crate::error::PlayerError;

use super::backend::{AudioBackend, AudioSession, SessionId, SessionStatus, StatusEvent};

pub struct RodioBackend {
    stream: OutputStream,
    status_tx: Sender<StatusEvent>,
    status_interval: Duration,
}

impl RodioBackend {
    /// Open the default output device.
    pub fn new(status_tx: Sender<StatusEvent>, status_interval: Duration) -> Result<Self, PlayerError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| PlayerError::AudioOutput(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped, which garbles the TUI.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            status_tx,
            status_interval,
        })
    }
}

impl AudioBackend for RodioBackend {
    type Session = RodioSession;

    fn create(
        &mut self,
        id: SessionId,
        locator: &str,
        autoplay: bool,
    ) -> Result<RodioSession, PlayerError> {
        let path = locator_path(locator);
        let source = open_source(&path).map_err(|reason| PlayerError::MediaLoad {
            locator: locator.to_string(),
            reason,
        })?;

        let duration = source
            .total_duration()
            .or_else(|| probe_duration(&path))
            .unwrap_or(Duration::ZERO);

        let sink = Sink::connect_new(self.stream.mixer());
        if !autoplay {
            sink.pause();
        }
        sink.append(source);

        let sink = Arc::new(sink);
        let released = Arc::new(AtomicBool::new(false));
        spawn_status_ticker(
            id,
            sink.clone(),
            duration,
            released.clone(),
            self.status_tx.clone(),
            self.status_interval,
        );

        debug!(session = %id, path = %path.display(), ?duration, "session created");
        Ok(RodioSession {
            id,
            sink,
            released,
        })
    }
}

pub struct RodioSession {
    id: SessionId,
    sink: Arc<Sink>,
    released: Arc<AtomicBool>,
}

impl AudioSession for RodioSession {
    fn play(&mut self) {
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn stop(&mut self) {
        self.sink.stop();
    }

    fn seek_to(&mut self, position: Duration) -> Result<(), PlayerError> {
        self.sink
            .try_seek(position)
            .map_err(|e| PlayerError::Seek(e.to_string()))
    }

    fn release(self) {
        debug!(session = %self.id, "session released");
        // Drop does the work.
    }
}

impl Drop for RodioSession {
    fn drop(&mut self) {
        self.released.store(true, Ordering::Release);
        self.sink.stop();
    }
}

/// Accept plain paths as well as `file://` URIs.
fn locator_path(locator: &str) -> PathBuf {
    PathBuf::from(locator.strip_prefix("file://").unwrap_or(locator))
}

fn open_source(path: &Path) -> Result<Decoder<BufReader<File>>, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    Decoder::new(BufReader::new(file)).map_err(|e| e.to_string())
}

/// Read the duration from the file's headers when the decoder cannot tell.
fn probe_duration(path: &Path) -> Option<Duration> {
    let tagged = lofty::read_from_path(path).ok()?;
    let duration = tagged.properties().duration();
    (!duration.is_zero()).then_some(duration)
}

fn sample_status(sink: &Sink, duration: Duration) -> SessionStatus {
    let finished = sink.empty();
    let position = if finished && !duration.is_zero() {
        duration
    } else if duration.is_zero() {
        sink.get_pos()
    } else {
        sink.get_pos().min(duration)
    };

    SessionStatus {
        loaded: true,
        playing: !finished && !sink.is_paused(),
        position,
        duration,
        finished,
    }
}

fn spawn_status_ticker(
    id: SessionId,
    sink: Arc<Sink>,
    duration: Duration,
    released: Arc<AtomicBool>,
    tx: Sender<StatusEvent>,
    interval: Duration,
) {
    thread::spawn(move || {
        loop {
            thread::sleep(interval);
            if released.load(Ordering::Acquire) {
                break;
            }
            let status = sample_status(&sink, duration);
            if tx.send(StatusEvent { session: id, status }).is_err() {
                break;
            }
        }
        debug!(session = %id, "status ticker exited");
    });
}
