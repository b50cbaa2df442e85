//! Download-with-progress tracker.
//!
//! [`DownloadTracker`] drives one download per resource: it checks the
//! session, opens the byte stream, publishes progress as chunks arrive,
//! and hands the assembled bytes to a [`FileSink`] only once the stream
//! has ended cleanly. A failed download leaves no entry and no file.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::sync::{broadcast, RwLock};

use sonique_client::{ApiError, ByteStream};
use sonique_core::download::{download_filename, DownloadProgress, MediaKind};
use sonique_core::session::BearerToken;
use sonique_core::types::DbId;

use crate::context::AppContext;
use crate::error::AppError;

const EVENT_CAPACITY: usize = 256;

/// Upper bound on the buffer reserved from a declared `Content-Length`.
const MAX_PREALLOC: u64 = 64 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Targets and events
// ---------------------------------------------------------------------------

/// A downloadable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum DownloadTarget {
    Sound(DbId),
    /// PDF certificate of a sound.
    Certificate(DbId),
}

impl DownloadTarget {
    /// Media kind assumed when the response has no usable `Content-Type`.
    pub fn default_kind(&self) -> MediaKind {
        match self {
            DownloadTarget::Sound(_) => MediaKind::Mp3,
            DownloadTarget::Certificate(_) => MediaKind::Pdf,
        }
    }
}

impl fmt::Display for DownloadTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadTarget::Sound(id) => write!(f, "sound #{id}"),
            DownloadTarget::Certificate(id) => write!(f, "certificate #{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DownloadState {
    InProgress { progress: DownloadProgress },
    Completed { path: PathBuf, bytes: u64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DownloadEvent {
    Started { target: DownloadTarget },
    Progress { target: DownloadTarget, progress: DownloadProgress },
    Completed { target: DownloadTarget, path: PathBuf },
    Failed { target: DownloadTarget, message: String },
    /// The completed entry was removed after the reset delay.
    Cleared { target: DownloadTarget },
}

// ---------------------------------------------------------------------------
// Seams
// ---------------------------------------------------------------------------

/// Opens the byte stream of a download.
pub trait DownloadSource: Send + Sync {
    fn open_download(
        &self,
        token: &BearerToken,
        target: DownloadTarget,
    ) -> impl Future<Output = Result<ByteStream, ApiError>> + Send;
}

/// Receives the bytes of a completed download.
pub trait FileSink: Send + Sync + 'static {
    /// Persist `bytes` under a name derived from `filename` and return
    /// where they were written.
    fn save(
        &self,
        filename: &str,
        bytes: &[u8],
    ) -> impl Future<Output = std::io::Result<PathBuf>> + Send;
}

/// Writes downloads into a directory, never overwriting an existing file:
/// `Mon_Son.mp3` becomes `Mon_Son (1).mp3` and so on.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// `name (n).ext` for the n-th collision.
fn numbered_filename(filename: &str, n: u32) -> String {
    if n == 0 {
        return filename.to_string();
    }
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem} ({n}).{ext}"),
        _ => format!("{filename} ({n})"),
    }
}

const MAX_NAME_ATTEMPTS: u32 = 1000;

impl FileSink for DirectorySink {
    async fn save(&self, filename: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;

        for n in 0..MAX_NAME_ATTEMPTS {
            let path = self.dir.join(numbered_filename(filename, n));
            let file = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;
            match file {
                Ok(mut file) => {
                    file.write_all(bytes).await?;
                    file.flush().await?;
                    return Ok(path);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }

        Err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("no free name for {filename} in {}", self.dir.display()),
        ))
    }
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

/// A tracked download; `run` tells successive downloads of one target apart.
struct Entry {
    run: u64,
    state: DownloadState,
}

struct TrackerInner<K> {
    ctx: AppContext,
    sink: K,
    states: RwLock<HashMap<DownloadTarget, Entry>>,
    runs: AtomicU64,
    events: broadcast::Sender<DownloadEvent>,
    reset_after: Duration,
}

/// Per-resource download state. Cloning shares the same tracker.
pub struct DownloadTracker<K> {
    inner: Arc<TrackerInner<K>>,
}

impl<K> Clone for DownloadTracker<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl DownloadTracker<DirectorySink> {
    /// Tracker writing into the configured download directory.
    pub fn from_context(ctx: AppContext) -> Self {
        let sink = DirectorySink::new(ctx.config.download_dir.clone());
        Self::new(ctx, sink)
    }
}

impl<K: FileSink> DownloadTracker<K> {
    pub fn new(ctx: AppContext, sink: K) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let reset_after = ctx.config.download_reset;
        Self {
            inner: Arc::new(TrackerInner {
                ctx,
                sink,
                states: RwLock::new(HashMap::new()),
                runs: AtomicU64::new(0),
                events,
                reset_after,
            }),
        }
    }

    pub fn sink(&self) -> &K {
        &self.inner.sink
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DownloadEvent> {
        self.inner.events.subscribe()
    }

    pub async fn state(&self, target: DownloadTarget) -> Option<DownloadState> {
        self.inner
            .states
            .read()
            .await
            .get(&target)
            .map(|entry| entry.state.clone())
    }

    pub async fn is_downloading(&self, target: DownloadTarget) -> bool {
        matches!(
            self.state(target).await,
            Some(DownloadState::InProgress { .. })
        )
    }

    pub async fn active_count(&self) -> usize {
        self.inner.states.read().await.len()
    }

    /// Download `target` and save it as `title` plus the media extension.
    ///
    /// Returns the path written. On any failure the entry is removed, an
    /// error toast is shown and nothing reaches the sink.
    pub async fn download<S: DownloadSource>(
        &self,
        source: &S,
        target: DownloadTarget,
        title: &str,
    ) -> Result<PathBuf, AppError> {
        let token = self.inner.ctx.require_token().await?;

        let run = {
            let mut states = self.inner.states.write().await;
            if matches!(
                states.get(&target),
                Some(Entry {
                    state: DownloadState::InProgress { .. },
                    ..
                })
            ) {
                return Err(AppError::Busy(format!("{target} is already downloading")));
            }
            let run = self.inner.runs.fetch_add(1, Ordering::Relaxed) + 1;
            states.insert(
                target,
                Entry {
                    run,
                    state: DownloadState::InProgress {
                        progress: DownloadProgress::at(0, None, false),
                    },
                },
            );
            run
        };
        self.publish(DownloadEvent::Started { target });
        tracing::info!(%target, "Download started");

        match self.run(source, &token, target, title).await {
            Ok((path, bytes)) => {
                self.inner.states.write().await.insert(
                    target,
                    Entry {
                        run,
                        state: DownloadState::Completed {
                            path: path.clone(),
                            bytes,
                        },
                    },
                );
                self.publish(DownloadEvent::Completed {
                    target,
                    path: path.clone(),
                });
                tracing::info!(%target, path = %path.display(), bytes, "Download completed");
                self.inner.ctx.toasts.success("Téléchargement terminé").await;
                self.schedule_reset(target, run);
                Ok(path)
            }
            Err(err) => {
                self.inner.states.write().await.remove(&target);
                tracing::warn!(%target, error = %err, "Download failed");
                self.publish(DownloadEvent::Failed {
                    target,
                    message: err.user_message(),
                });
                Err(self.inner.ctx.report(err).await)
            }
        }
    }

    async fn run<S: DownloadSource>(
        &self,
        source: &S,
        token: &BearerToken,
        target: DownloadTarget,
        title: &str,
    ) -> Result<(PathBuf, u64), AppError> {
        let ByteStream {
            content_length,
            content_type,
            mut chunks,
        } = source.open_download(token, target).await?;

        let reserve = content_length.map_or(0, |n| n.min(MAX_PREALLOC) as usize);
        let mut buffer: Vec<u8> = Vec::with_capacity(reserve);
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            buffer.extend_from_slice(&chunk);
            let progress = DownloadProgress::at(buffer.len() as u64, content_length, false);
            self.set_progress(target, progress).await;
        }

        let received = buffer.len() as u64;
        self.set_progress(target, DownloadProgress::at(received, content_length, true))
            .await;

        let kind = content_type
            .as_deref()
            .map(MediaKind::from_content_type)
            .filter(|kind| *kind != MediaKind::Other)
            .unwrap_or_else(|| target.default_kind());
        let filename = download_filename(title, kind);
        let path = self.inner.sink.save(&filename, &buffer).await?;
        Ok((path, received))
    }

    async fn set_progress(&self, target: DownloadTarget, progress: DownloadProgress) {
        if let Some(entry) = self.inner.states.write().await.get_mut(&target) {
            entry.state = DownloadState::InProgress { progress };
        }
        self.publish(DownloadEvent::Progress { target, progress });
    }

    /// Remove the completed entry of `run` after the reset delay. A later
    /// download of the same target owns its own entry and reset.
    fn schedule_reset(&self, target: DownloadTarget, run: u64) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(inner.reset_after).await;
            let mut states = inner.states.write().await;
            let finished = matches!(
                states.get(&target),
                Some(Entry {
                    run: current,
                    state: DownloadState::Completed { .. },
                }) if *current == run
            );
            if finished {
                states.remove(&target);
                drop(states);
                let _ = inner.events.send(DownloadEvent::Cleared { target });
                tracing::debug!(%target, "Download entry cleared");
            }
        });
    }

    fn publish(&self, event: DownloadEvent) {
        let _ = self.inner.events.send(event);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_names_keep_extension() {
        assert_eq!(numbered_filename("Mon_Son.mp3", 0), "Mon_Son.mp3");
        assert_eq!(numbered_filename("Mon_Son.mp3", 2), "Mon_Son (2).mp3");
        assert_eq!(numbered_filename("README", 1), "README (1)");
    }

    #[test]
    fn certificate_defaults_to_pdf() {
        assert_eq!(DownloadTarget::Certificate(3).default_kind(), MediaKind::Pdf);
        assert_eq!(DownloadTarget::Sound(3).to_string(), "sound #3");
    }

    #[tokio::test]
    async fn directory_sink_never_overwrites() {
        let dir = std::env::temp_dir().join(format!("sonique-sink-{}", std::process::id()));
        let sink = DirectorySink::new(&dir);

        let first = sink.save("track.mp3", b"one").await.unwrap();
        let second = sink.save("track.mp3", b"two").await.unwrap();

        assert_eq!(first.file_name().unwrap(), "track.mp3");
        assert_eq!(second.file_name().unwrap(), "track (1).mp3");
        assert_eq!(tokio::fs::read(&first).await.unwrap(), b"one");
        assert_eq!(tokio::fs::read(&second).await.unwrap(), b"two");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
