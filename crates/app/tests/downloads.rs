mod common;

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use assert_matches::assert_matches;
use futures::channel::mpsc;
use futures::StreamExt;

use sonique_app::download::{DownloadEvent, DownloadSource, DownloadState, DownloadTarget, DownloadTracker, FileSink};
use sonique_app::toast::ToastKind;
use sonique_app::AppError;
use sonique_client::{ApiError, ByteStream};
use sonique_core::session::BearerToken;

use common::{anon_ctx, user_ctx, Calls};

type Chunk = Result<Vec<u8>, ApiError>;

/// Serves a scripted sequence of chunks, or a live channel when one is set.
#[derive(Default)]
struct ScriptedSource {
    calls: Calls,
    chunks: Mutex<Vec<Chunk>>,
    content_length: Option<u64>,
    content_type: Option<String>,
    live: Mutex<Option<mpsc::UnboundedReceiver<Chunk>>>,
}

impl ScriptedSource {
    fn with_chunks(chunks: Vec<Chunk>, content_length: Option<u64>) -> Self {
        Self {
            chunks: Mutex::new(chunks),
            content_length,
            content_type: Some("audio/mpeg".into()),
            ..Self::default()
        }
    }
}

impl DownloadSource for ScriptedSource {
    async fn open_download(&self, _token: &BearerToken, target: DownloadTarget) -> Result<ByteStream, ApiError> {
        self.calls.record(format!("open:{target}"));
        let chunks = match self.live.lock().unwrap().take() {
            Some(rx) => rx.boxed(),
            None => futures::stream::iter(std::mem::take(&mut *self.chunks.lock().unwrap())).boxed(),
        };
        Ok(ByteStream::new(self.content_length, self.content_type.clone(), chunks))
    }
}

#[derive(Default)]
struct MemorySink {
    saved: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.saved.lock().unwrap().clone()
    }
}

impl FileSink for MemorySink {
    async fn save(&self, filename: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
        self.saved.lock().unwrap().push((filename.to_string(), bytes.to_vec()));
        Ok(PathBuf::from("/downloads").join(filename))
    }
}

fn drain(rx: &mut tokio::sync::broadcast::Receiver<DownloadEvent>) -> Vec<DownloadEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn progress_rises_and_reaches_100_only_at_the_end() {
    let source = ScriptedSource::with_chunks(
        vec![Ok(vec![0; 25]), Ok(vec![1; 25]), Ok(vec![2; 25]), Ok(vec![3; 25])],
        Some(100),
    );
    let tracker = DownloadTracker::new(user_ctx(), MemorySink::default());
    let mut rx = tracker.subscribe();

    let path = tracker
        .download(&source, DownloadTarget::Sound(7), "Mon Son")
        .await
        .unwrap();
    assert_eq!(path, PathBuf::from("/downloads/Mon_Son.mp3"));

    let events = drain(&mut rx);
    let percents: Vec<f64> = events
        .iter()
        .filter_map(|e| match e {
            DownloadEvent::Progress { progress, .. } => progress.percent(),
            _ => None,
        })
        .collect();

    assert_eq!(percents.len(), 5);
    assert!(percents.windows(2).all(|w| w[0] <= w[1]));
    assert!(percents[..4].iter().all(|p| *p < 100.0));
    assert_eq!(percents[4], 100.0);
    assert_matches!(events.first(), Some(DownloadEvent::Started { .. }));
    assert_matches!(events.last(), Some(DownloadEvent::Completed { .. }));

    let saved = tracker.sink().saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].1.len(), 100);
    assert_matches!(
        tracker.state(DownloadTarget::Sound(7)).await,
        Some(DownloadState::Completed { bytes: 100, .. })
    );
}

#[tokio::test]
async fn mid_stream_failure_saves_nothing() {
    let ctx = user_ctx();
    let source = ScriptedSource::with_chunks(
        vec![Ok(vec![0; 40]), Err(ApiError::application("connexion interrompue"))],
        Some(100),
    );
    let tracker = DownloadTracker::new(ctx.clone(), MemorySink::default());
    let mut rx = tracker.subscribe();

    let err = tracker
        .download(&source, DownloadTarget::Sound(7), "Mon Son")
        .await
        .unwrap_err();
    assert_matches!(err, AppError::Api(_));

    let events = drain(&mut rx);
    assert!(!events.iter().any(|e| matches!(e, DownloadEvent::Completed { .. })));
    assert_matches!(events.last(), Some(DownloadEvent::Failed { .. }));
    assert!(tracker.sink().saved().is_empty());
    assert_eq!(tracker.state(DownloadTarget::Sound(7)).await, None);
    assert_eq!(ctx.toasts.count(ToastKind::Error).await, 1);
}

#[tokio::test]
async fn anonymous_download_makes_no_request() {
    let ctx = anon_ctx();
    let source = ScriptedSource::with_chunks(vec![Ok(vec![0; 10])], None);
    let tracker = DownloadTracker::new(ctx.clone(), MemorySink::default());

    let err = tracker
        .download(&source, DownloadTarget::Sound(1), "x")
        .await
        .unwrap_err();

    assert_matches!(err, AppError::LoginRequired);
    assert!(source.calls.is_empty());
    assert_eq!(ctx.toasts.count(ToastKind::LoginRequired).await, 1);
    assert_eq!(tracker.active_count().await, 0);
}

#[tokio::test]
async fn second_start_while_running_is_refused() {
    let (tx, rx) = mpsc::unbounded();
    let source = ScriptedSource {
        content_length: Some(8),
        live: Mutex::new(Some(rx)),
        ..ScriptedSource::default()
    };
    let tracker = DownloadTracker::new(user_ctx(), MemorySink::default());
    let target = DownloadTarget::Certificate(3);

    let first = {
        let tracker = tracker.clone();
        async move { tracker.download(&source, target, "Certificat").await }
    };
    let second = async {
        tokio::task::yield_now().await;
        assert!(tracker.is_downloading(target).await);
        let busy = tracker.download(&ScriptedSource::default(), target, "Certificat").await;
        tx.unbounded_send(Ok(vec![9; 8])).unwrap();
        drop(tx);
        busy
    };
    let (first, second) = tokio::join!(first, second);

    assert_matches!(second, Err(AppError::Busy(_)));
    let path = first.unwrap();
    assert_eq!(path, PathBuf::from("/downloads/Certificat.pdf"));
    assert_eq!(tracker.sink().saved().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn completed_entry_clears_after_reset_delay() {
    let source = ScriptedSource::with_chunks(vec![Ok(vec![0; 4])], Some(4));
    let tracker = DownloadTracker::new(user_ctx(), MemorySink::default());
    let mut rx = tracker.subscribe();
    let target = DownloadTarget::Sound(2);

    tracker.download(&source, target, "Court").await.unwrap();
    assert_matches!(tracker.state(target).await, Some(DownloadState::Completed { .. }));

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(tracker.state(target).await.is_some());

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(tracker.state(target).await, None);
    assert_matches!(drain(&mut rx).last(), Some(DownloadEvent::Cleared { .. }));
}

#[tokio::test]
async fn oversized_content_length_still_streams() {
    let source = ScriptedSource::with_chunks(vec![Ok(b"abc".to_vec())], Some(u64::MAX));
    let tracker = DownloadTracker::new(user_ctx(), MemorySink::default());

    tracker
        .download(&source, DownloadTarget::Sound(9), "Bogus")
        .await
        .unwrap();

    assert_eq!(tracker.sink().saved()[0].1, b"abc".to_vec());
    assert_matches!(
        tracker.state(DownloadTarget::Sound(9)).await,
        Some(DownloadState::Completed { bytes: 3, .. })
    );
}

#[tokio::test(start_paused = true)]
async fn earlier_reset_leaves_a_newer_completion_in_place() {
    let tracker = DownloadTracker::new(user_ctx(), MemorySink::default());
    let target = DownloadTarget::Sound(2);

    let first = ScriptedSource::with_chunks(vec![Ok(vec![0; 4])], Some(4));
    tracker.download(&first, target, "Court").await.unwrap();

    tokio::time::sleep(Duration::from_secs(2)).await;
    let second = ScriptedSource::with_chunks(vec![Ok(vec![1; 4])], Some(4));
    tracker.download(&second, target, "Court").await.unwrap();

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_matches!(tracker.state(target).await, Some(DownloadState::Completed { .. }));

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(tracker.state(target).await, None);
}
