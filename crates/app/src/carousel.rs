//! Media carousel with autoplay.
//!
//! [`Carousel`] is the plain state machine; [`autoplay`] drives it from
//! UI signals and the image dwell timer until cancelled.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;

/// Default time an image stays on screen during autoplay.
pub const DEFAULT_IMAGE_DWELL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideKind {
    Audio,
    Video,
    Image,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    pub kind: SlideKind,
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Carousel {
    slides: Vec<Slide>,
    index: usize,
    playing: bool,
    image_dwell: Duration,
}

impl Carousel {
    /// New carousel on the first slide, autoplay on.
    pub fn new(slides: Vec<Slide>, image_dwell: Duration) -> Self {
        Self {
            slides,
            index: 0,
            playing: true,
            image_dwell,
        }
    }

    pub fn current(&self) -> Option<&Slide> {
        self.slides.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn next_slide(&mut self) {
        if !self.slides.is_empty() {
            self.index = (self.index + 1) % self.slides.len();
        }
    }

    pub fn previous_slide(&mut self) {
        if !self.slides.is_empty() {
            self.index = (self.index + self.slides.len() - 1) % self.slides.len();
        }
    }

    /// Jump to `index`; out-of-range indexes are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.slides.len() {
            self.index = index;
            true
        } else {
            false
        }
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn resume(&mut self) {
        self.playing = true;
    }

    /// The current audio/video slide finished playing.
    pub fn on_media_ended(&mut self) {
        let is_media = matches!(
            self.current().map(|s| s.kind),
            Some(SlideKind::Audio | SlideKind::Video)
        );
        if self.playing && is_media {
            self.next_slide();
        }
    }

    /// How long the current slide stays before autoplay advances, when a
    /// timer applies (playing, on an image).
    pub fn dwell(&self) -> Option<Duration> {
        match self.current() {
            Some(slide) if self.playing && slide.kind == SlideKind::Image => Some(self.image_dwell),
            _ => None,
        }
    }
}

/// Input from the UI shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselSignal {
    MediaEnded,
    Next,
    Previous,
    Select(usize),
    Pause,
    Resume,
}

/// Drive `carousel` until `cancel` fires or the signal channel closes.
///
/// Every signal restarts the dwell timer of the (possibly new) slide.
pub async fn autoplay(
    carousel: &RwLock<Carousel>,
    mut signals: mpsc::Receiver<CarouselSignal>,
    cancel: &CancellationToken,
) {
    loop {
        let dwell = carousel.read().await.dwell();

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("Carousel autoplay cancelled");
                return;
            }
            signal = signals.recv() => {
                let Some(signal) = signal else { return };
                let mut c = carousel.write().await;
                match signal {
                    CarouselSignal::MediaEnded => c.on_media_ended(),
                    CarouselSignal::Next => c.next_slide(),
                    CarouselSignal::Previous => c.previous_slide(),
                    CarouselSignal::Select(i) => {
                        c.select(i);
                    }
                    CarouselSignal::Pause => c.pause(),
                    CarouselSignal::Resume => c.resume(),
                }
            }
            _ = sleep_for(dwell) => {
                carousel.write().await.next_slide();
            }
        }
    }
}

async fn sleep_for(dwell: Option<Duration>) {
    match dwell {
        Some(d) => tokio::time::sleep(d).await,
        None => std::future::pending().await,
    }
}
