//! Live video feed: one displayed frame at a time

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, trace, warn};

/// Frames allowed to wait for the writer. More than this means display is
/// behind the stream and new frames are skipped.
pub const FRAME_QUEUE_LEN: usize = 2;

/// A received frame, alive until the next frame has been displayed
#[derive(Debug)]
pub struct FrameHandle {
    seq: u64,
    data: Bytes,
}

impl FrameHandle {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

/// Where frames are shown
pub trait FrameSink: Send {
    fn display(&mut self, frame: &FrameHandle) -> Result<(), VideoError>;
}

/// Keeps frames in memory only
#[derive(Debug, Default)]
pub struct MemorySink;

impl FrameSink for MemorySink {
    fn display(&mut self, _frame: &FrameHandle) -> Result<(), VideoError> {
        Ok(())
    }
}

/// Writes each frame over a single image file. Readers never observe a
/// half-written image: the frame goes to a sibling temp file first.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    tmp_path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        Self {
            path,
            tmp_path: PathBuf::from(tmp),
        }
    }
}

impl FrameSink for FileSink {
    fn display(&mut self, frame: &FrameHandle) -> Result<(), VideoError> {
        fs::write(&self.tmp_path, frame.data())?;
        fs::rename(&self.tmp_path, &self.path)?;
        Ok(())
    }
}

/// Video feed state
pub struct VideoFeed {
    sink: Box<dyn FrameSink>,
    current: Option<FrameHandle>,
    next_seq: u64,
    released: u64,
    failed: u64,
}

impl VideoFeed {
    pub fn new(sink: Box<dyn FrameSink>) -> Self {
        Self {
            sink,
            current: None,
            next_seq: 1,
            released: 0,
            failed: 0,
        }
    }

    /// Show a new frame. The previous frame is released only after the new
    /// one is displayed; if display fails the previous frame stays up.
    pub fn present(&mut self, data: Bytes) -> Result<u64, VideoError> {
        let frame = FrameHandle {
            seq: self.next_seq,
            data,
        };
        self.next_seq += 1;

        if let Err(e) = self.sink.display(&frame) {
            self.failed += 1;
            self.release(frame);
            return Err(e);
        }

        let seq = frame.seq;
        if let Some(previous) = self.current.replace(frame) {
            self.release(previous);
        }
        Ok(seq)
    }

    fn release(&mut self, frame: FrameHandle) {
        trace!(seq = frame.seq, bytes = frame.data.len(), "Released frame");
        self.released += 1;
        drop(frame);
    }

    pub fn current(&self) -> Option<&FrameHandle> {
        self.current.as_ref()
    }

    /// Handles released so far (displayed-then-replaced plus failed)
    pub fn released_count(&self) -> u64 {
        self.released
    }

    pub fn failed_count(&self) -> u64 {
        self.failed
    }
}

/// Build the feed for an optional output path
pub fn feed_for(output: Option<&Path>) -> VideoFeed {
    match output {
        Some(path) => VideoFeed::new(Box::new(FileSink::new(path))),
        None => {
            warn!("FRAME_OUTPUT not set, video frames are kept in memory only");
            VideoFeed::new(Box::new(MemorySink))
        }
    }
}

/// Hands received frames to a writer task, so sink I/O never runs on the
/// socket reader
pub struct VideoPipe {
    feed: Arc<Mutex<VideoFeed>>,
    tx: mpsc::Sender<Bytes>,
    rx: Mutex<Option<mpsc::Receiver<Bytes>>>,
    skipped: AtomicU64,
}

impl VideoPipe {
    pub fn new(feed: VideoFeed) -> Self {
        let (tx, rx) = mpsc::channel(FRAME_QUEUE_LEN);
        Self {
            feed: Arc::new(Mutex::new(feed)),
            tx,
            rx: Mutex::new(Some(rx)),
            skipped: AtomicU64::new(0),
        }
    }

    pub fn feed(&self) -> &Arc<Mutex<VideoFeed>> {
        &self.feed
    }

    /// Queue a frame for display without waiting. Returns false when the
    /// frame was skipped.
    pub fn submit(&self, data: Bytes) -> bool {
        match self.tx.try_send(data) {
            Ok(()) => true,
            Err(TrySendError::Full(data)) => {
                self.skipped.fetch_add(1, Ordering::Relaxed);
                debug!(bytes = data.len(), "Video writer behind, frame skipped");
                false
            }
            Err(TrySendError::Closed(_)) => {
                warn!("Video writer stopped, frame dropped");
                false
            }
        }
    }

    /// Frames skipped because the queue was full
    pub fn skipped_count(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    /// Display queued frames on the blocking pool, one at a time and in
    /// order. Runs until the task is dropped.
    pub async fn run(self: Arc<Self>) {
        let rx = self.rx.lock().take();
        let Some(mut rx) = rx else {
            warn!("Video writer already running");
            return;
        };

        while let Some(data) = rx.recv().await {
            let feed = self.feed.clone();
            match tokio::task::spawn_blocking(move || feed.lock().present(data)).await {
                Ok(Ok(seq)) => trace!(seq, "Displayed frame"),
                Ok(Err(e)) => warn!(error = %e, "Dropped video frame"),
                Err(e) => error!(error = %e, "Video display task failed"),
            }
        }
    }
}

/// Video errors
#[derive(Debug, thiserror::Error)]
pub enum VideoError {
    #[error("Failed to write frame: {0}")]
    Io(#[from] io::Error),

    #[error("Frame rejected: {0}")]
    Rejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Rejects empty frames the way a decoder would
    struct PickySink;

    impl FrameSink for PickySink {
        fn display(&mut self, frame: &FrameHandle) -> Result<(), VideoError> {
            if frame.data().is_empty() {
                return Err(VideoError::Rejected("empty frame".into()));
            }
            Ok(())
        }
    }

    #[test]
    fn each_frame_is_released_once_after_its_successor() {
        let mut feed = VideoFeed::new(Box::new(MemorySink));
        assert_eq!(feed.present(Bytes::from_static(b"one")).unwrap(), 1);
        assert_eq!(feed.released_count(), 0);

        feed.present(Bytes::from_static(b"two")).unwrap();
        feed.present(Bytes::from_static(b"three")).unwrap();
        assert_eq!(feed.released_count(), 2);
        assert_eq!(feed.current().map(FrameHandle::seq), Some(3));
        assert_eq!(feed.current().unwrap().data().as_ref(), b"three");
    }

    #[test]
    fn failed_frame_keeps_previous_on_screen() {
        let mut feed = VideoFeed::new(Box::new(PickySink));
        feed.present(Bytes::from_static(b"good")).unwrap();
        assert!(feed.present(Bytes::new()).is_err());

        assert_eq!(feed.current().map(FrameHandle::seq), Some(1));
        assert_eq!(feed.released_count(), 1);
        assert_eq!(feed.failed_count(), 1);
    }

    #[test]
    fn full_queue_skips_frames_without_waiting() {
        let pipe = VideoPipe::new(VideoFeed::new(Box::new(MemorySink)));
        for _ in 0..FRAME_QUEUE_LEN {
            assert!(pipe.submit(Bytes::from_static(b"frame")));
        }
        assert!(!pipe.submit(Bytes::from_static(b"late")));
        assert_eq!(pipe.skipped_count(), 1);
        // nothing reaches the sink until the writer runs
        assert!(pipe.feed().lock().current().is_none());
    }

    #[tokio::test]
    async fn writer_task_displays_in_order_and_releases_predecessors() {
        let path = std::env::temp_dir().join(format!("pilot-frame-{}.jpg", uuid::Uuid::new_v4()));
        let pipe = Arc::new(VideoPipe::new(feed_for(Some(path.as_path()))));
        let writer = tokio::spawn(pipe.clone().run());

        assert!(pipe.submit(Bytes::from_static(b"\xff\xd8first")));
        let shown = |seq: u64| pipe.feed().lock().current().map(FrameHandle::seq) == Some(seq);
        tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while !shown(1) {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("first frame not displayed");
        assert_eq!(pipe.feed().lock().released_count(), 0);

        assert!(pipe.submit(Bytes::from_static(b"\xff\xd8second")));
        tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while !shown(2) {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("second frame not displayed");

        assert_eq!(pipe.feed().lock().released_count(), 1);
        assert_eq!(fs::read(&path).unwrap(), b"\xff\xd8second");

        writer.abort();
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn file_sink_replaces_the_image() {
        let path = std::env::temp_dir().join(format!("pilot-frame-{}.jpg", uuid::Uuid::new_v4()));
        let mut feed = feed_for(Some(path.as_path()));

        feed.present(Bytes::from_static(b"\xff\xd8first")).unwrap();
        feed.present(Bytes::from_static(b"\xff\xd8second")).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"\xff\xd8second");

        let _ = fs::remove_file(&path);
    }
}
