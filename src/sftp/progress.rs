//! Transfer progress reporting
//!
//! [`ProgressReader`] wraps the source side of a copy and counts bytes as
//! they are read. It emits at most one [`ProgressEvent::Progress`] per
//! interval, plus a final one when the source reports end of stream.
//! Events go to a [`ProgressSink`]; [`ConsoleProgress`] renders them as a
//! single rewritten terminal line.

use std::io::Write;
use std::pin::Pin;
use std::sync::Mutex;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, ReadBuf};

use crate::config::ClientSettings;

/// Default minimum time between two progress events for one file
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Download,
    Upload,
}

impl Direction {
    fn verb(self) -> &'static str {
        match self {
            Direction::Download => "downloaded",
            Direction::Upload => "uploaded",
        }
    }
}

/// Events emitted while one file is copied
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Started {
        direction: Direction,
        source: String,
        destination: String,
        total_bytes: u64,
    },
    Progress {
        direction: Direction,
        source: String,
        bytes_transferred: u64,
        /// Zero when the size is unknown
        total_bytes: u64,
        /// Set on the event emitted at end of stream
        finished: bool,
    },
    Completed {
        direction: Direction,
        destination: String,
        bytes: u64,
    },
}

impl ProgressEvent {
    /// Completion percentage, or `None` when the total size is unknown
    pub fn percent(&self) -> Option<f64> {
        match self {
            ProgressEvent::Progress {
                bytes_transferred,
                total_bytes,
                ..
            } if *total_bytes > 0 => Some(*bytes_transferred as f64 / *total_bytes as f64 * 100.0),
            _ => None,
        }
    }
}

/// Receiver of progress events. Sinks are shared with the transfer future,
/// which may run on another thread.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn on_progress(&self, event: &ProgressEvent) {
        self(event)
    }
}

/// Discards every event
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&self, _event: &ProgressEvent) {}
}

/// Renders progress as `\r12.34% downloaded...` lines
pub struct ConsoleProgress<W: Write = std::io::Stdout> {
    out: Mutex<W>,
}

impl ConsoleProgress<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl Default for ConsoleProgress<std::io::Stdout> {
    fn default() -> Self {
        Self::stdout()
    }
}

impl<W: Write> ConsoleProgress<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl<W: Write + Send> ProgressSink for ConsoleProgress<W> {
    fn on_progress(&self, event: &ProgressEvent) {
        let Some(line) = render(event) else {
            return;
        };
        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Progress output is best effort
        let _ = out.write_all(line.as_bytes());
        let _ = out.flush();
    }
}

fn render(event: &ProgressEvent) -> Option<String> {
    match event {
        ProgressEvent::Started { .. } => None,
        ProgressEvent::Progress {
            direction,
            bytes_transferred,
            ..
        } => Some(match event.percent() {
            Some(percent) => format!("\r{:.2}% {}...", percent, direction.verb()),
            None => format!("\r{} bytes {}...", bytes_transferred, direction.verb()),
        }),
        ProgressEvent::Completed {
            direction: Direction::Download,
            destination,
            ..
        } => Some(format!("\nDownload finished: {}\n", destination)),
        ProgressEvent::Completed {
            direction: Direction::Upload,
            destination,
            ..
        } => Some(format!("\nUpload finished: {}\n", destination)),
    }
}

/// How often and where to report progress
#[derive(Clone, Copy)]
pub struct Progress<'a> {
    pub sink: &'a dyn ProgressSink,
    pub interval: Duration,
}

impl<'a> Progress<'a> {
    pub fn new(sink: &'a dyn ProgressSink) -> Self {
        Self {
            sink,
            interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Report to `sink` at the interval set in `settings`
    pub fn configured(sink: &'a dyn ProgressSink, settings: &ClientSettings) -> Self {
        Self::new(sink).with_interval(settings.progress_interval())
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub(crate) fn emit(&self, event: ProgressEvent) {
        self.sink.on_progress(&event);
    }
}

impl std::fmt::Debug for Progress<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

/// Byte-counting reader that reports through a [`Progress`]
pub struct ProgressReader<'a, R> {
    inner: R,
    direction: Direction,
    source: String,
    total_bytes: u64,
    bytes_read: u64,
    last_update: Option<Instant>,
    finished: bool,
    progress: Progress<'a>,
}

impl<'a, R> ProgressReader<'a, R> {
    pub fn new(
        inner: R,
        direction: Direction,
        source: impl Into<String>,
        total_bytes: u64,
        progress: Progress<'a>,
    ) -> Self {
        Self {
            inner,
            direction,
            source: source.into(),
            total_bytes,
            bytes_read: 0,
            last_update: None,
            finished: false,
            progress,
        }
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    fn record(&mut self, n: usize, end_of_stream: bool) {
        self.bytes_read += n as u64;

        if end_of_stream {
            if !self.finished {
                self.finished = true;
                self.report(true);
            }
            return;
        }

        let now = Instant::now();
        let due = self
            .last_update
            .is_none_or(|last| now.duration_since(last) >= self.progress.interval);
        if due {
            self.last_update = Some(now);
            self.report(false);
        }
    }

    fn report(&self, finished: bool) {
        self.progress.emit(ProgressEvent::Progress {
            direction: self.direction,
            source: self.source.clone(),
            bytes_transferred: self.bytes_read,
            total_bytes: self.total_bytes,
            finished,
        });
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for ProgressReader<'_, R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let this = self.get_mut();
        let had_room = buf.remaining() > 0;
        let before = buf.filled().len();

        let poll = Pin::new(&mut this.inner).poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = &poll {
            let n = buf.filled().len() - before;
            this.record(n, had_room && n == 0);
        }
        poll
    }
}
