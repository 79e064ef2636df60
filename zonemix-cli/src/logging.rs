use log::{LevelFilter, Log, Metadata, Record};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, OnceLock};

const LOG_CAPACITY: usize = 500;

/// Most recent log lines, oldest first. Shown by the status screen and by
/// `simulate --log`.
pub type LogBuffer = Arc<Mutex<VecDeque<String>>>;

struct SharedLogger {
    level: LevelFilter,
    lines: LogBuffer,
    echo_stderr: bool,
}

impl SharedLogger {
    fn push(&self, line: String) {
        let Ok(mut lines) = self.lines.lock() else {
            return;
        };
        if lines.len() == LOG_CAPACITY {
            lines.pop_front();
        }
        lines.push_back(line);
    }
}

impl Log for SharedLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("[{}] {}", record.level(), record.args());
        if self.echo_stderr {
            eprintln!("{}", line);
        }
        self.push(line);
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<SharedLogger> = OnceLock::new();

/// Install the ring-buffer logger and return its buffer.
///
/// `RUST_LOG` holds a single level name (default `info`). Set
/// `ZONEMIX_LOG_STDERR` to anything but `0` to mirror lines to stderr.
pub fn init() -> LogBuffer {
    let logger = LOGGER.get_or_init(|| SharedLogger {
        level: std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| level.parse().ok())
            .unwrap_or(LevelFilter::Info),
        lines: Arc::new(Mutex::new(VecDeque::with_capacity(LOG_CAPACITY))),
        echo_stderr: std::env::var_os("ZONEMIX_LOG_STDERR").is_some_and(|value| value != "0"),
    });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(logger.level);
    }
    logger.lines.clone()
}

pub fn snapshot(buffer: &LogBuffer) -> Vec<String> {
    buffer
        .lock()
        .map(|lines| lines.iter().cloned().collect())
        .unwrap_or_default()
}
