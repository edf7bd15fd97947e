//! Output for the session's `tracing` events.
//!
//! Native builds write to stderr: `RUST_LOG` selects the filter (default
//! [`DEFAULT_FILTER`]), `WALLET_SESSION_LOG_JSON=1` switches to JSON lines.
//! Browser builds write to the devtools console, one call per event at the
//! event's level.

use std::io;
use std::sync::Arc;
use tracing::{Level, Metadata, Subscriber};
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

pub const LOG_JSON_ENV: &str = "WALLET_SESSION_LOG_JSON";

/// Session events at `info`, everything else at `warn`.
pub const DEFAULT_FILTER: &str = "wallet_session=info,warn";

type Sink = Arc<dyn Fn(Level, &str) + Send + Sync>;

/// `MakeWriter` handing each formatted event, with its level, to a sink.
#[derive(Clone)]
pub struct LevelWriter {
    sink: Sink,
}

impl LevelWriter {
    pub fn new(sink: impl Fn(Level, &str) + Send + Sync + 'static) -> Self {
        Self { sink: Arc::new(sink) }
    }

    fn buffer(&self, level: Level) -> EventBuffer {
        EventBuffer {
            level,
            bytes: Vec::new(),
            sink: self.sink.clone(),
        }
    }
}

/// One event's text; delivered to the sink when the formatter drops it.
pub struct EventBuffer {
    level: Level,
    bytes: Vec<u8>,
    sink: Sink,
}

impl io::Write for EventBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for EventBuffer {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.bytes);
        let line = text.trim_end();
        if !line.is_empty() {
            (self.sink)(self.level, line);
        }
    }
}

impl<'a> MakeWriter<'a> for LevelWriter {
    type Writer = EventBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.buffer(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        self.buffer(*meta.level())
    }
}

/// Plain fmt layer over a [`LevelWriter`]. No timestamps (the sink adds its
/// own) and no ANSI colours.
pub fn level_layer<S>(writer: LevelWriter) -> impl Layer<S>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fmt::layer()
        .without_time()
        .with_ansi(false)
        .with_writer(writer)
}

/// Install the stderr subscriber. Later calls are no-ops.
#[cfg(feature = "native")]
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let use_json = std::env::var(LOG_JSON_ENV)
        .map(|value| value == "1")
        .unwrap_or(false);

    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);
    let _ = if use_json {
        builder.json().try_init()
    } else {
        builder.with_target(false).try_init()
    };
}

/// Install the console subscriber. Later calls are no-ops.
#[cfg(feature = "wasm")]
pub fn init_console_logging() {
    use tracing_subscriber::filter::Targets;
    use tracing_subscriber::prelude::*;

    let filter: Targets = DEFAULT_FILTER
        .parse()
        .unwrap_or_else(|_| Targets::new().with_default(Level::INFO));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(level_layer(LevelWriter::new(console)))
        .try_init();
}

#[cfg(feature = "wasm")]
fn console(level: Level, line: &str) {
    use wasm_bindgen::JsValue;
    use web_sys::console;

    let line = JsValue::from_str(line);
    if level == Level::ERROR {
        console::error_1(&line);
    } else if level == Level::WARN {
        console::warn_1(&line);
    } else if level == Level::INFO {
        console::info_1(&line);
    } else {
        console::debug_1(&line);
    }
}
