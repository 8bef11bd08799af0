//! Tracing subscriber: the appsync console format and the per-command log file.
//!
//! Both sinks classify an event the same way through [`LineKind`], so a stage
//! header on the console is a stage header in the file as well.
use std::fmt;
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use super::utils::{format_utc_datetime, format_utc_time, log_file_path, strip_ansi};

/// Target of stage headers.
pub(super) const STAGE_TARGET: &str = "appsync::stage";

/// Target of lines describing what a dry run would do.
pub(super) const DRY_RUN_TARGET: &str = "appsync::dry_run";

const VERSION: &str = match option_env!("APPSYNC_VERSION") {
    Some(v) => v,
    None => concat!("dev-", env!("CARGO_PKG_VERSION")),
};

/// How an event is rendered, decided from its level and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Stage,
    DryRun,
    Error,
    Warn,
    Info,
    Debug,
}

impl LineKind {
    fn classify(level: &Level, target: &str) -> Self {
        if *level == Level::ERROR {
            Self::Error
        } else if *level == Level::WARN {
            Self::Warn
        } else if *level != Level::INFO {
            Self::Debug
        } else if target == STAGE_TARGET {
            Self::Stage
        } else if target == DRY_RUN_TARGET {
            Self::DryRun
        } else {
            Self::Info
        }
    }

    /// Plain-text line for the log file.
    fn file_line(self, time: &str, msg: &str) -> String {
        let tag = match self {
            Self::Stage => return format!("[{time}] ==> {msg}"),
            Self::DryRun => "[dry run] ",
            Self::Error => "[error] ",
            Self::Warn => "[warn] ",
            Self::Debug => "[debug] ",
            Self::Info => "",
        };
        format!("[{time}]     {tag}{msg}")
    }

    /// Colored line for the terminal.
    fn write_console(self, out: &mut impl fmt::Write, msg: &str) -> fmt::Result {
        match self {
            Self::Stage => writeln!(out, "\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
            Self::DryRun => writeln!(out, "  \x1b[33m[DRY RUN]\x1b[0m {msg}"),
            Self::Error => writeln!(out, "\x1b[31mERROR\x1b[0m {msg}"),
            Self::Warn => writeln!(out, "\x1b[33mWARN\x1b[0m  {msg}"),
            Self::Info => writeln!(out, "  {msg}"),
            Self::Debug => writeln!(out, "  \x1b[2m{msg}\x1b[0m"),
        }
    }

    fn of(event: &Event<'_>) -> Self {
        let metadata = event.metadata();
        Self::classify(metadata.level(), metadata.target())
    }
}

/// The `message` field of an event; other fields are ignored.
#[derive(Debug, Default)]
struct Message(String);

impl Message {
    fn of(event: &Event<'_>) -> String {
        let mut message = Self::default();
        event.record(&mut message);
        message.0
    }
}

impl tracing::field::Visit for Message {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            value.clone_into(&mut self.0);
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

/// Layer appending every event, `DEBUG` included, to the command's log file.
///
/// The file is truncated at startup so it only ever holds the latest run.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Open `$XDG_CACHE_HOME/appsync/<command>.log`. `None` leaves logging
    /// console-only.
    pub(super) fn new(command: &str) -> Option<Self> {
        Self::at(&log_file_path(command), command)
    }

    pub(super) fn at(path: &Path, command: &str) -> Option<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok()?;
        }
        let mut file = fs::File::create(path).ok()?;
        writeln!(
            file,
            "# appsync {VERSION} {command}, started {}",
            format_utc_datetime()
        )
        .ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }

    fn append(&self, line: &str) {
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{line}");
        }
    }
}

impl<S: Subscriber> Layer<S> for FileLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let msg = strip_ansi(&Message::of(event));
        self.append(&LineKind::of(event).file_line(&format_utc_time(), &msg));
    }
}

/// Console event format: colored level tags and `==>` stage headers.
#[derive(Debug)]
struct ConsoleFormatter;

impl<S, N> FormatEvent<S, N> for ConsoleFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        LineKind::of(event).write_console(&mut writer, &Message::of(event))
    }
}

/// Warnings and errors go to stderr. Everything else goes to stdout, unless
/// stdout is reserved for machine-readable output.
fn console_writer(stdout_reserved: bool) -> BoxMakeWriter {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;

    if stdout_reserved {
        return BoxMakeWriter::new(std::io::stderr);
    }
    BoxMakeWriter::new(
        std::io::stderr
            .with_max_level(Level::WARN)
            .and(std::io::stdout.with_min_level(Level::INFO)),
    )
}

/// Install the global subscriber: the console at `INFO` (`DEBUG` with
/// `verbose`) plus the log file for `command`.
///
/// With `stdout_reserved` all console output goes to stderr (`list --json`).
/// Call once, before anything logs.
pub fn init_subscriber(verbose: bool, command: &str, stdout_reserved: bool) {
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::layer::SubscriberExt as _;
    use tracing_subscriber::util::SubscriberInitExt as _;

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let console = tracing_subscriber::fmt::layer()
        .event_format(ConsoleFormatter)
        .with_writer(console_writer(stdout_reserved))
        .with_filter(console_level);
    let file = FileLayer::new(command).map(|layer| layer.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry().with(console).with(file).init();
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_level_then_target() {
        assert_eq!(LineKind::classify(&Level::INFO, STAGE_TARGET), LineKind::Stage);
        assert_eq!(LineKind::classify(&Level::INFO, DRY_RUN_TARGET), LineKind::DryRun);
        assert_eq!(LineKind::classify(&Level::INFO, "appsync_cli"), LineKind::Info);
        assert_eq!(LineKind::classify(&Level::WARN, STAGE_TARGET), LineKind::Warn);
        assert_eq!(LineKind::classify(&Level::ERROR, "x"), LineKind::Error);
        assert_eq!(LineKind::classify(&Level::TRACE, "x"), LineKind::Debug);
    }

    #[test]
    fn file_lines_are_tagged_and_indented() {
        assert_eq!(
            LineKind::Stage.file_line("12:00:00", "Backing up"),
            "[12:00:00] ==> Backing up"
        );
        assert_eq!(
            LineKind::Warn.file_line("12:00:00", "declined"),
            "[12:00:00]     [warn] declined"
        );
        assert_eq!(
            LineKind::Info.file_line("12:00:00", "storage: /s"),
            "[12:00:00]     storage: /s"
        );
    }

    #[test]
    fn console_lines_strip_back_to_plain_text() {
        let mut out = String::new();
        LineKind::DryRun.write_console(&mut out, "would link").unwrap();
        LineKind::Error.write_console(&mut out, "denied").unwrap();
        assert_eq!(strip_ansi(&out), "  [DRY RUN] would link\nERROR denied\n");
    }

    #[test]
    fn file_layer_writes_header_naming_the_command() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/appsync/backup.log");
        FileLayer::at(&path, "backup").expect("layer");
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# appsync "), "header missing: {text}");
        assert!(text.contains(" backup, started "));
    }

    #[test]
    fn file_layer_truncates_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("restore.log");
        fs::write(&path, "stale contents").unwrap();
        let layer = FileLayer::at(&path, "restore").expect("layer");
        layer.append("fresh");
        let text = fs::read_to_string(&path).unwrap();
        assert!(!text.contains("stale contents"));
        assert!(text.ends_with("fresh\n"));
    }
}
