use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

use crate::errors::ConfigError;

static INIT: OnceCell<()> = OnceCell::new();

const DEFAULT_FILTER: &str = "info";

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    /// Nothing is installed.
    Disabled,
    /// Compact lines on stderr.
    Console,
    /// One JSON object per line, appended to this file.
    JsonFile(PathBuf),
}

/// Logging settings read from the environment.
///
/// - `AGENT_CHAT_OBSERVABILITY`: `false`/`0`/`off` disables logging.
/// - `AGENT_CHAT_LOG_LEVEL`: filter directive, falling back to `RUST_LOG`,
///   then `info`.
/// - `AGENT_CHAT_JSON_LOG_PATH`: JSON lines file instead of the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub filter: String,
    pub output: LogOutput,
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let enabled = lookup("AGENT_CHAT_OBSERVABILITY")
            .and_then(|value| parse_switch(&value))
            .unwrap_or(true);

        let filter = ["AGENT_CHAT_LOG_LEVEL", "RUST_LOG"]
            .into_iter()
            .filter_map(&lookup)
            .find(|directive| EnvFilter::try_new(directive).is_ok())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());

        let output = if !enabled {
            LogOutput::Disabled
        } else if let Some(path) =
            lookup("AGENT_CHAT_JSON_LOG_PATH").filter(|path| !path.trim().is_empty())
        {
            LogOutput::JsonFile(PathBuf::from(path))
        } else {
            LogOutput::Console
        };

        Self { filter, output }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

fn parse_switch(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Opens `path` for appending JSON log lines, creating parent directories.
pub(crate) fn json_file_writer(path: &Path) -> Result<RollingFileAppender, ConfigError> {
    let log_file_error = |message: String| ConfigError::LogFile {
        path: path.display().to_string(),
        message,
    };
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| log_file_error("path has no file name".into()))?;
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    std::fs::create_dir_all(dir).map_err(|e| log_file_error(e.to_string()))?;
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir)
        .map_err(|e| log_file_error(e.to_string()))
}

/// Installs the process-wide tracing subscriber once, using
/// [`LogSettings::from_env`].
///
/// Console logs go to stderr; stdout carries streamed reply text. When the
/// JSON log file cannot be opened, console logging is installed instead and
/// the failure is logged as a warning.
pub fn init_observability() {
    INIT.get_or_init(|| install(LogSettings::from_env()));
}

fn install(settings: LogSettings) {
    let path = match &settings.output {
        LogOutput::Disabled => return,
        LogOutput::Console => None,
        LogOutput::JsonFile(path) => Some(path),
    };

    let fallback = match path.map(|path| json_file_writer(path)) {
        Some(Ok(writer)) => {
            let json_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .with_writer(writer);
            let _ = tracing_subscriber::registry()
                .with(settings.env_filter())
                .with(json_layer)
                .try_init();
            return;
        }
        Some(Err(error)) => Some(error),
        None => None,
    };

    let console_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = tracing_subscriber::registry()
        .with(settings.env_filter())
        .with(console_layer)
        .try_init();
    if let Some(error) = fallback {
        tracing::warn!(%error, "JSON logging unavailable, logging to stderr");
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write as _;

    use super::*;

    fn settings(vars: &[(&str, &str)]) -> LogSettings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LogSettings::from_lookup(|key| vars.get(key).cloned())
    }

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("agent-chat-{}-{name}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn defaults_to_console_at_info() {
        assert_eq!(
            settings(&[]),
            LogSettings {
                filter: "info".into(),
                output: LogOutput::Console
            }
        );
    }

    #[test]
    fn switch_accepts_common_spellings() {
        assert_eq!(parse_switch(" TRUE "), Some(true));
        assert_eq!(parse_switch("off"), Some(false));
        assert_eq!(parse_switch("maybe"), None);
        assert_eq!(
            settings(&[("AGENT_CHAT_OBSERVABILITY", "0")]).output,
            LogOutput::Disabled
        );
        assert_eq!(
            settings(&[("AGENT_CHAT_OBSERVABILITY", "maybe")]).output,
            LogOutput::Console
        );
    }

    #[test]
    fn level_overrides_rust_log_and_invalid_directives_are_skipped() {
        let both = settings(&[
            ("AGENT_CHAT_LOG_LEVEL", "agent_chat_stream=debug"),
            ("RUST_LOG", "warn"),
        ]);
        assert_eq!(both.filter, "agent_chat_stream=debug");

        let invalid = settings(&[
            ("AGENT_CHAT_LOG_LEVEL", "agent_chat_stream=loud"),
            ("RUST_LOG", "warn"),
        ]);
        assert_eq!(invalid.filter, "warn");
    }

    #[test]
    fn json_path_selects_file_output() {
        assert_eq!(
            settings(&[("AGENT_CHAT_JSON_LOG_PATH", "logs/chat.jsonl")]).output,
            LogOutput::JsonFile(PathBuf::from("logs/chat.jsonl"))
        );
        assert_eq!(
            settings(&[("AGENT_CHAT_JSON_LOG_PATH", "  ")]).output,
            LogOutput::Console
        );
    }

    #[test]
    fn json_writer_creates_the_named_file() {
        let dir = scratch_path("logs");
        let path = dir.join("nested").join("chat.jsonl");
        let mut writer = json_file_writer(&path).expect("writer");
        writer.write_all(b"{}\n").expect("write");
        writer.flush().expect("flush");
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "{}\n");
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn unwritable_json_path_is_an_error_not_a_panic() {
        let blocker = scratch_path("blocker");
        std::fs::write(&blocker, b"not a directory").expect("blocker file");
        let path = blocker.join("logs").join("chat.jsonl");

        let err = json_file_writer(&path).expect_err("parent is a file");
        assert!(matches!(err, ConfigError::LogFile { .. }));
        let _ = std::fs::remove_file(blocker);
    }

    #[test]
    fn init_is_idempotent() {
        init_observability();
        init_observability();
        assert!(INIT.get().is_some());
    }
}
