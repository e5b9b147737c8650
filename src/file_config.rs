//! INI-based hook configuration.
//!
//! Hooks are normally built in code with [`HookOptions`], but deployments can
//! describe them in an INI file instead:
//!
//! ```ini
//! [kafka_hook]
//! topic = app_logs
//! mode = async
//! access_log_topic = access_logs
//! timeout_ms = 50
//! levels = info, warn, error
//! formatter = json
//! ```
//!
//! Parsing uses the `rust-ini` crate; values are validated eagerly so a bad
//! file fails before any hook is constructed.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use ini::{Ini, Properties};
use thiserror::Error;

use crate::formatter::{JsonFormatter, MessagePackFormatter, SharedFormatter, TextFormatter};
use crate::kafka_hook::{HookOptions, KafkaHook};
use crate::level::Level;
use crate::producer::{AsyncProducer, SyncProducer};

/// Section holding the hook settings.
pub const SECTION: &str = "kafka_hook";

/// Errors raised while loading a [`HookConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} doesn't exist")]
    NotFound(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid ini: {0}")]
    Parse(String),
    #[error("missing [kafka_hook] section")]
    MissingSection,
    #[error("missing required key `{0}`")]
    MissingKey(&'static str),
    #[error("invalid value for `{key}`: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("configuration describes a {configured} hook but a {requested} hook was requested")]
    ModeMismatch {
        configured: DeliveryKind,
        requested: DeliveryKind,
    },
}

/// Delivery mode named in configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeliveryKind {
    #[default]
    Sync,
    Async,
}

impl std::fmt::Display for DeliveryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Sync => "sync",
            Self::Async => "async",
        })
    }
}

impl FromStr for DeliveryKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sync" => Ok(Self::Sync),
            "async" => Ok(Self::Async),
            _ => Err(()),
        }
    }
}

/// Formatter named in configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormatterKind {
    #[default]
    Text,
    Json,
    MessagePack,
}

impl FromStr for FormatterKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "msgpack" | "messagepack" => Ok(Self::MessagePack),
            _ => Err(()),
        }
    }
}

impl FormatterKind {
    pub fn build(self) -> SharedFormatter {
        match self {
            Self::Text => SharedFormatter::new(TextFormatter::new()),
            Self::Json => SharedFormatter::new(JsonFormatter),
            Self::MessagePack => SharedFormatter::new(MessagePackFormatter),
        }
    }
}

/// Hook settings loaded from the `[kafka_hook]` section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HookConfig {
    pub topic: String,
    pub mode: DeliveryKind,
    pub access_log_topic: Option<String>,
    pub access_log_field: Option<String>,
    pub timeout: Option<Duration>,
    pub levels: Option<Vec<Level>>,
    pub formatter: FormatterKind,
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    let display = path.display().to_string();
    fs::read_to_string(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => ConfigError::NotFound(display),
        _ => ConfigError::Io {
            path: display,
            source: err,
        },
    })
}

fn non_empty<'a>(props: &'a Properties, key: &str) -> Option<&'a str> {
    props
        .get(key)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn parse_value<T: FromStr>(
    props: &Properties,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    non_empty(props, key)
        .map(|raw| {
            raw.parse().map_err(|_| ConfigError::InvalidValue {
                key,
                value: raw.to_owned(),
            })
        })
        .transpose()
}

fn parse_levels(props: &Properties) -> Result<Option<Vec<Level>>, ConfigError> {
    let Some(raw) = non_empty(props, "levels") else {
        return Ok(None);
    };
    let levels = raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            name.parse().map_err(|_| ConfigError::InvalidValue {
                key: "levels",
                value: name.to_owned(),
            })
        })
        .collect::<Result<Vec<Level>, _>>()?;
    if levels.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: "levels",
            value: raw.to_owned(),
        });
    }
    Ok(Some(levels))
}

impl HookConfig {
    /// Load the configuration from an INI file.
    pub fn from_ini_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = read_file(path.as_ref())?;
        Self::from_ini_str(&text)
    }

    /// Parse the configuration from INI text.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        let props = ini
            .section(Some(SECTION))
            .ok_or(ConfigError::MissingSection)?;
        Self::from_properties(props)
    }

    fn from_properties(props: &Properties) -> Result<Self, ConfigError> {
        let topic = non_empty(props, "topic")
            .ok_or(ConfigError::MissingKey("topic"))?
            .to_owned();
        let timeout = parse_value::<u64>(props, "timeout_ms")?.map(Duration::from_millis);
        Ok(Self {
            topic,
            mode: parse_value::<DeliveryKind>(props, "mode")?.unwrap_or_default(),
            access_log_topic: non_empty(props, "access_log_topic").map(str::to_owned),
            access_log_field: non_empty(props, "access_log_field").map(str::to_owned),
            timeout,
            levels: parse_levels(props)?,
            formatter: parse_value::<FormatterKind>(props, "formatter")?.unwrap_or_default(),
        })
    }

    /// Translate the settings into [`HookOptions`].
    pub fn options(&self) -> HookOptions {
        let mut options = HookOptions::new().with_shared_formatter(self.formatter.build());
        if let Some(timeout) = self.timeout {
            options = options.with_timeout(timeout);
        }
        if let Some(topic) = &self.access_log_topic {
            options = options.with_access_log_topic(topic.clone());
        }
        if let Some(field) = &self.access_log_field {
            options = options.with_access_log_field(field.clone());
        }
        if let Some(levels) = &self.levels {
            options = options.with_levels(levels.iter().copied());
        }
        options
    }

    fn ensure_mode(&self, requested: DeliveryKind) -> Result<(), ConfigError> {
        if self.mode == requested {
            Ok(())
        } else {
            Err(ConfigError::ModeMismatch {
                configured: self.mode,
                requested,
            })
        }
    }

    /// Build a sync hook; fails when the file asks for `mode = async`.
    pub fn build_sync(&self, producer: Arc<dyn SyncProducer>) -> Result<KafkaHook, ConfigError> {
        self.ensure_mode(DeliveryKind::Sync)?;
        Ok(KafkaHook::new_sync(self.topic.clone(), producer, self.options()))
    }

    /// Build an async hook; fails unless the file asks for `mode = async`.
    pub fn build_async(&self, producer: Arc<dyn AsyncProducer>) -> Result<KafkaHook, ConfigError> {
        self.ensure_mode(DeliveryKind::Async)?;
        Ok(KafkaHook::new_async(self.topic.clone(), producer, self.options()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::Hook;
    use crate::producer::{MemoryAsyncProducer, MemoryProducer};
    use rstest::rstest;
    use std::io::Write;

    const FULL: &str = "\
[kafka_hook]
topic = app_logs
mode = async
access_log_topic = access_logs
access_log_field = is_access
timeout_ms = 50
levels = info, WARN ,error
formatter = json
";

    #[test]
    fn parses_every_key() {
        let config = HookConfig::from_ini_str(FULL).expect("valid config");
        assert_eq!(
            config,
            HookConfig {
                topic: "app_logs".into(),
                mode: DeliveryKind::Async,
                access_log_topic: Some("access_logs".into()),
                access_log_field: Some("is_access".into()),
                timeout: Some(Duration::from_millis(50)),
                levels: Some(vec![Level::Info, Level::Warn, Level::Error]),
                formatter: FormatterKind::Json,
            }
        );
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = HookConfig::from_ini_str("[kafka_hook]\ntopic = logs\n").expect("valid");
        assert_eq!(config.mode, DeliveryKind::Sync);
        assert_eq!(config.formatter, FormatterKind::Text);
        assert!(config.timeout.is_none());
        assert!(config.levels.is_none());

        let hook = config
            .build_sync(Arc::new(MemoryProducer::new()))
            .expect("sync hook");
        assert_eq!(hook.levels(), &Level::ALL[..]);
    }

    #[rstest]
    #[case("[other]\ntopic = x\n", "missing [kafka_hook] section")]
    #[case("[kafka_hook]\nmode = sync\n", "missing required key `topic`")]
    #[case("[kafka_hook]\ntopic =   \n", "missing required key `topic`")]
    #[case(
        "[kafka_hook]\ntopic = t\nmode = eventual\n",
        "invalid value for `mode`: \"eventual\""
    )]
    #[case(
        "[kafka_hook]\ntopic = t\ntimeout_ms = soon\n",
        "invalid value for `timeout_ms`: \"soon\""
    )]
    #[case(
        "[kafka_hook]\ntopic = t\nlevels = info,loud\n",
        "invalid value for `levels`: \"loud\""
    )]
    #[case(
        "[kafka_hook]\ntopic = t\nlevels = , ,\n",
        "invalid value for `levels`: \", ,\""
    )]
    #[case(
        "[kafka_hook]\ntopic = t\nformatter = xml\n",
        "invalid value for `formatter`: \"xml\""
    )]
    fn rejects_invalid_configs(#[case] text: &str, #[case] expected: &str) {
        let err = HookConfig::from_ini_str(text).expect_err("config must be rejected");
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn build_rejects_mode_mismatch() {
        let config = HookConfig::from_ini_str(FULL).expect("valid config");
        let err = config
            .build_sync(Arc::new(MemoryProducer::new()))
            .expect_err("async config cannot build a sync hook");
        assert!(matches!(
            err,
            ConfigError::ModeMismatch {
                configured: DeliveryKind::Async,
                requested: DeliveryKind::Sync,
            }
        ));
        assert!(
            config
                .build_async(Arc::new(MemoryAsyncProducer::with_capacity(8)))
                .is_ok()
        );
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(FULL.as_bytes()).expect("write config");
        let config = HookConfig::from_ini_file(file.path()).expect("load config");
        assert_eq!(config.topic, "app_logs");
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("absent.ini");
        let err = HookConfig::from_ini_file(&path).expect_err("missing file");
        assert!(matches!(err, ConfigError::NotFound(p) if p.ends_with("absent.ini")));
    }
}
