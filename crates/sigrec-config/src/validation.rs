use crate::{LoggingConfig, ReconcileConfig};

/// A semantic problem in an otherwise well-formed config.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    LoggingLevelInvalid { value: String, normalized: String },
    /// `logging.json` is set but no log sink is enabled.
    LoggingJsonWithoutSink,
}

impl ConfigWarning {
    pub fn toml_path(&self) -> &'static str {
        match self {
            ConfigWarning::LoggingLevelInvalid { .. } => "logging.level",
            ConfigWarning::LoggingJsonWithoutSink => "logging.json",
        }
    }

    pub fn message(&self) -> String {
        match self {
            ConfigWarning::LoggingLevelInvalid { value, normalized } => format!(
                "invalid logging level {value:?} (parsed as {normalized:?}); falling back to info"
            ),
            ConfigWarning::LoggingJsonWithoutSink => {
                "logging.json has no effect while logging.stderr is false".to_owned()
            }
        }
    }
}

impl ReconcileConfig {
    /// Semantic checks that parsing alone cannot catch.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut out = Vec::new();
        validate_logging(&self.logging, &mut out);
        out
    }
}

fn validate_logging(logging: &LoggingConfig, out: &mut Vec<ConfigWarning>) {
    let normalized = LoggingConfig::normalize_level_directives(&logging.level);
    if !logging.level.trim().is_empty()
        && tracing_subscriber::EnvFilter::try_new(normalized.clone()).is_err()
    {
        out.push(ConfigWarning::LoggingLevelInvalid {
            value: logging.level.clone(),
            normalized,
        });
    }
    if logging.json && !logging.stderr {
        out.push(ConfigWarning::LoggingJsonWithoutSink);
    }
}
