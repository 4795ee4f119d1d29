use crate::error::{PatternError, Result};
use crate::flyweight::{FlyweightRegistry, SharedState, DEFAULT_SEPARATOR};
use crate::observer::DEFAULT_MESSAGE;
use crate::sequence::ObserverSequence;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub flyweight: FlyweightConfig,
    pub observer: ObserverConfig,
    pub logging: LoggingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FlyweightConfig {
    pub separator: String,
    pub preload: Vec<SharedState>,
    pub capacity: Option<usize>,
}

impl Default for FlyweightConfig {
    fn default() -> Self {
        FlyweightConfig {
            separator: DEFAULT_SEPARATOR.to_string(),
            preload: vec![
                SharedState::new("Chevrolet", "Camaro", "pink"),
                SharedState::new("Mercedes Benz", "C300", "black"),
                SharedState::new("Mercedes Benz", "C500", "red"),
                SharedState::new("BMW", "M5", "red"),
                SharedState::new("BMW", "X6", "white"),
            ],
            capacity: None,
        }
    }
}

impl FlyweightConfig {
    pub fn registry(&self) -> FlyweightRegistry {
        let mut registry = FlyweightRegistry::with_separator(self.separator.clone());
        registry.extend(self.preload.iter().cloned());
        registry
    }

    fn distinct_preloaded(&self) -> usize {
        self.preload
            .iter()
            .map(|state| state.key(&self.separator))
            .collect::<HashSet<_>>()
            .len()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    pub default_message: String,
    pub first_number: u64,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        ObserverConfig {
            default_message: DEFAULT_MESSAGE.to_string(),
            first_number: 0,
        }
    }
}

impl ObserverConfig {
    pub fn sequence(&self) -> ObserverSequence {
        ObserverSequence::starting_at(self.first_number)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG`.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "warn".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig { color: true }
    }
}

impl DemoConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: DemoConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: DemoConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Picks the format from the extension, falling back to sniffing the
    /// first non-blank character.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|err| PatternError::io(path, err))?;

        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match format.as_deref() {
            Some("json") => Self::from_json_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            _ => {
                if content.trim_start().starts_with('{') {
                    Self::from_json_str(&content)
                } else {
                    Self::from_toml_str(&content)
                }
            }
        }
    }

    /// Loads `path` if one was given, otherwise the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.flyweight.separator.is_empty() {
            return Err(PatternError::invalid_config(
                "flyweight.separator",
                "must not be empty",
            ));
        }

        if self.observer.first_number == u64::MAX {
            return Err(PatternError::invalid_config(
                "observer.first_number",
                format!("must be below {}, the first observer needs a number after it", u64::MAX),
            ));
        }

        if let Some(capacity) = self.flyweight.capacity {
            let preloaded = self.flyweight.distinct_preloaded();
            if capacity < preloaded {
                return Err(PatternError::invalid_config(
                    "flyweight.capacity",
                    format!("{capacity} is smaller than the {preloaded} preloaded flyweights"),
                ));
            }
        }

        Ok(())
    }
}
