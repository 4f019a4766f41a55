#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::env;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::fs;

use crate::domain::models::AgentMode;
use crate::domain::models::GenerationConfig;
use crate::domain::models::GenerationMode;
use crate::domain::models::NumericField;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    AgentMode,
    BackendHealthCheckTimeout,
    BackendHost,
    BackendPort,
    ConfigFile,
    DownloadDir,
    FrequencyPenalty,
    MaxIterations,
    MaxTokens,
    Mode,
    Model,
    PresencePenalty,
    StoreFile,
    Temperature,
    Theme,
    TopP,
}

/// Root directory for the store file and debug logs.
pub fn cache_dir() -> path::PathBuf {
    return dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join("mapscribe");
}

/// Directory for `debug.log`, overridable with `MAPSCRIBE_LOG_DIR`.
pub fn log_dir() -> path::PathBuf {
    if let Ok(dir) = env::var("MAPSCRIBE_LOG_DIR") {
        return path::PathBuf::from(dir);
    }

    return cache_dir();
}

fn numeric_key(field: NumericField) -> ConfigKey {
    match field {
        NumericField::Temperature => return ConfigKey::Temperature,
        NumericField::MaxTokens => return ConfigKey::MaxTokens,
        NumericField::TopP => return ConfigKey::TopP,
        NumericField::FrequencyPenalty => return ConfigKey::FrequencyPenalty,
        NumericField::PresencePenalty => return ConfigKey::PresencePenalty,
        NumericField::MaxIterations => return ConfigKey::MaxIterations,
    }
}

pub struct Config {}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    pub fn default(key: ConfigKey) -> String {
        let defaults = GenerationConfig::default();

        #[cfg(not(target_os = "macos"))]
        let config_path = dirs::config_dir()
            .unwrap_or_else(env::temp_dir)
            .join("mapscribe/config.toml");
        #[cfg(target_os = "macos")]
        let config_path = dirs::home_dir()
            .unwrap_or_else(env::temp_dir)
            .join(".config/mapscribe/config.toml");

        let res = match key {
            ConfigKey::AgentMode => defaults.agent_mode.to_string(),
            ConfigKey::BackendHealthCheckTimeout => "1000".to_string(),
            ConfigKey::BackendHost => "localhost".to_string(),
            ConfigKey::Mode => defaults.mode.to_string(),
            ConfigKey::Model => defaults.model.to_string(),
            ConfigKey::Theme => "base16-ocean.dark".to_string(),
            ConfigKey::FrequencyPenalty
            | ConfigKey::MaxIterations
            | ConfigKey::MaxTokens
            | ConfigKey::PresencePenalty
            | ConfigKey::Temperature
            | ConfigKey::TopP => {
                let field = NumericField::iter()
                    .find(|e| return numeric_key(*e) == key)
                    .unwrap_or(NumericField::Temperature);
                defaults.readout(field)
            }

            // Special
            ConfigKey::BackendPort => "".to_string(),
            ConfigKey::ConfigFile => config_path.to_string_lossy().to_string(),
            ConfigKey::DownloadDir => env::current_dir()
                .unwrap_or_else(|_| return path::PathBuf::from("."))
                .to_string_lossy()
                .to_string(),
            ConfigKey::StoreFile => cache_dir().join("store.json").to_string_lossy().to_string(),
        };

        return res;
    }

    pub async fn load(cmd: Command, clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key))
        }

        let mut config_file = Config::default(ConfigKey::ConfigFile);
        for matches in clap_arg_matches.as_slice() {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }

        let config_path = path::PathBuf::from(config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(config_path).await?;
            let doc = toml_str.parse::<toml_edit::Document>()?;

            for key in ConfigKey::iter() {
                if let Some(val) = doc.get(&key.to_string()) {
                    // Use clap value parsers to do validation.
                    let mut possible_values = vec![];
                    if let Some(arg) = cmd
                        .get_arguments()
                        .find(|e| return e.get_long() == Some(key.to_string().as_str()))
                    {
                        possible_values = arg
                            .get_possible_values()
                            .iter()
                            .map(|e| return e.get_name().to_string())
                            .collect::<Vec<String>>();
                    }

                    if let Some(val_int) = val.as_integer() {
                        Config::set(key, &val_int.to_string());
                    } else if let Some(val_float) = val.as_float() {
                        Config::set(key, &val_float.to_string());
                    } else if let Some(val_str) = val.as_str() {
                        if val_str.is_empty() {
                            continue;
                        }
                        if !possible_values.is_empty()
                            && !possible_values.contains(&val_str.to_string())
                        {
                            bail!(format!("config.toml has an invalid value for key '{key}': {val_str}\nPossible values are: {}", possible_values.join(", ")));
                        }
                        Config::set(key, val_str);
                    } else {
                        bail!(format!("config.toml has an invalid value for key '{key}'"));
                    }
                }
            }
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    Config::set(key, val)
                }
            }
        }

        tracing::debug!(
            backend_host = Config::get(ConfigKey::BackendHost),
            backend_port = Config::get(ConfigKey::BackendPort),
            mode = Config::get(ConfigKey::Mode),
            model = Config::get(ConfigKey::Model),
            agent_mode = Config::get(ConfigKey::AgentMode),
            theme = Config::get(ConfigKey::Theme),
            store_file = Config::get(ConfigKey::StoreFile),
            "config"
        );

        return Ok(());
    }

    /// Port given on the command line, environment or config file, if any.
    pub fn backend_port() -> Result<Option<u16>> {
        let raw = Config::get(ConfigKey::BackendPort);
        if raw.trim().is_empty() {
            return Ok(None);
        }

        match raw.trim().parse::<u16>() {
            Ok(port) => return Ok(Some(port)),
            Err(_) => bail!(format!("Invalid value for '{}': {raw}", ConfigKey::BackendPort)),
        }
    }

    pub fn health_check_timeout() -> Result<u64> {
        let raw = Config::get(ConfigKey::BackendHealthCheckTimeout);
        match raw.trim().parse::<u64>() {
            Ok(timeout) => return Ok(timeout),
            Err(_) => bail!(format!(
                "Invalid value for '{}': {raw}",
                ConfigKey::BackendHealthCheckTimeout
            )),
        }
    }

    /// Seeds the generation parameters from the loaded startup values.
    /// Out-of-range numbers are clamped, non-numeric values fail.
    pub fn generation_config() -> Result<GenerationConfig> {
        let mut config = GenerationConfig {
            model: Config::get(ConfigKey::Model),
            mode: GenerationMode::parse(&Config::get(ConfigKey::Mode)),
            ..GenerationConfig::default()
        };

        let agent_mode = Config::get(ConfigKey::AgentMode);
        config.agent_mode = match agent_mode.parse::<AgentMode>() {
            Ok(agent_mode) => agent_mode,
            Err(_) => bail!(format!(
                "Invalid value for '{}': {agent_mode}",
                ConfigKey::AgentMode
            )),
        };

        for field in NumericField::iter() {
            config.parse_numeric(field, &Config::get(numeric_key(field)))?;
        }

        return Ok(config);
    }

    pub fn serialize_default(cmd: Command) -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::ConfigFile {
                    return None;
                }

                let arg = cmd
                    .get_arguments()
                    .find(|e| return e.get_long() == Some(key.to_string().as_str()))?;

                let mut description = arg
                    .get_help()
                    .map(|e| return e.to_string())
                    .unwrap_or_default();

                description = description
                    .split("[default:")
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                if !arg.get_possible_values().is_empty() {
                    let possible_values = arg
                        .get_possible_values()
                        .iter()
                        .map(|e| return e.get_name())
                        .collect::<Vec<_>>()
                        .join(", ");
                    description = format!("{description} [possible values: {}]", possible_values);
                }

                let mut val = Config::default(key);
                if key == ConfigKey::DownloadDir || key == ConfigKey::StoreFile || val.is_empty() {
                    val = format!("# {key} = \"\"");
                } else if val.parse::<f64>().is_ok() {
                    val = format!("{key} = {val}");
                } else {
                    val = format!("{key} = \"{val}\"");
                }

                return Some(format!("# {description}\n{val}"));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }
}
