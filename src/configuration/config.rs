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

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    AllowedTopics,
    Catalog,
    CompletionTimeout,
    CompletionURL,
    ConfigFile,
    StateDir,
}

impl ConfigKey {
    fn is_integer(&self) -> bool {
        return *self == ConfigKey::CompletionTimeout;
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

    fn app_dir(base: Option<path::PathBuf>) -> path::PathBuf {
        return base
            .unwrap_or_else(|| return path::PathBuf::from("."))
            .join("routinely");
    }

    /// Directory of the debug log, overridable with `ROUTINELY_LOG_DIR`.
    pub fn log_dir() -> path::PathBuf {
        if let Ok(dir) = env::var("ROUTINELY_LOG_DIR") {
            return path::PathBuf::from(dir);
        }

        return Config::app_dir(dirs::cache_dir());
    }

    pub fn default(key: ConfigKey) -> String {
        let res = match key {
            ConfigKey::AllowedTopics => "".to_string(),
            ConfigKey::Catalog => "".to_string(),
            ConfigKey::CompletionTimeout => "30000".to_string(),
            ConfigKey::CompletionURL => "http://localhost:8787".to_string(),

            // Special
            ConfigKey::ConfigFile => Config::app_dir(dirs::config_dir())
                .join("config.toml")
                .to_string_lossy()
                .to_string(),
            ConfigKey::StateDir => Config::app_dir(dirs::data_dir())
                .to_string_lossy()
                .to_string(),
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
            Config::apply_toml(&cmd, &toml_str)?;
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
            catalog = Config::get(ConfigKey::Catalog),
            completion_url = Config::get(ConfigKey::CompletionURL),
            completion_timeout = Config::get(ConfigKey::CompletionTimeout),
            state_dir = Config::get(ConfigKey::StateDir),
            "config"
        );

        return Ok(());
    }

    fn apply_toml(cmd: &Command, toml_str: &str) -> Result<()> {
        let doc = toml_str.parse::<toml_edit::Document>()?;

        for key in ConfigKey::iter() {
            let Some(val) = doc.get(&key.to_string()) else {
                continue;
            };

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
            } else if let Some(val_str) = val.as_str() {
                if val_str.is_empty() {
                    continue;
                }
                if key.is_integer() && val_str.parse::<u64>().is_err() {
                    bail!(format!(
                        "config.toml has an invalid value for key '{key}': {val_str}\nExpected a number."
                    ));
                }
                if !possible_values.is_empty() && !possible_values.contains(&val_str.to_string())
                {
                    bail!(format!("config.toml has an invalid value for key '{key}': {val_str}\nPossible values are: {}", possible_values.join(", ")));
                }
                Config::set(key, val_str);
            } else if let Some(val_arr) = val.as_array() {
                if key.is_integer() {
                    bail!(format!(
                        "config.toml has an invalid value for key '{key}'\nExpected a number."
                    ));
                }
                // Lists are only meaningful for comma separated keys.
                let joined = val_arr
                    .iter()
                    .filter_map(|e| return e.as_str())
                    .collect::<Vec<&str>>()
                    .join(",");
                Config::set(key, &joined);
            } else {
                bail!(format!(
                    "config.toml has an unsupported value type for key '{key}'"
                ));
            }
        }

        return Ok(());
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

                let mut val = Config::default(key);
                if val.is_empty() {
                    val = format!("# {key} = \"\"");
                } else if val.parse::<i64>().is_ok() {
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
