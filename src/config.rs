use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use toml;

use crate::warn;

#[derive(Deserialize, Serialize, Default, Clone, Copy, Debug)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Keybindings {
    #[default]
    Emacs,
    Vi,
}

#[derive(Deserialize, Serialize, Default, Debug)]
pub(crate) struct Backend {
    pub api_base: Option<String>,
}

#[derive(Deserialize, Serialize, Default, Debug)]
pub(crate) struct Config {
    pub default_model: Option<String>,
    #[serde(default)]
    pub keybindings: Keybindings,
    #[serde(default)]
    pub backend: Backend,
}

fn get_config_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME");

    if let Some(home) = home {
        let home = PathBuf::from(home);

        const USER_PATHS: [&str; 2] = [".config/sidekick/config.toml", ".sidekick.toml"];

        for &path in USER_PATHS.iter() {
            let fullpath = home.join(path);

            if fullpath.exists() {
                return Some(fullpath);
            }
        }
    }

    let system_config = PathBuf::from("/etc/sidekick.toml");

    if system_config.exists() {
        Some(system_config)
    } else {
        None
    }
}

fn parse_config_or_die<S: serde::de::DeserializeOwned>(config: &str) -> S {
    let r: Result<S, toml::de::Error> = toml::de::from_str(config);

    match r {
        Ok(s) => s,
        Err(err) => die::die!("failed to parse config: {}", err),
    }
}

// Walks the user's raw document against the reserialized, known-good
// structure and warns about any key the latter does not contain.
fn warn_on_extra_keys(path: &mut Vec<String>, user: &toml::Table, known: &toml::Table) {
    for (key, user_value) in user {
        path.push(key.clone());

        match known.get(key) {
            Some(toml::Value::Table(known_table)) => {
                if let toml::Value::Table(user_table) = user_value {
                    warn_on_extra_keys(path, user_table, known_table);
                }
            }
            Some(_) => {}
            None => {
                warn!("config contains extraneous key \"{}\", ignoring", path.join("."));
            }
        }

        path.pop();
    }
}

fn warn_on_extra_fields(config: &Config, raw_config: &str) {
    let user_config: toml::Table = parse_config_or_die(raw_config);

    let known_config: toml::Table = {
        let reserialized = toml::ser::to_string(config).expect("failed to reserialize config");

        parse_config_or_die(&reserialized)
    };

    let mut path = Vec::new();

    warn_on_extra_keys(&mut path, &user_config, &known_config);
}

pub(crate) fn read_config(config: Option<PathBuf>) -> Config {
    let config_path = config.or_else(get_config_path);

    if let Some(path) = config_path {
        let raw_config = std::fs::read_to_string(path).expect("failed to read config");

        let config: Config = parse_config_or_die(&raw_config);

        warn_on_extra_fields(&config, &raw_config);

        config
    } else {
        Config::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_config() {
        let raw = r#"
default_model = "gemma:2b"
keybindings = "vi"

[backend]
api_base = "http://10.0.0.7:11434"
"#;

        let config: Config = toml::de::from_str(raw).unwrap();

        assert_eq!(config.default_model.as_deref(), Some("gemma:2b"));
        assert!(matches!(config.keybindings, Keybindings::Vi));
        assert_eq!(
            config.backend.api_base.as_deref(),
            Some("http://10.0.0.7:11434")
        );
    }

    #[test]
    fn an_empty_config_uses_defaults() {
        let config: Config = toml::de::from_str("").unwrap();

        assert!(config.default_model.is_none());
        assert!(matches!(config.keybindings, Keybindings::Emacs));
        assert!(config.backend.api_base.is_none());
    }
}
