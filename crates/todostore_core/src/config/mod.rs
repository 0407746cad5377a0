use crate::error::AppError;
use crate::model::Priority;
use crate::task_api::Tab;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "TODOSTORE_CONFIG_PATH";

/// Terminal colours for each priority, mirroring the red/yellow/green badges.
#[derive(Debug, Clone)]
pub struct Palette {
    pub high: &'static str,
    pub medium: &'static str,
    pub low: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn paint_priority(&self, priority: Priority) -> String {
        let colour = match priority {
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
        };
        if colour.is_empty() {
            priority.as_str().to_string()
        } else {
            format!("{}{}{}", colour, priority.as_str(), self.reset)
        }
    }
}

pub fn palette_for_theme(theme: Option<&str>) -> Palette {
    match theme.and_then(canonical_theme_name).as_deref() {
        Some("noir") => Palette {
            high: "\x1b[38;5;203m",
            medium: "\x1b[38;5;221m",
            low: "\x1b[38;5;114m",
            reset: "\x1b[0m",
        },
        Some("solarized") => Palette {
            high: "\x1b[38;5;160m",
            medium: "\x1b[38;5;136m",
            low: "\x1b[38;5;64m",
            reset: "\x1b[0m",
        },
        _ => Palette {
            high: "",
            medium: "",
            low: "",
            reset: "",
        },
    }
}

pub fn canonical_theme_name(raw: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    match cleaned.trim_matches('_') {
        "" | "vanilla" | "light" | "plain" => Some("default".to_string()),
        "dark" | "dark_mode" | "darkmode" => Some("noir".to_string()),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub default_tab: Option<Tab>,
}

impl Config {
    pub fn tab(&self) -> Tab {
        self.default_tab.unwrap_or_default()
    }

    pub fn palette(&self) -> Palette {
        palette_for_theme(self.theme.as_deref())
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub theme: Option<String>,
    pub default_tab: Option<Tab>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("todostore")
            .join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("todostore")
            .join(CONFIG_FILE_NAME))
    }
}

/// Loads the config file, falling back to defaults when it is absent or broken.
pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable config");
            ConfigLoad {
                config: Config::default(),
                error: Some(err),
            }
        }
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let mut config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    config.theme = config.theme.and_then(|name| canonical_theme_name(&name));
    Ok(config)
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(theme) = overrides.theme.as_deref() {
        merged.theme = canonical_theme_name(theme);
    }
    if let Some(tab) = overrides.default_tab {
        merged.default_tab = Some(tab);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::{
        Config, ConfigOverrides, canonical_theme_name, load_config_from_path,
        load_config_with_fallback_from_path, merge_overrides, palette_for_theme,
    };
    use crate::model::Priority;
    use crate::task_api::Tab;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("todostore-{nanos}-{file_name}"))
    }

    #[test]
    fn missing_config_gives_defaults_without_error() {
        let path = temp_path("missing-config.json");
        let result = load_config_with_fallback_from_path(&path);

        assert_eq!(result.config, Config::default());
        assert!(result.error.is_none());
        assert_eq!(result.config.tab(), Tab::Open);
    }

    #[test]
    fn invalid_config_gives_defaults_and_error() {
        let path = temp_path("invalid-config.json");
        fs::write(&path, "{ invalid json ").unwrap();

        let result = load_config_with_fallback_from_path(&path);
        fs::remove_file(&path).ok();

        assert_eq!(result.config, Config::default());
        assert_eq!(result.error.unwrap().code(), "invalid_data");
    }

    #[test]
    fn reads_theme_and_default_tab() {
        let path = temp_path("valid-config.json");
        let content = serde_json::json!({
            "theme": "Dark Mode",
            "default_tab": "completed"
        });
        fs::write(&path, serde_json::to_string(&content).unwrap()).unwrap();

        let loaded = load_config_from_path(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded.theme.as_deref(), Some("noir"));
        assert_eq!(loaded.tab(), Tab::Completed);
    }

    #[test]
    fn unknown_tab_is_invalid_data() {
        let path = temp_path("bad-tab.json");
        fs::write(&path, r#"{ "default_tab": "someday" }"#).unwrap();

        let err = load_config_from_path(&path).unwrap_err();
        fs::remove_file(&path).ok();

        assert_eq!(err.code(), "invalid_data");
    }

    #[test]
    fn overrides_replace_only_what_they_set() {
        let base = Config {
            theme: Some("solarized".into()),
            default_tab: Some(Tab::Completed),
        };

        let merged = merge_overrides(
            &base,
            &ConfigOverrides {
                theme: Some("light".into()),
                default_tab: None,
            },
        );

        assert_eq!(merged.theme.as_deref(), Some("default"));
        assert_eq!(merged.default_tab, Some(Tab::Completed));
        assert_eq!(base.theme.as_deref(), Some("solarized"));
        assert_eq!(merge_overrides(&base, &ConfigOverrides::default()), base);
    }

    #[test]
    fn canonical_theme_name_maps_variants() {
        assert_eq!(canonical_theme_name("Vanilla"), Some("default".into()));
        assert_eq!(canonical_theme_name("Noir"), Some("noir".into()));
        assert_eq!(canonical_theme_name("dark-mode"), Some("noir".into()));
        assert_eq!(canonical_theme_name("  "), Some("default".into()));
    }

    #[test]
    fn palette_paints_priorities() {
        let plain = palette_for_theme(Some("vanilla"));
        assert_eq!(plain.paint_priority(Priority::High), "high");

        let noir = palette_for_theme(Some("noir"));
        assert_eq!(noir.paint_priority(Priority::Low), "\x1b[38;5;114mlow\x1b[0m");

        let unknown = palette_for_theme(Some("oceanic"));
        assert!(unknown.high.is_empty());
    }
}
