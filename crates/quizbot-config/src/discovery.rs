//! Config file discovery.
//!
//! Two layers are merged, the later one winning field by field:
//! 1. the user file, `config.toml` in `QUIZBOT_CONFIG_DIR` or the platform
//!    config dir (`~/.config/quizbot` on Linux);
//! 2. the project file, `quizbot.toml` in the working directory.
//!
//! `--config <file>` bypasses discovery and is handled by the binary.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::{ConfigError, QuizbotConfig, Result};

const USER_FILE: &str = "config.toml";
const PROJECT_FILE: &str = "quizbot.toml";
const CONFIG_DIR_ENV: &str = "QUIZBOT_CONFIG_DIR";

/// Which config layer a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    User,
    Project,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Project => write!(f, "project"),
        }
    }
}

/// What happened when a layer was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerStatus {
    /// No file at the path; the layer contributes nothing.
    Missing,
    /// Parsed and merged.
    Loaded,
    /// Present but unreadable or not valid TOML; skipped.
    Malformed(String),
}

/// One checked layer.
#[derive(Debug, Clone)]
pub struct ConfigLayer {
    pub layer: Layer,
    pub path: PathBuf,
    pub status: LayerStatus,
}

/// Merged configuration plus what each layer did.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: QuizbotConfig,
    /// Checked layers, lowest precedence first.
    pub layers: Vec<ConfigLayer>,
}

impl LoadedConfig {
    /// Paths of the layers that were merged.
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.layers
            .iter()
            .filter(|l| l.status == LayerStatus::Loaded)
            .map(|l| l.path.as_path())
            .collect()
    }

    /// One message per malformed layer.
    pub fn warnings(&self) -> Vec<String> {
        self.layers
            .iter()
            .filter_map(|l| match &l.status {
                LayerStatus::Malformed(reason) => Some(format!(
                    "Ignoring {} config {}: {}",
                    l.layer,
                    l.path.display(),
                    reason
                )),
                _ => None,
            })
            .collect()
    }
}

/// Where to look for config layers.
#[derive(Debug, Clone)]
pub struct ConfigSearch {
    /// Directory holding the user `config.toml`, if one can be determined.
    pub user_dir: Option<PathBuf>,
    /// Directory holding the project `quizbot.toml`.
    pub project_dir: PathBuf,
}

impl ConfigSearch {
    /// User dir from `QUIZBOT_CONFIG_DIR` or the platform default; project
    /// dir is the working directory.
    pub fn from_env() -> Self {
        let user_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
            _ => dirs::config_dir().map(|d| d.join("quizbot")),
        };
        Self {
            user_dir,
            project_dir: PathBuf::from("."),
        }
    }

    /// Path of the user config file.
    pub fn user_file(&self) -> Option<PathBuf> {
        self.user_dir.as_ref().map(|d| d.join(USER_FILE))
    }

    /// Path of the project config file.
    pub fn project_file(&self) -> PathBuf {
        self.project_dir.join(PROJECT_FILE)
    }

    /// Read and merge every layer. Missing and malformed files never fail
    /// the load; they are recorded on the returned layers.
    pub fn load(&self) -> LoadedConfig {
        let mut config = QuizbotConfig::new();
        let mut layers = Vec::with_capacity(2);

        if let Some(path) = self.user_file() {
            layers.push(merge_layer(&mut config, Layer::User, path));
        }
        layers.push(merge_layer(&mut config, Layer::Project, self.project_file()));

        LoadedConfig { config, layers }
    }
}

/// Load config from a specific file path (no discovery).
pub fn load_config_file(path: &Path) -> Result<QuizbotConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    QuizbotConfig::from_toml(&contents)
}

fn merge_layer(config: &mut QuizbotConfig, layer: Layer, path: PathBuf) -> ConfigLayer {
    let status = if !path.is_file() {
        LayerStatus::Missing
    } else {
        match load_config_file(&path) {
            Ok(parsed) => {
                config.merge(parsed);
                LayerStatus::Loaded
            }
            Err(e) => LayerStatus::Malformed(e.to_string()),
        }
    };
    ConfigLayer {
        layer,
        path,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn search(user: &TempDir, project: &TempDir) -> ConfigSearch {
        ConfigSearch {
            user_dir: Some(user.path().to_path_buf()),
            project_dir: project.path().to_path_buf(),
        }
    }

    #[test]
    fn test_file_names() {
        let search = ConfigSearch {
            user_dir: Some(PathBuf::from("/home/u/.config/quizbot")),
            project_dir: PathBuf::from("/work"),
        };
        assert_eq!(
            search.user_file(),
            Some(PathBuf::from("/home/u/.config/quizbot/config.toml"))
        );
        assert_eq!(search.project_file(), PathBuf::from("/work/quizbot.toml"));
    }

    #[test]
    fn test_load_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[session]\nttl_minutes = 3\n").unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.session().ttl_minutes, 3);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let err = load_config_file(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "this is not valid toml {{{{").unwrap();

        let err = load_config_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_no_files_gives_defaults() {
        let user = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();

        let loaded = search(&user, &project).load();
        assert_eq!(loaded.config, QuizbotConfig::default());
        assert!(loaded.loaded_from().is_empty());
        assert!(loaded.warnings().is_empty());

        let order: Vec<_> = loaded.layers.iter().map(|l| (l.layer, &l.status)).collect();
        assert_eq!(
            order,
            vec![
                (Layer::User, &LayerStatus::Missing),
                (Layer::Project, &LayerStatus::Missing)
            ]
        );
    }

    #[test]
    fn test_project_overrides_user() {
        let user = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        fs::write(
            user.path().join("config.toml"),
            "[session]\nttl_minutes = 30\n\n[cache]\nmax_entries = 64\n",
        )
        .unwrap();
        fs::write(
            project.path().join("quizbot.toml"),
            "[session]\nttl_minutes = 5\n",
        )
        .unwrap();

        let loaded = search(&user, &project).load();
        let user_file = user.path().join("config.toml");
        let project_file = project.path().join("quizbot.toml");

        assert_eq!(loaded.config.session().ttl_minutes, 5);
        assert_eq!(loaded.config.cache().max_entries, 64);
        assert_eq!(
            loaded.loaded_from(),
            vec![user_file.as_path(), project_file.as_path()]
        );
    }

    #[test]
    fn test_malformed_layer_is_skipped() {
        let user = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        fs::write(user.path().join("config.toml"), "[cache]\nmax_entries = 8\n").unwrap();
        fs::write(project.path().join("quizbot.toml"), "not valid toml {{{{").unwrap();

        let loaded = search(&user, &project).load();

        assert_eq!(loaded.config.cache().max_entries, 8);
        assert!(matches!(loaded.layers[1].status, LayerStatus::Malformed(_)));
        let warnings = loaded.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Ignoring project config"));
    }

    #[test]
    fn test_without_user_dir_only_project_is_checked() {
        let project = TempDir::new().unwrap();
        let search = ConfigSearch {
            user_dir: None,
            project_dir: project.path().to_path_buf(),
        };

        let loaded = search.load();
        assert_eq!(loaded.layers.len(), 1);
        assert_eq!(loaded.layers[0].layer, Layer::Project);
    }
}
