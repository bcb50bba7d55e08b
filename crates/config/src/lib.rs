//! Layered settings for the `facesort` command line.
//!
//! Values are merged from, lowest precedence first:
//! 1. built-in defaults,
//! 2. `facesort.toml`, `facesort.yaml` or `facesort.json` in the platform
//!    config directory, or a single file given explicitly,
//! 3. `FACESORT_*` environment variables (`FACESORT_EXCLUDE_HIDDEN=true`).
//!
//! Command line flags are applied on top by the binary.

pub mod error;

use crate::error::{ErrorKind, Result};
use derive_more::Display;
use directories::{BaseDirs, ProjectDirs, UserDirs};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const ENV_PREFIX: &str = "FACESORT_";
const FILE_STEM: &str = "facesort";
const DEFAULT_INTERCHANGE: &str = "photo_paths_by_person.csv";

/// Naming rules used for destination directories.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rules {
    #[default]
    #[display("windows")]
    Windows,
    #[display("posix")]
    Posix,
}
impl FromStr for Rules {
    type Err = ErrorKind;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "windows" => Ok(Self::Windows),
            "posix" => Ok(Self::Posix),
            other => Err(ErrorKind::Invalid(format!("unknown naming rules `{other}` (expected windows or posix)"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The recognition database written by the tagging application.
    pub database: PathBuf,
    /// Where `export` writes and `organize` reads the interchange file.
    pub interchange: PathBuf,
    /// Default destination root for `organize`.
    pub destination: Option<PathBuf>,
    pub rules: Rules,
    /// Leave hidden persons and faces out of exports.
    pub exclude_hidden: bool,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            interchange: default_interchange(),
            destination: None,
            rules: Rules::default(),
            exclude_hidden: false,
        }
    }
}
impl Config {
    /// Loads the configuration, reading `explicit` instead of the files in
    /// the platform config directory when given.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(explicit)?
            .extract()
            .or_raise(|| ErrorKind::Invalid("cannot parse configuration".to_string()))?;
        config.validate()?;
        tracing::debug!(?config, "Loaded configuration");
        Ok(config)
    }

    /// The merged providers, without extracting.
    pub fn figment(explicit: Option<&Path>) -> Result<Figment> {
        let figment = Figment::from(Serialized::defaults(Self::default()));
        let figment = match explicit {
            Some(path) => {
                if !path.is_file() {
                    exn::bail!(ErrorKind::Load(path.to_path_buf()));
                }
                merge_file(figment, path)?
            },
            None => match config_dir() {
                // Missing files are skipped by the providers.
                Some(dir) => figment
                    .merge(Toml::file(dir.join(format!("{FILE_STEM}.toml"))))
                    .merge(Yaml::file(dir.join(format!("{FILE_STEM}.yaml"))))
                    .merge(Json::file(dir.join(format!("{FILE_STEM}.json")))),
                None => figment,
            },
        };
        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Invalid("database path is empty".to_string()));
        }
        if self.interchange.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Invalid("interchange path is empty".to_string()));
        }
        if let Some(destination) = &self.destination
            && destination.as_os_str().is_empty()
        {
            exn::bail!(ErrorKind::Invalid("destination path is empty".to_string()));
        }
        Ok(())
    }
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    let extension = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    Ok(match extension.as_deref() {
        Some("toml") => figment.merge(Toml::file_exact(path)),
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
        Some("json") => figment.merge(Json::file_exact(path)),
        _ => exn::bail!(ErrorKind::Load(path.to_path_buf())),
    })
}

/// Platform config directory, e.g. `~/.config/facesort`.
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", FILE_STEM).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Where the tagging application keeps its database (`%APPDATA%` on Windows).
fn default_database() -> PathBuf {
    let relative = Path::new("facial_recognition").join("face_data").join("metadata.db");
    match BaseDirs::new() {
        Some(dirs) => dirs.data_dir().join(relative),
        None => relative,
    }
}

fn default_interchange() -> PathBuf {
    match UserDirs::new() {
        Some(dirs) => dirs.desktop_dir().unwrap_or(dirs.home_dir()).join(DEFAULT_INTERCHANGE),
        None => PathBuf::from(DEFAULT_INTERCHANGE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.database.ends_with("facial_recognition/face_data/metadata.db"));
        assert!(config.interchange.ends_with(DEFAULT_INTERCHANGE));
        assert_eq!(config.destination, None);
        assert_eq!(config.rules, Rules::Windows);
        assert!(!config.exclude_hidden);
        config.validate().unwrap();
    }

    #[rstest]
    #[case("facesort.toml", "database = \"/data/metadata.db\"\nrules = \"posix\"\nexclude_hidden = true\n")]
    #[case("facesort.yaml", "database: /data/metadata.db\nrules: posix\nexclude_hidden: true\n")]
    #[case("facesort.yml", "database: /data/metadata.db\nrules: posix\nexclude_hidden: true\n")]
    #[case("facesort.json", r#"{"database": "/data/metadata.db", "rules": "posix", "exclude_hidden": true}"#)]
    fn test_explicit_file(#[case] name: &str, #[case] contents: &str) {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, name, contents);
        let config: Config = Config::figment(Some(path.as_path())).unwrap().extract().unwrap();
        assert_eq!(config.database, PathBuf::from("/data/metadata.db"));
        assert_eq!(config.rules, Rules::Posix);
        assert!(config.exclude_hidden);
        // Untouched settings keep their defaults.
        assert_eq!(config.interchange, Config::default().interchange);
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facesort.toml");
        let err = Config::load(Some(path.as_path())).unwrap_err();
        assert_eq!(*err, ErrorKind::Load(path));
    }

    #[test]
    fn test_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "facesort.ini", "database = x");
        let err = Config::load(Some(path.as_path())).unwrap_err();
        assert_eq!(*err, ErrorKind::Load(path));
    }

    #[test]
    fn test_invalid_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "facesort.toml", "rules = \"amiga\"\n");
        let err = Config::load(Some(path.as_path())).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid(_)));
    }

    #[test]
    fn test_empty_path_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "facesort.toml", "destination = \"\"\n");
        let err = Config::load(Some(path.as_path())).unwrap_err();
        assert_eq!(*err, ErrorKind::Invalid("destination path is empty".to_string()));
    }

    #[rstest]
    #[case("windows", Rules::Windows)]
    #[case("Windows", Rules::Windows)]
    #[case("POSIX", Rules::Posix)]
    fn test_rules_from_str(#[case] input: &str, #[case] expected: Rules) {
        assert_eq!(input.parse::<Rules>().unwrap(), expected);
        assert_eq!(expected.to_string().parse::<Rules>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_rules() {
        assert!(matches!("dos".parse::<Rules>(), Err(ErrorKind::Invalid(_))));
    }
}
