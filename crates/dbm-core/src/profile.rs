//! Connection profiles and their on-disk store.
//!
//! A profile holds everything needed to reach one target database plus the
//! migrations root it is managed from. Profiles are saved as YAML, one file
//! per alias, in the dbmarshal home directory (`$DBMARSHAL_HOME`, defaulting
//! to `~/.dbmarshal`).

use crate::error::{CoreError, CoreResult};
use crate::layout::MigrationsRoot;
use crate::newtype_string::define_newtype_string;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable overriding the profile directory.
pub const HOME_ENV: &str = "DBMARSHAL_HOME";

/// Default profile directory name under the user's home.
pub const DEFAULT_HOME_DIR: &str = ".dbmarshal";

define_newtype_string! {
    /// Name a profile is saved under.
    pub struct ProfileAlias;
}

impl ProfileAlias {
    /// Parse an alias, allowing only `[A-Za-z0-9_-]`.
    pub fn parse(alias: &str) -> CoreResult<Self> {
        let valid = !alias.is_empty()
            && alias
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(CoreError::InvalidAlias {
                alias: alias.to_string(),
            });
        }
        Self::try_new(alias).ok_or_else(|| CoreError::InvalidAlias {
            alias: alias.to_string(),
        })
    }
}

/// Database driver a profile connects with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    /// MySQL / MariaDB server
    #[default]
    Mysql,
    /// Embedded DuckDB file; `database` is the file path
    Duckdb,
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Driver::Mysql => write!(f, "mysql"),
            Driver::Duckdb => write!(f, "duckdb"),
        }
    }
}

fn default_port() -> u16 {
    3306
}

/// Fully resolved connection settings for one target database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionProfile {
    pub hostname: String,

    #[serde(default = "default_port")]
    pub port: u16,

    pub username: String,

    pub password: String,

    /// Database (schema) name
    pub database: String,

    /// Migrations root containing `revisions/` and `statics/`
    pub directory: PathBuf,

    #[serde(default)]
    pub driver: Driver,
}

impl ConnectionProfile {
    pub fn migrations_root(&self) -> MigrationsRoot {
        MigrationsRoot::new(&self.directory)
    }

    /// Password replaced by one `*` per character, for display.
    pub fn masked_password(&self) -> String {
        "*".repeat(self.password.chars().count())
    }
}

/// Directory of saved profiles.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    home: PathBuf,
}

impl ProfileStore {
    /// Use an explicit profile directory.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Resolve the profile directory from `DBMARSHAL_HOME` or `~/.dbmarshal`.
    pub fn from_env() -> CoreResult<Self> {
        let env_home = std::env::var(HOME_ENV).ok().filter(|v| !v.is_empty());
        match env_home {
            Some(home) => Ok(Self::new(home)),
            None => {
                let mut home = dirs::home_dir()
                    .ok_or_else(|| CoreError::HomeNotFound("no home directory".to_string()))?;
                home.push(DEFAULT_HOME_DIR);
                Ok(Self::new(home))
            }
        }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// File a profile alias is stored in.
    pub fn profile_path(&self, alias: &ProfileAlias) -> PathBuf {
        self.home.join(format!("{alias}.yml"))
    }

    /// Save `profile` under `alias`, replacing any previous profile.
    pub fn save(&self, alias: &ProfileAlias, profile: &ConnectionProfile) -> CoreResult<PathBuf> {
        std::fs::create_dir_all(&self.home).map_err(|e| CoreError::io(&self.home, e))?;
        let path = self.profile_path(alias);
        let yaml = serde_yaml::to_string(profile)?;
        write_private(&path, &yaml).map_err(|e| CoreError::io(&path, e))?;
        log::debug!("Saved profile '{}' to {}", alias, path.display());
        Ok(path)
    }

    /// Load the profile saved under `alias`.
    pub fn load(&self, alias: &ProfileAlias) -> CoreResult<ConnectionProfile> {
        let path = self.profile_path(alias);
        if !path.is_file() {
            return Err(CoreError::ProfileNotFound {
                alias: alias.to_string(),
                path: self.home.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(&path).map_err(|e| CoreError::io(&path, e))?;
        serde_yaml::from_str(&content).map_err(|source| CoreError::ProfileParse {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Profiles contain a plaintext password; the file is created owner-only
/// and narrowed before any content is written when it already exists.
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        options.mode(0o600);
        let file = options.open(path)?;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        write_all(file, contents)
    }
    #[cfg(not(unix))]
    {
        write_all(options.open(path)?, contents)
    }
}

fn write_all(mut file: std::fs::File, contents: &str) -> std::io::Result<()> {
    use std::io::Write;
    file.write_all(contents.as_bytes())?;
    file.flush()
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
