//! File persistence helpers.
//!
//! The configuration file holds API keys, so it is written atomically and
//! kept owner-readable only.

use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ConfigError;

// ============================================================================
// Default Paths
// ============================================================================

/// Returns the default configuration directory.
///
/// - Linux: `~/.config/gemrelay`
/// - macOS: `~/Library/Application Support/gemrelay`
/// - Windows: `%APPDATA%\gemrelay`
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|c| c.join("gemrelay"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns the default configuration file path.
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yml")
}

// ============================================================================
// Security: File Permissions
// ============================================================================

/// Sets owner-only permissions (0o600) on Unix systems.
#[cfg(unix)]
async fn set_restrictive_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = tokio::fs::metadata(path).await?.permissions();
    perms.set_mode(0o600);
    tokio::fs::set_permissions(path, perms).await?;

    debug!(path = %path.display(), mode = "0600", "Set restrictive permissions");
    Ok(())
}

/// Sets owner-only directory permissions (0o700) on Unix systems.
#[cfg(unix)]
async fn set_restrictive_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = tokio::fs::metadata(path).await?.permissions();
    perms.set_mode(0o700);
    tokio::fs::set_permissions(path, perms).await?;

    debug!(path = %path.display(), mode = "0700", "Set restrictive directory permissions");
    Ok(())
}

#[cfg(not(unix))]
async fn set_restrictive_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(not(unix))]
async fn set_restrictive_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ============================================================================
// File Operations
// ============================================================================

/// Creates the parent directory of `path` if it is missing.
async fn create_parent_dir(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!(path = %parent.display(), "Creating config directory");
            tokio::fs::create_dir_all(parent).await?;
            set_restrictive_dir_permissions(parent).await?;
        }
    }
    Ok(())
}

/// Writes text to `path` atomically with owner-only permissions.
///
/// Parent directories are created as needed.
pub async fn write_secure(path: &Path, content: &str) -> Result<(), ConfigError> {
    create_parent_dir(path).await?;

    let temp_path = path.with_extension("yml.tmp");
    tokio::fs::write(&temp_path, content).await?;
    set_restrictive_permissions(&temp_path).await?;
    tokio::fs::rename(&temp_path, path).await?;

    debug!(path = %path.display(), bytes = content.len(), "File saved securely");
    Ok(())
}

/// Serializes `data` as YAML and saves it with [`write_secure`].
pub async fn save_yaml<T: Serialize>(path: &Path, data: &T) -> Result<(), ConfigError> {
    debug!(path = %path.display(), "Saving YAML file");
    let yaml = serde_yaml::to_string(data)?;
    write_secure(path, &yaml).await
}

/// Loads a YAML file.
pub async fn load_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    debug!(path = %path.display(), "Loading YAML file");

    let content = tokio::fs::read_to_string(path).await?;
    let data = serde_yaml::from_str(&content)?;

    Ok(data)
}
