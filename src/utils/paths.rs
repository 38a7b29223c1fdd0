use crate::error::{Result, WatchError};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Ensures parent directories exist for a given path
///
/// # Errors
///
/// Returns [`WatchError::Write`] if the parent directories cannot be created
pub fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| WatchError::write(path, e))?;
    }
    Ok(())
}

/// Expands tilde in path to home directory
///
/// # Errors
///
/// Returns an error if the path starts with `~` and the home directory cannot be
/// determined
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => {
            let home = dirs::home_dir()
                .ok_or_else(|| WatchError::config("Could not find home directory"))?;
            Ok(home.join(components.as_path()))
        }
        _ => Ok(path.to_path_buf()),
    }
}

/// Makes a path absolute, resolving relative paths from current directory
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined
pub fn make_absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let current_dir = std::env::current_dir().map_err(|e| {
            WatchError::config(format!("Could not determine current directory: {e}"))
        })?;
        Ok(current_dir.join(path))
    }
}

/// Directory containing the running executable.
///
/// Default config, output and log locations are relative to it.
///
/// # Errors
///
/// Returns an error if the executable path cannot be determined
pub fn install_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe()
        .map_err(|e| WatchError::config(format!("Could not locate the executable: {e}")))?;
    Ok(exe
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf))
}

/// Render a relative path with `/` separators regardless of platform
#[must_use]
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
