// src/infra/paths.rs — Config path resolution
//
// AEROFORGE_HOME overrides everything. Otherwise config lives in ~/.aeroforge/.

use std::path::PathBuf;

/// Returns the AEROFORGE_HOME override, if set.
fn aeroforge_home() -> Option<PathBuf> {
    std::env::var_os("AEROFORGE_HOME").map(PathBuf::from)
}

/// Home directory, if one can be determined.
pub fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

/// Configuration directory: $AEROFORGE_HOME/ or ~/.aeroforge/
pub fn config_dir() -> Option<PathBuf> {
    if let Some(home) = aeroforge_home() {
        return Some(home);
    }
    dirs_home().map(|h| h.join(".aeroforge"))
}

/// Default config file location.
pub fn config_file_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}
