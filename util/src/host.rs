//! Host platform utility functions

use std::path::PathBuf;

/// Name of the environment variable pointing at the software root.
pub const SW_ROOT_ENV_VAR: &str = "GVF_SW_ROOT";

/// Get the root directory of the software, as set by the `GVF_SW_ROOT`
/// environment variable.
///
/// Parameter files and session directories are resolved relative to this
/// root.
pub fn get_sw_root() -> Result<PathBuf, std::env::VarError> {
    std::env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
