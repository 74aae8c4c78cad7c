use std::path::PathBuf;

use crate::SteamError;

/// Returns the Steam base directory on Windows using the registry.
pub(crate) fn get_base_dir() -> Result<PathBuf, SteamError> {
    // 32-bit view on 64-bit Windows first.
    let first_err = match read_steam_registry(r"SOFTWARE\Wow6432Node\Valve\Steam") {
        Ok(path) => return Ok(path),
        Err(e) => e,
    };

    match read_steam_registry(r"SOFTWARE\Valve\Steam") {
        Ok(path) => Ok(path),
        Err(SteamError::NotFound) => Err(first_err),
        Err(e) => Err(e),
    }
}

fn read_steam_registry(subkey: &str) -> Result<PathBuf, SteamError> {
    use std::io::ErrorKind;

    use winreg::RegKey;
    use winreg::enums::{HKEY_LOCAL_MACHINE, KEY_READ};

    let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
    let key = hklm
        .open_subkey_with_flags(subkey, KEY_READ)
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => SteamError::NotFound,
            _ => SteamError::Registry(format!("failed to open {subkey}: {e}")),
        })?;
    let install_path: String = key.get_value("InstallPath").map_err(|e| match e.kind() {
        ErrorKind::NotFound => SteamError::NotFound,
        _ => SteamError::Registry(format!("failed to read InstallPath in {subkey}: {e}")),
    })?;
    Ok(PathBuf::from(install_path))
}
