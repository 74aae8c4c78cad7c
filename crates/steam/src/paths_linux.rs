use std::path::PathBuf;

use crate::SteamError;

/// Returns the Steam base directory on Linux.
///
/// There is no registry, so the usual install locations under `$HOME`
/// are probed in order.
pub(crate) fn get_base_dir() -> Result<PathBuf, SteamError> {
    let home = std::env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or(SteamError::NotFound)?;

    candidates(&home)
        .into_iter()
        .find(|dir| dir.exists())
        .ok_or(SteamError::NotFound)
}

fn candidates(home: &std::path::Path) -> Vec<PathBuf> {
    vec![
        home.join(".steam").join("steam"),
        home.join(".local").join("share").join("Steam"),
        // Flatpak
        home.join(".var")
            .join("app")
            .join("com.valvesoftware.Steam")
            .join(".steam")
            .join("steam"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_order() {
        let c = candidates(std::path::Path::new("/home/deck"));
        assert_eq!(c[0], PathBuf::from("/home/deck/.steam/steam"));
        assert_eq!(c[1], PathBuf::from("/home/deck/.local/share/Steam"));
        assert!(c[2].ends_with("com.valvesoftware.Steam/.steam/steam"));
    }
}
