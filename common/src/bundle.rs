//! Bundle repository layout: `<root>/<sanitizedGameName>/<version>/...`.

use std::path::{Path, PathBuf};

/// Strips everything outside `[A-Za-z0-9 _-]`, trims, replaces spaces with
/// underscores, and falls back to `unnamed_game` if nothing is left —
/// matching the filesystem-safe naming the game bundle directories use.
pub fn sanitize_name(name: &str) -> String {
    let filtered: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ' || *c == '_' || *c == '-')
        .collect();
    let trimmed = filtered.trim();
    if trimmed.is_empty() {
        return "unnamed_game".to_string();
    }
    trimmed.replace(' ', "_")
}

/// The directory holding every version of a game's bundle.
pub fn game_dir(root: &Path, game_name: &str) -> PathBuf {
    root.join(sanitize_name(game_name))
}

/// The on-disk directory for one version of a game's bundle.
pub fn version_dir(root: &Path, game_name: &str, version: &str) -> PathBuf {
    game_dir(root, game_name).join(version)
}

/// Checks a version string against the required `major.minor.patch`
/// numeric format (e.g. `1.0.0`). No pre-release or build metadata.
pub fn is_valid_version(version: &str) -> bool {
    let parts: Vec<&str> = version.split('.').collect();
    parts.len() == 3 && parts.iter().all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod test {
    use super::*;

    /// Disallowed characters are stripped, interior spaces become
    /// underscores, and surrounding whitespace is trimmed.
    #[test]
    fn test_sanitize_typical_name() {
        assert_eq!(sanitize_name("  My Game! 2.0  "), "My_Game_20");
    }

    /// A name with nothing left after filtering falls back to the
    /// default rather than producing an empty path segment.
    #[test]
    fn test_sanitize_empty_falls_back() {
        assert_eq!(sanitize_name("!!!"), "unnamed_game");
    }

    #[test]
    fn test_is_valid_version() {
        assert!(is_valid_version("1.0.0"));
        assert!(is_valid_version("10.2.33"));
        assert!(!is_valid_version("1.0"));
        assert!(!is_valid_version("1.0.0-beta"));
        assert!(!is_valid_version("v1.0.0"));
        assert!(!is_valid_version(""));
    }
}
