use std::path::Path;
use std::path::PathBuf;

/// `~` and `~/rest` resolve against the home directory; anything else is returned unchanged.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let expanded = match path.to_str() {
        Some("~") => dirs::home_dir(),
        Some(raw) => raw
            .strip_prefix("~/")
            .and_then(|rest| dirs::home_dir().map(|home| home.join(rest))),
        None => None,
    };
    expanded.unwrap_or_else(|| path.to_path_buf())
}

/// Expand `~` and make `path` absolute against the current directory.
pub fn resolve_output_path(path: &Path) -> std::io::Result<PathBuf> {
    std::path::absolute(expand_tilde(path))
}

/// Shorten paths under the home directory for log lines.
pub fn display_with_tilde(path: &Path) -> String {
    match dirs::home_dir().and_then(|home| path.strip_prefix(home).ok().map(Path::to_path_buf)) {
        Some(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Some(rest) => format!("~/{}", rest.display()),
        None => path.display().to_string(),
    }
}
