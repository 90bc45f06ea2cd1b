//! Download path construction
//!
//! Folder and file names are derived from remote titles, so everything goes
//! through [`sanitize_name`] before it touches the filesystem.

use std::path::{Path, PathBuf};

use crate::app::models::Track;
use crate::constants::files;

/// Remove characters that are invalid in file names on common platforms
///
/// Strips `\ / * ? : " < > |`, keeps every other character in order, and trims
/// surrounding whitespace.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !files::FORBIDDEN_NAME_CHARS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Folder name for a collection: `"<title> [<id>]"`, sanitized
pub fn collection_folder_name(title: &str, id: &str) -> String {
    sanitize_name(&format!("{} [{}]", title, id))
}

/// Full destination folder for a collection under the download root
pub fn collection_folder(root: &Path, title: &str, id: &str) -> PathBuf {
    root.join(collection_folder_name(title, id))
}

/// File name for a track: `"<artists> - <title>.mp3"`, sanitized
pub fn track_file_name(track: &Track) -> String {
    format!(
        "{}.{}",
        sanitize_name(&track.display_name()),
        files::TRACK_EXTENSION
    )
}

/// Temporary path a transfer writes to before being renamed into place
pub fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(files::PARTIAL_FILE_SUFFIX);
    PathBuf::from(name)
}
