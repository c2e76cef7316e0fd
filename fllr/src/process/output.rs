use std::path::{Path, PathBuf};

pub const FLAC_EXTENSION: &str = "flac";

/// Path of the segment starting at split interval `interval`.
///
/// The first segment keeps the bare base name; later ones carry the interval
/// number. The extension is appended to the whole file name, so a base of
/// `take.v2` yields `take.v2.flac` rather than replacing `.v2`.
pub fn segment_path(base_path: &Path, interval: u64) -> PathBuf {
    let file_name = base_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let new_name = if interval == 0 {
        format!("{file_name}.{FLAC_EXTENSION}")
    } else {
        format!("{file_name}_{interval}.{FLAC_EXTENSION}")
    };

    let mut path = base_path.to_path_buf();
    if base_path.file_name().is_some() {
        path.set_file_name(new_name);
    } else {
        path.push(new_name);
    }
    path
}
