//! Output name derivation from movie file names.

/// Derive the output folder name for a movie file.
///
/// The short name is everything before the first occurrence of `marker`
/// in the file name. A file name without the marker is used unchanged;
/// the returned flag tells callers whether the marker was found so the
/// fallback can be surfaced. An empty marker never truncates.
pub fn derive_short_name(file_name: &str, marker: &str) -> (String, bool) {
    if marker.is_empty() {
        return (file_name.to_string(), true);
    }

    match file_name.find(marker) {
        Some(idx) => (file_name[..idx].to_string(), true),
        None => (file_name.to_string(), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_at_marker() {
        assert_eq!(derive_short_name("a.tif", ".tif"), ("a".to_string(), true));
        assert_eq!(
            derive_short_name("TL_R3D.dv", "_R3D"),
            ("TL".to_string(), true)
        );
    }

    #[test]
    fn truncates_at_first_occurrence() {
        assert_eq!(
            derive_short_name("movie.tif.tif", ".tif"),
            ("movie".to_string(), true)
        );
    }

    #[test]
    fn marker_absent_keeps_full_name() {
        assert_eq!(
            derive_short_name("movie.nd2", ".tif"),
            ("movie.nd2".to_string(), false)
        );
    }

    #[test]
    fn empty_marker_keeps_full_name() {
        assert_eq!(
            derive_short_name("movie.tif", ""),
            ("movie.tif".to_string(), true)
        );
    }

    #[test]
    fn compound_extension_truncates_cleanly() {
        assert_eq!(
            derive_short_name("pos3.tiff", ".tif"),
            ("pos3".to_string(), true)
        );
    }
}
