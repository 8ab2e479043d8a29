//! Container detection from file extensions.

use std::path::Path;

/// Supported texture containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Portable Network Graphics.
    Png,
    /// Tagged Image File Format.
    Tiff,
    /// JPEG/JFIF.
    Jpeg,
    /// Radiance RGBE.
    Hdr,
    /// OpenEXR.
    Exr,
    /// Khronos KTX2 (write only).
    Ktx2,
}

impl Format {
    /// Maps an extension to a container. Case-insensitive, leading dot
    /// optional. Never touches the filesystem.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.');
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Format::Png),
            "tif" | "tiff" => Some(Format::Tiff),
            "jpg" | "jpeg" => Some(Format::Jpeg),
            "hdr" => Some(Format::Hdr),
            "exr" => Some(Format::Exr),
            "ktx2" => Some(Format::Ktx2),
            _ => None,
        }
    }

    /// Detects the container of a path from its extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn recognizes_known_extensions() {
        assert_eq!(Format::from_extension("png"), Some(Format::Png));
        assert_eq!(Format::from_extension("tif"), Some(Format::Tiff));
        assert_eq!(Format::from_extension("tiff"), Some(Format::Tiff));
        assert_eq!(Format::from_extension("jpg"), Some(Format::Jpeg));
        assert_eq!(Format::from_extension("jpeg"), Some(Format::Jpeg));
        assert_eq!(Format::from_extension("hdr"), Some(Format::Hdr));
        assert_eq!(Format::from_extension("exr"), Some(Format::Exr));
        assert_eq!(Format::from_extension("ktx2"), Some(Format::Ktx2));
    }

    #[test]
    fn ignores_case_and_dot() {
        assert_eq!(Format::from_extension(".PNG"), Some(Format::Png));
        assert_eq!(Format::from_extension("Exr"), Some(Format::Exr));
    }

    #[test]
    fn rejects_unknown() {
        assert_eq!(Format::from_extension("bmp"), None);
        assert_eq!(Format::from_extension(""), None);
        assert_eq!(Format::from_path(&PathBuf::from("tex")), None);
    }

    #[test]
    fn detects_from_path() {
        assert_eq!(
            Format::from_path(&PathBuf::from("assets/albedo.TIF")),
            Some(Format::Tiff)
        );
    }
}
