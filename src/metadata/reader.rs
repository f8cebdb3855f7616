use anyhow::{Context, Result};
use nom_exif::*;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

/// Normalized metadata: tag name → raw string value, keys unique.
pub type TagMap = BTreeMap<String, String>;

/// Tags surfaced from the parser, keyed by EXIF tag code and reported under
/// the conventional group-prefixed name ("Image" for IFD0 tags, "EXIF" for
/// Exif sub-IFD tags).
const KNOWN_TAGS: &[(u16, &str)] = &[
    // Date / time
    (0x0132, "Image DateTime"),
    (0x9003, "EXIF DateTimeOriginal"),
    (0x9004, "EXIF DateTimeDigitized"),
    (0x9010, "EXIF OffsetTime"),
    (0x9011, "EXIF OffsetTimeOriginal"),
    (0x9290, "EXIF SubSecTime"),
    (0x9291, "EXIF SubSecTimeOriginal"),
    (0x9292, "EXIF SubSecTimeDigitized"),
    // Camera
    (0x010F, "Image Make"),
    (0x0110, "Image Model"),
    (0x0112, "Image Orientation"),
    (0x0131, "Image Software"),
    (0x829A, "EXIF ExposureTime"),
    (0x829D, "EXIF FNumber"),
    (0x8827, "EXIF ISOSpeedRatings"),
    (0x920A, "EXIF FocalLength"),
    (0xA434, "EXIF LensModel"),
    // Image properties
    (0x010E, "Image ImageDescription"),
    (0x011A, "Image XResolution"),
    (0x011B, "Image YResolution"),
    (0xA001, "EXIF ColorSpace"),
    (0xA002, "EXIF ExifImageWidth"),
    (0xA003, "EXIF ExifImageLength"),
];

/// Read and normalize the metadata tags of a media file.
///
/// Absence of metadata is common and is not an error: files the parser
/// cannot recognize (junk bytes, RAW variants with non-standard layout) and
/// files with zero tags both yield an empty mapping. The only `Err` is a
/// file that cannot be read at all.
pub fn read_metadata(path: &Path) -> Result<TagMap> {
    // Probe readability first so I/O failures surface distinctly from
    // missing metadata.
    File::open(path).with_context(|| format!("cannot read {}", path.display()))?;

    let mut parser = MediaParser::new();
    let ms = match MediaSource::file_path(path) {
        Ok(ms) => ms,
        Err(e) => {
            log::debug!("{}: unrecognized container: {e}", path.display());
            return Ok(TagMap::new());
        }
    };

    let iter: ExifIter = match parser.parse(ms) {
        Ok(iter) => iter,
        Err(e) => {
            log::debug!("{}: no parseable metadata: {e}", path.display());
            return Ok(TagMap::new());
        }
    };
    let exif: Exif = iter.into();

    let mut tags = TagMap::new();
    for (code, name) in KNOWN_TAGS {
        if let Some(value) = exif.get_by_ifd_tag_code(0, *code).and_then(entry_to_string) {
            tags.insert((*name).to_string(), value);
        }
    }
    Ok(tags)
}

/// Convert an EntryValue to an Option<String>.
fn entry_to_string(val: &EntryValue) -> Option<String> {
    let s = val.to_string();
    let s = s.trim().trim_matches('"').trim().to_string();
    if s.is_empty() { None } else { Some(s) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_a_read_failure() {
        assert!(read_metadata(Path::new("/nonexistent/photo.jpg")).is_err());
    }

    #[test]
    fn unrecognized_bytes_yield_empty_mapping() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("junk.jpg");
        let mut f = File::create(&path).unwrap();
        f.write_all(b"definitely not an image").unwrap();

        let tags = read_metadata(&path).unwrap();
        assert!(tags.is_empty());
    }

    #[test]
    fn empty_file_yields_empty_mapping() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.png");
        File::create(&path).unwrap();

        let tags = read_metadata(&path).unwrap();
        assert!(tags.is_empty());
    }
}
