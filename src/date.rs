//! Capture-date resolution.
//!
//! Scans the normalized tag mapping for a fixed, priority-ordered list of
//! date fields and parses the first one that matches the conventional EXIF
//! text format `YYYY:MM:DD HH:MM:SS`. Sub-second tags refine an already
//! selected timestamp; they are never a date source on their own.

use chrono::{Duration, NaiveDateTime};

use crate::metadata::TagMap;
use crate::pipeline::MediaKind;

/// Primary date fields, highest priority first.
const PRIMARY_DATE_FIELDS: [&str; 3] = [
    "EXIF DateTimeOriginal",
    "EXIF DateTime",
    "Image DateTime",
];

/// Sub-second refinement fields, matching priority order.
const SUBSEC_FIELDS: [&str; 2] = ["EXIF SubSecTimeOriginal", "EXIF SubSecTime"];

/// A capture timestamp extracted from file metadata, together with the tag
/// it came from (kept for logging and the `--json` report).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureDate {
    pub timestamp: NaiveDateTime,
    pub source: &'static str,
}

/// Resolve the authoritative capture date from a tag mapping.
///
/// Returns `None` when no candidate field is present or parseable — the
/// expected "no EXIF date" case, distinct from a read failure. Malformed
/// higher-priority values fall through to the next candidate.
///
/// Video containers carry their dates in QuickTime-style tags that are not
/// parsed yet, so the video candidate list is empty and video files resolve
/// to `None` through the same scan.
///
/// # Example
///
/// ```rust
/// use exif_redate::date::resolve_capture_date;
/// use exif_redate::metadata::TagMap;
/// use exif_redate::pipeline::MediaKind;
///
/// let mut tags = TagMap::new();
/// tags.insert("EXIF DateTimeOriginal".into(), "2023:07:04 10:15:00".into());
///
/// let date = resolve_capture_date(MediaKind::Image, &tags).unwrap();
/// assert_eq!(date.source, "EXIF DateTimeOriginal");
/// ```
pub fn resolve_capture_date(kind: MediaKind, tags: &TagMap) -> Option<CaptureDate> {
    for field in primary_fields(kind) {
        let Some(raw) = tags.get(*field) else {
            continue;
        };
        match parse_exif_datetime(raw) {
            Some(timestamp) => {
                return Some(CaptureDate {
                    timestamp: refine_subsec(timestamp, tags),
                    source: *field,
                });
            }
            None => {
                log::warn!("could not parse {field} value {raw:?}");
            }
        }
    }
    None
}

fn primary_fields(kind: MediaKind) -> &'static [&'static str] {
    match kind {
        MediaKind::Image | MediaKind::RawImage => &PRIMARY_DATE_FIELDS,
        // QuickTime container date tags are a future extension.
        MediaKind::Video | MediaKind::Unsupported => &[],
    }
}

/// Parse the conventional EXIF datetime text format. Anything that does not
/// match the exact shape is unparseable.
fn parse_exif_datetime(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), "%Y:%m:%d %H:%M:%S").ok()
}

/// Merge the first well-formed sub-second tag into the selected timestamp.
/// Sub-second values are advisory precision only — a malformed value leaves
/// the primary timestamp untouched.
fn refine_subsec(timestamp: NaiveDateTime, tags: &TagMap) -> NaiveDateTime {
    for field in &SUBSEC_FIELDS {
        if let Some(raw) = tags.get(*field) {
            if let Some(refined) = merge_subsec(timestamp, raw) {
                return refined;
            }
        }
    }
    timestamp
}

/// Interpret a sub-second tag as fractional seconds: "123" means 0.123s.
/// Digits beyond nanosecond precision are dropped.
fn merge_subsec(timestamp: NaiveDateTime, raw: &str) -> Option<NaiveDateTime> {
    let digits = raw.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits = &digits[..digits.len().min(9)];
    let value: u32 = digits.parse().ok()?;
    let nanos = i64::from(value) * 10i64.pow(9 - digits.len() as u32);
    timestamp.checked_add_signed(Duration::nanoseconds(nanos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn tag_map(pairs: &[(&str, &str)]) -> TagMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    // ── priority order ───────────────────────────────────────────────

    #[test]
    fn date_time_original_wins_over_other_fields() {
        let tags = tag_map(&[
            ("Image DateTime", "2021:01:01 00:00:00"),
            ("EXIF DateTime", "2022:02:02 02:02:02"),
            ("EXIF DateTimeOriginal", "2023:06:20 10:15:30"),
        ]);
        let date = resolve_capture_date(MediaKind::Image, &tags).unwrap();
        assert_eq!(date.timestamp, ts(2023, 6, 20, 10, 15, 30));
        assert_eq!(date.source, "EXIF DateTimeOriginal");
    }

    #[test]
    fn exif_date_time_selected_when_original_absent() {
        let tags = tag_map(&[("EXIF DateTime", "2023:05:15 14:30:25")]);
        let date = resolve_capture_date(MediaKind::Image, &tags).unwrap();
        assert_eq!(date.timestamp, ts(2023, 5, 15, 14, 30, 25));
        assert_eq!(date.source, "EXIF DateTime");
    }

    #[test]
    fn image_date_time_is_last_resort() {
        let tags = tag_map(&[("Image DateTime", "2020:12:31 23:59:59")]);
        let date = resolve_capture_date(MediaKind::RawImage, &tags).unwrap();
        assert_eq!(date.timestamp, ts(2020, 12, 31, 23, 59, 59));
        assert_eq!(date.source, "Image DateTime");
    }

    // ── fallthrough ──────────────────────────────────────────────────

    #[test]
    fn malformed_original_falls_through_to_valid_date_time() {
        let tags = tag_map(&[
            ("EXIF DateTimeOriginal", "invalid-date-format"),
            ("EXIF DateTime", "2023:05:15 14:30:25"),
        ]);
        let date = resolve_capture_date(MediaKind::Image, &tags).unwrap();
        assert_eq!(date.timestamp, ts(2023, 5, 15, 14, 30, 25));
        assert_eq!(date.source, "EXIF DateTime");
    }

    #[test]
    fn all_candidates_malformed_yields_none() {
        let tags = tag_map(&[
            ("EXIF DateTimeOriginal", "2023-05-15T14:30:25"),
            ("Image DateTime", "yesterday"),
        ]);
        assert!(resolve_capture_date(MediaKind::Image, &tags).is_none());
    }

    #[test]
    fn empty_mapping_yields_none() {
        assert!(resolve_capture_date(MediaKind::Image, &TagMap::new()).is_none());
    }

    #[test]
    fn unrelated_tags_yield_none() {
        let tags = tag_map(&[("Image Make", "Canon"), ("Image Model", "EOS R5")]);
        assert!(resolve_capture_date(MediaKind::Image, &tags).is_none());
    }

    // ── video ────────────────────────────────────────────────────────

    #[test]
    fn video_never_resolves_even_with_exif_fields_present() {
        let tags = tag_map(&[("EXIF DateTimeOriginal", "2023:05:15 14:30:25")]);
        assert!(resolve_capture_date(MediaKind::Video, &tags).is_none());
    }

    // ── sub-second refinement ────────────────────────────────────────

    #[test]
    fn subsec_refines_selected_timestamp() {
        let tags = tag_map(&[
            ("EXIF DateTimeOriginal", "2023:07:04 10:15:00"),
            ("EXIF SubSecTimeOriginal", "123"),
        ]);
        let date = resolve_capture_date(MediaKind::Image, &tags).unwrap();
        let expected = NaiveDate::from_ymd_opt(2023, 7, 4)
            .unwrap()
            .and_hms_milli_opt(10, 15, 0, 123)
            .unwrap();
        assert_eq!(date.timestamp, expected);
        assert_eq!(date.source, "EXIF DateTimeOriginal");
    }

    #[test]
    fn subsec_original_preferred_over_plain_subsec() {
        let tags = tag_map(&[
            ("EXIF DateTime", "2023:07:04 10:15:00"),
            ("EXIF SubSecTime", "500"),
            ("EXIF SubSecTimeOriginal", "250"),
        ]);
        let date = resolve_capture_date(MediaKind::Image, &tags).unwrap();
        let expected = NaiveDate::from_ymd_opt(2023, 7, 4)
            .unwrap()
            .and_hms_milli_opt(10, 15, 0, 250)
            .unwrap();
        assert_eq!(date.timestamp, expected);
    }

    #[test]
    fn subsec_alone_is_not_a_date_source() {
        let tags = tag_map(&[("EXIF SubSecTimeOriginal", "123")]);
        assert!(resolve_capture_date(MediaKind::Image, &tags).is_none());
    }

    #[test]
    fn malformed_subsec_leaves_primary_intact() {
        let tags = tag_map(&[
            ("EXIF DateTimeOriginal", "2023:07:04 10:15:00"),
            ("EXIF SubSecTimeOriginal", "abc"),
        ]);
        let date = resolve_capture_date(MediaKind::Image, &tags).unwrap();
        assert_eq!(date.timestamp, ts(2023, 7, 4, 10, 15, 0));
    }

    #[test]
    fn malformed_subsec_falls_through_to_next_subsec_field() {
        let tags = tag_map(&[
            ("EXIF DateTimeOriginal", "2023:07:04 10:15:00"),
            ("EXIF SubSecTimeOriginal", "12a"),
            ("EXIF SubSecTime", "7"),
        ]);
        let date = resolve_capture_date(MediaKind::Image, &tags).unwrap();
        let expected = NaiveDate::from_ymd_opt(2023, 7, 4)
            .unwrap()
            .and_hms_milli_opt(10, 15, 0, 700)
            .unwrap();
        assert_eq!(date.timestamp, expected);
    }

    #[test]
    fn subsec_digits_beyond_nanoseconds_are_dropped() {
        let tags = tag_map(&[
            ("EXIF DateTimeOriginal", "2023:07:04 10:15:00"),
            ("EXIF SubSecTimeOriginal", "1234567891234"),
        ]);
        let date = resolve_capture_date(MediaKind::Image, &tags).unwrap();
        let expected = NaiveDate::from_ymd_opt(2023, 7, 4)
            .unwrap()
            .and_hms_nano_opt(10, 15, 0, 123_456_789)
            .unwrap();
        assert_eq!(date.timestamp, expected);
    }

    // ── parsing shape ────────────────────────────────────────────────

    #[test]
    fn parse_accepts_exact_exif_shape_only() {
        assert!(parse_exif_datetime("2023:05:15 14:30:25").is_some());
        assert!(parse_exif_datetime("  2023:05:15 14:30:25  ").is_some());
        assert!(parse_exif_datetime("2023-05-15 14:30:25").is_none());
        assert!(parse_exif_datetime("2023:05:15").is_none());
        assert!(parse_exif_datetime("").is_none());
    }
}
