/// Pseudo-language Tesseract lists for orientation and script detection.
pub const OSD_PSEUDO_LANGUAGE: &str = "osd";

/// Turn `tesseract --list-langs` output into language codes.
///
/// The first line is the tool's header (`List of available languages in
/// "/usr/share/tesseract-ocr/5/tessdata/" (3):`). Order is kept as printed.
pub fn parse_language_listing(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|lang| !lang.is_empty() && *lang != OSD_PSEUDO_LANGUAGE)
        .map(str::to_string)
        .collect()
}
