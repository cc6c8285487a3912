use crate::config::ScreenConfig;

/// Braille patterns used by most terminal spinners. U+2800 is excluded; it is
/// a blank cell some TUIs use as padding.
const BRAILLE_SPINNER: std::ops::RangeInclusive<char> = '\u{2801}'..='\u{28FF}';

/// Whether `row` looks like a transient progress indicator.
pub fn is_activity_row(row: &str, screen: &ScreenConfig) -> bool {
    let trimmed = row.trim_start();
    if let Some(first) = trimmed.chars().next() {
        if BRAILLE_SPINNER.contains(&first) || screen.activity_glyphs.contains(first) {
            return true;
        }
    }
    screen
        .activity_hints
        .iter()
        .any(|hint| !hint.is_empty() && row.contains(hint.as_str()))
}
