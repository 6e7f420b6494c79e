/// Name used when sanitizing leaves nothing usable
pub const DEFAULT_FILE_NAME: &str = "qr-code";

/// Normalizes arbitrary user text into a filesystem-safe base name
///
/// Trims surrounding whitespace, replaces every character outside `[A-Za-z0-9_-]` with `_`,
/// collapses runs of `_` and strips leading/trailing `_`. Falls back to
/// [`DEFAULT_FILE_NAME`] when nothing is left.
///
/// # Examples
///
/// ```
/// use qr_keeper::sanitize_file_name;
///
/// assert_eq!(sanitize_file_name("My File!"), "My_File");
/// assert_eq!(sanitize_file_name("   "), "qr-code");
/// ```
pub fn sanitize_file_name(raw: &str) -> String {
    let mut sanitized = String::with_capacity(raw.len());

    for c in raw.trim().chars() {
        let c = if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' };
        if c == '_' && sanitized.ends_with('_') {
            continue;
        }
        sanitized.push(c);
    }

    let trimmed = sanitized.trim_matches('_');
    if trimmed.is_empty() { DEFAULT_FILE_NAME.to_string() } else { trimmed.to_string() }
}
