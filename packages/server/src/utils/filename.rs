/// Reduce a client-supplied filename to its final path component.
///
/// Browsers may send full paths (`C:\Users\me\data.csv`); both separators
/// are treated as directory boundaries.
pub fn display_filename(filename: &str) -> &str {
    filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
}

/// Produce a filename that is safe to use as part of an on-disk name.
///
/// Path separators become spaces, whitespace runs are joined with `_`,
/// anything outside ASCII `[A-Za-z0-9._-]` is dropped, and leading or
/// trailing `.`/`_` are stripped. The result may be empty.
pub fn secure_filename(filename: &str) -> String {
    let spaced: String = filename
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Lower-cased extension after the last dot, if any.
pub fn extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
