use rand::{rngs::OsRng, RngCore};
use std::fmt::Write;

/// Number of random bytes behind a stored file name (128 bits).
const TOKEN_BYTES: usize = 16;

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Last path segment of `name`, ignoring trailing separators.
pub fn base_name(name: &str) -> &str {
    let trimmed = name.trim_end_matches(is_separator);
    trimmed.rsplit(is_separator).next().unwrap_or(trimmed)
}

/// Reduce an untrusted file name to a safe leaf name.
///
/// Directory components are dropped and every character outside
/// `[A-Za-z0-9.-]` is replaced with `_`. The result never contains a path
/// separator and sanitizing it again returns it unchanged.
pub fn sanitize_filename(filename: &str) -> String {
    base_name(filename)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect()
}

/// Lower-cased extension of the last path segment, dot included.
///
/// Returns an empty string when there is no extension, including for names
/// like `.gitignore` whose only dot is the leading one.
pub fn file_extension(filename: &str) -> String {
    let name = base_name(filename);
    match name.rfind('.') {
        Some(idx) if idx > 0 => name[idx..].to_lowercase(),
        _ => String::new(),
    }
}

/// Shorten an already sanitized name to at most `max_len` bytes, keeping
/// its extension when the extension itself fits.
pub fn truncate_filename(name: &str, max_len: usize) -> String {
    if name.len() <= max_len {
        return name.to_string();
    }

    let extension = match name.rfind('.') {
        Some(idx) if idx > 0 && name.len() - idx < max_len => &name[idx..],
        _ => "",
    };
    let stem_len = max_len - extension.len();
    format!("{}{}", &name[..stem_len], extension)
}

/// Random lowercase hex token used to make stored names unique.
pub fn random_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);

    bytes.iter().fold(String::with_capacity(TOKEN_BYTES * 2), |mut acc, b| {
        let _ = write!(acc, "{b:02x}");
        acc
    })
}
