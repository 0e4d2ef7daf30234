//! MIME type detection module
//!
//! Returns the Content-Type for a served file based on its extension.

use mime_guess::mime;
use std::path::Path;

/// Get Content-Type for a file path
///
/// Textual types carry an explicit UTF-8 charset, unknown extensions map to
/// `application/octet-stream`.
///
/// # Examples
/// ```
/// use spa_serve::http::mime::content_type_for;
/// assert_eq!(content_type_for("index.html".as_ref()), "text/html; charset=utf-8");
/// assert_eq!(content_type_for("logo.png".as_ref()), "image/png");
/// ```
pub fn content_type_for(path: &Path) -> String {
    let guessed = mime_guess::from_path(path).first_or_octet_stream();
    if guessed.type_() == mime::TEXT && guessed.get_param(mime::CHARSET).is_none() {
        format!("{guessed}; charset=utf-8")
    } else {
        guessed.to_string()
    }
}
