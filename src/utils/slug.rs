//! Title to slug normalization.

use unicode_normalization::UnicodeNormalization;

/// Combining Diacritical Marks block, stripped after NFD decomposition.
fn is_combining_mark(ch: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&ch)
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Turn a title into a URL-safe slug: accents stripped, lowercase, only
/// `[a-z0-9_]` kept, whitespace and hyphen runs collapsed into one `-`.
///
/// ```
/// use passin_app::utils::generate_slug;
///
/// assert_eq!(generate_slug("Slug test"), "slug-test");
/// assert_eq!(generate_slug("Ínvalid character"), "invalid-character");
/// ```
pub fn generate_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_separator = false;

    for ch in text
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
    {
        if is_word_char(ch) {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch);
        } else if ch.is_whitespace() || ch == '-' {
            pending_separator = true;
        }
    }

    slug
}
