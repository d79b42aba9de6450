//! Escaping for user-supplied text that ends up inside the relayed email.
//!
//! Escaping is reference-aware: an `&` that already starts a character
//! reference is kept as is, so running any function here over its own output
//! changes nothing.

use once_cell::sync::Lazy;
use regex::Regex;

static CHARACTER_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^&(?:amp|lt|gt|quot|apos|#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6});")
        .expect("character reference pattern is valid")
});

/// Escapes `&`, `<` and `>`. Nothing else is touched.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(c) = rest.chars().next() {
        let (token, consumed) = escape_token(rest, c);
        out.push_str(token);
        rest = &rest[consumed..];
    }

    out
}

/// Escapes HTML, strips control characters (U+0000–U+001F, U+007F) and caps
/// the result at `max_chars` characters of escaped output.
pub fn sanitize(input: &str, max_chars: usize) -> String {
    clean(input, max_chars, false)
}

/// Like [`sanitize`] but keeps line feeds, for multi-line text such as the
/// message body.
pub fn sanitize_multiline(input: &str, max_chars: usize) -> String {
    clean(input, max_chars, true)
}

fn clean(input: &str, max_chars: usize, keep_line_feeds: bool) -> String {
    let mut out = String::with_capacity(input.len().min(max_chars));
    let mut used = 0;
    let mut rest = input;

    while let Some(c) = rest.chars().next() {
        let (token, consumed) = match c {
            '\n' if keep_line_feeds => ("\n", 1),
            c if is_control(c) => ("", c.len_utf8()),
            c => escape_token(rest, c),
        };
        rest = &rest[consumed..];

        // A reference is never split by the cap
        let width = token.chars().count();
        if used + width > max_chars {
            break;
        }
        out.push_str(token);
        used += width;
    }

    out
}

/// Returns the escaped form of the character at the start of `rest` and how
/// many bytes of `rest` it replaces.
fn escape_token(rest: &str, c: char) -> (&str, usize) {
    match c {
        '&' => match CHARACTER_REFERENCE.find(rest) {
            Some(reference) => (reference.as_str(), reference.end()),
            None => ("&amp;", 1),
        },
        '<' => ("&lt;", 1),
        '>' => ("&gt;", 1),
        c => (&rest[..c.len_utf8()], c.len_utf8()),
    }
}

fn is_control(c: char) -> bool {
    c <= '\u{1F}' || c == '\u{7F}'
}
