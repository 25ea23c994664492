//! Textual repair of history API responses.
//!
//! The history API sometimes sends `""` for fields that are numeric in its
//! schema, which a typed decoder rejects. Before decoding, the four known
//! fields are rewritten to a zero of their declared type. Other fields are
//! left alone.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

struct Patch {
    pattern: Regex,
    replacement: &'static str,
}

fn patch(field: &str, replacement: &'static str) -> Patch {
    let pattern = Regex::new(&format!(r#""{}"\s*:\s*"""#, regex::escape(field)))
        .expect("static normalizer pattern");
    Patch {
        pattern,
        replacement,
    }
}

static PATCHES: LazyLock<[Patch; 4]> = LazyLock::new(|| {
    [
        // Index fields are string-or-number, so keep them quoted.
        patch("parent_media_index", r#""parent_media_index":"0""#),
        patch("media_index", r#""media_index":"0""#),
        patch("watched_status", r#""watched_status":0"#),
        patch("percent_complete", r#""percent_complete":0"#),
    ]
});

/// Rewrite empty-string values of the known numeric fields.
///
/// Borrows the input unchanged when nothing needs patching.
pub fn normalize_history_json(body: &str) -> Cow<'_, str> {
    let mut text = Cow::Borrowed(body);
    for p in PATCHES.iter() {
        let patched = match p.pattern.replace_all(&text, p.replacement) {
            Cow::Owned(s) => Some(s),
            Cow::Borrowed(_) => None,
        };
        if let Some(s) = patched {
            text = Cow::Owned(s);
        }
    }
    text
}
