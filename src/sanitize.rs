//! Markup sanitizing for user submitted text
//!
//! Only a small set of inline tags survives, everything else is removed. The result is safe to
//! store and to embed as-is in HTML.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::LazyLock;

use ammonia::Builder;

/// Tags that are allowed to stay in a note
const ALLOWED_TAGS: [&str; 12] = [
    "a",
    "abbr",
    "acronym",
    "b",
    "blockquote",
    "code",
    "em",
    "i",
    "li",
    "ol",
    "strong",
    "ul",
];

/// URL schemes allowed in links
const ALLOWED_URL_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// The shared cleaner, the configuration never changes
static CLEANER: LazyLock<Builder<'static>> = LazyLock::new(|| {
    let mut tag_attributes = HashMap::new();
    tag_attributes.insert("a", HashSet::from(["href", "title"]));
    tag_attributes.insert("abbr", HashSet::from(["title"]));
    tag_attributes.insert("acronym", HashSet::from(["title"]));

    let mut builder = Builder::default();
    builder
        .tags(HashSet::from(ALLOWED_TAGS))
        .tag_attributes(tag_attributes)
        .generic_attributes(HashSet::<&str>::new())
        .url_schemes(HashSet::from(ALLOWED_URL_SCHEMES))
        .link_rel(None);

    builder
});

/// Clean user submitted text
///
/// Disallowed tags are removed (the contents of `script` and `style` entirely), as are
/// disallowed attributes. Running it on its own output gives the same output.
pub fn clean(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    CLEANER.clean(raw).to_string()
}

/// Escape arbitrary text to be used in HTML text or attribute values
pub fn escape(raw: &str) -> String {
    ammonia::clean_text(raw)
}
