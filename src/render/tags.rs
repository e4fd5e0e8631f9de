//! Placeholder syntax.
//!
//! A placeholder is `{{`, a key, `}}`, with optional whitespace padding
//! inside the braces. Keys cannot contain braces.

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

/// Opening delimiter.
pub const OPEN: &str = "{{";

/// Closing delimiter.
pub const CLOSE: &str = "}}";

/// Well-formed placeholder; group 1 is the trimmed key.
fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{\s*([^{}\s][^{}]*?)\s*\}\}").expect("placeholder pattern"))
}

/// Anything between double braces, non-greedy; used by the cleanup pass.
pub(crate) fn leftover_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{.*?\}\}").expect("leftover pattern"))
}

/// Canonical key of a single tag, or `None` if `tag` is not one.
pub fn normalize_tag(tag: &str) -> Option<&str> {
    let inner = tag.strip_prefix(OPEN)?.strip_suffix(CLOSE)?;
    let key = inner.trim();
    if key.is_empty() || key.contains(['{', '}']) {
        return None;
    }
    Some(key)
}

/// Keys of all well-formed placeholders in `text`, in order of appearance.
pub fn keys_in(text: &str) -> Vec<String> {
    placeholder_regex()
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Check whether `text` holds a placeholder for `key` in any spelling.
pub fn contains_key(text: &str, key: &str) -> bool {
    placeholder_regex()
        .captures_iter(text)
        .any(|caps| &caps[1] == key)
}

/// How [`substitute`] treats one well-formed placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Replace the placeholder with this text
    Value(String),
    /// Delete the placeholder without counting it as a leftover
    Drop,
    /// Leave the placeholder to the surrounding template text
    Unresolved,
}

/// Text after [`substitute`], with counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    /// Rewritten text
    pub text: String,
    /// Placeholders replaced by a value
    pub replaced: u32,
    /// Leftover fragments deleted from template text
    pub removed: u32,
}

/// Replace every placeholder that `resolve` knows.
///
/// Placeholders are matched left to right as whole tokens and inserted
/// values are never re-scanned. With `clean` set, leftover syntax is deleted
/// from the template text between inserted values (unresolved placeholders
/// included); the values themselves are kept verbatim even when they contain
/// braces.
pub fn substitute<F>(text: &str, clean: bool, mut resolve: F) -> Rewrite
where
    F: FnMut(&str) -> Resolution,
{
    let mut out = Rewrite {
        text: String::with_capacity(text.len()),
        replaced: 0,
        removed: 0,
    };
    let mut span_start = 0;

    for caps in placeholder_regex().captures_iter(text) {
        let Some(token) = caps.get(0) else {
            continue;
        };
        let value = match resolve(&caps[1]) {
            Resolution::Value(value) => {
                out.replaced += 1;
                value
            }
            Resolution::Drop => String::new(),
            Resolution::Unresolved => continue,
        };
        push_template(&mut out, &text[span_start..token.start()], clean);
        out.text.push_str(&value);
        span_start = token.end();
    }
    push_template(&mut out, &text[span_start..], clean);

    out
}

fn push_template(out: &mut Rewrite, span: &str, clean: bool) {
    if !clean {
        out.text.push_str(span);
        return;
    }
    out.removed += leftover_regex().find_iter(span).count() as u32;
    out.text.push_str(&strip_leftovers(span));
}

/// Delete everything that looks like a placeholder.
pub fn strip_leftovers(text: &str) -> Cow<'_, str> {
    leftover_regex().replace_all(text, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("{{ name }}"), Some("name"));
        assert_eq!(normalize_tag("{{name}}"), Some("name"));
        assert_eq!(normalize_tag("{{  sender.name\t}}"), Some("sender.name"));
        assert_eq!(normalize_tag("{{ }}"), None);
        assert_eq!(normalize_tag("name"), None);
        assert_eq!(normalize_tag("{{ a{b }}"), None);
    }

    #[test]
    fn test_keys_in() {
        let keys = keys_in("{{ a }} and {{b.c}} and {{ a }}");
        assert_eq!(keys, vec!["a", "b.c", "a"]);
        assert!(keys_in("{{ }} {{}}").is_empty());
    }

    fn lookup(key: &str) -> Resolution {
        match key {
            "name" => Resolution::Value("N".to_string()),
            "document.name" => Resolution::Value("D".to_string()),
            "a" => Resolution::Value("{{b}}".to_string()),
            "body" => Resolution::Drop,
            _ => Resolution::Unresolved,
        }
    }

    #[test]
    fn test_substitute_whole_tokens() {
        let out = substitute("{{name}} / {{document.name}}", false, lookup);
        assert_eq!(out.text, "N / D");
        assert_eq!(out.replaced, 2);
    }

    #[test]
    fn test_substitute_keeps_unknown() {
        let out = substitute("Hi {{ who }}!", false, lookup);
        assert_eq!(out.text, "Hi {{ who }}!");
        assert_eq!(out.replaced, 0);
    }

    #[test]
    fn test_substitute_triple_braces() {
        assert_eq!(substitute("{{{name}}}", true, lookup).text, "{N}");
    }

    #[test]
    fn test_values_not_rescanned() {
        let out = substitute("{{a}} {{ who }}", true, lookup);
        assert_eq!(out.text, "{{b}} ");
        assert_eq!(out.replaced, 1);
        assert_eq!(out.removed, 1);
    }

    #[test]
    fn test_clean_template_text() {
        let out = substitute("A {{ who }}{{name}} {{ x {{ y }} {{ }} B", true, lookup);
        assert_eq!(out.text, "A N   B");
        assert_eq!(out.removed, 3);
    }

    #[test]
    fn test_dropped_placeholder_not_counted() {
        let out = substitute("[{{ body }}]", true, lookup);
        assert_eq!(out.text, "[]");
        assert_eq!(out.removed, 0);
        assert_eq!(substitute("[{{ body }}]", false, lookup).text, "[]");
    }

    #[test]
    fn test_strip_leftovers() {
        assert_eq!(strip_leftovers("A {{ x }}B{{y}} C"), "A B C");
        assert_eq!(strip_leftovers("no tags {here}"), "no tags {here}");
        assert_eq!(strip_leftovers("{{ a }} }}"), " }}");
    }
}
