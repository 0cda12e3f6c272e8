//! Sanitisation of user-supplied inline CSS.
//!
//! This follows MediaWiki’s `Sanitizer::checkCss`: the value is normalised so
//! that escapes, look-alike characters, and comments cannot hide anything, and
//! if the normalised value contains a construct which can load resources or
//! run script, the whole value is replaced by a harmless comment.

use regex::{Captures, Regex, RegexBuilder};
use std::{borrow::Cow, sync::LazyLock};
use unicode_normalization::{IsNormalized, UnicodeNormalization as _, is_nfkc_quick};

/// The replacement value for CSS which can load resources or run script.
pub const INSECURE: &str = "/* insecure input */";

/// The replacement value for CSS containing control characters or
/// undecodable escapes.
pub const INVALID_CONTROL_CHAR: &str = "/* invalid control char */";

/// FULLWIDTH REVERSE SOLIDUS. Folding it would turn already-decoded text back
/// into a live escape.
const FULLWIDTH_BACKSLASH: char = '\u{ff3c}';

/// Small capitals which some browsers read as ASCII letters. NFKC leaves them
/// alone.
const SMALL_CAPITALS: [(char, char); 4] = [('ʀ', 'r'), ('ɴ', 'n'), ('ʟ', 'l'), ('ɪ', 'i')];

/// Normalises and checks a `style` attribute value. Returns the normalised
/// value if it is safe, or one of [`INSECURE`] or [`INVALID_CONTROL_CHAR`] if
/// it is not. Never fails.
pub fn check_css(value: &str) -> Cow<'_, str> {
    static INSECURE_RE: LazyLock<Regex> = LazyLock::new(|| {
        RegexBuilder::new(concat!(
            r"expression|filter\s*:|accelerator\s*:|-o-link\s*:|-o-link-source\s*:",
            r"|-o-replace\s*:|url\s*\(|image\s*\(|image-set\s*\(|attr\s*\([^)]+[\s,]+url",
        ))
        .case_insensitive(true)
        .build()
        .unwrap()
    });

    let value = normalize_css(value);
    if value.contains(is_invalid_char) {
        log::debug!("rejected CSS with control characters {value:?}");
        Cow::Borrowed(INVALID_CONTROL_CHAR)
    } else if INSECURE_RE.is_match(&value) {
        log::debug!("rejected insecure CSS {value:?}");
        Cow::Borrowed(INSECURE)
    } else {
        value
    }
}

/// Returns true for control characters other than whitespace, and for the
/// replacement character left by an undecodable escape.
fn is_invalid_char(c: char) -> bool {
    matches!(
        c,
        '\0'..='\u{8}' | '\u{b}' | '\u{e}'..='\u{1f}' | '\u{7f}' | char::REPLACEMENT_CHARACTER
    )
}

/// Folds compatibility characters, decodes escape sequences, and strips
/// comments from a CSS value.
fn normalize_css(value: &str) -> Cow<'_, str> {
    let mut value = fold_compatibility(value);

    let decoded = match decode_escapes(&value) {
        Cow::Borrowed(_) => None,
        Cow::Owned(decoded) => Some(decoded),
    };
    if let Some(decoded) = decoded {
        value = Cow::Owned(decoded);
    }

    if value.contains("/*") {
        value = Cow::Owned(strip_comments(&value));
    }

    value
}

/// Folds fullwidth and other compatibility characters to their plain forms,
/// except for [`FULLWIDTH_BACKSLASH`].
fn fold_compatibility(value: &str) -> Cow<'_, str> {
    let is_small_capital = |c: char| SMALL_CAPITALS.iter().any(|&(from, _)| from == c);
    if is_nfkc_quick(value.chars()) == IsNormalized::Yes && !value.contains(is_small_capital) {
        return Cow::Borrowed(value);
    }

    let mut folded = String::with_capacity(value.len());
    for (index, part) in value.split(FULLWIDTH_BACKSLASH).enumerate() {
        if index != 0 {
            folded.push(FULLWIDTH_BACKSLASH);
        }
        folded.extend(part.nfkc().map(|c| {
            SMALL_CAPITALS
                .iter()
                .find(|&&(from, _)| from == c)
                .map_or(c, |&(_, to)| to)
        }));
    }

    if folded == value {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(folded)
    }
}

/// Decodes CSS escape sequences: `\` followed by up to six hex digits and one
/// optional whitespace character, `\` followed by a newline (a line
/// continuation), or `\` followed by any other character. Characters which
/// would end a string or start another escape stay escaped, in canonical
/// hex form.
fn decode_escapes(value: &str) -> Cow<'_, str> {
    static ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\\(?:([0-9A-Fa-f]{1,6})[ \t\r\n\f]?|(\r\n|[\n\r\f])|(.)|$)").unwrap()
    });

    if !value.contains('\\') {
        return Cow::Borrowed(value);
    }

    ESCAPE.replace_all(value, |caps: &Captures<'_>| {
        let c = if let Some(hex) = caps.get(1) {
            u32::from_str_radix(hex.as_str(), 16)
                .ok()
                .filter(|&code| code != 0)
                .and_then(char::from_u32)
                .unwrap_or(char::REPLACEMENT_CHARACTER)
        } else if caps.get(2).is_some() {
            return String::new();
        } else {
            caps.get(3)
                .and_then(|c| c.as_str().chars().next())
                .unwrap_or('\\')
        };

        if matches!(c, '\n' | '"' | '\'' | '\\') {
            format!("\\{:x} ", u32::from(c))
        } else {
            c.to_string()
        }
    })
}

/// Replaces every closed comment with a space, then truncates the value at an
/// unclosed comment.
fn strip_comments(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("/*") {
        out += &rest[..start];
        let body = &rest[start + "/*".len()..];
        if let Some(end) = body.find("*/") {
            out.push(' ');
            rest = &body[end + "*/".len()..];
        } else {
            rest = "";
        }
    }
    out += rest;
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_values() {
        assert_eq!(check_css("color: red"), Cow::Borrowed("color: red"));
        assert_eq!(
            check_css("font-weight: bold; margin: 0 1em"),
            "font-weight: bold; margin: 0 1em"
        );
        assert_eq!(check_css("font-family: \"A\\\"B\""), "font-family: \"A\\22 B\"");
    }

    #[test]
    fn comments() {
        assert_eq!(check_css("color: red/* note */;"), "color: red ;");
        assert_eq!(check_css("color: red; /* unclosed"), "color: red; ");
    }

    #[test]
    fn insecure_values() {
        assert_eq!(check_css("width: expression(alert(1))"), INSECURE);
        assert_eq!(check_css("background: URL(http://example.com/x.png)"), INSECURE);
        assert_eq!(check_css("background-image: image-set('x.png' 1x)"), INSECURE);
        assert_eq!(check_css("filter: progid:foo"), INSECURE);
        assert_eq!(check_css("-o-link: javascript:alert(1)"), INSECURE);
        assert_eq!(check_css("content: attr(href url)"), INSECURE);
    }

    #[test]
    fn hidden_insecure_values() {
        assert_eq!(check_css(r"width: \65 xpression(alert(1))"), INSECURE, "hex escape");
        assert_eq!(check_css(r"width: e\xpression(alert(1))"), INSECURE, "char escape");
        assert_eq!(check_css("width: ｅｘｐｒｅｓｓｉｏｎ(1)"), INSECURE, "fullwidth");
        assert_eq!(check_css("width: eˣpression(alert(1))"), INSECURE, "compatibility");
        assert_eq!(check_css("background: uʀl(x)"), INSECURE, "small capital");
        assert_eq!(check_css(r"background: u\72l(x)"), INSECURE, "escaped url");
        assert_eq!(check_css("background: u\u{fe68}72l(x)"), INSECURE, "small backslash");
    }

    #[test]
    fn fullwidth_backslash_stays_inert() {
        for input in [
            "background: \u{ff3c}75rl(https://evil.example/x.png)",
            "width: \u{ff3c}65 xpression(alert(1))",
        ] {
            let checked = check_css(input);
            assert_eq!(checked, input);
            assert!(!checked.contains('\\'), "{checked}");
        }
    }

    #[test]
    fn escaped_backslash_stays_escaped() {
        assert_eq!(check_css(r"background: \5c 75rl(x)"), r"background: \5c 75rl(x)");
        assert_eq!(check_css(r"background: \\75rl(x)"), r"background: \5c 75rl(x)");
        assert_eq!(check_css("color: red\\"), r"color: red\5c ");
    }

    #[test]
    fn control_characters() {
        assert_eq!(check_css(r"color: red\0 x"), INVALID_CONTROL_CHAR);
        assert_eq!(check_css(r"color: \110000"), INVALID_CONTROL_CHAR);
        assert_eq!(check_css("color: red\u{7}"), INVALID_CONTROL_CHAR);
        assert_eq!(check_css("color: red\u{fffd}"), INVALID_CONTROL_CHAR);
        assert_eq!(check_css("color:\tred;\nmargin: 0"), "color:\tred;\nmargin: 0");
    }

    #[test]
    fn decode() {
        assert_eq!(decode_escapes(r"\41 B"), "AB");
        assert_eq!(decode_escapes("a\\\nb"), "ab");
        assert_eq!(decode_escapes(r"\0 x"), "\u{fffd}x");
        assert_eq!(decode_escapes(r"\;"), ";");
        assert_eq!(decode_escapes(r"\a"), r"\a ");
        assert_eq!(decode_escapes(r"\'"), r"\27 ");
    }
}
