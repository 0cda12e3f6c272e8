//! Functions used by the title codec, the message dictionary, and the
//! renderer which do not belong to any one of them.

use regex::Regex;
use std::{borrow::Cow, sync::LazyLock};

/// Encodes a title fragment into a format suitable for use as a URL anchor.
pub fn anchor_encode(s: &str) -> String {
    url_encode(&s.trim_ascii().replace(' ', "_")).to_string()
}

/// Formats a message, using `cb` to replace any `$N` placeholders in the
/// message. If `cb` returns `None`, no replacement occurs.
pub fn format_raw_message<'a, E, F>(message: &str, mut cb: F) -> Result<Cow<'_, str>, E>
where
    F: FnMut(&str) -> Result<Option<Cow<'a, str>>, E>,
{
    static RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$(\d+)").unwrap());

    let mut out = String::new();
    let mut flushed = 0;
    for capture in RE.captures_iter(message) {
        let (_, [key]) = capture.extract();
        if let Some(value) = cb(key)? {
            let range = capture.get_match().range();
            out += &message[flushed..range.start];
            out += &value;
            flushed = range.end;
        }
    }

    Ok(if flushed == 0 {
        Cow::Borrowed(message)
    } else {
        out += &message[flushed..];
        Cow::Owned(out)
    })
}

/// Percent-encodes a title key for use in a URL path.
#[inline]
pub fn url_encode(input: &str) -> percent_encoding::PercentEncode<'_> {
    percent_encoding::utf8_percent_encode(input, &ALPHABET)
}

/// The alphabet of characters to percent-encode when encoding title keys.
///
/// These are the characters MediaWiki’s `wfUrlencode` leaves alone.
const ALPHABET: percent_encoding::AsciiSet = percent_encoding::NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b';')
    .remove(b':')
    .remove(b'@')
    .remove(b'$')
    .remove(b'!')
    .remove(b'*')
    .remove(b'(')
    .remove(b')')
    .remove(b',')
    .remove(b'/');
