//! Types and functions for parsing and formatting wiki title strings.

use crate::{
    common::{anchor_encode, url_encode},
    config::Configuration,
};
use html_escape::decode_html_entities;
use regex::Regex;
use std::{borrow::Cow, sync::LazyLock};

/// The maximum length of a local title key, in bytes.
const MAX_TITLE_LEN: usize = 255;

/// The title casing strategy for a namespace.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NamespaceCase {
    /// The first letter of the title is capitalised.
    FirstLetter,
    /// The title is case-sensitive.
    CaseSensitive,
}

/// An article namespace.
#[derive(Debug, Eq)]
pub struct Namespace {
    /// The namespace ID.
    pub id: i32,
    /// The display name of the namespace.
    pub name: &'static str,
    /// The case folding strategy for titles in the namespace.
    pub case: NamespaceCase,
    /// Named aliases for the namespace.
    pub aliases: &'static [&'static str],
}

impl PartialEq for Namespace {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Namespace {
    /// The special namespace ID used for dynamic pages.
    pub const SPECIAL: i32 = -1;
}

/// The reason a string could not be turned into a [`Title`].
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum InvalidTitle {
    /// Nothing was left after normalisation.
    #[error("title is empty")]
    Empty,

    /// The title contains a character which is never allowed in titles.
    #[error("title contains illegal character {0:?}")]
    IllegalChar(char),

    /// The title text starts with a colon after a namespace prefix.
    #[error("title text starts with a colon")]
    LeadingColon,

    /// The title contains a percent-encoded byte.
    #[error("title contains percent-escape '{0}'")]
    PercentEscape(String),

    /// The title is a relative path.
    #[error("title contains a relative path")]
    RelativePath,

    /// The title contains a signature sequence.
    #[error("title contains '~~~'")]
    Signature,

    /// The title key is longer than [`MAX_TITLE_LEN`] bytes.
    #[error("title is {0} bytes long")]
    TooLong(usize),
}

/// A normalised article title.
#[derive(Clone, Debug, Eq)]
pub struct Title {
    /// The location of the fragment delimiter in the title, if one exists.
    ///
    /// ```text
    /// interwiki:Namespace:Title/Sub/Page#Fragment
    ///                                   ^
    /// ```
    fragment_delimiter: Option<usize>,

    /// The location of the interwiki delimiter in the title, if one exists.
    ///
    /// ```text
    /// interwiki:Namespace:Title/Sub/Page#Fragment
    ///          ^
    /// ```
    iw_delimiter: Option<usize>,

    /// The namespace of the title.
    namespace: &'static Namespace,

    /// The location of the namespace delimiter in the title, if one exists.
    ///
    /// ```text
    /// interwiki:Namespace:Title/Sub/Page#Fragment
    ///                    ^
    /// ```
    ns_delimiter: Option<usize>,

    /// The full title text.
    text: String,
}

impl PartialEq for Title {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Title {
    /// Creates a title from a known namespace plus already-validated text
    /// parts.
    ///
    /// Titles with an interwiki prefix belong to another wiki, so their text is
    /// kept as-is instead of being capitalised according to `namespace`.
    pub fn from_parts(
        namespace: &'static Namespace,
        title: &str,
        fragment: Option<&str>,
        interwiki: Option<&str>,
    ) -> Self {
        let mut text = String::with_capacity(title.len());

        let iw_delimiter = interwiki.map(|interwiki| {
            text += &interwiki.to_lowercase();
            let iw_delimiter = text.len();
            text.push(':');
            iw_delimiter
        });

        let ns_delimiter = (!namespace.name.is_empty()).then(|| {
            text += namespace.name;
            let ns_delimiter = text.len();
            text.push(':');
            ns_delimiter
        });

        let title = normalize(title);
        if interwiki.is_none()
            && namespace.case == NamespaceCase::FirstLetter
            && let Some(first) = title.chars().next()
            && first.is_lowercase()
        {
            text.extend(first.to_uppercase());
            text += &title[first.len_utf8()..];
        } else {
            text += &title;
        }

        let fragment_delimiter = fragment.map(|fragment| {
            let fragment_delimiter = text.len();
            text.push('#');
            text += &normalize(fragment);
            fragment_delimiter
        });

        Self {
            fragment_delimiter,
            iw_delimiter,
            namespace,
            ns_delimiter,
            text,
        }
    }

    /// Creates a new [`Title`] from user-supplied text.
    ///
    /// In MediaWiki, this is like `newFromText`. A prefix is first matched
    /// against the namespace names, then against the interwiki prefixes known
    /// to `config`.
    pub fn new_from_text(text: &str, config: &Configuration) -> Result<Self, InvalidTitle> {
        let text = normalize(text);
        let mut rest = text.strip_prefix(':').map_or(&*text, str::trim_start);
        let mut namespace = Namespace::main();
        let mut interwiki = None;

        if let Some((prefix, tail)) = rest.split_once(':') {
            let prefix = prefix.trim_end();
            if let Some(ns) = Namespace::find_by_name(prefix) {
                namespace = ns;
                rest = tail.trim_start();
                if rest.starts_with(':') {
                    return Err(InvalidTitle::LeadingColon);
                }
            } else {
                let prefix = prefix.to_lowercase();
                if config.interwiki_map.contains_key(&prefix) {
                    interwiki = Some(prefix);
                    rest = tail.trim_start();
                }
            }
        }

        let (body, fragment) = rest
            .split_once('#')
            .map_or((rest, None), |(body, fragment)| (body.trim_end(), Some(fragment)));

        check_chars(body)?;
        if interwiki.is_none() {
            check_local(body, namespace)?;
        }

        let title = Self::from_parts(namespace, body, fragment, interwiki.as_deref());
        log::trace!("resolved title '{text}' as '{}'", title.full_text());
        Ok(title)
    }

    /// The page fragment, if one exists.
    ///
    /// ```text
    /// interwiki:Namespace:Title/Sub/Page#Fragment
    ///                                    ^^^^^^^^
    /// ```
    pub fn fragment(&self) -> Option<&str> {
        self.fragment_delimiter.map(|d| &self.text[d + 1..])
    }

    /// The title interwiki identifier, in lower case. Local titles have an
    /// empty interwiki identifier.
    ///
    /// ```text
    /// interwiki:Namespace:Title/Sub/Page#Fragment
    /// ^^^^^^^^^
    /// ```
    pub fn interwiki(&self) -> &str {
        let end_at = self.iw_delimiter.unwrap_or(0);
        &self.text[..end_at]
    }

    /// The title key within its own wiki.
    ///
    /// ```text
    /// interwiki:Namespace:Title/Sub/Page#Fragment
    ///           ^^^^^^^^^^^^^^^^^^^^^^^^
    /// ```
    pub fn key(&self) -> &str {
        let start_at = self.iw_delimiter.map_or(0, |d| d + 1);
        let end_at = self.fragment_delimiter.unwrap_or(self.text.len());
        &self.text[start_at..end_at]
    }

    /// The title’s namespace object.
    pub fn namespace(&self) -> &'static Namespace {
        self.namespace
    }

    /// The full title without its fragment. This is the form used to identify
    /// a page, like MediaWiki’s `getPrefixedText`.
    ///
    /// ```text
    /// interwiki:Namespace:Title/Sub/Page#Fragment
    /// ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^
    /// ```
    pub fn prefixed_text(&self) -> &str {
        let end_at = self.fragment_delimiter.unwrap_or(self.text.len());
        &self.text[..end_at]
    }

    /// The path of the page.
    ///
    /// ```text
    /// interwiki:Namespace:Title/Sub/Page#Fragment
    ///                     ^^^^^^^^^^^^^^
    /// ```
    pub fn text(&self) -> &str {
        let start_at = self
            .ns_delimiter
            .or(self.iw_delimiter)
            .map_or(0, |d| d + 1);
        let end_at = self.fragment_delimiter.unwrap_or(self.text.len());
        &self.text[start_at..end_at]
    }

    /// The full text of the title.
    ///
    /// ```text
    /// interwiki:Namespace:Title/Sub/Page#Fragment
    /// ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^
    /// ```
    pub fn full_text(&self) -> &str {
        &self.text
    }

    /// The URL of the title, relative to this wiki when possible.
    ///
    /// Interwiki titles use the URL pattern of their prefix. Local titles use
    /// the configured article path.
    pub fn local_url(&self, config: &Configuration) -> String {
        let key = self.key().replace(' ', "_");
        let path = url_encode(&key).to_string();
        let pattern = match self.interwiki() {
            "" => Some(&config.article_path),
            interwiki => config.interwiki_map.get(interwiki),
        };
        let mut url = pattern.map_or_else(|| path.clone(), |pattern| pattern.replace("$1", &path));
        if let Some(fragment) = self.fragment().filter(|fragment| !fragment.is_empty()) {
            url.push('#');
            url += &anchor_encode(fragment);
        }
        url
    }
}

impl core::fmt::Display for Title {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.prefixed_text())
    }
}

/// Rejects characters that may never appear in a title.
fn check_chars(body: &str) -> Result<(), InvalidTitle> {
    static PERCENT_ESCAPE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new("%[0-9A-Fa-f]{2}").unwrap());

    if let Some(c) = body
        .chars()
        .find(|&c| matches!(c, '<' | '>' | '[' | ']' | '{' | '}' | '|') || c.is_control())
    {
        return Err(InvalidTitle::IllegalChar(c));
    }

    if let Some(escape) = PERCENT_ESCAPE.find(body) {
        return Err(InvalidTitle::PercentEscape(escape.as_str().to_string()));
    }

    Ok(())
}

/// Applies the extra rules for titles on this wiki.
fn check_local(body: &str, namespace: &Namespace) -> Result<(), InvalidTitle> {
    if body.is_empty() {
        return Err(InvalidTitle::Empty);
    }

    if body == "."
        || body == ".."
        || body.starts_with("./")
        || body.starts_with("../")
        || body.contains("/./")
        || body.contains("/../")
        || body.ends_with("/.")
        || body.ends_with("/..")
    {
        return Err(InvalidTitle::RelativePath);
    }

    if body.contains("~~~") {
        return Err(InvalidTitle::Signature);
    }

    if namespace.id != Namespace::SPECIAL && body.len() > MAX_TITLE_LEN {
        return Err(InvalidTitle::TooLong(body.len()));
    }

    Ok(())
}

/// Returns true if the given character `c` is a bidirectional text control
/// character.
fn bidi(c: char) -> bool {
    ('\u{200e}'..='\u{200f}').contains(&c) || ('\u{202a}'..='\u{202e}').contains(&c)
}

/// Normalises a title text part by decoding HTML entities, stripping bidi
/// control characters, and converting runs of whitespace and underscores to a
/// single space character.
pub fn normalize(text: &str) -> Cow<'_, str> {
    let decoded = decode_html_entities(text);
    let mut out = String::with_capacity(decoded.len());
    let mut pending_space = false;
    for c in decoded.chars() {
        if bidi(c) {
            continue;
        } else if spacelike(c) {
            pending_space = !out.is_empty();
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(c);
        }
    }

    if out == decoded {
        decoded
    } else {
        Cow::Owned(out)
    }
}

/// Returns true if the character `c` is considered like whitespace in title
/// text.
fn spacelike(c: char) -> bool {
    c == '_' || c.is_whitespace()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize() {
        assert_eq!(super::normalize("A b"), Cow::Borrowed("A b"));
        assert_eq!(super::normalize("A_b"), "A b");
        assert_eq!(super::normalize("A_______b"), "A b");
        assert_eq!(super::normalize("A__  __b"), "A b");
        assert_eq!(super::normalize("   A b   "), "A b");
        assert_eq!(super::normalize(" \t A b"), "A b");
        assert_eq!(super::normalize("\u{200e}A b   \u{202e}"), "A b");
        assert_eq!(super::normalize("A&amp;b"), "A&b");
    }

    #[test]
    fn local_title() {
        let config = Configuration::default();
        let title = Title::new_from_text("talk:main_page#History", &config).unwrap();
        assert_eq!(title.interwiki(), "");
        assert_eq!(title.namespace().name, "Talk");
        assert_eq!(title.text(), "Main page");
        assert_eq!(title.key(), "Talk:Main page");
        assert_eq!(title.prefixed_text(), "Talk:Main page");
        assert_eq!(title.fragment(), Some("History"));
        assert_eq!(title.local_url(&config), "/article/Talk:Main_page#History");
    }

    #[test]
    fn first_letter_case() {
        let config = Configuration::default();
        let title = Title::new_from_text("éclair", &config).unwrap();
        assert_eq!(title.prefixed_text(), "Éclair");
        assert_eq!(title.local_url(&config), "/article/%C3%89clair");
    }

    #[test]
    fn leading_colon() {
        let config = Configuration::default();
        let title = Title::new_from_text(":Help:Contents", &config).unwrap();
        assert_eq!(title.namespace().name, "Help");
        assert_eq!(title.text(), "Contents");
    }

    #[test]
    fn interwiki_title() {
        let config = Configuration::default();
        let title = Title::new_from_text("FR:talk:page d'accueil", &config).unwrap();
        assert_eq!(title.interwiki(), "fr");
        assert_eq!(title.namespace().name, "");
        assert_eq!(title.text(), "talk:page d'accueil");
        assert_eq!(title.prefixed_text(), "fr:talk:page d'accueil");
        assert_eq!(
            title.local_url(&config),
            "https://fr.wikipedia.org/wiki/talk:page_d%27accueil"
        );
    }

    #[test]
    fn unknown_prefix_is_text() {
        let config = Configuration::default();
        let title = Title::new_from_text("xx:Page", &config).unwrap();
        assert_eq!(title.interwiki(), "");
        assert_eq!(title.namespace().name, "");
        assert_eq!(title.prefixed_text(), "Xx:Page");
    }

    #[test]
    fn invalid_titles() {
        let config = Configuration::default();
        let invalid = |text: &str| Title::new_from_text(text, &config).unwrap_err();
        assert_eq!(invalid(""), InvalidTitle::Empty);
        assert_eq!(invalid("  _ "), InvalidTitle::Empty);
        assert_eq!(invalid("Talk:"), InvalidTitle::Empty);
        assert_eq!(invalid("#Section"), InvalidTitle::Empty);
        assert_eq!(invalid("A[b"), InvalidTitle::IllegalChar('['));
        assert_eq!(invalid("A|b"), InvalidTitle::IllegalChar('|'));
        assert_eq!(invalid("fr:A{b"), InvalidTitle::IllegalChar('{'));
        assert_eq!(invalid("A%20b"), InvalidTitle::PercentEscape("%20".into()));
        assert_eq!(invalid("../Up"), InvalidTitle::RelativePath);
        assert_eq!(invalid("A/./b"), InvalidTitle::RelativePath);
        assert_eq!(invalid("Sig ~~~"), InvalidTitle::Signature);
        assert_eq!(invalid("Talk::Oops"), InvalidTitle::LeadingColon);
        assert_eq!(invalid(&"x".repeat(256)), InvalidTitle::TooLong(256));
    }

    #[test]
    fn empty_interwiki_title() {
        let config = Configuration::default();
        let title = Title::new_from_text("de:", &config).unwrap();
        assert_eq!(title.interwiki(), "de");
        assert_eq!(title.local_url(&config), "https://de.wikipedia.org/wiki/");
    }
}
