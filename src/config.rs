//! Site configuration.
//!
//! Pages cannot be rendered without out-of-band configuration data: the
//! namespace table, the interwiki map used to recognise and resolve prefixed
//! titles, and the restrictions on who may add extra language links and where
//! those links may point. Everything except the namespace table can be loaded
//! from a JSON file; missing keys take the values a stock wiki would have.

use crate::title::{
    Namespace,
    NamespaceCase::{CaseSensitive, FirstLetter},
    Title, normalize,
};
use indexmap::IndexMap;
use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

/// Errors that may occur when loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The configuration file could not be read.
    #[error("{1}: I/O error: {0}")]
    Io(std::io::Error, PathBuf),

    /// The configuration file is not valid.
    #[error("{1}: invalid configuration: {0}")]
    Parse(serde_json::Error, PathBuf),
}

impl Namespace {
    /// Finds the namespace with the given case-insensitive name. Searches the
    /// name and all aliases. The main namespace is never found by name.
    pub fn find_by_name(name: &str) -> Option<&'static Self> {
        NAMESPACES.iter().find(|ns| {
            !ns.name.is_empty()
                && (ns.name.eq_ignore_ascii_case(name)
                    || ns
                        .aliases
                        .iter()
                        .any(|alias| alias.eq_ignore_ascii_case(name)))
        })
    }

    /// Returns the main namespace.
    pub fn main() -> &'static Self {
        &NAMESPACES[MAIN_INDEX]
    }
}

/// The index of the main namespace in [`NAMESPACES`].
const MAIN_INDEX: usize = 2;

/// Registered title namespaces.
static NAMESPACES: &[Namespace] = &[
    Namespace {
        id: -2,
        name: "Media",
        case: FirstLetter,
        aliases: &[],
    },
    Namespace {
        id: -1,
        name: "Special",
        case: FirstLetter,
        aliases: &[],
    },
    Namespace {
        id: 0,
        name: "",
        case: FirstLetter,
        aliases: &[],
    },
    Namespace {
        id: 1,
        name: "Talk",
        case: FirstLetter,
        aliases: &[],
    },
    Namespace {
        id: 2,
        name: "User",
        case: FirstLetter,
        aliases: &[],
    },
    Namespace {
        id: 3,
        name: "User talk",
        case: FirstLetter,
        aliases: &[],
    },
    Namespace {
        id: 4,
        name: "Project",
        case: FirstLetter,
        aliases: &[],
    },
    Namespace {
        id: 5,
        name: "Project talk",
        case: FirstLetter,
        aliases: &[],
    },
    Namespace {
        id: 6,
        name: "File",
        case: FirstLetter,
        aliases: &["Image"],
    },
    Namespace {
        id: 7,
        name: "File talk",
        case: FirstLetter,
        aliases: &["Image talk"],
    },
    Namespace {
        id: 8,
        name: "MediaWiki",
        case: FirstLetter,
        aliases: &[],
    },
    Namespace {
        id: 9,
        name: "MediaWiki talk",
        case: FirstLetter,
        aliases: &[],
    },
    Namespace {
        id: 10,
        name: "Template",
        case: FirstLetter,
        aliases: &[],
    },
    Namespace {
        id: 11,
        name: "Template talk",
        case: FirstLetter,
        aliases: &[],
    },
    Namespace {
        id: 12,
        name: "Help",
        case: FirstLetter,
        aliases: &[],
    },
    Namespace {
        id: 13,
        name: "Help talk",
        case: FirstLetter,
        aliases: &[],
    },
    Namespace {
        id: 14,
        name: "Category",
        case: FirstLetter,
        aliases: &[],
    },
    Namespace {
        id: 15,
        name: "Category talk",
        case: FirstLetter,
        aliases: &[],
    },
    Namespace {
        id: 828,
        name: "Module",
        case: FirstLetter,
        aliases: &[],
    },
    Namespace {
        id: 829,
        name: "Module talk",
        case: FirstLetter,
        aliases: &[],
    },
    Namespace {
        id: 2300,
        name: "Gadget",
        case: CaseSensitive,
        aliases: &[],
    },
    Namespace {
        id: 2301,
        name: "Gadget talk",
        case: CaseSensitive,
        aliases: &[],
    },
];

/// Default interwiki prefixes and their URL patterns.
static DEFAULT_INTERWIKI_MAP: phf::OrderedMap<&str, &str> = phf::phf_ordered_map! {
    "commons" => "https://commons.wikimedia.org/wiki/$1",
    "de" => "https://de.wikipedia.org/wiki/$1",
    "en" => "https://en.wikipedia.org/wiki/$1",
    "es" => "https://es.wikipedia.org/wiki/$1",
    "fr" => "https://fr.wikipedia.org/wiki/$1",
    "it" => "https://it.wikipedia.org/wiki/$1",
    "ja" => "https://ja.wikipedia.org/wiki/$1",
    "mw" => "https://www.mediawiki.org/wiki/$1",
};

/// Default interlanguage prefixes and their language autonyms.
static DEFAULT_LANGUAGE_NAMES: phf::OrderedMap<&str, &str> = phf::phf_ordered_map! {
    "de" => "Deutsch",
    "en" => "English",
    "es" => "Español",
    "fr" => "Français",
    "it" => "Italiano",
    "ja" => "日本語",
};

/// The on-disk form of a restriction list: `false` for no restriction, or a
/// list of permitted values.
#[derive(serde::Deserialize)]
#[serde(untagged)]
pub enum Toggle {
    /// A bare boolean. Only `false` is meaningful.
    Flag(bool),
    /// An explicit list.
    List(Vec<String>),
}

/// The interwiki prefixes which extra language links may point to.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize)]
#[serde(try_from = "Toggle")]
pub enum AllowedPrefixes {
    /// Any prefix, including none at all, is allowed.
    #[default]
    All,
    /// Only these lower-cased prefixes are allowed. An empty string permits
    /// links to local pages.
    Only(HashSet<String>),
}

impl AllowedPrefixes {
    /// Creates an explicit allow-list from the given prefixes.
    pub fn only<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::Only(
            prefixes
                .into_iter()
                .map(|prefix| prefix.as_ref().to_lowercase())
                .collect(),
        )
    }

    /// Returns true if links with the interwiki prefix `prefix` are allowed.
    pub fn allows(&self, prefix: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(prefixes) => prefixes.contains(&prefix.to_lowercase()),
        }
    }
}

impl TryFrom<Toggle> for AllowedPrefixes {
    type Error = &'static str;

    fn try_from(value: Toggle) -> Result<Self, Self::Error> {
        match value {
            Toggle::Flag(false) => Ok(Self::All),
            Toggle::Flag(true) => Err("expected `false` or a list of interwiki prefixes"),
            Toggle::List(prefixes) => Ok(Self::only(prefixes)),
        }
    }
}

/// The pages which may use the extra language link parser function.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize)]
#[serde(try_from = "Toggle")]
pub enum AllowedTitles {
    /// Every page may add links.
    #[default]
    Unrestricted,
    /// Only pages with these prefixed titles may add links.
    Only(HashSet<String>),
}

impl AllowedTitles {
    /// Creates an explicit allow-list from the given prefixed page titles.
    pub fn only<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::Only(
            titles
                .into_iter()
                .map(|title| normalize(title.as_ref()).into_owned())
                .collect(),
        )
    }

    /// Returns true if the page `title` may add links.
    pub fn allows(&self, title: &Title) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Only(titles) => titles.contains(title.prefixed_text()),
        }
    }
}

impl TryFrom<Toggle> for AllowedTitles {
    type Error = &'static str;

    fn try_from(value: Toggle) -> Result<Self, Self::Error> {
        match value {
            Toggle::Flag(false) => Ok(Self::Unrestricted),
            Toggle::Flag(true) => Err("expected `false` or a list of page titles"),
            Toggle::List(titles) => Ok(Self::only(titles)),
        }
    }
}

/// The installation configuration.
#[derive(Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct Configuration {
    /// Interwiki prefixes which extra language links may use.
    pub allowed_prefixes: AllowedPrefixes,
    /// Pages which may add extra language links.
    pub allowed_titles: AllowedTitles,
    /// The URL pattern for local articles, where `$1` is the encoded title.
    pub article_path: String,
    /// Names of the extra language link parser function. The first name is
    /// the one quoted in error messages.
    pub function_names: Vec<String>,
    /// Interwiki prefixes and their URL patterns, where `$1` is the encoded
    /// remote title.
    pub interwiki_map: IndexMap<String, String>,
    /// The interface language.
    pub language: String,
    /// Interlanguage prefixes and the autonyms of their languages. Each prefix
    /// also needs an entry in `interwiki_map`.
    pub language_names: IndexMap<String, String>,
    /// Site-specific message overrides.
    pub messages: HashMap<String, String>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            allowed_prefixes: AllowedPrefixes::default(),
            allowed_titles: AllowedTitles::default(),
            article_path: "/article/$1".to_string(),
            function_names: vec!["extralanguagelink".to_string()],
            interwiki_map: DEFAULT_INTERWIKI_MAP
                .entries()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            language: "en".to_string(),
            language_names: DEFAULT_LANGUAGE_NAMES
                .entries()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            messages: HashMap::new(),
        }
    }
}

impl Configuration {
    /// Loads a configuration from the JSON file at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|err| Error::Io(err, path.into()))?;
        let config = Self::from_json(&json).map_err(|err| Error::Parse(err, path.into()))?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Loads a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::normalized)
    }

    /// Lower-cases the prefix keys, since prefixes are matched
    /// case-insensitively.
    fn normalized(mut self) -> Self {
        self.interwiki_map = self
            .interwiki_map
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        self.language_names = self
            .language_names
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        self
    }

    /// The name of the extra language link parser function used in error
    /// messages.
    pub fn primary_function_name(&self) -> &str {
        self.function_names
            .first()
            .map_or("extralanguagelink", String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_namespace() {
        assert_eq!(Namespace::main().id, 0);
        assert_eq!(Namespace::find_by_name("talk").unwrap().name, "Talk");
        assert_eq!(Namespace::find_by_name("image").unwrap().id, 6);
        assert!(Namespace::find_by_name("").is_none());
    }

    #[test]
    fn defaults() {
        let config = Configuration::default();
        assert_eq!(config.allowed_prefixes, AllowedPrefixes::All);
        assert_eq!(config.allowed_titles, AllowedTitles::Unrestricted);
        assert_eq!(config.primary_function_name(), "extralanguagelink");
        assert_eq!(
            config.interwiki_map.get("fr").map(String::as_str),
            Some("https://fr.wikipedia.org/wiki/$1")
        );
    }

    #[test]
    fn from_json() {
        let config = Configuration::from_json(
            r#"{
                "allowedPrefixes": ["DE", "es"],
                "allowedTitles": ["Main_Page"],
                "interwikiMap": { "FR": "https://fr.example.org/$1" },
                "language": "de"
            }"#,
        )
        .unwrap();
        assert_eq!(config.allowed_prefixes, AllowedPrefixes::only(["de", "es"]));
        assert!(config.allowed_prefixes.allows("De"));
        assert!(!config.allowed_prefixes.allows("fr"));
        assert_eq!(config.allowed_titles, AllowedTitles::only(["Main Page"]));
        assert!(config.interwiki_map.contains_key("fr"));
        assert_eq!(config.article_path, "/article/$1");
        assert_eq!(config.language, "de");
    }

    #[test]
    fn from_json_false_sentinels() {
        let config =
            Configuration::from_json(r#"{ "allowedPrefixes": false, "allowedTitles": false }"#)
                .unwrap();
        assert_eq!(config.allowed_prefixes, AllowedPrefixes::All);
        assert_eq!(config.allowed_titles, AllowedTitles::Unrestricted);
    }

    #[test]
    fn from_json_rejects_true() {
        assert!(Configuration::from_json(r#"{ "allowedPrefixes": true }"#).is_err());
        assert!(Configuration::from_json(r#"{ "allowedTitles": true }"#).is_err());
        assert!(Configuration::from_json(r#"{ "allowedPrefix": [] }"#).is_err());
    }

    #[test]
    fn allowed_titles() {
        let config = Configuration::default();
        let allowed = AllowedTitles::only(["Main Page"]);
        let main = Title::new_from_text("Main_Page", &config).unwrap();
        let talk = Title::new_from_text("Talk:Main Page", &config).unwrap();
        assert!(allowed.allows(&main));
        assert!(!allowed.allows(&talk));
        assert!(AllowedTitles::Unrestricted.allows(&talk));
    }

    #[test]
    fn from_file_missing() {
        let err = Configuration::from_file("/nonexistent/langlinks.json").unwrap_err();
        assert!(matches!(err, Error::Io(..)));
    }
}
