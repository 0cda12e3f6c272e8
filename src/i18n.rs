//! Interface messages.
//!
//! Message dictionaries use the MediaWiki i18n JSON format: a flat object of
//! message keys to message strings, plus an `@metadata` entry which is
//! ignored. Messages may contain `$N` placeholders.

use crate::{common::format_raw_message, config::Configuration};
use core::convert::Infallible;
use std::{borrow::Cow, collections::HashMap};

/// The bundled message dictionaries.
static DICTIONARIES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "de" => include_str!("../res/i18n/de.json"),
    "en" => include_str!("../res/i18n/en.json"),
    "fr" => include_str!("../res/i18n/fr.json"),
};

/// The language used when a message is missing from the interface language.
const FALLBACK_LANGUAGE: &str = "en";

/// A message dictionary loading error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A bundled dictionary is not valid JSON.
    #[error("'{lang}' message dictionary: {err}")]
    Dictionary {
        /// The language of the dictionary.
        lang: &'static str,
        /// The error.
        #[source]
        err: serde_json::Error,
    },
}

/// Messages for one interface language.
#[derive(Debug)]
pub struct Messages {
    /// The interface language.
    language: String,
    /// Message keys and their text.
    messages: HashMap<String, String>,
}

impl Messages {
    /// Loads the messages for `language`, falling back to English for any
    /// message which is not translated, then applies the site `overrides`.
    pub fn new(language: &str, overrides: &HashMap<String, String>) -> Result<Self, Error> {
        let mut messages = HashMap::new();
        load(&mut messages, FALLBACK_LANGUAGE)?;

        let language = language.to_ascii_lowercase();
        if language != FALLBACK_LANGUAGE {
            if let Some((lang, _)) = DICTIONARIES.get_entry(language.as_str()) {
                load(&mut messages, *lang)?;
            } else {
                log::warn!("No messages for language '{language}'; using '{FALLBACK_LANGUAGE}'");
            }
        }

        for (key, value) in overrides {
            messages.insert(key.to_lowercase(), value.clone());
        }

        Ok(Self { language, messages })
    }

    /// Loads the messages for the interface language of `config`.
    pub fn for_config(config: &Configuration) -> Result<Self, Error> {
        Self::new(&config.language, &config.messages)
    }

    /// The interface language.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Returns the raw text of the message `key`, if it exists and is not
    /// blank or disabled.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages
            .get(key)
            .map(String::as_str)
            .filter(|message| !matches!(*message, "" | "-"))
    }

    /// Returns the text of the message `key`, or a placeholder naming the key
    /// if it does not exist.
    pub fn text(&self, key: &str) -> Cow<'_, str> {
        self.format(key, &[])
    }

    /// Returns the text of the message `key` with `$N` replaced by the
    /// one-based `params`, or a placeholder naming the key if it does not
    /// exist.
    pub fn format(&self, key: &str, params: &[&str]) -> Cow<'_, str> {
        let Some(message) = self.get(key) else {
            return Cow::Owned(format!("⧼{}⧽", html_escape::encode_text(key)));
        };

        format_raw_message(message, |n| {
            Ok::<_, Infallible>(
                n.parse::<usize>()
                    .ok()
                    .and_then(|n| params.get(n.checked_sub(1)?))
                    .map(|param| Cow::Borrowed(*param)),
            )
        })
        .unwrap_or_else(|never| match never {})
    }
}

/// Adds the bundled dictionary for `lang` to `messages`.
fn load(messages: &mut HashMap<String, String>, lang: &'static str) -> Result<(), Error> {
    let Some(source) = DICTIONARIES.get(lang) else {
        return Ok(());
    };

    let dictionary = serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(source)
        .map_err(|err| Error::Dictionary { lang, err })?;
    for (key, value) in dictionary {
        if let serde_json::Value::String(value) = value {
            messages.insert(key, value);
        }
    }
    Ok(())
}
