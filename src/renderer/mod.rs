//! Article rendering types and functions.
//!
//! Rendering a page happens in one pass over its source text:
//!
//! 1. Template expressions are expanded recursively, innermost first. An
//!    expression with no arguments whose name is a registered variable is
//!    replaced by the variable’s value. An expression whose name has a `:` and
//!    whose part before the `:` names a registered parser function is replaced
//!    by the output of that function. The `extralanguagelink` function is
//!    registered under every configured synonym and takes no `#` prefix. Any
//!    other expression is left as plain text.
//!
//! 2. Wikitext links whose target starts with a configured interlanguage
//!    prefix are removed from the text and collected as the page’s own
//!    language links.
//!
//! Language links added by `{{extralanguagelink:…}}` are collected separately
//! in [`ParserOutput::extra_language_links`]. They only reach the sidebar when
//! the page’s output is merged into a skin template, so they survive whatever
//! the skin does to the page’s own links.

use crate::{config::Configuration, i18n::Messages, link::LinkRecord, title::Title};
use core::fmt;
pub use globals::{LanguageLinks, PROPERTY_NAME, PageProperties};
use link_args::ParamNames;
use parser_fns::FunctionNames;
use validate::LinkValidator;

mod expand;
mod globals;
mod link_args;
mod parser_fns;
mod validate;

/// An article rendering error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A write to a buffer failed.
    #[error("fmt error: {0}")]
    Fmt(#[from] fmt::Error),

    /// Page properties could not be serialised.
    #[error("page property error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The standard result type used by all fallible renderer functions.
pub type Result<T = (), E = Error> = core::result::Result<T, E>;

/// The reason an `{{extralanguagelink:…}}` call did not add a link.
///
/// None of these stop the page from rendering. Some are reported inline, and
/// the rest expand to nothing.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum LinkError {
    /// The link target was empty or missing.
    #[error("missing link target")]
    MissingTarget,

    /// The current page is not allowed to add extra language links.
    #[error("page may not add extra language links")]
    PageNotAllowed,

    /// The link target is not a valid title.
    #[error("bad title '{0}'")]
    BadTitle(String),

    /// The link target uses an interwiki prefix which is not allowed.
    #[error("interwiki prefix '{0}' not allowed")]
    BadInterwiki(String),
}

impl LinkError {
    /// Returns true if the error expands to nothing instead of an error
    /// message.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::MissingTarget | Self::PageNotAllowed)
    }

    /// The message key and its parameter for errors which are shown to the
    /// reader.
    pub fn message(&self) -> Option<(&'static str, &str)> {
        match self {
            Self::MissingTarget | Self::PageNotAllowed => None,
            Self::BadTitle(target) => Some(("extralanguagelink-badtitle", target)),
            Self::BadInterwiki(prefix) => Some(("extralanguagelink-badinterwiki", prefix)),
        }
    }
}

/// Everything collected while rendering one page.
#[derive(Debug, Default)]
pub struct ParserOutput {
    /// The rendered text.
    pub text: String,
    /// Language links from interlanguage wikilinks, in page order.
    pub language_links: Vec<LinkRecord>,
    /// Language links added by `{{extralanguagelink:…}}`, in call order.
    pub extra_language_links: LanguageLinks,
}

impl ParserOutput {
    /// Returns the page properties which must be stored with this output.
    pub fn page_properties(&self) -> Result<PageProperties> {
        let mut properties = PageProperties::new();
        if let Some(value) = self.extra_language_links.to_property()? {
            properties.insert(PROPERTY_NAME.to_string(), value);
        }
        Ok(properties)
    }
}

/// The page renderer. One renderer can render any number of pages, one at a
/// time.
pub struct Parser<'a> {
    /// The installation configuration.
    config: &'a Configuration,
    /// Registered parser function names.
    functions: FunctionNames,
    /// Interface messages.
    messages: &'a Messages,
    /// Named argument lookup table for `{{extralanguagelink:…}}`.
    param_names: ParamNames,
    /// The extra language link checker.
    validator: LinkValidator<'a>,
}

impl<'a> Parser<'a> {
    /// Creates a new renderer.
    pub fn new(config: &'a Configuration, messages: &'a Messages) -> Self {
        Self {
            config,
            functions: FunctionNames::new(config),
            messages,
            param_names: ParamNames::new(messages),
            validator: LinkValidator::new(config),
        }
    }

    /// Interface messages.
    pub fn messages(&self) -> &'a Messages {
        self.messages
    }

    /// Renders the page `title` from its source text. Each call starts from a
    /// fresh [`ParserOutput`], so nothing from an earlier render of the same
    /// page survives.
    pub fn parse(&self, title: &Title, source: &str) -> Result<ParserOutput> {
        let mut state = State {
            parser: self,
            title,
            output: ParserOutput::default(),
        };

        let mut text = String::with_capacity(source.len());
        expand::expand(&mut text, &mut state, source, 0)?;
        state.output.text = expand::collect_language_links(&mut state, &text);

        log::debug!(
            "Rendered '{title}' with {} language links and {} extra language links",
            state.output.language_links.len(),
            state.output.extra_language_links.len()
        );

        Ok(state.output)
    }
}

/// Renderer state for one page.
pub(crate) struct State<'p> {
    /// The renderer.
    pub parser: &'p Parser<'p>,
    /// The title of the page being rendered.
    pub title: &'p Title,
    /// Collected output.
    pub output: ParserOutput,
}
