//! The page being sent to the reader.

use crate::{
    link::LinkRecord,
    renderer::{LanguageLinks, PROPERTY_NAME, PageProperties, ParserOutput},
};

/// The output for one page view, built from one or more rendered
/// [`ParserOutput`]s.
#[derive(Debug, Default)]
pub struct OutputPage {
    /// The page body.
    content: String,
    /// Language links from interlanguage wikilinks.
    language_links: Vec<LinkRecord>,
    /// Language links added by `{{extralanguagelink:…}}`.
    extra_language_links: Option<LanguageLinks>,
}

impl OutputPage {
    /// Adds a rendered page to the output.
    ///
    /// Extra language links are read from the page properties stored with the
    /// rendered page, not from the parser output itself, so a page served from
    /// storage behaves the same as a freshly rendered one. They are only taken
    /// from a page which has some, and replace any taken from an earlier page.
    pub fn add_parser_output(&mut self, output: ParserOutput, properties: &PageProperties) {
        let ParserOutput {
            text,
            language_links,
            ..
        } = output;

        self.content += &text;
        self.language_links.extend(language_links);
        let extra_language_links =
            LanguageLinks::from_property(properties.get(PROPERTY_NAME).map(String::as_str));
        if !extra_language_links.is_empty() {
            self.extra_language_links = Some(extra_language_links);
        }
    }

    /// Consumes the output, returning the page body.
    pub fn into_content(self) -> String {
        self.content
    }

    /// Language links from interlanguage wikilinks.
    pub fn language_links(&self) -> &[LinkRecord] {
        &self.language_links
    }

    /// Language links added by `{{extralanguagelink:…}}`, if there are any.
    pub fn extra_language_links(&self) -> Option<&LanguageLinks> {
        self.extra_language_links.as_ref()
    }
}
