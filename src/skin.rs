//! Skin template data for the page chrome.

use crate::{
    i18n::Messages,
    link::{LinkAttr, LinkRecord},
    output::OutputPage,
};
use core::fmt;
use html_escape::{encode_double_quoted_attribute as attr_escape, encode_text};

/// Data used by the skin to draw everything around the page body.
#[derive(Debug)]
pub struct SkinTemplate {
    /// The links in the “in other languages” sidebar section, or `None` if the
    /// page has no language links of its own.
    pub language_urls: Option<Vec<LinkRecord>>,
}

impl SkinTemplate {
    /// Creates the skin data for `out`.
    pub fn new(out: &OutputPage) -> Self {
        let language_links = out.language_links();
        Self {
            language_urls: (!language_links.is_empty()).then(|| language_links.to_vec()),
        }
    }

    /// Emits the “in other languages” sidebar section. Nothing is emitted if
    /// there are no language links.
    pub fn language_portlet<W: fmt::Write + ?Sized>(
        &self,
        f: &mut W,
        messages: &Messages,
    ) -> fmt::Result {
        let Some(links) = self.language_urls.as_deref().filter(|links| !links.is_empty()) else {
            return Ok(());
        };

        writeln!(
            f,
            r#"<nav id="p-lang" class="portlet" aria-labelledby="p-lang-label">"#
        )?;
        writeln!(
            f,
            r#"<h3 id="p-lang-label">{}</h3>"#,
            encode_text(&messages.text("otherlanguages"))
        )?;
        writeln!(f, "<ul>")?;
        for link in links {
            f.write_str("<li")?;
            if let Some(class) = link.attr(LinkAttr::Class) {
                write!(f, r#" class="{}""#, attr_escape(class))?;
            }
            write!(f, r#"><a href="{}""#, attr_escape(link.href()))?;
            for (attr, value) in link.attrs().filter(|(attr, _)| *attr != LinkAttr::Class) {
                write!(f, r#" {attr}="{}""#, attr_escape(value))?;
            }
            writeln!(f, ">{}</a></li>", encode_text(link.text()))?;
        }
        writeln!(f, "</ul>")?;
        writeln!(f, "</nav>")
    }
}

/// Appends the page’s extra language links to the skin’s language links.
///
/// This must run exactly once per page view. Running it again appends the
/// same links again.
pub fn merge_extra_language_links(out: &OutputPage, template: &mut SkinTemplate) {
    let Some(extra) = out.extra_language_links().filter(|extra| !extra.is_empty()) else {
        return;
    };

    match &mut template.language_urls {
        None => template.language_urls = Some(extra.as_slice().to_vec()),
        Some(language_urls) => language_urls.extend(extra.iter().cloned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{link::LinkDraft, renderer::ParserOutput};
    use std::collections::HashMap;

    fn link(text: &str) -> LinkRecord {
        LinkDraft::new(text).into_record(format!("/article/{text}"))
    }

    fn texts(template: &SkinTemplate) -> Option<Vec<&str>> {
        template
            .language_urls
            .as_ref()
            .map(|links| links.iter().map(LinkRecord::text).collect())
    }

    fn make_page(language_links: &[&str], extra: &[&str]) -> OutputPage {
        let mut output = ParserOutput {
            language_links: language_links.iter().copied().map(link).collect(),
            ..ParserOutput::default()
        };
        for text in extra {
            output.extra_language_links.push(link(text));
        }
        let properties = output.page_properties().unwrap();
        let mut page = OutputPage::default();
        page.add_parser_output(output, &properties);
        page
    }

    #[test]
    fn merge_after_existing() {
        let page = make_page(&["A", "B"], &["C", "D"]);
        let mut template = SkinTemplate::new(&page);
        merge_extra_language_links(&page, &mut template);
        assert_eq!(texts(&template), Some(vec!["A", "B", "C", "D"]));
    }

    #[test]
    fn merge_without_existing() {
        let page = make_page(&[], &["C", "D"]);
        let mut template = SkinTemplate::new(&page);
        assert_eq!(texts(&template), None);
        merge_extra_language_links(&page, &mut template);
        assert_eq!(texts(&template), Some(vec!["C", "D"]));
    }

    #[test]
    fn merge_nothing() {
        let page = make_page(&["A"], &[]);
        let mut template = SkinTemplate::new(&page);
        merge_extra_language_links(&page, &mut template);
        assert_eq!(texts(&template), Some(vec!["A"]));

        let page = make_page(&[], &[]);
        let mut template = SkinTemplate::new(&page);
        merge_extra_language_links(&page, &mut template);
        assert_eq!(texts(&template), None);
    }

    #[test]
    fn merge_twice_duplicates() {
        let page = make_page(&["A"], &["C"]);
        let mut template = SkinTemplate::new(&page);
        merge_extra_language_links(&page, &mut template);
        merge_extra_language_links(&page, &mut template);
        assert_eq!(texts(&template), Some(vec!["A", "C", "C"]));
    }

    #[test]
    fn language_portlet() {
        let messages = Messages::new("en", &HashMap::new()).unwrap();
        let mut draft = LinkDraft::new("Fran<ç>ais");
        draft.set(LinkAttr::Class, "extra");
        draft.set(LinkAttr::Title, r#"Say "bonjour""#);
        draft.set(LinkAttr::Lang, "fr");
        let template = SkinTemplate {
            language_urls: Some(vec![draft.into_record("/article/A&B".into())]),
        };

        let mut html = String::new();
        template.language_portlet(&mut html, &messages).unwrap();
        assert_eq!(
            html,
            concat!(
                r#"<nav id="p-lang" class="portlet" aria-labelledby="p-lang-label">"#,
                "\n",
                r#"<h3 id="p-lang-label">In other languages</h3>"#,
                "\n<ul>\n",
                r#"<li class="extra"><a href="/article/A&amp;B" lang="fr" "#,
                r#"title="Say &quot;bonjour&quot;">Fran&lt;ç&gt;ais</a></li>"#,
                "\n</ul>\n</nav>\n"
            )
        );

        let mut html = String::new();
        SkinTemplate { language_urls: None }
            .language_portlet(&mut html, &messages)
            .unwrap();
        assert_eq!(html, "");
    }
}
