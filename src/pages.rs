//! Whole-page rendering.

use crate::{
    output::OutputPage,
    renderer::{self, PageProperties, Parser},
    skin::{SkinTemplate, merge_extra_language_links},
    title::Title,
};

/// A fully rendered page.
#[derive(Debug)]
pub(crate) struct RenderedPage {
    /// The page body.
    pub content: String,
    /// The “in other languages” sidebar section.
    pub sidebar: String,
    /// The page properties to store for the page.
    pub page_properties: PageProperties,
}

/// Renders the page `title` from `source`, including its sidebar.
pub(crate) fn render_page(
    parser: &Parser<'_>,
    title: &Title,
    source: &str,
) -> Result<RenderedPage, renderer::Error> {
    let output = parser.parse(title, source)?;
    let page_properties = output.page_properties()?;

    let mut page = OutputPage::default();
    page.add_parser_output(output, &page_properties);

    let mut template = SkinTemplate::new(&page);
    merge_extra_language_links(&page, &mut template);

    let mut sidebar = String::new();
    template.language_portlet(&mut sidebar, parser.messages())?;

    Ok(RenderedPage {
        content: page.into_content(),
        sidebar,
        page_properties,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{AllowedPrefixes, Configuration},
        i18n::Messages,
        renderer::PROPERTY_NAME,
    };

    #[test]
    fn extra_links_follow_host_links() {
        let config = Configuration::default();
        let messages = Messages::for_config(&config).unwrap();
        let parser = Parser::new(&config, &messages);
        let title = Title::new_from_text("Main Page", &config).unwrap();
        let page = render_page(
            &parser,
            &title,
            "{{extralanguagelink:es:Portada|Español}}[[de:Hauptseite]]text",
        )
        .unwrap();

        assert_eq!(page.content, "text");
        let de = page.sidebar.find(">Deutsch<").unwrap();
        let es = page.sidebar.find(">Español<").unwrap();
        assert!(de < es);
        assert!(page.page_properties.contains_key(PROPERTY_NAME));
    }

    #[test]
    fn no_links_no_sidebar() {
        let config = Configuration {
            allowed_prefixes: AllowedPrefixes::only(["de"]),
            ..Configuration::default()
        };
        let messages = Messages::for_config(&config).unwrap();
        let parser = Parser::new(&config, &messages);
        let title = Title::new_from_text("Main Page", &config).unwrap();
        let page = render_page(&parser, &title, "{{extralanguagelink:fr:Accueil}}").unwrap();

        assert!(page.content.starts_with(r#"<div class="error">"#));
        assert_eq!(page.sidebar, "");
        assert!(page.page_properties.is_empty());
    }
}
