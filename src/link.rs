//! Sidebar language link records.

use core::fmt;

/// An optional HTML attribute of a language link.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LinkAttr {
    /// `class`
    Class,
    /// `hreflang`
    HrefLang,
    /// `lang`
    Lang,
    /// `style`
    Style,
    /// `title`
    Title,
}

impl LinkAttr {
    /// All attributes, in the order they are matched against argument names.
    pub const ALL: [LinkAttr; 5] = [
        LinkAttr::Class,
        LinkAttr::HrefLang,
        LinkAttr::Lang,
        LinkAttr::Style,
        LinkAttr::Title,
    ];

    /// The HTML attribute name, which is also the literal argument name.
    pub const fn name(self) -> &'static str {
        match self {
            LinkAttr::Class => "class",
            LinkAttr::HrefLang => "hreflang",
            LinkAttr::Lang => "lang",
            LinkAttr::Style => "style",
            LinkAttr::Title => "title",
        }
    }
}

impl fmt::Display for LinkAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A language link which has not been given a URL yet.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LinkDraft {
    /// The link text.
    text: String,
    /// Optional attributes.
    attrs: Attrs,
}

impl LinkDraft {
    /// Creates a new draft with the given link text and no attributes.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attrs: Attrs::default(),
        }
    }

    /// The link text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The value of the attribute `attr`, if it is set.
    pub fn get(&self, attr: LinkAttr) -> Option<&str> {
        self.attrs.get(attr)
    }

    /// Sets the attribute `attr`, replacing any earlier value.
    pub fn set(&mut self, attr: LinkAttr, value: impl Into<String>) {
        *self.attrs.slot(attr) = Some(value.into());
    }

    /// Finishes the link with its resolved URL.
    pub fn into_record(self, href: String) -> LinkRecord {
        LinkRecord {
            text: self.text,
            href,
            attrs: self.attrs,
        }
    }
}

/// A finished language link.
///
/// The serialised form is an object with `text`, `href`, and any of the
/// optional attributes which are set.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct LinkRecord {
    /// The link text.
    text: String,
    /// The link URL.
    href: String,
    /// Optional attributes.
    #[serde(flatten)]
    attrs: Attrs,
}

impl LinkRecord {
    /// The link text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The link URL.
    pub fn href(&self) -> &str {
        &self.href
    }

    /// The value of the attribute `attr`, if it is set.
    pub fn attr(&self, attr: LinkAttr) -> Option<&str> {
        self.attrs.get(attr)
    }

    /// Iterates over the attributes which are set, in [`LinkAttr::ALL`]
    /// order.
    pub fn attrs(&self) -> impl Iterator<Item = (LinkAttr, &str)> {
        LinkAttr::ALL
            .into_iter()
            .filter_map(|attr| self.attr(attr).map(|value| (attr, value)))
    }
}

/// Optional link attributes.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
struct Attrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hreflang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
}

impl Attrs {
    fn get(&self, attr: LinkAttr) -> Option<&str> {
        match attr {
            LinkAttr::Class => self.class.as_deref(),
            LinkAttr::HrefLang => self.hreflang.as_deref(),
            LinkAttr::Lang => self.lang.as_deref(),
            LinkAttr::Style => self.style.as_deref(),
            LinkAttr::Title => self.title.as_deref(),
        }
    }

    fn slot(&mut self, attr: LinkAttr) -> &mut Option<String> {
        match attr {
            LinkAttr::Class => &mut self.class,
            LinkAttr::HrefLang => &mut self.hreflang,
            LinkAttr::Lang => &mut self.lang,
            LinkAttr::Style => &mut self.style,
            LinkAttr::Title => &mut self.title,
        }
    }
}
