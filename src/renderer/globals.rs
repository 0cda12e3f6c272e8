//! Collections for semi-structured article data.

use crate::link::LinkRecord;
use indexmap::IndexMap;

/// The name of the page property which stores the extra language links.
pub const PROPERTY_NAME: &str = "extralanguagelinks";

/// Stored page properties, by property name.
pub type PageProperties = IndexMap<String, String>;

/// The extra language links added by one page, in the order they were added.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LanguageLinks(Vec<LinkRecord>);

impl LanguageLinks {
    /// Appends a link. Earlier links are kept, and duplicates are allowed.
    pub fn push(&mut self, link: LinkRecord) {
        self.0.push(link);
    }

    /// Returns true if there are no links.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The number of links.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The links, in the order they were added.
    pub fn as_slice(&self) -> &[LinkRecord] {
        &self.0
    }

    /// Iterates over the links in the order they were added.
    pub fn iter(&self) -> core::slice::Iter<'_, LinkRecord> {
        self.0.iter()
    }

    /// Serialises the links for storage as a page property. An empty list is
    /// not stored at all.
    pub fn to_property(&self) -> Result<Option<String>, serde_json::Error> {
        if self.0.is_empty() {
            Ok(None)
        } else {
            serde_json::to_string(&self.0).map(Some)
        }
    }

    /// Reads links back from a stored page property. A missing property is an
    /// empty list. So is a property which cannot be read, since a stale or
    /// corrupt property must not stop the page from rendering.
    pub fn from_property(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self::default();
        };

        match serde_json::from_str::<Vec<LinkRecord>>(value) {
            Ok(links) => Self(links),
            Err(err) => {
                log::warn!("Ignoring unreadable '{PROPERTY_NAME}' page property: {err}");
                Self::default()
            }
        }
    }
}
