//! Restrictions on extra language links.

use super::LinkError;
use crate::{config::Configuration, title::Title};

/// Decides which pages may add extra language links and where those links
/// may point.
#[derive(Debug)]
pub(super) struct LinkValidator<'a> {
    /// The installation configuration.
    config: &'a Configuration,
}

impl<'a> LinkValidator<'a> {
    /// Creates a validator using the allow-lists from `config`.
    pub fn new(config: &'a Configuration) -> Self {
        Self { config }
    }

    /// Checks whether the page `title` may add extra language links.
    pub fn check_page(&self, title: &Title) -> Result<(), LinkError> {
        if self.config.allowed_titles.allows(title) {
            Ok(())
        } else {
            Err(LinkError::PageNotAllowed)
        }
    }

    /// Resolves the link target `target` to a URL.
    pub fn resolve(&self, target: &str) -> Result<String, LinkError> {
        let title = Title::new_from_text(target, self.config).map_err(|err| {
            log::debug!("bad extra language link target '{target}': {err}");
            LinkError::BadTitle(target.to_string())
        })?;

        let interwiki = title.interwiki();
        if self.config.allowed_prefixes.allows(interwiki) {
            Ok(title.local_url(self.config))
        } else {
            Err(LinkError::BadInterwiki(interwiki.to_string()))
        }
    }
}
