//! Argument handling for `{{extralanguagelink:…}}`.

use super::LinkError;
use crate::{
    css::check_css,
    i18n::Messages,
    link::{LinkAttr, LinkDraft},
};
use std::collections::HashMap;

/// Maps named argument names to link attributes.
///
/// Each attribute can be named either by its literal HTML name or by its
/// localised name from the `extralanguagelink-param-<name>` message. When a
/// name could mean more than one attribute, the attribute which comes first in
/// [`LinkAttr::ALL`] wins. Names are case-sensitive.
#[derive(Debug)]
pub(super) struct ParamNames(HashMap<String, LinkAttr>);

impl ParamNames {
    /// Builds the lookup table from the interface messages.
    pub fn new(messages: &Messages) -> Self {
        let mut names = HashMap::new();
        for attr in LinkAttr::ALL {
            names.entry(attr.name().to_string()).or_insert(attr);
            if let Some(localised) = messages.get(&format!("extralanguagelink-param-{attr}")) {
                names.entry(localised.trim().to_string()).or_insert(attr);
            }
        }
        Self(names)
    }

    /// Finds the attribute named `name`.
    pub fn get(&self, name: &str) -> Option<LinkAttr> {
        self.0.get(name).copied()
    }
}

/// Returns the link target, which is the first argument.
pub(super) fn target(args: &[String]) -> Result<&str, LinkError> {
    args.first()
        .map(String::as_str)
        .filter(|target| !target.is_empty())
        .ok_or(LinkError::MissingTarget)
}

/// Builds a link from the arguments of `{{extralanguagelink:…}}`.
///
/// The second argument is the link text, which is the same as the target
/// when it is missing or empty. Each later argument of the form `name=value`
/// whose name is in `names` sets that attribute, replacing any earlier value.
/// Everything else is ignored.
pub(super) fn parse_link_args(target: &str, args: &[String], names: &ParamNames) -> LinkDraft {
    let text = args
        .get(1)
        .map(String::as_str)
        .filter(|text| !text.is_empty())
        .unwrap_or(target);

    let mut draft = LinkDraft::new(text);
    for arg in args.iter().skip(2) {
        let Some((name, value)) = arg.split_once('=') else {
            continue;
        };

        if let Some(attr) = names.get(name.trim()) {
            draft.set(attr, value.trim());
        } else {
            log::trace!("ignoring unknown argument '{}'", name.trim());
        }
    }

    if let Some(style) = draft.get(LinkAttr::Style) {
        let style = check_css(style).into_owned();
        draft.set(LinkAttr::Style, style);
    }

    draft
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    fn names(lang: &str) -> ParamNames {
        ParamNames::new(&Messages::new(lang, &HashMap::new()).unwrap())
    }

    #[test]
    fn missing_target() {
        assert_eq!(target(&[]), Err(LinkError::MissingTarget));
        assert_eq!(target(&args(&["", "Text"])), Err(LinkError::MissingTarget));
        assert_eq!(target(&args(&["0"])), Ok("0"));
    }

    #[test]
    fn text_defaults_to_target() {
        let names = names("en");
        let draft = parse_link_args("fr:Accueil", &args(&["fr:Accueil"]), &names);
        assert_eq!(draft.text(), "fr:Accueil");
        let draft = parse_link_args("fr:Accueil", &args(&["fr:Accueil", ""]), &names);
        assert_eq!(draft.text(), "fr:Accueil");
        let draft = parse_link_args("fr:Accueil", &args(&["fr:Accueil", "Français"]), &names);
        assert_eq!(draft.text(), "Français");
    }

    #[test]
    fn named_args() {
        let names = names("en");
        let draft = parse_link_args(
            "de:Seite",
            &args(&[
                "de:Seite",
                "Deutsch",
                " lang = de ",
                "no equals sign",
                "title=a=b",
                "onclick=alert(1)",
                "Class=wrong-case",
                "=empty",
            ]),
            &names,
        );
        assert_eq!(draft.get(LinkAttr::Lang), Some("de"));
        assert_eq!(draft.get(LinkAttr::Title), Some("a=b"));
        assert_eq!(draft.get(LinkAttr::Class), None);
        assert_eq!(draft.get(LinkAttr::HrefLang), None);
        assert_eq!(draft.get(LinkAttr::Style), None);
    }

    #[test]
    fn localised_names() {
        let names = names("de");
        assert_eq!(names.get("sprache"), Some(LinkAttr::Lang));
        assert_eq!(names.get("lang"), Some(LinkAttr::Lang));
        assert_eq!(names.get("klasse"), Some(LinkAttr::Class));
        assert_eq!(names.get("Sprache"), None);

        let draft = parse_link_args(
            "en:Page",
            &args(&["en:Page", "English", "sprache=en", "titel=English page"]),
            &names,
        );
        assert_eq!(draft.get(LinkAttr::Lang), Some("en"));
        assert_eq!(draft.get(LinkAttr::Title), Some("English page"));
    }

    #[test]
    fn first_attribute_wins_ambiguous_name() {
        let overrides = HashMap::from([
            ("extralanguagelink-param-lang".to_string(), "class".to_string()),
            ("extralanguagelink-param-title".to_string(), "tip".to_string()),
        ]);
        let names = ParamNames::new(&Messages::new("en", &overrides).unwrap());
        assert_eq!(names.get("class"), Some(LinkAttr::Class));
        assert_eq!(names.get("tip"), Some(LinkAttr::Title));
        assert_eq!(names.get("title"), Some(LinkAttr::Title));
    }

    #[test]
    fn last_duplicate_wins() {
        let names = names("en");
        let a = parse_link_args(
            "es:Página",
            &args(&["es:Página", "", "class=one", "lang=es", "class=two"]),
            &names,
        );
        let b = parse_link_args(
            "es:Página",
            &args(&["es:Página", "", "lang=es", "class=one", "class=two"]),
            &names,
        );
        assert_eq!(a, b);
        assert_eq!(a.get(LinkAttr::Class), Some("two"));
    }

    #[test]
    fn style_is_sanitised() {
        let names = names("en");
        let draft = parse_link_args(
            "fr:Page",
            &args(&["fr:Page", "", "style=background: url(javascript:alert(1))"]),
            &names,
        );
        assert_eq!(draft.get(LinkAttr::Style), Some(crate::css::INSECURE));

        let draft = parse_link_args(
            "fr:Page",
            &args(&["fr:Page", "", "style=color: red/* x */"]),
            &names,
        );
        assert_eq!(draft.get(LinkAttr::Style), Some("color: red "));
    }
}
