//! Parser function implementations.

// Clippy: Functions signatures all conform to a specific API; inline modules
// are clearer with wildcard import.
#![allow(clippy::unnecessary_wraps, clippy::wildcard_imports)]

use super::{Result, State};
use crate::{config::Configuration, title::Title};
use core::fmt::Write as _;
use std::collections::HashMap;

/// The function signature of a parser function.
type ParserFn = fn(&mut String, &mut State<'_>, &Arguments<'_>) -> Result;

/// The registered name of the extra language link parser function.
pub(super) const EXTRA_LANGUAGE_LINK: &str = "extralanguagelink";

/// The arguments to a parser function call.
///
/// All registered parser functions receive their arguments pre-expanded and
/// trimmed of ASCII whitespace.
pub(super) struct Arguments<'a> {
    /// The name the function was called with.
    pub callee: &'a str,
    /// The expanded arguments. The text after the `:` is the first argument.
    pub args: &'a [String],
}

impl Arguments<'_> {
    /// Returns the argument at `index`, if it exists.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }
}

mod langlinks {
    //! Language link parser functions.

    use super::*;
    use crate::renderer::{LinkError, link_args};

    /// `{{extralanguagelink: target | text | name=value … }}`
    pub fn extra_language_link(
        out: &mut String,
        state: &mut State<'_>,
        Arguments { callee, args }: &Arguments<'_>,
    ) -> Result {
        let Err(err) = add_extra_language_link(state, args) else {
            return Ok(());
        };

        if err.is_silent() {
            log::trace!("{}: {callee}: {err}", state.title);
        } else {
            log::debug!("{}: {callee}: link not added: {err}", state.title);
        }

        if let Some((key, param)) = err.message() {
            let messages = state.parser.messages;
            let param = html_escape::encode_text(param);
            write!(
                out,
                r#"<div class="error">{{{{{}}}}}: {}: {}</div>"#,
                html_escape::encode_text(state.parser.config.primary_function_name()),
                messages.text("error"),
                messages.format(key, &[&*param])
            )?;
        }

        Ok(())
    }

    /// Validates the link in `args` and adds it to the page.
    fn add_extra_language_link(state: &mut State<'_>, args: &[String]) -> Result<(), LinkError> {
        let target = link_args::target(args)?;
        state.parser.validator.check_page(state.title)?;
        let draft = link_args::parse_link_args(target, args, &state.parser.param_names);
        let href = state.parser.validator.resolve(target)?;
        log::trace!("{}: extra language link '{}' to {href}", state.title, draft.text());
        state.output.extra_language_links.push(draft.into_record(href));
        Ok(())
    }
}

mod page {
    //! Page information parser functions.

    use super::*;

    /// `{{FULLPAGENAME [: title]}}`
    pub fn full_page_name(
        out: &mut String,
        state: &mut State<'_>,
        arguments: &Arguments<'_>,
    ) -> Result {
        if let Some(title) = title_arg(state, arguments) {
            write!(out, "{}", html_escape::encode_text(title.prefixed_text()))?;
        }
        Ok(())
    }

    /// `{{NAMESPACE [: title]}}`
    pub fn namespace(out: &mut String, state: &mut State<'_>, arguments: &Arguments<'_>) -> Result {
        if let Some(title) = title_arg(state, arguments)
            && title.interwiki().is_empty()
        {
            write!(out, "{}", html_escape::encode_text(title.namespace().name))?;
        }
        Ok(())
    }

    /// `{{PAGENAME [: title]}}`
    pub fn page_name(out: &mut String, state: &mut State<'_>, arguments: &Arguments<'_>) -> Result {
        if let Some(title) = title_arg(state, arguments) {
            write!(out, "{}", html_escape::encode_text(title.text()))?;
        }
        Ok(())
    }

    /// Returns the title named by the first argument, or the current page
    /// when there are no arguments. An invalid title gives nothing.
    fn title_arg(state: &State<'_>, arguments: &Arguments<'_>) -> Option<Title> {
        match arguments.get(0) {
            None => Some(state.title.clone()),
            Some(text) => Title::new_from_text(text, state.parser.config).ok(),
        }
    }
}

/// Known parser functions.
static PARSER_FUNCTIONS: phf::Map<&'static str, ParserFn> = phf::phf_map! {
    "extralanguagelink" => langlinks::extra_language_link,
    "fullpagename" => page::full_page_name,
    "namespace" => page::namespace,
    "pagename" => page::page_name,
};

/// Known variables. Unlike parser functions, variable names are
/// case-sensitive.
static VARIABLES: phf::Map<&'static str, ParserFn> = phf::phf_map! {
    "FULLPAGENAME" => page::full_page_name,
    "NAMESPACE" => page::namespace,
    "PAGENAME" => page::page_name,
};

/// Maps the names parser functions may be called by to their registered
/// names.
#[derive(Debug)]
pub(super) struct FunctionNames(HashMap<String, &'static str>);

impl FunctionNames {
    /// Registers every parser function under its own name, and the extra
    /// language link function under each of its configured synonyms.
    pub fn new(config: &Configuration) -> Self {
        let mut names = PARSER_FUNCTIONS
            .keys()
            .filter(|name| **name != EXTRA_LANGUAGE_LINK)
            .map(|name| ((*name).to_string(), *name))
            .collect::<HashMap<_, _>>();

        if config.function_names.is_empty() {
            names.insert(EXTRA_LANGUAGE_LINK.to_string(), EXTRA_LANGUAGE_LINK);
        } else {
            for synonym in &config.function_names {
                names.insert(synonym.trim().to_lowercase(), EXTRA_LANGUAGE_LINK);
            }
        }

        Self(names)
    }

    /// Finds the registered name for the case-insensitive name `callee`.
    pub fn get(&self, callee: &str) -> Option<&'static str> {
        self.0.get(&callee.to_lowercase()).copied()
    }
}

/// Returns true if `name` is a known variable name.
pub(super) fn is_variable(name: &str) -> bool {
    VARIABLES.contains_key(name)
}

/// Renders a variable.
pub(super) fn call_variable(out: &mut String, state: &mut State<'_>, name: &str) -> Result {
    if let Some(variable) = VARIABLES.get(name) {
        variable(out, state, &Arguments { callee: name, args: &[] })?;
    }
    Ok(())
}

/// Renders a parser function.
pub(super) fn call_parser_fn(
    out: &mut String,
    state: &mut State<'_>,
    callee: &str,
    args: &[String],
) -> Result {
    if let Some(parser_fn) = state
        .parser
        .functions
        .get(callee)
        .and_then(|name| PARSER_FUNCTIONS.get(name))
    {
        parser_fn(out, state, &Arguments { callee, args })
    } else {
        log::warn!("unknown parser function {callee}");
        Ok(())
    }
}
