//! Template expansion and interlanguage link collection.

use super::{
    Result, State,
    parser_fns::{call_parser_fn, call_variable, is_variable},
};
use crate::{
    link::{LinkAttr, LinkDraft, LinkRecord},
    title::Title,
};
use memchr::memmem;

/// The maximum nesting depth of template expressions.
const MAX_DEPTH: usize = 40;

/// Expands all template expressions in `source` into `out`.
pub(super) fn expand(
    out: &mut String,
    state: &mut State<'_>,
    source: &str,
    depth: usize,
) -> Result {
    let mut rest = source;
    while let Some(start) = memmem::find(rest.as_bytes(), b"{{") {
        out.push_str(&rest[..start]);
        let body_start = start + "{{".len();
        let Some(len) = find_close(&rest[body_start..]) else {
            // Unbalanced; everything else is text.
            rest = &rest[start..];
            break;
        };

        let body = &rest[body_start..body_start + len];
        call(out, state, body, depth)?;
        rest = &rest[body_start + len + "}}".len()..];
    }
    out.push_str(rest);
    Ok(())
}

/// Expands the body of one template expression into `out`.
fn call(out: &mut String, state: &mut State<'_>, body: &str, depth: usize) -> Result {
    if depth >= MAX_DEPTH {
        log::warn!("{}: template expansion depth limit exceeded", state.title);
        out.push_str(r#"<span class="error">Template expansion depth limit exceeded</span>"#);
        return Ok(());
    }

    let parts = split_args(body);
    let mut name = String::new();
    expand(&mut name, state, parts[0], depth + 1)?;
    let name = name.trim_ascii();

    if let Some((callee, first)) = name.split_once(':') {
        let callee = callee.trim_ascii();
        if state.parser.functions.get(callee).is_some() {
            let mut args = Vec::with_capacity(parts.len());
            args.push(first.trim_ascii().to_string());
            for part in &parts[1..] {
                let mut arg = String::new();
                expand(&mut arg, state, part, depth + 1)?;
                args.push(arg.trim_ascii().to_string());
            }
            return call_parser_fn(out, state, callee, &args);
        }
    } else if parts.len() == 1 && is_variable(name) {
        return call_variable(out, state, name);
    }

    log::trace!("{}: leaving '{name}' as text", state.title);
    out.push_str("{{");
    out.push_str(body);
    out.push_str("}}");
    Ok(())
}

/// Finds the `}}` which closes a template expression whose body starts at
/// the beginning of `s`, skipping over nested expressions. Returns the length
/// of the body.
fn find_close(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut depth = 0_usize;
    let mut pos = 0;
    while let Some(offset) = memchr::memchr2(b'{', b'}', &bytes[pos..]) {
        let at = pos + offset;
        if bytes.get(at + 1) != Some(&bytes[at]) {
            pos = at + 1;
            continue;
        }

        if bytes[at] == b'{' {
            depth += 1;
        } else if depth == 0 {
            return Some(at);
        } else {
            depth -= 1;
        }
        pos = at + 2;
    }
    None
}

/// Splits the body of a template expression on each `|` which is not inside
/// a nested template expression or wikilink.
fn split_args(body: &str) -> Vec<&str> {
    let bytes = body.as_bytes();
    let mut parts = Vec::new();
    let mut braces = 0_usize;
    let mut brackets = 0_usize;
    let mut start = 0;
    let mut at = 0;
    while at < bytes.len() {
        let c = bytes[at];
        if matches!(c, b'{' | b'}' | b'[' | b']') && bytes.get(at + 1) == Some(&c) {
            match c {
                b'{' => braces += 1,
                b'}' => braces = braces.saturating_sub(1),
                b'[' => brackets += 1,
                _ => brackets = brackets.saturating_sub(1),
            }
            at += 2;
            continue;
        }

        if c == b'|' && braces == 0 && brackets == 0 {
            parts.push(&body[start..at]);
            start = at + 1;
        }
        at += 1;
    }
    parts.push(&body[start..]);
    parts
}

/// Removes interlanguage links from the expanded text `text`, adding them to
/// the page’s language links, and returns the remaining text.
///
/// Only the first link for each language is kept.
pub(super) fn collect_language_links(state: &mut State<'_>, text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = memmem::find(rest.as_bytes(), b"[[") {
        let inner_start = start + "[[".len();
        let Some(len) = memmem::find(&rest.as_bytes()[inner_start..], b"]]") else {
            break;
        };
        let end = inner_start + len + "]]".len();

        if let Some(link) = interlanguage_link(state, &rest[inner_start..inner_start + len]) {
            out.push_str(&rest[..start]);
            let lang = link.attr(LinkAttr::Lang);
            if state
                .output
                .language_links
                .iter()
                .any(|other| other.attr(LinkAttr::Lang) == lang)
            {
                log::debug!("{}: ignoring second link to {}", state.title, link.href());
            } else {
                state.output.language_links.push(link);
            }
        } else {
            out.push_str(&rest[..end]);
        }
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}

/// Converts the inside of a wikilink to a language link, if its target has
/// an interlanguage prefix.
fn interlanguage_link(state: &State<'_>, inner: &str) -> Option<LinkRecord> {
    let target = inner.split_once('|').map_or(inner, |(target, _)| target).trim();
    if target.starts_with(':') {
        return None;
    }

    let (prefix, _) = target.split_once(':')?;
    let prefix = prefix.trim().to_lowercase();
    let config = state.parser.config;
    let autonym = config.language_names.get(&prefix)?;
    let title = Title::new_from_text(target, config).ok()?;
    if title.interwiki() != prefix {
        return None;
    }

    let mut draft = LinkDraft::new(autonym.as_str());
    draft.set(LinkAttr::Class, format!("interlanguage-link interwiki-{prefix}"));
    draft.set(LinkAttr::Lang, prefix.as_str());
    draft.set(LinkAttr::HrefLang, prefix.as_str());
    draft.set(
        LinkAttr::Title,
        match title.text() {
            "" => autonym.clone(),
            page => format!("{page} – {autonym}"),
        },
    );
    Some(draft.into_record(title.local_url(config)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close() {
        assert_eq!(find_close("a}}"), Some(1));
        assert_eq!(find_close("a{{b}}c}}d"), Some(7));
        assert_eq!(find_close("{x}}}"), Some(2));
        assert_eq!(find_close("a{{b}}"), None);
        assert_eq!(find_close("a}b"), None);
    }

    #[test]
    fn split() {
        assert_eq!(split_args("a"), ["a"]);
        assert_eq!(split_args("a|b||c"), ["a", "b", "", "c"]);
        assert_eq!(split_args("a|{{b|c}}|[[d|e]]"), ["a", "{{b|c}}", "[[d|e]]"]);
        assert_eq!(split_args("a|b=c|"), ["a", "b=c", ""]);
    }
}
