//! Best-effort tag recovery from attribute values the host parser could not
//! fully evaluate. A `merge(...)` expression that survives parsing still
//! carries its literal object arguments as text; those flat `{ ... }`
//! fragments are extracted and merged here without evaluating anything.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::attr::{resolve, AttrValue};

// Innermost brace pairs only. Nested function calls produce nested brace
// syntax that is not itself a flat literal, so depth stops at one.
static FRAGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^{}]*\}").unwrap());

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FragmentError {
    #[error("fragment is not brace-delimited")]
    NotAnObject,
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("expected '=' or ':' after key")]
    MissingSeparator,
    #[error("unexpected character {0:?}")]
    Unexpected(char),
    #[error("value {0:?} is not a literal")]
    NonLiteralValue(String),
}

/// Recover a string-to-string tag mapping from a raw attribute value.
///
/// Already-resolved mappings pass through with scalar values coerced to
/// strings. Unresolved expression text is scanned for flat object literals,
/// merged in textual order with later fragments overwriting earlier keys.
/// That order approximates how nested merge calls layer defaults under
/// overrides, but it is not a verified equivalence with the configuration
/// language's own precedence; audit-sensitive consumers should treat
/// recovered tags as best-effort. Anything else yields an empty mapping.
pub fn resolve_tags(raw: Option<&AttrValue>) -> BTreeMap<String, String> {
    let value = match raw {
        Some(v) => resolve(v),
        None => return BTreeMap::new(),
    };
    match value {
        AttrValue::Mapping(entries) => entries
            .iter()
            .filter_map(|(k, v)| v.coerce_string().map(|s| (k.clone(), s)))
            .collect(),
        AttrValue::Unresolved(text) => {
            let mut merged = BTreeMap::new();
            for fragment in FRAGMENT.find_iter(&text) {
                // braces that delimit blocks rather than object literals
                // fail the literal grammar and are skipped
                if let Ok(pairs) = parse_object_literal(fragment.as_str()) {
                    merged.extend(pairs);
                }
            }
            merged
        }
        _ => BTreeMap::new(),
    }
}

/// Parse one brace-delimited fragment with the object-literal grammar
/// subset: quoted or bare keys, `=` or `:` separators, string, number, or
/// bool values. Pairs are returned in source order.
pub fn parse_object_literal(fragment: &str) -> Result<Vec<(String, String)>, FragmentError> {
    let inner = fragment
        .trim()
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .ok_or(FragmentError::NotAnObject)?;

    let mut chars = inner.chars().peekable();
    let mut pairs = Vec::new();
    loop {
        skip_filler(&mut chars);
        let Some(&c) = chars.peek() else { break };
        let key = if c == '"' {
            read_quoted(&mut chars)?
        } else if c.is_ascii_alphabetic() || c == '_' {
            read_bare(&mut chars)
        } else {
            return Err(FragmentError::Unexpected(c));
        };
        skip_filler(&mut chars);
        match chars.next() {
            Some('=') | Some(':') => {}
            _ => return Err(FragmentError::MissingSeparator),
        }
        skip_filler(&mut chars);
        pairs.push((key, read_value(&mut chars)?));
    }
    Ok(pairs)
}

fn skip_filler(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    while chars.next_if(|c| c.is_whitespace() || *c == ',').is_some() {}
}

fn read_quoted(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> Result<String, FragmentError> {
    chars.next(); // opening quote
    let mut out = String::new();
    loop {
        match chars.next() {
            Some('"') => return Ok(out),
            Some('\\') => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => return Err(FragmentError::UnterminatedString),
            },
            Some(c) => out.push(c),
            None => return Err(FragmentError::UnterminatedString),
        }
    }
}

fn read_bare(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut out = String::new();
    while let Some(c) = chars.next_if(|c| c.is_ascii_alphanumeric() || matches!(*c, '_' | '-')) {
        out.push(c);
    }
    out
}

fn read_value(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> Result<String, FragmentError> {
    let Some(&first) = chars.peek() else {
        return Err(FragmentError::MissingSeparator);
    };
    if first == '"' {
        return read_quoted(chars);
    }
    let mut token = String::new();
    while let Some(c) =
        chars.next_if(|c| c.is_ascii_alphanumeric() || matches!(*c, '_' | '.' | '+' | '-'))
    {
        token.push(c);
    }
    if token.is_empty() {
        return Err(FragmentError::Unexpected(first));
    }
    if token == "true" || token == "false" || token.parse::<f64>().is_ok() {
        Ok(token)
    } else {
        // bare words are variable references, not literals
        Err(FragmentError::NonLiteralValue(token))
    }
}
