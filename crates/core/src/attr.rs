use std::collections::BTreeMap;

pub type AttributeMap = BTreeMap<String, AttrValue>;

/// One attribute value as delivered by the host parser. HCL parsers wrap
/// single values in one-element lists and leave unevaluated function calls
/// as raw expression text, so both shapes are first-class here.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Sequence(Vec<AttrValue>),
    Mapping(BTreeMap<String, AttrValue>),
    Unresolved(String),
}

impl AttrValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    /// Literal string text, or the raw expression text for unresolved values.
    pub fn text(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) | AttrValue::Unresolved(s) => Some(s),
            _ => None,
        }
    }

    pub fn coerce_string(&self) -> Option<String> {
        match self {
            AttrValue::String(s) => Some(s.clone()),
            AttrValue::Bool(b) => Some(b.to_string()),
            AttrValue::Number(n) => Some(format_number(*n)),
            _ => None,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Normalize a raw attribute value into its canonical literal form.
///
/// Single-element sequences are the host's legacy wrapping for single
/// values and unwrap recursively; empty sequences degrade to `Null`.
/// Total over every input shape so rules never see a failure path.
pub fn resolve(raw: &AttrValue) -> AttrValue {
    match raw {
        AttrValue::Sequence(items) => match items.as_slice() {
            [] => AttrValue::Null,
            [inner] => resolve(inner),
            // multi-valued attributes are outside every rule's domain
            _ => AttrValue::Null,
        },
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_single_element_sequence() {
        let raw = AttrValue::Sequence(vec![AttrValue::String("PT8H".into())]);
        assert_eq!(resolve(&raw), AttrValue::String("PT8H".into()));
    }

    #[test]
    fn unwraps_nested_single_element_sequences() {
        let raw = AttrValue::Sequence(vec![AttrValue::Sequence(vec![AttrValue::Bool(true)])]);
        assert_eq!(resolve(&raw), AttrValue::Bool(true));
    }

    #[test]
    fn empty_sequence_degrades_to_null() {
        assert_eq!(resolve(&AttrValue::Sequence(vec![])), AttrValue::Null);
    }

    #[test]
    fn multi_element_sequence_degrades_to_null() {
        let raw = AttrValue::Sequence(vec![AttrValue::Number(1.0), AttrValue::Number(2.0)]);
        assert_eq!(resolve(&raw), AttrValue::Null);
    }

    #[test]
    fn scalars_and_mappings_pass_through() {
        let mapping = AttrValue::Mapping(BTreeMap::from([(
            "Owner".to_string(),
            AttrValue::String("sre".into()),
        )]));
        assert_eq!(resolve(&mapping), mapping);
        assert_eq!(
            resolve(&AttrValue::Unresolved("${merge(a, b)}".into())),
            AttrValue::Unresolved("${merge(a, b)}".into())
        );
        assert_eq!(resolve(&AttrValue::Number(4.0)), AttrValue::Number(4.0));
    }

    #[test]
    fn coerces_scalars_to_strings() {
        assert_eq!(AttrValue::Number(42.0).coerce_string().unwrap(), "42");
        assert_eq!(AttrValue::Number(1.5).coerce_string().unwrap(), "1.5");
        assert_eq!(AttrValue::Bool(true).coerce_string().unwrap(), "true");
        assert_eq!(AttrValue::Null.coerce_string(), None);
    }
}
