//! Generic structural parser for nested CIP values.
//!
//! A value such as
//! ```text
//! {1 Content={2854 Content={2853, 3031 Amount=40}}, 3 Content={3354}}
//! ```
//! becomes a list of [`Element`]s. Every `Content=` attribute receives the
//! elements of the bracket group that follows it.

use crate::enclosure::{
    DEFAULT_PAIRS, extract_enclosed_substrings, split_respecting_quotes, split_tokens,
    strip_outer_enclosure,
};
use crate::error::{CipError, Result};
use serde::Serialize;

/// Name of the attribute that owns a nested bracket group.
pub const CONTENT_ATTRIBUTE: &str = "Content";

const EQUALS_SIGN: char = '=';
const COMMA: char = ',';

/// The value carried by a [`ParsedAttribute`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AttributeValue {
    Integer(i32),
    Text(String),
    Elements(Vec<Element>),
}

/// A `name` or `name=value` token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedAttribute {
    pub name: String,
    pub value: Option<AttributeValue>,
}

impl ParsedAttribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    pub fn as_integer(&self) -> Option<i32> {
        match self.value {
            Some(AttributeValue::Integer(value)) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            Some(AttributeValue::Text(value)) => Some(value),
            _ => None,
        }
    }

    pub fn as_elements(&self) -> Option<&[Element]> {
        match &self.value {
            Some(AttributeValue::Elements(elements)) => Some(elements),
            _ => None,
        }
    }

    fn is_pending_content(&self) -> bool {
        self.name == CONTENT_ATTRIBUTE && self.value.is_none()
    }
}

/// A parsed unit: an optional leading id followed by attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    pub id: Option<i32>,
    pub attributes: Vec<ParsedAttribute>,
}

impl Element {
    /// A bare marker such as `SeeInvisible`.
    pub fn is_flag(&self) -> bool {
        self.attributes.len() == 1 && self.attributes[0].value.is_none()
    }

    /// The id, or -1 when the element has none.
    pub fn id_or_default(&self) -> i32 {
        self.id.unwrap_or(-1)
    }

    pub fn attribute(&self, name: &str) -> Option<&ParsedAttribute> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    pub fn content(&self) -> Option<&[Element]> {
        self.attribute(CONTENT_ATTRIBUTE).and_then(ParsedAttribute::as_elements)
    }
}

/// Parse a single `name` or `name=value` token.
pub fn parse_attribute(token: &str) -> ParsedAttribute {
    match token.split_once(EQUALS_SIGN) {
        Some((name, value)) if !value.is_empty() => ParsedAttribute {
            name: name.to_string(),
            value: Some(match value.parse::<i32>() {
                Ok(number) => AttributeValue::Integer(number),
                Err(_) => AttributeValue::Text(value.to_string()),
            }),
        },
        Some((name, _)) => ParsedAttribute::new(name),
        None => ParsedAttribute::new(token),
    }
}

/// Parse one comma-separated piece into an [`Element`].
pub fn parse_element(text: &str) -> Result<Element> {
    if text.trim().is_empty() {
        return Err(CipError::Grammar("empty element".to_string()));
    }

    let tokens = split_tokens(text)?;
    let id = tokens.first().and_then(|token| token.parse::<i32>().ok());
    let skip = usize::from(id.is_some());

    let attributes = tokens[skip..].iter().map(|token| parse_attribute(token)).collect();

    Ok(Element { id, attributes })
}

/// Where a bracket group's elements end up.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Root,
    Attribute {
        group: usize,
        element: usize,
        attribute: usize,
    },
}

/// Parse a nested value into its top-level elements.
///
/// Returns `Ok(None)` for blank input.
pub fn parse(input: &str) -> Result<Option<Vec<Element>>> {
    if input.trim().is_empty() {
        return Ok(None);
    }

    let input = strip_outer_enclosure(input.trim_matches(' '), &DEFAULT_PAIRS);
    let enclosures = extract_enclosed_substrings(input, &DEFAULT_PAIRS)?;

    let mut groups: Vec<Vec<Element>> = Vec::with_capacity(enclosures.len());
    let mut targets: Vec<Slot> = Vec::with_capacity(enclosures.len());
    let mut pending = vec![Slot::Root];

    for (group, enclosure) in enclosures.iter().enumerate() {
        let elements = if enclosure.trim().is_empty() {
            Vec::new()
        } else {
            split_respecting_quotes(enclosure, COMMA)?
                .into_iter()
                .map(parse_element)
                .collect::<Result<Vec<_>>>()?
        };

        let slot = pending.pop().ok_or_else(|| {
            CipError::UnbalancedEnclosure(format!("no Content attribute owns {{{}}}", enclosure))
        })?;

        // Groups arrive in pre-order, so the first Content must be popped first.
        let mut owned = Vec::new();
        for (element_idx, element) in elements.iter().enumerate() {
            for (attribute_idx, attr) in element.attributes.iter().enumerate() {
                if attr.is_pending_content() {
                    owned.push(Slot::Attribute {
                        group,
                        element: element_idx,
                        attribute: attribute_idx,
                    });
                }
            }
        }
        pending.extend(owned.into_iter().rev());

        groups.push(elements);
        targets.push(slot);
    }

    if !pending.is_empty() {
        return Err(CipError::UnbalancedEnclosure(format!(
            "{} Content attribute(s) without a group in {}",
            pending.len(),
            input
        )));
    }

    // A group only ever fills a slot of an earlier group, so resolving from
    // the back moves each group after all of its own children are in place.
    let mut root = None;
    for group in (0..groups.len()).rev() {
        let elements = std::mem::take(&mut groups[group]);
        match targets[group] {
            Slot::Root => root = Some(elements),
            Slot::Attribute {
                group: owner,
                element,
                attribute,
            } => {
                groups[owner][element].attributes[attribute].value =
                    Some(AttributeValue::Elements(elements));
            }
        }
    }

    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attribute_flag() {
        let attr = parse_attribute("SeeInvisible");
        assert_eq!(attr.name, "SeeInvisible");
        assert_eq!(attr.value, None);
    }

    #[test]
    fn test_parse_attribute_dangling_equals() {
        let attr = parse_attribute("Content=");
        assert_eq!(attr.name, "Content");
        assert_eq!(attr.value, None);
    }

    #[test]
    fn test_parse_attribute_integer() {
        let attr = parse_attribute("Amount=40");
        assert_eq!(attr.name, "Amount");
        assert_eq!(attr.as_integer(), Some(40));

        let attr = parse_attribute("Speed=-80");
        assert_eq!(attr.as_integer(), Some(-80));
    }

    #[test]
    fn test_parse_attribute_string() {
        let attr = parse_attribute(r#"String="a=b""#);
        assert_eq!(attr.name, "String");
        assert_eq!(attr.as_text(), Some(r#""a=b""#));

        let attr = parse_attribute("Amount=40x");
        assert_eq!(attr.as_text(), Some("40x"));
    }

    #[test]
    fn test_parse_element_with_id() {
        let element = parse_element("3031 Amount=40").unwrap();
        assert_eq!(element.id, Some(3031));
        assert_eq!(element.attributes.len(), 1);
        assert_eq!(element.attribute("Amount").and_then(|a| a.as_integer()), Some(40));
    }

    #[test]
    fn test_parse_element_without_id() {
        let element = parse_element("NoPoison").unwrap();
        assert_eq!(element.id, None);
        assert_eq!(element.id_or_default(), -1);
        assert!(element.is_flag());
    }

    #[test]
    fn test_parse_element_empty() {
        assert!(parse_element("   ").is_err());
    }

    #[test]
    fn test_parse_blank_is_absent() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_flag_list() {
        let elements = parse("{KickBoxes, SeeInvisible, NoPoison}").unwrap().unwrap();
        let names: Vec<&str> = elements
            .iter()
            .filter(|e| e.is_flag())
            .map(|e| e.attributes[0].name.as_str())
            .collect();
        assert_eq!(names, vec!["KickBoxes", "SeeInvisible", "NoPoison"]);
    }

    #[test]
    fn test_parse_empty_group() {
        assert_eq!(parse("{}").unwrap(), Some(Vec::new()));
    }

    #[test]
    fn test_parse_nested_inventory() {
        let input = "{1 Content={3354},\n 3 Content={2854 Content={2853, 3031 Amount=40}},\n 10 Content={2854 Content={3449 Amount=100, 3155 Charges=35}}}";
        let slots = parse(input).unwrap().unwrap();
        assert_eq!(slots.len(), 3);

        assert_eq!(slots[0].id, Some(1));
        let first = slots[0].content().unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, Some(3354));

        assert_eq!(slots[1].id, Some(3));
        let bag = &slots[1].content().unwrap()[0];
        assert_eq!(bag.id, Some(2854));
        let inside = bag.content().unwrap();
        assert_eq!(inside.len(), 2);
        assert_eq!(inside[0].id, Some(2853));
        assert_eq!(inside[1].id, Some(3031));
        assert_eq!(inside[1].attribute("Amount").and_then(|a| a.as_integer()), Some(40));

        assert_eq!(slots[2].id, Some(10));
        let inside = slots[2].content().unwrap()[0].content().unwrap();
        assert_eq!(inside[0].attribute("Amount").and_then(|a| a.as_integer()), Some(100));
        assert_eq!(inside[1].attribute("Charges").and_then(|a| a.as_integer()), Some(35));
    }

    #[test]
    fn test_parse_sibling_contents_keep_order() {
        let elements = parse("{1 Content={10}, 2 Content={20}}").unwrap().unwrap();
        assert_eq!(elements[0].content().unwrap()[0].id, Some(10));
        assert_eq!(elements[1].content().unwrap()[0].id, Some(20));
    }

    #[test]
    fn test_parse_quoted_text() {
        let elements = parse(r#"{2 String="Hello, {world}" Amount=3}"#).unwrap().unwrap();
        assert_eq!(elements.len(), 1);
        assert_eq!(
            elements[0].attribute("String").and_then(|a| a.as_text()),
            Some(r#""Hello, {world}""#)
        );
    }

    #[test]
    fn test_parse_is_deterministic() {
        let input = "{1 Content={2 Content={3}, 4}, 5 Content={6}}";
        assert_eq!(parse(input).unwrap(), parse(input).unwrap());
    }

    #[test]
    fn test_parse_unbalanced_fails() {
        for input in ["{1 Content={2}", "{1 Content={2}}}", "{1 Content=(2}}"] {
            let err = parse(input).unwrap_err();
            assert!(err.is_format_error(), "{input} gave {err}");
        }
    }

    #[test]
    fn test_parse_orphan_group_fails() {
        assert!(parse("{1 Amount={2}}").is_err());
        assert!(parse("{1 Content=}").is_err());
    }
}
