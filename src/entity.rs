use std::borrow::Cow;

use crate::error::Error;

/// A piece of character data as found in markup: either literal text, with
/// predefined and character references expanded, or a reference to an
/// entity that cannot be expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TextPiece {
    Text(String),
    EntityRef(String),
}

/// Split character data on entity references.
///
/// Predefined entities and numeric character references are expanded into
/// the surrounding text; any other named reference becomes its own piece.
pub(crate) fn split_entities(content: &str) -> Result<Vec<TextPiece>, Error> {
    let mut pieces = Vec::new();
    let mut text = String::new();
    let mut chars = content.chars();
    while let Some(c) = chars.next() {
        if c != '&' {
            text.push(c);
            continue;
        }
        let mut entity = String::new();
        let mut is_complete = false;
        for c in chars.by_ref() {
            if c == ';' {
                is_complete = true;
                break;
            }
            entity.push(c);
        }
        if !is_complete {
            return Err(Error::UnclosedEntity(entity));
        }
        match entity.as_str() {
            "amp" => text.push('&'),
            "apos" => text.push('\''),
            "gt" => text.push('>'),
            "lt" => text.push('<'),
            "quot" => text.push('"'),
            "" => return Err(Error::InvalidEntity(entity)),
            _ if entity.starts_with('#') => text.push(parse_char_ref(&entity)?),
            _ => {
                if !text.is_empty() {
                    pieces.push(TextPiece::Text(std::mem::take(&mut text)));
                }
                pieces.push(TextPiece::EntityRef(entity));
            }
        }
    }
    if !text.is_empty() {
        pieces.push(TextPiece::Text(text));
    }
    Ok(pieces)
}

/// Expand references in an attribute value. Attributes are opaque strings,
/// so a reference to an unknown entity is an error here.
pub(crate) fn parse_attribute(content: &str) -> Result<Cow<str>, Error> {
    if !content.contains('&') {
        return Ok(content.into());
    }
    let mut result = String::with_capacity(content.len());
    for piece in split_entities(content)? {
        match piece {
            TextPiece::Text(text) => result.push_str(&text),
            TextPiece::EntityRef(name) => return Err(Error::InvalidEntity(name)),
        }
    }
    Ok(result.into())
}

fn parse_char_ref(entity: &str) -> Result<char, Error> {
    let digits = &entity[1..];
    let code = if let Some(hex) = digits.strip_prefix('x') {
        u32::from_str_radix(hex, 16)
    } else {
        digits.parse::<u32>()
    };
    code.ok()
        .and_then(char::from_u32)
        .ok_or_else(|| Error::InvalidEntity(entity.to_string()))
}

pub(crate) fn serialize_text(content: Cow<str>) -> Cow<str> {
    if !content.contains(['&', '<', '>', '\r']) {
        return content;
    }
    let mut result = String::with_capacity(content.len() + 8);
    for c in content.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '\r' => result.push_str("&#13;"),
            _ => result.push(c),
        }
    }
    result.into()
}

pub(crate) fn serialize_attribute(content: Cow<str>) -> Cow<str> {
    if !content.contains(['&', '<', '>', '"', '\t', '\n', '\r']) {
        return content;
    }
    let mut result = String::with_capacity(content.len() + 8);
    for c in content.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\t' => result.push_str("&#9;"),
            '\n' => result.push_str("&#10;"),
            '\r' => result.push_str("&#13;"),
            _ => result.push(c),
        }
    }
    result.into()
}

/// Render a CDATA section; a `]]>` inside the content is split over two
/// sections.
pub(crate) fn serialize_cdata(content: &str) -> String {
    format!(
        "<![CDATA[{}]]>",
        content.replace("]]>", "]]]]><![CDATA[>")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_predefined() {
        assert_eq!(
            split_entities("A &amp; B &lt;&gt;&apos;&quot;").unwrap(),
            vec![TextPiece::Text("A & B <>'\"".to_string())]
        );
    }

    #[test]
    fn test_split_char_refs() {
        assert_eq!(
            split_entities("&#65;&#x42;C").unwrap(),
            vec![TextPiece::Text("ABC".to_string())]
        );
    }

    #[test]
    fn test_split_unknown_entity() {
        assert_eq!(
            split_entities("a&nbsp;b&copy;").unwrap(),
            vec![
                TextPiece::Text("a".to_string()),
                TextPiece::EntityRef("nbsp".to_string()),
                TextPiece::Text("b".to_string()),
                TextPiece::EntityRef("copy".to_string()),
            ]
        );
    }

    #[test]
    fn test_split_unclosed() {
        let err = split_entities("&amp");
        if let Err(Error::UnclosedEntity(entity)) = err {
            assert_eq!(entity, "amp");
        } else {
            unreachable!();
        }
    }

    #[test]
    fn test_split_bad_char_ref() {
        assert!(matches!(
            split_entities("&#xZZ;"),
            Err(Error::InvalidEntity(_))
        ));
        assert!(matches!(split_entities("&;"), Err(Error::InvalidEntity(_))));
    }

    #[test]
    fn test_parse_attribute() {
        assert_eq!(parse_attribute("a &amp; b").unwrap(), "a & b");
        assert!(matches!(
            parse_attribute("&nbsp;"),
            Err(Error::InvalidEntity(_))
        ));
    }

    #[test]
    fn test_serialize_text() {
        assert_eq!(serialize_text("a < b & c > d".into()), "a &lt; b &amp; c &gt; d");
        assert!(matches!(serialize_text("plain".into()), Cow::Borrowed(_)));
    }

    #[test]
    fn test_serialize_attribute() {
        assert_eq!(
            serialize_attribute("\"x\"\n<&".into()),
            "&quot;x&quot;&#10;&lt;&amp;"
        );
    }

    #[test]
    fn test_serialize_cdata_split() {
        assert_eq!(serialize_cdata("a]]>b"), "<![CDATA[a]]]]><![CDATA[>b]]>");
    }
}
