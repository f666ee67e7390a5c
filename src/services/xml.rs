// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Minimal RSS item reader.
//!
//! Every `<item>` becomes a map from its child tag names to the list of
//! occurrences of that tag. Namespaced tags keep their prefix verbatim
//! (`georss:point`), so callers look fields up by the name they see in
//! the feed.

use crate::error::AppError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

/// One occurrence of a child element of `<item>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    pub text: String,
    pub attrs: HashMap<String, String>,
}

/// Child elements of one `<item>`, in document order per tag.
#[derive(Debug, Clone, Default)]
pub struct XmlItem {
    fields: HashMap<String, Vec<XmlNode>>,
}

impl XmlItem {
    fn push(&mut self, name: String, node: XmlNode) {
        self.fields.entry(name).or_default().push(node);
    }

    /// First occurrence of `name`.
    pub fn first(&self, name: &str) -> Option<&XmlNode> {
        self.fields.get(name).and_then(|nodes| nodes.first())
    }

    /// Text of the first occurrence of `name`, if present.
    pub fn opt(&self, name: &str) -> Option<String> {
        self.first(name).map(|node| node.text.clone())
    }

    /// Text of the first occurrence of `name`, empty when absent.
    pub fn text(&self, name: &str) -> String {
        self.opt(name).unwrap_or_default()
    }

    /// Texts of every occurrence of `name`.
    pub fn texts<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .get(name)
            .into_iter()
            .flatten()
            .map(|node| node.text.as_str())
    }
}

/// Read every `<item>` of an RSS document.
///
/// Fails if the document is not well-formed or has no `<channel>`.
pub fn read_items(xml: &str) -> Result<Vec<XmlItem>, AppError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut saw_channel = false;
    let mut item: Option<XmlItem> = None;
    // Child of the current item being read, and how deep we are below it.
    let mut field: Option<(String, XmlNode)> = None;
    let mut depth = 0usize;

    loop {
        let event = reader.read_event().map_err(|e| {
            AppError::Parse(format!(
                "XML error at position {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(start) => {
                let name = tag_name(&start);
                if field.is_some() {
                    depth += 1;
                } else if item.is_some() {
                    field = Some((
                        name,
                        XmlNode {
                            text: String::new(),
                            attrs: read_attrs(&start)?,
                        },
                    ));
                    depth = 0;
                } else if name == "item" {
                    item = Some(XmlItem::default());
                } else if name == "channel" {
                    saw_channel = true;
                }
            }
            Event::Empty(empty) => {
                if field.is_none() {
                    if let Some(current) = &mut item {
                        current.push(
                            tag_name(&empty),
                            XmlNode {
                                text: String::new(),
                                attrs: read_attrs(&empty)?,
                            },
                        );
                    }
                }
            }
            Event::Text(text) => {
                if let Some((_, node)) = &mut field {
                    let unescaped = text
                        .unescape()
                        .map_err(|e| AppError::Parse(format!("XML text error: {}", e)))?;
                    node.text.push_str(&unescaped);
                }
            }
            Event::CData(cdata) => {
                if let Some((_, node)) = &mut field {
                    node.text
                        .push_str(String::from_utf8_lossy(&cdata.into_inner()).trim());
                }
            }
            Event::End(_) => {
                if field.is_some() {
                    if depth == 0 {
                        if let (Some(current), Some((name, node))) = (&mut item, field.take()) {
                            current.push(name, node);
                        }
                    } else {
                        depth -= 1;
                    }
                } else if let Some(done) = item.take() {
                    items.push(done);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_channel {
        return Err(AppError::Parse("feed has no <channel>".to_string()));
    }

    Ok(items)
}

fn tag_name(start: &BytesStart) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

fn read_attrs(start: &BytesStart) -> Result<HashMap<String, String>, AppError> {
    start
        .attributes()
        .map(|attr| {
            let attr = attr.map_err(|e| AppError::Parse(format!("XML attribute error: {}", e)))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| AppError::Parse(format!("XML attribute error: {}", e)))?
                .into_owned();
            Ok((key, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_namespaced_fields_and_attributes() {
        let xml = r#"<?xml version="1.0"?>
<rss xmlns:georss="http://www.georss.org/georss">
  <channel>
    <title>Feed</title>
    <item>
      <title>One &amp; only</title>
      <guid isPermaLink="false">abc-1</guid>
      <category>Wildfire</category>
      <category>Europe</category>
      <georss:point>38.1 23.7</georss:point>
      <description><![CDATA[ <p>html</p> ]]></description>
      <enclosure url="http://x/y.png"/>
    </item>
    <item><title>Two</title></item>
  </channel>
</rss>"#;

        let items = read_items(xml).unwrap();
        assert_eq!(items.len(), 2);

        let first = &items[0];
        assert_eq!(first.text("title"), "One & only");
        assert_eq!(first.text("georss:point"), "38.1 23.7");
        assert_eq!(first.text("description"), "<p>html</p>");
        assert_eq!(
            first.first("guid").unwrap().attrs.get("isPermaLink").unwrap(),
            "false"
        );
        assert_eq!(
            first.first("enclosure").unwrap().attrs.get("url").unwrap(),
            "http://x/y.png"
        );
        assert_eq!(
            first.texts("category").collect::<Vec<_>>(),
            vec!["Wildfire", "Europe"]
        );
        assert_eq!(first.opt("missing"), None);
        assert_eq!(items[1].text("georss:point"), "");
    }

    #[test]
    fn test_channel_title_is_not_an_item_field() {
        let xml = "<rss><channel><title>Feed</title></channel></rss>";
        assert!(read_items(xml).unwrap().is_empty());
    }

    #[test]
    fn test_nested_markup_inside_field_is_flattened() {
        let xml = "<rss><channel><item><description>a<b>bold</b>c</description>\
                   <title>t</title></item></channel></rss>";
        let items = read_items(xml).unwrap();
        assert_eq!(items[0].text("description"), "aboldc");
        assert_eq!(items[0].text("title"), "t");
    }

    #[test]
    fn test_rejects_non_feed_documents() {
        assert!(matches!(
            read_items("<html><body>Service unavailable</body></html>"),
            Err(AppError::Parse(_))
        ));
        assert!(matches!(
            read_items("<rss><channel><item></channel>"),
            Err(AppError::Parse(_))
        ));
    }
}
