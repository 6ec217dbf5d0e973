use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::models::{FeedDocument, FeedItem};
use crate::FeedError;

/// Parse an RSS 2.0 document from raw XML bytes
///
/// Only direct children of `<channel>` and `<item>` are read, so nested
/// elements such as `<image><title>` do not leak into the channel title.
pub fn parse_feed(xml: &[u8]) -> Result<FeedDocument, FeedError> {
    let mut reader = Reader::from_reader(xml);

    let mut document = FeedDocument::default();
    let mut seen_channel = false;
    let mut buf = Vec::new();

    // Open element names, innermost last, with the text gathered inside each.
    // Text of elements nested below a field is folded into the field.
    let mut path: Vec<String> = Vec::new();
    let mut texts: Vec<String> = Vec::new();
    let mut current_item: Option<FeedItemBuilder> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();

                match name.as_str() {
                    "channel" => seen_channel = true,
                    "item" if parent_is(&path, "channel") => {
                        current_item = Some(FeedItemBuilder::default());
                    }
                    _ => {}
                }

                path.push(name);
                texts.push(String::new());
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                path.pop();
                let text = texts.pop().unwrap_or_default();

                if name == "item" && parent_is(&path, "channel") {
                    if let Some(builder) = current_item.take() {
                        document.items.push(builder.build());
                    }
                } else if parent_is(&path, "item") {
                    if let Some(ref mut item) = current_item {
                        item.set(&name, text);
                    }
                } else if parent_is(&path, "channel") {
                    let value = text.trim().to_string();
                    match name.as_str() {
                        "title" => document.title = value,
                        "link" => document.link = value,
                        "description" => document.description = value,
                        "language" if !value.is_empty() => document.language = Some(value),
                        _ => {}
                    }
                } else if let Some(parent) = texts.last_mut() {
                    parent.push_str(&text);
                }
            }
            Ok(Event::Text(e)) => {
                let value = e
                    .unescape()
                    .map_err(|e| FeedError::Parse(format!("XML parse error: {}", e)))?;
                if let Some(current) = texts.last_mut() {
                    current.push_str(&value);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(current) = texts.last_mut() {
                    current.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(FeedError::Parse(format!("XML parse error: {}", e))),
            _ => {}
        }
        buf.clear();
    }

    if !seen_channel {
        return Err(FeedError::Parse("missing <channel> element".to_string()));
    }

    Ok(document)
}

fn parent_is(path: &[String], name: &str) -> bool {
    path.last().is_some_and(|last| last == name)
}

#[derive(Default)]
struct FeedItemBuilder {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    pub_date: Option<String>,
}

impl FeedItemBuilder {
    fn set(&mut self, element: &str, value: String) {
        let value = value.trim().to_string();
        match element {
            "title" => self.title = Some(value),
            "link" => self.link = Some(value),
            "description" => self.description = Some(value),
            "pubDate" if !value.is_empty() => self.pub_date = Some(value),
            _ => {}
        }
    }

    fn build(self) -> FeedItem {
        FeedItem {
            title: self.title.unwrap_or_default(),
            link: self.link.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            pub_date: self.pub_date,
        }
    }
}
