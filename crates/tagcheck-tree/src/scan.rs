use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::MarkupError;
use crate::options::{AttributeMode, ParseOptions};

/// One attribute of a start tag. Valueless attributes carry an empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// A start tag as seen by a scan sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTag {
    pub name: String,
    pub attributes: Vec<Attribute>,
    /// 1-based line of the `<` that opened the tag.
    pub line: usize,
}

/// Normalized markup events delivered in document order.
///
/// Every `Open` is matched by exactly one `Close`; self-closing tags produce
/// both back to back. `Text` is trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup {
    Open(OpenTag),
    Text(String),
    Close,
}

/// Stream `text` once, enforcing well-formedness, and hand every element
/// event to `sink`.
///
/// Comments, processing instructions, the XML declaration and DOCTYPE are
/// skipped. Errors raised by the sink abort the scan and are returned as-is.
pub fn scan<F, E>(
    text: &str,
    mode: AttributeMode,
    options: &ParseOptions,
    mut sink: F,
) -> std::result::Result<(), E>
where
    F: FnMut(Markup) -> std::result::Result<(), E>,
    E: From<MarkupError>,
{
    if text.trim().is_empty() {
        return Err(MarkupError::Empty.into());
    }

    let mut reader = Reader::from_str(text);
    reader.config_mut().check_end_names = true;

    let mut lines = LineTracker::new(text);
    let mut open: Vec<(String, usize)> = Vec::new();
    let mut seen_root = false;

    loop {
        let start = reader.buffer_position() as usize;
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(err) => {
                let line = lines.line_at(reader.error_position() as usize);
                return Err(MarkupError::Malformed {
                    line,
                    message: err.to_string(),
                }
                .into());
            }
        };

        match event {
            Event::Start(_) | Event::Empty(_) if open.is_empty() && seen_root => {
                return Err(MarkupError::MultipleRoots {
                    line: lines.line_at(start),
                }
                .into());
            }
            Event::Start(tag) => {
                let line = lines.line_at(start);
                let open_tag = read_open_tag(&tag, mode, line)?;
                check_depth(open.len(), options, line)?;
                seen_root = true;
                open.push((open_tag.name.clone(), line));
                sink(Markup::Open(open_tag))?;
            }
            Event::Empty(tag) => {
                let line = lines.line_at(start);
                let open_tag = read_open_tag(&tag, mode, line)?;
                check_depth(open.len(), options, line)?;
                seen_root = true;
                sink(Markup::Open(open_tag))?;
                sink(Markup::Close)?;
            }
            Event::End(_) => {
                open.pop();
                sink(Markup::Close)?;
            }
            Event::Text(content) => {
                let decoded = content.unescape().map_err(|err| MarkupError::Malformed {
                    line: lines.line_at(start),
                    message: err.to_string(),
                })?;
                deliver_text(decoded, &open, lines.line_at(start), &mut sink)?;
            }
            Event::CData(content) => {
                let decoded = std::str::from_utf8(&content).map_err(MarkupError::NotText)?;
                deliver_text(Cow::Borrowed(decoded), &open, lines.line_at(start), &mut sink)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some((name, line)) = open.pop() {
        return Err(MarkupError::Unclosed { name, line }.into());
    }
    if !seen_root {
        return Err(MarkupError::NoRoot.into());
    }

    Ok(())
}

fn check_depth(open: usize, options: &ParseOptions, line: usize) -> crate::error::Result<()> {
    match options.max_depth {
        Some(max) if open >= max => Err(MarkupError::TooDeep { line, max }),
        _ => Ok(()),
    }
}

/// Check that `text` is well-formed markup without building anything.
pub fn check_well_formed(
    text: &str,
    mode: AttributeMode,
    options: &ParseOptions,
) -> crate::error::Result<()> {
    scan(text, mode, options, |_| Ok::<(), MarkupError>(()))
}

fn deliver_text<F, E>(
    text: Cow<'_, str>,
    open: &[(String, usize)],
    line: usize,
    sink: &mut F,
) -> std::result::Result<(), E>
where
    F: FnMut(Markup) -> std::result::Result<(), E>,
    E: From<MarkupError>,
{
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    if open.is_empty() {
        return Err(MarkupError::TextOutsideRoot { line }.into());
    }
    sink(Markup::Text(trimmed.to_string()))
}

fn read_open_tag(
    tag: &BytesStart<'_>,
    mode: AttributeMode,
    line: usize,
) -> std::result::Result<OpenTag, MarkupError> {
    let name = std::str::from_utf8(tag.name().as_ref())?.to_string();

    let raw = match mode {
        AttributeMode::Strict => tag.attributes(),
        AttributeMode::Boolean => tag.html_attributes(),
    };

    let mut attributes = Vec::new();
    for attr in raw {
        let attr = attr.map_err(|err| MarkupError::Malformed {
            line,
            message: err.to_string(),
        })?;
        let attr_name = std::str::from_utf8(attr.key.as_ref())?.to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| MarkupError::Malformed {
                line,
                message: err.to_string(),
            })?
            .into_owned();
        attributes.push(Attribute {
            name: attr_name,
            value,
        });
    }

    Ok(OpenTag {
        name,
        attributes,
        line,
    })
}

/// Maps byte offsets to 1-based line numbers, counting forward incrementally.
struct LineTracker<'a> {
    bytes: &'a [u8],
    offset: usize,
    line: usize,
}

impl<'a> LineTracker<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            offset: 0,
            line: 1,
        }
    }

    fn line_at(&mut self, position: usize) -> usize {
        let position = position.min(self.bytes.len());
        if position < self.offset {
            self.offset = 0;
            self.line = 1;
        }
        self.line += self.bytes[self.offset..position]
            .iter()
            .filter(|b| **b == b'\n')
            .count();
        self.offset = position;
        self.line
    }
}
