//! XML reading and deterministic writing.
//!
//! Reading drops whitespace-only text, comments, processing instructions
//! and the declaration. Writing puts one element per line with tab
//! indentation; an element holding text is written on a single line so its
//! content is reproduced exactly.

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::{Element, Node, XmlError, XmlResult};

/// Declaration written at the top of every file.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// Parses a fragment or document and returns its root element.
pub fn parse_element(xml: &str) -> XmlResult<Element> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader.read_event().map_err(|e| XmlError::Parse {
            position,
            message: e.to_string(),
        })?;

        match event {
            Event::Start(start) => stack.push(open_element(&start, position)?),
            Event::Empty(start) => {
                let element = open_element(&start, position)?;
                attach(&mut stack, &mut root, element, position)?;
            }
            Event::End(end) => {
                let found = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                let element = stack.pop().ok_or_else(|| XmlError::Parse {
                    position,
                    message: format!("closing tag </{found}> without opening tag"),
                })?;
                if element.name != found {
                    return Err(XmlError::MismatchedTag {
                        expected: element.name,
                        found,
                    });
                }
                attach(&mut stack, &mut root, element, position)?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| XmlError::Parse {
                    position,
                    message: e.to_string(),
                })?;
                push_text(&mut stack, &text);
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                push_text(&mut stack, &text);
            }
            Event::Eof => break,
            // declaration, comments, processing instructions, doctype
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::UnexpectedEof(open.name));
    }
    root.ok_or(XmlError::NoRoot)
}

fn open_element(start: &BytesStart<'_>, position: u64) -> XmlResult<Element> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError::Parse {
            position,
            message: e.to_string(),
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|e| XmlError::Parse {
            position,
            message: e.to_string(),
        })?;
        element.attributes.push((key, value.into_owned()));
    }
    Ok(element)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
    position: u64,
) -> XmlResult<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(Node::Element(element));
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(XmlError::Parse {
            position,
            message: format!("second root element <{}>", element.name),
        }),
    }
}

fn push_text(stack: &mut [Element], text: &str) {
    if text.trim().is_empty() {
        return;
    }
    let Some(parent) = stack.last_mut() else {
        return;
    };
    match parent.children.last_mut() {
        Some(Node::Text(existing)) => existing.push_str(text),
        _ => parent.children.push(Node::Text(text.to_string())),
    }
}

/// Serializes an element (no declaration) with a trailing newline.
pub fn write_element(element: &Element) -> String {
    let mut out = String::new();
    write_indented(&mut out, element, 0);
    out
}

/// Serializes a whole file: declaration followed by the root element.
pub fn write_document(root: &Element) -> String {
    let mut out = String::with_capacity(256);
    out.push_str(XML_DECLARATION);
    out.push('\n');
    write_indented(&mut out, root, 0);
    out
}

fn write_indented(out: &mut String, element: &Element, depth: usize) {
    for _ in 0..depth {
        out.push('\t');
    }
    if element.children.is_empty() {
        write_open(out, element, true);
    } else if element.has_text() {
        write_inline(out, element);
    } else {
        write_open(out, element, false);
        out.push('\n');
        for child in element.elements() {
            write_indented(out, child, depth + 1);
        }
        for _ in 0..depth {
            out.push('\t');
        }
        write_close(out, element);
    }
    out.push('\n');
}

fn write_inline(out: &mut String, element: &Element) {
    if element.children.is_empty() {
        write_open(out, element, true);
        return;
    }
    write_open(out, element, false);
    for child in &element.children {
        match child {
            Node::Text(text) => out.push_str(&escape(text.as_str())),
            Node::Element(e) => write_inline(out, e),
        }
    }
    write_close(out, element);
}

fn write_open(out: &mut String, element: &Element, self_closing: bool) {
    out.push('<');
    out.push_str(&element.name);
    for (key, value) in &element.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(value.as_str()));
        out.push('"');
    }
    out.push_str(if self_closing { " />" } else { ">" });
}

fn write_close(out: &mut String, element: &Element) {
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}
