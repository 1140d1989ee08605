//! Thin indenting XML writer over quick-xml

use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::inertia::round_to;

pub(crate) const XACRO_NS: &str = "http://www.ros.org/wiki/xacro";

/// Document under construction; two-space indentation
pub(crate) struct XmlDoc {
    writer: Writer<Cursor<Vec<u8>>>,
}

fn io_err(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(e.to_string())
}

fn start_tag<'a>(name: &'a str, attrs: &[(&str, &str)]) -> BytesStart<'a> {
    let mut tag = BytesStart::new(name);
    for &attr in attrs {
        tag.push_attribute(attr);
    }
    tag
}

impl XmlDoc {
    /// Start a document with the XML declaration and an opened `<robot>` element
    pub fn robot(name: &str) -> std::io::Result<Self> {
        let mut doc = Self {
            writer: Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2),
        };
        doc.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", None, None)))
            .map_err(io_err)?;
        doc.start("robot", &[("name", name), ("xmlns:xacro", XACRO_NS)])?;
        Ok(doc)
    }

    pub fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> std::io::Result<()> {
        self.writer
            .write_event(Event::Start(start_tag(name, attrs)))
            .map_err(io_err)
    }

    pub fn end(&mut self, name: &str) -> std::io::Result<()> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(io_err)
    }

    pub fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> std::io::Result<()> {
        self.writer
            .write_event(Event::Empty(start_tag(name, attrs)))
            .map_err(io_err)
    }

    /// `<name>text</name>` on one line
    pub fn text_element(&mut self, name: &str, text: &str) -> std::io::Result<()> {
        self.start(name, &[])?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(io_err)?;
        self.end(name)
    }

    /// Close `<robot>` and return the text with a trailing newline
    pub fn finish(mut self) -> std::io::Result<String> {
        self.end("robot")?;
        let mut text = String::from_utf8(self.writer.into_inner().into_inner())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        text.push('\n');
        Ok(text)
    }
}

/// Shortest decimal form after rounding; never exponent notation
pub(crate) fn fmt_num(value: f64, decimals: i32) -> String {
    format!("{}", round_to(value, decimals))
}

pub(crate) fn fmt_triple(values: [f64; 3], decimals: i32) -> String {
    values
        .iter()
        .map(|&v| fmt_num(v, decimals))
        .collect::<Vec<_>>()
        .join(" ")
}
