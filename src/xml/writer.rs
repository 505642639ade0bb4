//! Minimal indenting XML element writer.

use std::io::{self, Write};

use crate::encoding::is_illegal_control;

/// Streams elements with two-space indentation, one element per line.
pub struct XmlWriter<W: Write> {
    out: W,
    depth: usize,
}

impl<W: Write> XmlWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, depth: 0 }
    }

    pub fn declaration(&mut self) -> io::Result<()> {
        self.out
            .write_all(b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n")
    }

    /// `<name attr="...">`
    pub fn open(&mut self, name: &str, attributes: &[(&str, String)]) -> io::Result<()> {
        self.tag(name, attributes, false)?;
        self.depth += 1;
        Ok(())
    }

    /// `<name attr="..."/>`
    pub fn empty(&mut self, name: &str, attributes: &[(&str, String)]) -> io::Result<()> {
        self.tag(name, attributes, true)
    }

    /// `</name>`
    pub fn close(&mut self, name: &str) -> io::Result<()> {
        self.depth = self.depth.saturating_sub(1);
        let line = format!("{}</{}>\n", self.indent(), name);
        self.out.write_all(line.as_bytes())
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }

    fn tag(&mut self, name: &str, attributes: &[(&str, String)], empty: bool) -> io::Result<()> {
        let mut line = self.indent();
        line.push('<');
        line.push_str(name);
        for (key, value) in attributes {
            line.push(' ');
            line.push_str(key);
            line.push_str("=\"");
            escape_attribute(value, &mut line);
            line.push('"');
        }
        line.push_str(if empty { "/>\n" } else { ">\n" });
        self.out.write_all(line.as_bytes())
    }

    fn indent(&self) -> String {
        "  ".repeat(self.depth)
    }
}

/// Escape `raw` for a double-quoted attribute value.
///
/// Tab, LF and CR become character references so attribute-value
/// normalization keeps them. Other C0 controls cannot be represented in
/// XML 1.0 and are replaced with U+FFFD; parameter values never reach this
/// point unencoded.
pub fn escape_attribute(raw: &str, out: &mut String) {
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            c if is_illegal_control(c) => out.push('\u{FFFD}'),
            c => out.push(c),
        }
    }
}
