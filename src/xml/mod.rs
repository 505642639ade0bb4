//! XML rendering of a [`ParameterDocument`].
//!
//! The schema is consumed by prompt clients and is kept stable:
//!
//! ```text
//! <parameters report="..." is-prompt-needed="true|false">
//!   <parameter name="..." type="..." kind="..." is-list="..." is-mandatory="..."
//!              [label="..."] [render-type="..."] [depends-on="a,b"]>
//!     <value value="..." label="..." selected="..." [encoded="true"] type="..." [null="true"]/>
//!     <error message="..."/>
//!   </parameter>
//! </parameters>
//! ```
//!
//! `encoded` is only ever written as `"true"`; an absent attribute means the
//! value is plain text. When set it covers both `value` and `label`.

mod writer;

pub use writer::{escape_attribute, XmlWriter};

use std::io::{self, BufWriter, Write};

use crate::resolver::{ParameterDocument, ParameterEntry, ResolvedValue};

/// Write `document` as XML to `sink`.
pub fn serialize<W: Write>(document: &ParameterDocument, sink: W) -> io::Result<()> {
    let mut writer = XmlWriter::new(BufWriter::new(sink));
    writer.declaration()?;

    let root = [
        ("report", document.report.clone()),
        ("is-prompt-needed", document.is_prompt_needed().to_string()),
    ];

    if document.parameters.is_empty() {
        writer.empty("parameters", &root)?;
    } else {
        writer.open("parameters", &root)?;
        for entry in &document.parameters {
            write_parameter(&mut writer, entry)?;
        }
        writer.close("parameters")?;
    }

    writer.finish().map(drop)
}

/// Render `document` into a string.
pub fn to_string(document: &ParameterDocument) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = serialize(document, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

fn write_parameter<W: Write>(writer: &mut XmlWriter<W>, entry: &ParameterEntry) -> io::Result<()> {
    let decl = &entry.declaration;

    let mut attributes = vec![
        ("name", decl.name.clone()),
        ("type", decl.value_type.as_str().to_string()),
        ("kind", decl.kind.as_str().to_string()),
        ("is-list", decl.is_list().to_string()),
        ("is-mandatory", decl.mandatory.to_string()),
    ];
    if let Some(label) = &decl.label {
        attributes.push(("label", label.clone()));
    }
    if let Some(hint) = decl.render_hint {
        attributes.push(("render-type", hint.as_str().to_string()));
    }
    if !decl.depends_on.is_empty() {
        attributes.push(("depends-on", decl.depends_on.join(",")));
    }

    if entry.values.is_empty() && entry.error.is_none() {
        return writer.empty("parameter", &attributes);
    }

    writer.open("parameter", &attributes)?;
    let value_type = decl.value_type.as_str();
    for value in &entry.values {
        write_value(writer, value, value_type)?;
    }
    if let Some(error) = &entry.error {
        writer.empty("error", &[("message", error.to_string())])?;
    }
    writer.close("parameter")
}

fn write_value<W: Write>(
    writer: &mut XmlWriter<W>,
    value: &ResolvedValue,
    value_type: &str,
) -> io::Result<()> {
    let (text, label) = value.transport_pair();

    let mut attributes = vec![
        ("value", text),
        ("label", label),
        ("selected", value.selected.to_string()),
    ];
    if value.encoded() {
        attributes.push(("encoded", "true".to_string()));
    }
    attributes.push(("type", value_type.to_string()));
    if value.is_null {
        attributes.push(("null", "true".to_string()));
    }

    writer.empty("value", &attributes)
}
