use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Cursor;

use super::tree::Element;
use crate::error::ConvertError;

fn xml_io(e: std::io::Error) -> ConvertError {
    ConvertError::Write(format!("{e}"))
}

/// Indent serializer for [`Element`] trees.
pub struct XmlWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlWriter {
    /// Start a document with an UTF-8 XML declaration and 2-space indent.
    pub fn new() -> Result<Self, ConvertError> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_io)?;
        Ok(Self { writer })
    }

    /// Write an element and its subtree. Elements with neither text nor
    /// children serialize self-closing.
    pub fn write_element(&mut self, element: &Element) -> Result<(), ConvertError> {
        let name = element.qualified_name();
        let mut start = BytesStart::new(name.as_str());
        for (key, value) in &element.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if element.text.is_none() && element.children.is_empty() {
            return self.writer.write_event(Event::Empty(start)).map_err(xml_io);
        }

        self.writer
            .write_event(Event::Start(start))
            .map_err(xml_io)?;
        if let Some(text) = &element.text {
            self.writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(xml_io)?;
        }
        for child in &element.children {
            self.write_element(child)?;
        }
        self.writer
            .write_event(Event::End(BytesEnd::new(name.as_str())))
            .map_err(xml_io)
    }

    /// Finish and return the document text.
    pub fn into_string(self) -> Result<String, ConvertError> {
        let buf = self.writer.into_inner().into_inner();
        String::from_utf8(buf).map_err(|e| ConvertError::Write(format!("invalid UTF-8: {e}")))
    }
}

/// Serialize a tree as a standalone document.
pub fn write_document(root: &Element) -> Result<String, ConvertError> {
    let mut writer = XmlWriter::new()?;
    writer.write_element(root)?;
    writer.into_string()
}
