//! Parsing and serialization of Android `strings.xml` files.
//!
//! Handles the three element kinds of the resource schema: `<string>`,
//! `<string-array>`/`<item>`, and `<plurals>`/`<item quantity="...">`.
//! Unknown elements are skipped on read and absent from output.

use quick_xml::{
    Reader, Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use std::{
    fs::File,
    io::{BufRead, BufReader, Write},
    path::Path,
};

use crate::error::{Error, Result};
use crate::res::model::{
    ArrayEntry, PluralItem, PluralsEntry, ResourceElement, StringEntry, StringsDocument,
};

/// Parse a document from any reader.
pub fn from_reader<R: BufRead>(reader: R) -> Result<StringsDocument> {
    let mut xml_reader = Reader::from_reader(reader);
    xml_reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut elements = Vec::new();

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"string" => {
                    elements.push(ResourceElement::String(parse_string(e, &mut xml_reader)?));
                }
                b"string-array" => {
                    elements.push(ResourceElement::StringArray(parse_array(
                        e,
                        &mut xml_reader,
                    )?));
                }
                b"plurals" => {
                    elements.push(ResourceElement::Plurals(parse_plurals(e, &mut xml_reader)?));
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"string" => {
                let (name, translatable) = name_and_translatable(e)?;
                let name = name.ok_or_else(|| {
                    Error::InvalidResource("string tag missing 'name'".to_string())
                })?;
                elements.push(ResourceElement::String(StringEntry {
                    name,
                    value: String::new(),
                    translatable,
                }));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(Error::XmlParse(e)),
        }
        buf.clear();
    }

    Ok(StringsDocument { elements })
}

/// Parse a document from a string slice.
pub fn from_str(s: &str) -> Result<StringsDocument> {
    from_reader(s.as_bytes())
}

/// Read a document from a file path.
pub fn read_file(path: &Path) -> Result<StringsDocument> {
    let file = File::open(path)?;
    from_reader(BufReader::new(file))
}

/// Serialize a document to any writer.
pub fn to_writer<W: Write>(doc: &StringsDocument, mut writer: W) -> Result<()> {
    let mut xml_writer = Writer::new(&mut writer);

    xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    xml_writer.write_event(Event::Text(BytesText::new("\n")))?;
    xml_writer.write_event(Event::Start(BytesStart::new("resources")))?;
    xml_writer.write_event(Event::Text(BytesText::new("\n")))?;

    for element in &doc.elements {
        match element {
            ResourceElement::String(entry) => {
                let mut elem = BytesStart::new("string");
                elem.push_attribute(("name", entry.name.as_str()));
                push_translatable(&mut elem, entry.translatable);
                xml_writer.write_event(Event::Start(elem))?;
                xml_writer.write_event(Event::Text(BytesText::new(&entry.value)))?;
                xml_writer.write_event(Event::End(BytesEnd::new("string")))?;
                xml_writer.write_event(Event::Text(BytesText::new("\n")))?;
            }
            ResourceElement::StringArray(array) => {
                let mut elem = BytesStart::new("string-array");
                elem.push_attribute(("name", array.name.as_str()));
                push_translatable(&mut elem, array.translatable);
                xml_writer.write_event(Event::Start(elem))?;
                xml_writer.write_event(Event::Text(BytesText::new("\n")))?;
                for item in &array.items {
                    xml_writer.write_event(Event::Start(BytesStart::new("item")))?;
                    xml_writer.write_event(Event::Text(BytesText::new(item)))?;
                    xml_writer.write_event(Event::End(BytesEnd::new("item")))?;
                    xml_writer.write_event(Event::Text(BytesText::new("\n")))?;
                }
                xml_writer.write_event(Event::End(BytesEnd::new("string-array")))?;
                xml_writer.write_event(Event::Text(BytesText::new("\n")))?;
            }
            ResourceElement::Plurals(plurals) => {
                let mut elem = BytesStart::new("plurals");
                elem.push_attribute(("name", plurals.name.as_str()));
                push_translatable(&mut elem, plurals.translatable);
                xml_writer.write_event(Event::Start(elem))?;
                xml_writer.write_event(Event::Text(BytesText::new("\n")))?;
                for item in &plurals.items {
                    let mut item_elem = BytesStart::new("item");
                    item_elem.push_attribute(("quantity", item.quantity.as_str()));
                    xml_writer.write_event(Event::Start(item_elem))?;
                    xml_writer.write_event(Event::Text(BytesText::new(&item.value)))?;
                    xml_writer.write_event(Event::End(BytesEnd::new("item")))?;
                    xml_writer.write_event(Event::Text(BytesText::new("\n")))?;
                }
                xml_writer.write_event(Event::End(BytesEnd::new("plurals")))?;
                xml_writer.write_event(Event::Text(BytesText::new("\n")))?;
            }
        }
    }

    xml_writer.write_event(Event::End(BytesEnd::new("resources")))?;
    xml_writer.write_event(Event::Text(BytesText::new("\n")))?;
    Ok(())
}

/// Serialize a document to a string.
pub fn to_string(doc: &StringsDocument) -> Result<String> {
    let mut out = Vec::new();
    to_writer(doc, &mut out)?;
    String::from_utf8(out).map_err(|e| Error::DataMismatch(e.to_string()))
}

/// Write a document to a file path.
pub fn write_file(doc: &StringsDocument, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    to_writer(doc, file)
}

fn push_translatable(elem: &mut BytesStart, translatable: Option<bool>) {
    if let Some(flag) = translatable {
        elem.push_attribute(("translatable", if flag { "true" } else { "false" }));
    }
}

fn name_and_translatable(e: &BytesStart) -> Result<(Option<String>, Option<bool>)> {
    let mut name = None;
    let mut translatable = None;

    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(|e| Error::DataMismatch(e.to_string()))?;
        match attr.key.as_ref() {
            b"name" => name = Some(attr.unescape_value()?.to_string()),
            b"translatable" => {
                let v = attr.unescape_value()?.to_string();
                translatable = Some(!v.eq_ignore_ascii_case("false"));
            }
            _ => {}
        }
    }
    Ok((name, translatable))
}

fn quantity_attr(e: &BytesStart) -> Result<Option<String>> {
    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(|e| Error::DataMismatch(e.to_string()))?;
        if attr.key.as_ref() == b"quantity" {
            return Ok(Some(attr.unescape_value()?.to_string()));
        }
    }
    Ok(None)
}

/// Read the text content of the element just opened, stopping at its end tag.
fn read_element_text<R: BufRead>(xml_reader: &mut Reader<R>) -> Result<String> {
    let mut buf = Vec::new();
    let mut value = String::new();
    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Text(e)) => value.push_str(&e.unescape().map_err(Error::XmlParse)?),
            Ok(Event::End(_)) => return Ok(value),
            Ok(Event::Eof) => return Err(Error::InvalidResource("unexpected EOF".to_string())),
            Ok(_) => (),
            Err(e) => return Err(Error::XmlParse(e)),
        }
        buf.clear();
    }
}

fn parse_string<R: BufRead>(e: &BytesStart, xml_reader: &mut Reader<R>) -> Result<StringEntry> {
    let (name, translatable) = name_and_translatable(e)?;
    let name =
        name.ok_or_else(|| Error::InvalidResource("string tag missing 'name'".to_string()))?;
    let value = read_element_text(xml_reader)?;
    Ok(StringEntry {
        name,
        value,
        translatable,
    })
}

fn parse_array<R: BufRead>(e: &BytesStart, xml_reader: &mut Reader<R>) -> Result<ArrayEntry> {
    let (name, translatable) = name_and_translatable(e)?;
    let name =
        name.ok_or_else(|| Error::InvalidResource("string-array tag missing 'name'".to_string()))?;

    let mut items = Vec::new();
    let mut buf = Vec::new();
    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref inner)) if inner.name().as_ref() == b"item" => {
                items.push(read_element_text(xml_reader)?);
            }
            Ok(Event::Empty(ref inner)) if inner.name().as_ref() == b"item" => {
                items.push(String::new());
            }
            Ok(Event::End(ref end)) if end.name().as_ref() == b"string-array" => break,
            Ok(Event::Eof) => {
                return Err(Error::InvalidResource(
                    "unexpected EOF inside string-array".to_string(),
                ));
            }
            Ok(_) => {}
            Err(e) => return Err(Error::XmlParse(e)),
        }
        buf.clear();
    }

    Ok(ArrayEntry {
        name,
        translatable,
        items,
    })
}

fn parse_plurals<R: BufRead>(e: &BytesStart, xml_reader: &mut Reader<R>) -> Result<PluralsEntry> {
    let (name, translatable) = name_and_translatable(e)?;
    let name =
        name.ok_or_else(|| Error::InvalidResource("plurals tag missing 'name'".to_string()))?;

    let mut items = Vec::new();
    let mut buf = Vec::new();
    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref inner)) if inner.name().as_ref() == b"item" => {
                let quantity = quantity_attr(inner)?;
                let value = read_element_text(xml_reader)?;
                if let Some(quantity) = quantity {
                    items.push(PluralItem { quantity, value });
                }
            }
            Ok(Event::Empty(ref inner)) if inner.name().as_ref() == b"item" => {
                if let Some(quantity) = quantity_attr(inner)? {
                    items.push(PluralItem {
                        quantity,
                        value: String::new(),
                    });
                }
            }
            Ok(Event::End(ref end)) if end.name().as_ref() == b"plurals" => break,
            Ok(Event::Eof) => {
                return Err(Error::InvalidResource(
                    "unexpected EOF inside plurals".to_string(),
                ));
            }
            Ok(_) => {}
            Err(e) => return Err(Error::XmlParse(e)),
        }
        buf.clear();
    }

    Ok(PluralsEntry {
        name,
        translatable,
        items,
    })
}
