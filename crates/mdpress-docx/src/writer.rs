//! DOCX packaging.
//!
//! A DOCX file is a zip of XML parts. The writer accumulates blocks and
//! serializes them into `word/document.xml`; the remaining parts are fixed
//! apart from the title and author in `docProps/core.xml`.

use std::borrow::Cow;
use std::io::{Cursor, Write};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use mdpress_dom::ParseError;

use crate::block::Block;

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
</Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
</Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

const STYLES_XML: &str = include_str!("styles.xml");

const WORD_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// A4 in twentieths of a point, with 2 cm margins.
const PAGE_WIDTH_TWIPS: &str = "11906";
const PAGE_HEIGHT_TWIPS: &str = "16838";
const PAGE_MARGIN_TWIPS: &str = "1134";

/// Left indent per list nesting level, in twips.
const LIST_INDENT_TWIPS: usize = 720;

/// DOCX packaging error.
#[derive(Debug, thiserror::Error)]
pub enum PackagingError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("XML error: {0}")]
    Xml(String),
    #[error("content error: {0}")]
    Content(#[from] ParseError),
    #[error("packaging task failed: {0}")]
    Task(String),
}

/// Accumulates blocks and serializes them into a DOCX package.
#[derive(Debug, Default)]
pub struct StructuralWriter {
    title: String,
    author: String,
    blocks: Vec<Block>,
}

impl StructuralWriter {
    /// Create a writer; `title` and `author` go into the core properties.
    #[must_use]
    pub fn new(title: &str, author: &str) -> Self {
        Self {
            title: title.to_owned(),
            author: author.to_owned(),
            blocks: Vec::new(),
        }
    }

    /// Append one block at the end of the document body.
    pub fn append(&mut self, block: Block) {
        self.blocks.push(block);
    }

    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Serialize the package to DOCX bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PackagingError`] if XML generation or zip writing fails.
    pub fn serialize(&self) -> Result<Vec<u8>, PackagingError> {
        let document = document_xml(&self.blocks)?;
        let core = core_xml(&self.title, &self.author)?;

        let parts: [(&str, &[u8]); 6] = [
            ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes()),
            ("_rels/.rels", ROOT_RELS_XML.as_bytes()),
            ("word/document.xml", &document),
            ("word/styles.xml", STYLES_XML.as_bytes()),
            ("word/_rels/document.xml.rels", DOCUMENT_RELS_XML.as_bytes()),
            ("docProps/core.xml", &core),
        ];

        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in parts {
            zip.start_file(name, options)?;
            zip.write_all(data)?;
        }
        Ok(zip.finish()?.into_inner())
    }
}

type XmlWriter = Writer<Vec<u8>>;

fn emit<'a>(writer: &mut XmlWriter, event: impl Into<Event<'a>>) -> Result<(), PackagingError> {
    writer
        .write_event(event)
        .map_err(|e| PackagingError::Xml(e.to_string()))
}

fn start(writer: &mut XmlWriter, name: &str) -> Result<(), PackagingError> {
    emit(writer, Event::Start(BytesStart::new(name)))
}

fn end(writer: &mut XmlWriter, name: &str) -> Result<(), PackagingError> {
    emit(writer, Event::End(BytesEnd::new(name)))
}

fn empty(writer: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> Result<(), PackagingError> {
    let el = BytesStart::new(name).with_attributes(attrs.iter().copied());
    emit(writer, Event::Empty(el))
}

/// Characters XML 1.0 does not allow, even escaped.
fn is_forbidden_xml_char(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}')
}

/// `text` without characters that would make the part invalid XML.
fn xml_text(text: &str) -> Cow<'_, str> {
    if text.contains(is_forbidden_xml_char) {
        Cow::Owned(text.chars().filter(|&c| !is_forbidden_xml_char(c)).collect())
    } else {
        Cow::Borrowed(text)
    }
}

fn write_text(writer: &mut XmlWriter, text: &str) -> Result<(), PackagingError> {
    emit(writer, Event::Text(BytesText::new(&xml_text(text))))
}

fn text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<(), PackagingError> {
    start(writer, name)?;
    write_text(writer, text)?;
    end(writer, name)
}

fn declaration(writer: &mut XmlWriter) -> Result<(), PackagingError> {
    emit(
        writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))),
    )
}

/// Paragraph properties of a block.
struct ParagraphStyle<'a> {
    style: Option<String>,
    indent: Option<String>,
    italic: bool,
    text: &'a str,
}

impl<'a> ParagraphStyle<'a> {
    fn plain(text: &'a str) -> Self {
        Self {
            style: None,
            indent: None,
            italic: false,
            text,
        }
    }

    fn styled(style: &str, text: &'a str) -> Self {
        Self {
            style: Some(style.to_owned()),
            ..Self::plain(text)
        }
    }
}

fn write_block(writer: &mut XmlWriter, block: &Block) -> Result<(), PackagingError> {
    let list_text;
    let paragraph = match block {
        Block::Separator => return empty(writer, "w:p", &[]),
        Block::Title(text) => ParagraphStyle::styled("Title", text),
        Block::Byline(text) => ParagraphStyle {
            italic: true,
            ..ParagraphStyle::plain(text)
        },
        Block::Heading { level, text } => {
            ParagraphStyle::styled(&format!("Heading{}", (*level).clamp(1, 6)), text)
        }
        Block::Paragraph(text) => ParagraphStyle::plain(text),
        Block::Monospace(text) => ParagraphStyle::styled("Code", text),
        Block::ListItem {
            depth,
            marker,
            text,
        } => {
            list_text = format!("{marker} {text}");
            ParagraphStyle {
                indent: Some(((depth + 1) * LIST_INDENT_TWIPS).to_string()),
                ..ParagraphStyle::plain(&list_text)
            }
        }
    };
    write_paragraph(writer, &paragraph)
}

fn write_paragraph(writer: &mut XmlWriter, paragraph: &ParagraphStyle<'_>) -> Result<(), PackagingError> {
    start(writer, "w:p")?;

    if paragraph.style.is_some() || paragraph.indent.is_some() {
        start(writer, "w:pPr")?;
        if let Some(style) = &paragraph.style {
            empty(writer, "w:pStyle", &[("w:val", style.as_str())])?;
        }
        if let Some(indent) = &paragraph.indent {
            empty(writer, "w:ind", &[("w:left", indent.as_str())])?;
        }
        end(writer, "w:pPr")?;
    }

    start(writer, "w:r")?;
    if paragraph.italic {
        start(writer, "w:rPr")?;
        empty(writer, "w:i", &[])?;
        end(writer, "w:rPr")?;
    }
    for (i, line) in paragraph.text.split('\n').enumerate() {
        if i > 0 {
            empty(writer, "w:br", &[])?;
        }
        let el = BytesStart::new("w:t").with_attributes([("xml:space", "preserve")]);
        emit(writer, Event::Start(el))?;
        write_text(writer, line)?;
        end(writer, "w:t")?;
    }
    end(writer, "w:r")?;

    end(writer, "w:p")
}

/// `word/document.xml` for `blocks`.
pub(crate) fn document_xml(blocks: &[Block]) -> Result<Vec<u8>, PackagingError> {
    let mut writer = Writer::new(Vec::new());
    declaration(&mut writer)?;

    let root = BytesStart::new("w:document").with_attributes([("xmlns:w", WORD_NS)]);
    emit(&mut writer, Event::Start(root))?;
    start(&mut writer, "w:body")?;

    for block in blocks {
        write_block(&mut writer, block)?;
    }

    start(&mut writer, "w:sectPr")?;
    empty(
        &mut writer,
        "w:pgSz",
        &[("w:w", PAGE_WIDTH_TWIPS), ("w:h", PAGE_HEIGHT_TWIPS)],
    )?;
    empty(
        &mut writer,
        "w:pgMar",
        &[
            ("w:top", PAGE_MARGIN_TWIPS),
            ("w:right", PAGE_MARGIN_TWIPS),
            ("w:bottom", PAGE_MARGIN_TWIPS),
            ("w:left", PAGE_MARGIN_TWIPS),
        ],
    )?;
    end(&mut writer, "w:sectPr")?;

    end(&mut writer, "w:body")?;
    end(&mut writer, "w:document")?;
    Ok(writer.into_inner())
}

/// `docProps/core.xml` with title and author.
pub(crate) fn core_xml(title: &str, author: &str) -> Result<Vec<u8>, PackagingError> {
    let mut writer = Writer::new(Vec::new());
    declaration(&mut writer)?;

    let root = BytesStart::new("cp:coreProperties").with_attributes([
        (
            "xmlns:cp",
            "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
        ),
        ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
    ]);
    emit(&mut writer, Event::Start(root))?;
    text_element(&mut writer, "dc:title", title)?;
    if !author.is_empty() {
        text_element(&mut writer, "dc:creator", author)?;
    }
    end(&mut writer, "cp:coreProperties")?;
    Ok(writer.into_inner())
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use pretty_assertions::assert_eq;

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut out = String::new();
        file.read_to_string(&mut out).unwrap();
        out
    }

    fn xml(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_heading_paragraph() {
        let out = xml(document_xml(&[Block::Heading {
            level: 2,
            text: "A & B".to_owned(),
        }])
        .unwrap());
        assert!(out.contains(
            r#"<w:p><w:pPr><w:pStyle w:val="Heading2"/></w:pPr><w:r><w:t xml:space="preserve">A &amp; B</w:t></w:r></w:p>"#
        ));
    }

    #[test]
    fn test_byline_is_italic() {
        let out = xml(document_xml(&[Block::Byline("Ann".to_owned())]).unwrap());
        assert!(out.contains(
            r#"<w:p><w:r><w:rPr><w:i/></w:rPr><w:t xml:space="preserve">Ann</w:t></w:r></w:p>"#
        ));
    }

    #[test]
    fn test_monospace_line_breaks() {
        let out = xml(document_xml(&[Block::Monospace("a\nb".to_owned())]).unwrap());
        assert!(out.contains(r#"<w:pStyle w:val="Code"/>"#));
        assert!(out.contains(
            r#"<w:t xml:space="preserve">a</w:t><w:br/><w:t xml:space="preserve">b</w:t>"#
        ));
    }

    #[test]
    fn test_list_item_indent() {
        let out = xml(document_xml(&[Block::ListItem {
            depth: 1,
            marker: "2.".to_owned(),
            text: "Second".to_owned(),
        }])
        .unwrap());
        assert!(out.contains(r#"<w:ind w:left="1440"/>"#));
        assert!(out.contains(">2. Second</w:t>"));
    }

    #[test]
    fn test_separator_is_empty_paragraph() {
        let out = xml(document_xml(&[Block::Separator]).unwrap());
        assert!(out.contains("<w:body><w:p/><w:sectPr>"));
    }

    #[test]
    fn test_control_characters_dropped() {
        let out = xml(document_xml(&[Block::Paragraph("a\u{b}b\tc\u{0}".to_owned())]).unwrap());
        assert!(out.contains(">ab\tc</w:t>"));
        assert!(!out.contains('\u{b}'));
        assert!(!out.contains('\u{0}'));

        let core = xml(core_xml("Re\u{1f}port", "A\u{c}nn").unwrap());
        assert!(core.contains("<dc:title>Report</dc:title>"));
        assert!(core.contains("<dc:creator>Ann</dc:creator>"));
    }

    #[test]
    fn test_core_xml_omits_empty_author() {
        let out = xml(core_xml("Report", "").unwrap());
        assert!(out.contains("<dc:title>Report</dc:title>"));
        assert!(!out.contains("dc:creator"));
    }

    #[test]
    fn test_serialize_package() {
        let mut writer = StructuralWriter::new("Report", "Ann");
        writer.append(Block::Title("Report".to_owned()));
        writer.append(Block::Paragraph("Body".to_owned()));
        let bytes = writer.serialize().unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let mut names: Vec<_> = archive.file_names().map(str::to_owned).collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "[Content_Types].xml",
                "_rels/.rels",
                "docProps/core.xml",
                "word/_rels/document.xml.rels",
                "word/document.xml",
                "word/styles.xml",
            ]
        );
        assert!(archive.by_name("word/document.xml").is_ok());

        let document = read_part(&bytes, "word/document.xml");
        assert!(document.contains(r#"<w:pStyle w:val="Title"/>"#));
        assert!(document.contains(">Body</w:t>"));
        let core = read_part(&bytes, "docProps/core.xml");
        assert!(core.contains("<dc:creator>Ann</dc:creator>"));
        let styles = read_part(&bytes, "word/styles.xml");
        assert!(styles.contains(r#"w:styleId="Heading6""#));
    }
}
