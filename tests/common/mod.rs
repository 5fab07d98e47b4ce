#![allow(dead_code)]

use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use letterhead::{Job, Letter, Recipient};
use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipArchive;
use zip::write::{FileOptions, ZipWriter};

pub const SECT_PR: &str = concat!(
    r#"<w:sectPr w:rsidR="00A1B2C3">"#,
    r#"<w:headerReference w:type="default" r:id="rId7"/>"#,
    r#"<w:footerReference w:type="default" r:id="rId8"/>"#,
    r#"<w:pgSz w:w="11906" w:h="16838"/>"#,
    r#"<w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="708" w:footer="708" w:gutter="0"/>"#,
    r#"</w:sectPr>"#,
);

const PLAIN_SECT_PR: &str = r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr>"#;

pub const HEADER_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<w:hdr xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
    r#"<w:p><w:r><w:t>Acme Ltd</w:t></w:r></w:p></w:hdr>"#,
);

pub const FOOTER_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<w:ftr xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
    r#"<w:p><w:r><w:t>Registered in Ireland No. 123456</w:t></w:r></w:p></w:ftr>"#,
);

const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
    r#"<Override PartName="/word/header1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml"/>"#,
    r#"<Override PartName="/word/footer1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml"/>"#,
    r#"</Types>"#,
);

const PACKAGE_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    r#"</Relationships>"#,
);

const DOCUMENT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId7" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="header1.xml"/>"#,
    r#"<Relationship Id="rId8" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="footer1.xml"/>"#,
    r#"</Relationships>"#,
);

const CORE_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/">"#,
    r#"<dc:creator>Acme Ltd</dc:creator></cp:coreProperties>"#,
);

fn document_xml(sect_pr: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#,
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
            r#"<w:body><w:p><w:r><w:t>Template placeholder</w:t></w:r></w:p>{}</w:body></w:document>"#,
        ),
        sect_pr
    )
}

fn build(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in parts {
        zip.start_file(*name, FileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// A letterhead with one header and one footer.
pub fn letterhead_docx() -> Vec<u8> {
    let document = document_xml(SECT_PR);
    build(&[
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", PACKAGE_RELS),
        ("word/document.xml", &document),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS),
        ("word/header1.xml", HEADER_XML),
        ("word/footer1.xml", FOOTER_XML),
        ("docProps/core.xml", CORE_XML),
    ])
}

/// A letterhead whose footer reference has no relationship.
pub fn dangling_relationship_docx() -> Vec<u8> {
    let document = document_xml(SECT_PR);
    let rels = DOCUMENT_RELS.replace(
        r#"<Relationship Id="rId8" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="footer1.xml"/>"#,
        "",
    );
    build(&[
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", PACKAGE_RELS),
        ("word/document.xml", &document),
        ("word/_rels/document.xml.rels", &rels),
        ("word/header1.xml", HEADER_XML),
        ("word/footer1.xml", FOOTER_XML),
    ])
}

/// A letterhead whose header relationship points at a part that is not packaged.
pub fn missing_header_part_docx() -> Vec<u8> {
    let document = document_xml(SECT_PR);
    build(&[
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", PACKAGE_RELS),
        ("word/document.xml", &document),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS),
        ("word/footer1.xml", FOOTER_XML),
    ])
}

/// A well-formed document whose section has no header or footer.
pub fn plain_docx() -> Vec<u8> {
    let document = document_xml(PLAIN_SECT_PR);
    build(&[
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", PACKAGE_RELS),
        ("word/document.xml", &document),
    ])
}

pub fn letter() -> Letter {
    Letter {
        recipient: Recipient {
            name: "Ms Jane Smith".to_string(),
            title: "Director".to_string(),
            organisation: "Acme Corp".to_string(),
            address: vec!["123 Main Street".to_string()],
            city: "Dublin 1".to_string(),
            country: "Ireland".to_string(),
        },
        title: None,
        date: Some("1 January 2025".to_string()),
    }
}

/// Write the fixture template and `markdown` into `dir` and describe the job.
pub fn job(dir: &Path, markdown: &str) -> Job {
    let template = dir.join("letterhead.docx");
    let source = dir.join("letter.md");
    std::fs::write(&template, letterhead_docx()).unwrap();
    std::fs::write(&source, markdown).unwrap();
    Job {
        template,
        source,
        output: dir.join("letter.docx"),
        letter: letter(),
    }
}

/// Entry names in central directory order.
pub fn entry_names(docx: &[u8]) -> Vec<String> {
    let mut archive = ZipArchive::new(Cursor::new(docx)).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index_raw(i).unwrap().name().to_string())
        .collect()
}

pub fn entry(docx: &[u8], name: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(Cursor::new(docx)).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut content = Vec::new();
    file.read_to_end(&mut content).unwrap();
    content
}

pub fn read_output(path: &PathBuf) -> Vec<u8> {
    std::fs::read(path).unwrap()
}

/// One body paragraph as a reader would see it.
#[derive(Debug, Default, Clone)]
pub struct Para {
    pub text: String,
    pub bold: Vec<String>,
    pub page_break: bool,
}

/// Paragraphs inside `<w:body>` of a `word/document.xml`.
pub fn paragraphs(document: &[u8]) -> Vec<Para> {
    let mut reader = Reader::from_reader(document);
    let mut buf = Vec::new();
    let mut out = Vec::new();
    let mut para = Para::default();
    let mut run_bold = false;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf).unwrap() {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => para = Para::default(),
                b"w:r" => run_bold = false,
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:b" => run_bold = true,
                b"w:br" => para.page_break = true,
                _ => {}
            },
            Event::Text(t) if in_text => {
                let text = t.unescape().unwrap().into_owned();
                if run_bold {
                    para.bold.push(text.clone());
                }
                para.text.push_str(&text);
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => out.push(std::mem::take(&mut para)),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    out
}

pub fn texts(paras: &[Para]) -> Vec<&str> {
    paras.iter().map(|p| p.text.as_str()).collect()
}
