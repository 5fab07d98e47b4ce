//! Letterhead template loading.
//!
//! A template is an ordinary `.docx` package. Its body content is thrown away;
//! the body-level `<w:sectPr>` (which points at the header and footer parts) is
//! kept byte for byte and re-attached after the generated content.

use std::fs;
use std::io::{Cursor, Read, Seek};
use std::ops::Range;
use std::path::{Path, PathBuf};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::{Error, InputRole, Result};

pub(crate) const DOCUMENT_PART: &str = "word/document.xml";
const DOCUMENT_RELS: &str = "word/_rels/document.xml.rels";

/// Upper bound on any single XML part we decompress.
const MAX_PART_SIZE: u64 = 100 * 1024 * 1024;

/// A validated letterhead template held in memory.
#[derive(Debug, Clone)]
pub struct Template {
    path: PathBuf,
    package: Vec<u8>,
    document: String,
    layout: BodyLayout,
    parts: Vec<String>,
}

/// Byte offsets into `word/document.xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BodyLayout {
    /// Just past the `<w:body>` start tag
    body_start: usize,
    /// The body-level `<w:sectPr>...</w:sectPr>` element
    sect_pr: Range<usize>,
    /// At the `</w:body>` end tag
    body_end: usize,
    /// Relationship ids of header and footer references
    references: Vec<String>,
}

impl Template {
    /// Read and validate a template file.
    pub fn open(path: &Path) -> Result<Self> {
        let package = fs::read(path).map_err(|e| Error::input(InputRole::Template, path, e))?;
        Self::from_bytes(path, package)
    }

    /// Validate an in-memory template. `path` is only used in error messages.
    pub fn from_bytes(path: impl Into<PathBuf>, package: Vec<u8>) -> Result<Self> {
        let path = path.into();
        let invalid = |reason: String| Error::invalid_template(&path, reason);

        let (document, layout, parts) = {
            let mut archive = ZipArchive::new(Cursor::new(package.as_slice()))
                .map_err(|e| invalid(format!("not a Word document package ({e})")))?;

            let document = read_part(&mut archive, DOCUMENT_PART)
                .map_err(&invalid)?
                .ok_or_else(|| invalid(format!("{DOCUMENT_PART} is missing")))?;
            let layout = scan_document(&document).map_err(&invalid)?;

            if layout.references.is_empty() {
                return Err(invalid(
                    "section properties have no header or footer references".to_string(),
                ));
            }

            let rels = read_part(&mut archive, DOCUMENT_RELS)
                .map_err(&invalid)?
                .ok_or_else(|| invalid(format!("{DOCUMENT_RELS} is missing")))?;
            let targets = relationship_targets(&rels).map_err(&invalid)?;

            let mut parts = Vec::new();
            for id in &layout.references {
                let target = targets
                    .iter()
                    .find(|(rel_id, _)| rel_id == id)
                    .map(|(_, target)| target)
                    .ok_or_else(|| invalid(format!("header/footer relationship {id} is not defined")))?;
                let part = resolve_target(target);
                if archive.by_name(&part).is_err() {
                    return Err(invalid(format!("header/footer part {part} is missing")));
                }
                if !parts.contains(&part) {
                    parts.push(part);
                }
            }

            (document, layout, parts)
        };

        log::info!(
            "opened template {} with {} header/footer part(s)",
            path.display(),
            parts.len()
        );

        Ok(Self {
            path,
            package,
            document,
            layout,
            parts,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The body-level `<w:sectPr>` element exactly as it appears in the template.
    pub fn section_properties(&self) -> &str {
        &self.document[self.layout.sect_pr.clone()]
    }

    /// Package part names of the referenced headers and footers.
    pub fn header_footer_parts(&self) -> &[String] {
        &self.parts
    }

    /// Raw bytes of the template package.
    pub(crate) fn package(&self) -> &[u8] {
        &self.package
    }

    /// A `word/document.xml` with `body` in place of the template's content.
    ///
    /// Everything outside the body content (XML declaration, namespace
    /// declarations, section properties) is copied from the template unchanged.
    pub fn document_with_body(&self, body: &[u8]) -> Vec<u8> {
        let head = &self.document[..self.layout.body_start];
        let tail = &self.document[self.layout.body_end..];
        let sect_pr = self.section_properties();

        let mut out = Vec::with_capacity(head.len() + body.len() + sect_pr.len() + tail.len());
        out.extend_from_slice(head.as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(sect_pr.as_bytes());
        out.extend_from_slice(tail.as_bytes());
        out
    }
}

fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> std::result::Result<Option<String>, String> {
    let file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(format!("could not open {name}: {e}")),
    };

    let mut content = String::new();
    file.take(MAX_PART_SIZE + 1)
        .read_to_string(&mut content)
        .map_err(|e| format!("could not read {name}: {e}"))?;
    if content.len() as u64 > MAX_PART_SIZE {
        return Err(format!("{name} exceeds {MAX_PART_SIZE} bytes"));
    }
    Ok(Some(content))
}

/// Offset of the `<` that opened the event read from `before`.
///
/// Depending on what preceded it, the reader is either at the `<` or just past it.
fn tag_start(xml: &[u8], before: usize) -> usize {
    let end = (before + 1).min(xml.len());
    xml[..end]
        .iter()
        .rposition(|&b| b == b'<')
        .unwrap_or(before)
}

fn scan_document(xml: &str) -> std::result::Result<BodyLayout, String> {
    let bytes = xml.as_bytes();
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();

    let mut depth = 0usize;
    let mut body_start = None;
    let mut body_end = None;
    let mut sect_pr = None;
    let mut references = Vec::new();
    // Start offset and references of the sectPr being read
    let mut open_sect_pr: Option<(usize, Vec<String>)> = None;

    loop {
        let before = reader.buffer_position() as usize;
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| format!("{DOCUMENT_PART} is not well-formed XML ({e})"))?;
        let after = reader.buffer_position() as usize;
        let in_body = body_start.is_some() && body_end.is_none();

        match event {
            Event::Start(e) => {
                match (depth, e.local_name().as_ref()) {
                    (1, b"body") => body_start = Some(after),
                    (2, b"sectPr") if in_body => {
                        open_sect_pr = Some((tag_start(bytes, before), Vec::new()));
                    }
                    _ => {
                        if let Some((_, refs)) = open_sect_pr.as_mut() {
                            collect_reference(&e, refs)?;
                        }
                    }
                }
                depth += 1;
            }
            Event::Empty(e) => {
                if let Some((_, refs)) = open_sect_pr.as_mut() {
                    collect_reference(&e, refs)?;
                } else if depth == 2 && in_body && e.local_name().as_ref() == b"sectPr" {
                    sect_pr = Some(tag_start(bytes, before)..after);
                    references.clear();
                }
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                match (depth, e.local_name().as_ref()) {
                    (2, b"sectPr") => {
                        if let Some((start, refs)) = open_sect_pr.take() {
                            sect_pr = Some(start..after);
                            references = refs;
                        }
                    }
                    (1, b"body") => body_end = Some(tag_start(bytes, before)),
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let body_start = body_start.ok_or_else(|| format!("{DOCUMENT_PART} has no <w:body>"))?;
    let body_end = body_end.ok_or_else(|| format!("{DOCUMENT_PART} has an unterminated <w:body>"))?;
    let sect_pr = sect_pr.ok_or_else(|| "document has no section properties (<w:sectPr>)".to_string())?;

    Ok(BodyLayout {
        body_start,
        sect_pr,
        body_end,
        references,
    })
}

fn collect_reference(
    element: &BytesStart<'_>,
    refs: &mut Vec<String>,
) -> std::result::Result<(), String> {
    if !matches!(
        element.local_name().as_ref(),
        b"headerReference" | b"footerReference"
    ) {
        return Ok(());
    }
    for attr in element.attributes().flatten() {
        if attr.key.local_name().as_ref() == b"id" {
            let id = attr
                .unescape_value()
                .map_err(|e| format!("bad header/footer reference ({e})"))?;
            refs.push(id.into_owned());
        }
    }
    Ok(())
}

/// `(Id, Target)` pairs from a relationships part.
fn relationship_targets(xml: &str) -> std::result::Result<Vec<(String, String)>, String> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    let mut buf = Vec::new();
    let mut targets = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() != b"Relationship" {
                    buf.clear();
                    continue;
                }
                let mut id = None;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    let value = attr
                        .unescape_value()
                        .map_err(|e| format!("bad relationship attribute ({e})"))?
                        .into_owned();
                    match attr.key.local_name().as_ref() {
                        b"Id" => id = Some(value),
                        b"Target" => target = Some(value),
                        _ => {}
                    }
                }
                if let (Some(id), Some(target)) = (id, target) {
                    targets.push((id, target));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("{DOCUMENT_RELS} is not well-formed XML ({e})")),
            _ => {}
        }
        buf.clear();
    }

    Ok(targets)
}

/// Resolve a relationship target relative to `word/document.xml`.
fn resolve_target(target: &str) -> String {
    let mut segments = Vec::new();
    let relative = match target.strip_prefix('/') {
        Some(absolute) => absolute,
        None => {
            segments.push("word");
            target
        }
    };
    segments.extend(relative.split('/'));
    normalize(segments)
}

fn normalize(segments: Vec<&str>) -> String {
    let mut out: Vec<&str> = Vec::new();
    for segment in segments {
        match segment {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out.join("/")
}
