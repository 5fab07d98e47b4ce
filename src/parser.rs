use std::sync::LazyLock;

use regex::Regex;

use crate::block::{Block, Source, Span};

/// Spaces per list nesting level unless the style configuration says otherwise.
pub const DEFAULT_INDENT_WIDTH: usize = 2;

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold pattern is valid"));

/// Strip YAML frontmatter from the beginning of markdown content.
///
/// Only a block of `key: value` lines closed by a line that is exactly `---`
/// is frontmatter. Anything else is left to the line parser, which drops the
/// lone `---` rules and keeps the text.
fn strip_frontmatter(markdown: &str) -> &str {
    let Some(rest) = markdown
        .strip_prefix("---\n")
        .or_else(|| markdown.strip_prefix("---\r\n"))
    else {
        return markdown;
    };

    let mut offset = 0;
    let mut seen_key = false;
    for line in rest.split_inclusive('\n') {
        offset += line.len();
        let line = line.trim_end_matches(['\r', '\n']);
        if line == "---" {
            return if seen_key {
                rest[offset..].trim_start_matches(['\r', '\n'])
            } else {
                markdown
            };
        }
        if is_frontmatter_key(line) {
            seen_key = true;
        } else if !(seen_key && line.starts_with([' ', '\t']) && !line.trim().is_empty()) {
            return markdown;
        }
    }
    markdown
}

/// `key:` or `key: value`, where the key is a single word.
fn is_frontmatter_key(line: &str) -> bool {
    match line.split_once(':') {
        Some((key, value)) => {
            !key.is_empty()
                && key
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
                && (value.is_empty() || value.starts_with([' ', '\t']))
        }
        None => false,
    }
}

/// Parse markdown text using the default list indent width.
pub fn parse(markdown: &str) -> Source {
    parse_with_indent(markdown, DEFAULT_INDENT_WIDTH)
}

/// Parse markdown text, measuring list depth in units of `indent_width` spaces.
///
/// Parsing never fails: anything that is not a recognised construct becomes
/// paragraph text.
pub fn parse_with_indent(markdown: &str, indent_width: usize) -> Source {
    let indent_width = indent_width.max(1);
    let mut state = ParseState::default();

    for line in strip_frontmatter(markdown).lines() {
        state.line(line, indent_width);
    }

    state.finish()
}

#[derive(Default)]
struct ParseState {
    source: Source,
    // Trimmed lines of the paragraph being built
    paragraph: Vec<String>,
}

#[derive(Clone, Copy)]
enum ListKind {
    Bullet,
    Numbered,
}

enum Line<'a> {
    Blank,
    PageBreak,
    Rule,
    Heading(u8, &'a str),
    Item(ListKind, &'a str),
    Text(&'a str),
}

impl ParseState {
    fn line(&mut self, raw: &str, indent_width: usize) {
        match classify(raw) {
            Line::Blank | Line::Rule => self.flush(),
            Line::PageBreak => {
                self.flush();
                self.source.blocks.push(Block::PageBreak);
            }
            Line::Heading(level, text) => {
                self.flush();
                if level == 1 && self.source.title.is_none() {
                    self.source.title = Some(text.to_string());
                } else {
                    self.source.blocks.push(Block::Heading {
                        level,
                        text: text.to_string(),
                    });
                }
            }
            Line::Item(kind, text) => {
                self.flush();
                let depth = self.clamp_depth(indent_columns(raw, indent_width) / indent_width);
                let content = parse_spans(text);
                self.source.blocks.push(match kind {
                    ListKind::Bullet => Block::BulletItem { depth, content },
                    ListKind::Numbered => Block::NumberedItem { depth, content },
                });
            }
            Line::Text(text) => self.paragraph.push(text.to_string()),
        }
    }

    /// A list may go at most one level deeper than the item before it.
    fn clamp_depth(&self, depth: usize) -> usize {
        let max = self
            .source
            .blocks
            .last()
            .and_then(Block::list_depth)
            .map_or(0, |previous| previous + 1);
        depth.min(max)
    }

    fn flush(&mut self) {
        if !self.paragraph.is_empty() {
            let text = self.paragraph.join(" ");
            self.paragraph.clear();
            self.source.blocks.push(Block::Paragraph {
                content: parse_spans(&text),
            });
        }
    }

    fn finish(mut self) -> Source {
        self.flush();
        self.source
    }
}

fn classify(raw: &str) -> Line<'_> {
    let line = raw.trim();

    if line.is_empty() {
        return Line::Blank;
    }
    if line == "\\newpage" {
        return Line::PageBreak;
    }
    if line.len() >= 3 && line.chars().all(|c| c == '-') {
        return Line::Rule;
    }
    if let Some((level, text)) = heading(line) {
        return Line::Heading(level, text);
    }
    if let Some(text) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return Line::Item(ListKind::Bullet, text.trim_start());
    }
    if let Some(text) = numbered_item(line) {
        return Line::Item(ListKind::Numbered, text);
    }

    if line.starts_with(['#', '-', '*']) || line.starts_with(|c: char| c.is_ascii_digit()) {
        log::debug!("treating {:?} as paragraph text", line);
    }
    Line::Text(line)
}

/// `#`, `##` or `###` followed by a space and some text.
fn heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if !(1..=3).contains(&hashes) {
        return None;
    }
    let text = line[hashes..].strip_prefix(' ')?.trim();
    if text.is_empty() {
        return None;
    }
    Some((hashes as u8, text))
}

/// `<digits>.` followed by whitespace and some text.
fn numbered_item(line: &str) -> Option<&str> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = line[digits..].strip_prefix('.')?;
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    let text = rest.trim_start();
    (!text.is_empty()).then_some(text)
}

/// Leading whitespace width, counting a tab as one full indent level.
fn indent_columns(raw: &str, indent_width: usize) -> usize {
    raw.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { indent_width } else { 1 })
        .sum()
}

/// Split text into plain and `**bold**` spans.
pub(crate) fn parse_spans(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut last = 0;

    for caps in BOLD.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            spans.push(Span::Text(text[last..whole.start()].to_string()));
        }
        spans.push(Span::Bold(inner.as_str().to_string()));
        last = whole.end();
    }

    if last < text.len() {
        spans.push(Span::Text(text[last..].to_string()));
    }

    spans
}
