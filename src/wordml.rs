use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::block::{Block, Source, Span};
use crate::config::Config;
use crate::error::Result;
use crate::letter::Letter;

/// Render a whole letter body: title, address block, date, salutation, the
/// source blocks and the sign-off. The result is a sequence of `<w:p>`
/// elements ready to go inside `<w:body>`.
pub fn letter_to_wordml(source: &Source, letter: &Letter, config: &Config) -> Result<Vec<u8>> {
    let date = letter.resolve_date(config)?;
    let recipient = &letter.recipient;
    let gap = config.letter.gap_lines;
    let body_size = config.font.body_size;

    let mut out = BodyWriter::new(config);

    if let Some(title) = letter.resolve_title(source.title.as_deref()) {
        let style = &config.styles.title;
        let props = Spacing::new(style.space_before, style.space_after).centered();
        out.paragraph(props, &[Run::new(title, style.size).bold(style.bold)])?;
        out.blank_lines(gap)?;
    }

    out.line(&recipient.name, body_size, true)?;
    for line in recipient.address_block() {
        out.line(line, body_size, false)?;
    }

    out.blank_lines(gap)?;
    out.line(&date, body_size, false)?;

    out.blank_lines(gap)?;
    let salutation = config
        .letter
        .salutation_for(&recipient.name, &recipient.title);
    out.line(&salutation, body_size, false)?;

    emit_blocks(&source.blocks, &mut out)?;
    emit_sign_off(&mut out)?;

    log::debug!("rendered {} body blocks", source.blocks.len());
    Ok(out.finish())
}

/// Render only the markdown blocks, without any letter furniture.
pub fn blocks_to_wordml(blocks: &[Block], config: &Config) -> Result<Vec<u8>> {
    let mut out = BodyWriter::new(config);
    emit_blocks(blocks, &mut out)?;
    Ok(out.finish())
}

fn emit_blocks(blocks: &[Block], out: &mut BodyWriter<'_>) -> Result<()> {
    let config = out.config;
    let groups = list_groups(blocks);
    // Running number per list depth
    let mut counters: Vec<usize> = Vec::new();

    for (i, block) in blocks.iter().enumerate() {
        match block {
            Block::Heading { level, text } => {
                counters.clear();
                let style = config.styles.heading(*level);
                let props = Spacing::new(style.space_before, style.space_after);
                out.paragraph(props, &[Run::new(text, style.size).bold(style.bold)])?;
            }
            Block::Paragraph { content } => {
                counters.clear();
                let style = &config.styles.paragraph;
                let props = Spacing::new(style.space_before, style.space_after);
                let runs = spans_to_runs(content, style.size, style.bold);
                out.paragraph(props, &runs)?;
            }
            Block::BulletItem { depth, content } => {
                counters.truncate(*depth);
                let marker = format!("{} ", config.lists.bullet(*depth));
                emit_list_item(out, &groups, i, *depth, &marker, content)?;
            }
            Block::NumberedItem { depth, content } => {
                counters.truncate(depth + 1);
                counters.resize(depth + 1, 0);
                counters[*depth] += 1;
                let style = config.lists.number_style(*depth);
                let marker = format!("{} ", style.label(counters[*depth]));
                emit_list_item(out, &groups, i, *depth, &marker, content)?;
            }
            Block::PageBreak => {
                counters.clear();
                out.page_break()?;
            }
        }
    }

    Ok(())
}

fn emit_list_item(
    out: &mut BodyWriter<'_>,
    groups: &[Option<usize>],
    index: usize,
    depth: usize,
    marker: &str,
    content: &[Span],
) -> Result<()> {
    let config = out.config;
    let style = &config.styles.list;

    // Only the edges of a logical list get spacing; items inside stay tight.
    let group = groups[index];
    let first = index == 0 || groups[index - 1] != group;
    let last = groups.get(index + 1).is_none_or(|next| *next != group);

    let props = Spacing::new(
        if first { style.space_before } else { 0.0 },
        if last { style.space_after } else { 0.0 },
    )
    .indent(config.lists.indent * (depth + 1) as f32);

    let mut runs = vec![Run::new(marker, style.size)];
    runs.extend(spans_to_runs(content, style.size, style.bold));
    out.paragraph(props, &runs)
}

/// Assign each list item to a logical list.
///
/// A logical list is a run of consecutive items. Inside a run, a top-level
/// item of a different kind than the previous top-level item starts a new
/// list; nested items always belong to their parent's list.
fn list_groups(blocks: &[Block]) -> Vec<Option<usize>> {
    let mut groups = Vec::with_capacity(blocks.len());
    let mut next_id = 0;
    // (group id, numbered) of the current top-level list
    let mut current: Option<(usize, bool)> = None;

    for block in blocks {
        let numbered = match block {
            Block::BulletItem { .. } => false,
            Block::NumberedItem { .. } => true,
            _ => {
                current = None;
                groups.push(None);
                continue;
            }
        };
        let depth = block.list_depth().unwrap_or(0);

        let id = match current {
            Some((id, kind)) if depth > 0 || kind == numbered => id,
            _ => {
                next_id += 1;
                next_id
            }
        };
        if depth == 0 || current.is_none() {
            current = Some((id, numbered));
        }
        groups.push(Some(id));
    }

    groups
}

fn emit_sign_off(out: &mut BodyWriter<'_>) -> Result<()> {
    let config = out.config;
    let signoff = &config.signoff;
    let body_size = config.font.body_size;

    out.blank_lines(1)?;
    out.line(&signoff.closing, body_size, false)?;
    out.blank_lines(signoff.gap_lines)?;
    out.line(&signoff.name, body_size, true)?;
    out.line(&signoff.qualifications, signoff.qualifications_size, false)?;
    out.line(&signoff.title, body_size, true)
}

fn spans_to_runs(spans: &[Span], size: f32, bold: bool) -> Vec<Run<'_>> {
    spans
        .iter()
        .map(|span| Run::new(span.text(), size).bold(bold || span.is_bold()))
        .collect()
}

struct Run<'a> {
    text: &'a str,
    size: f32,
    bold: bool,
}

impl<'a> Run<'a> {
    fn new(text: &'a str, size: f32) -> Self {
        Self {
            text,
            size,
            bold: false,
        }
    }

    fn bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }
}

/// Paragraph-level properties, in points.
#[derive(Debug, Clone, Copy, Default)]
struct Spacing {
    before: f32,
    after: f32,
    indent: f32,
    centered: bool,
}

impl Spacing {
    fn new(before: f32, after: f32) -> Self {
        Self {
            before,
            after,
            ..Self::default()
        }
    }

    fn indent(mut self, indent: f32) -> Self {
        self.indent = indent;
        self
    }

    fn centered(mut self) -> Self {
        self.centered = true;
        self
    }
}

fn twips(points: f32) -> String {
    ((points * 20.0).round() as i64).to_string()
}

fn half_points(points: f32) -> String {
    ((points * 2.0).round() as i64).to_string()
}

/// Writes `<w:p>` elements with direct formatting.
struct BodyWriter<'a> {
    config: &'a Config,
    writer: Writer<Vec<u8>>,
    line: String,
}

impl<'a> BodyWriter<'a> {
    fn new(config: &'a Config) -> Self {
        Self {
            config,
            writer: Writer::new(Vec::new()),
            line: ((240.0 * config.font.line_spacing).round() as i64).to_string(),
        }
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }

    fn start(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::Start(BytesStart::new(name)))?;
        Ok(())
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn empty(&mut self, element: BytesStart<'_>) -> Result<()> {
        self.writer.write_event(Event::Empty(element))?;
        Ok(())
    }

    /// A tight single line (no paragraph spacing) in the body font.
    fn line(&mut self, text: &str, size: f32, bold: bool) -> Result<()> {
        self.paragraph(Spacing::default(), &[Run::new(text, size).bold(bold)])
    }

    fn blank_lines(&mut self, count: usize) -> Result<()> {
        for _ in 0..count {
            self.paragraph(Spacing::default(), &[])?;
        }
        Ok(())
    }

    fn paragraph(&mut self, props: Spacing, runs: &[Run<'_>]) -> Result<()> {
        self.start("w:p")?;
        self.paragraph_properties(props)?;
        for run in runs {
            self.run(run)?;
        }
        self.end("w:p")
    }

    fn paragraph_properties(&mut self, props: Spacing) -> Result<()> {
        self.start("w:pPr")?;

        let before = twips(props.before);
        let after = twips(props.after);
        let mut spacing = BytesStart::new("w:spacing");
        spacing.push_attribute(("w:before", before.as_str()));
        spacing.push_attribute(("w:after", after.as_str()));
        spacing.push_attribute(("w:line", self.line.as_str()));
        spacing.push_attribute(("w:lineRule", "auto"));
        self.empty(spacing)?;

        if props.indent > 0.0 {
            let left = twips(props.indent);
            let mut ind = BytesStart::new("w:ind");
            ind.push_attribute(("w:left", left.as_str()));
            self.empty(ind)?;
        }

        if props.centered {
            let mut jc = BytesStart::new("w:jc");
            jc.push_attribute(("w:val", "center"));
            self.empty(jc)?;
        }

        self.end("w:pPr")
    }

    fn run(&mut self, run: &Run<'_>) -> Result<()> {
        let font = self.config.font.name.as_str();
        let size = half_points(run.size);

        self.start("w:r")?;
        self.start("w:rPr")?;

        let mut fonts = BytesStart::new("w:rFonts");
        fonts.push_attribute(("w:ascii", font));
        fonts.push_attribute(("w:hAnsi", font));
        fonts.push_attribute(("w:cs", font));
        self.empty(fonts)?;

        if run.bold {
            self.empty(BytesStart::new("w:b"))?;
        }

        let mut sz = BytesStart::new("w:sz");
        sz.push_attribute(("w:val", size.as_str()));
        self.empty(sz)?;
        let mut sz_cs = BytesStart::new("w:szCs");
        sz_cs.push_attribute(("w:val", size.as_str()));
        self.empty(sz_cs)?;

        self.end("w:rPr")?;

        let mut t = BytesStart::new("w:t");
        t.push_attribute(("xml:space", "preserve"));
        self.writer.write_event(Event::Start(t))?;
        self.writer.write_event(Event::Text(BytesText::new(run.text)))?;
        self.end("w:t")?;

        self.end("w:r")
    }

    fn page_break(&mut self) -> Result<()> {
        self.start("w:p")?;
        self.start("w:r")?;
        let mut br = BytesStart::new("w:br");
        br.push_attribute(("w:type", "page"));
        self.empty(br)?;
        self.end("w:r")?;
        self.end("w:p")
    }
}
