//! Turn a markdown letter into a Word document on a letterhead template.
//!
//! The template's header and footer are kept exactly as they are; its body is
//! replaced by a formatted letter: title, recipient block, date, salutation,
//! the markdown content and a sign-off.

mod block;
mod config;
mod error;
mod letter;
mod package;
mod parser;
mod template;
mod wordml;

pub use block::{Block, Source, Span};
pub use config::{
    BlockStyle, Config, FontConfig, LetterConfig, ListConfig, NumberStyle, SignOffConfig,
    StylesConfig,
};
pub use error::{Error, InputRole, Result};
pub use letter::{Letter, Recipient};
pub use package::{save, write_package};
pub use template::Template;
pub use wordml::{blocks_to_wordml, letter_to_wordml};

use std::fs;
use std::io::Cursor;
use std::path::PathBuf;

/// Parse markdown text using the default list indent width.
pub fn parse(markdown: &str) -> Source {
    parser::parse(markdown)
}

/// Parse markdown text using the list indent width from `config`.
pub fn parse_with_config(markdown: &str, config: &Config) -> Source {
    parser::parse_with_indent(markdown, config.lists.indent_width)
}

/// Convert markdown to WordprocessingML body content using default config.
pub fn markdown_to_wordml(markdown: &str, letter: &Letter) -> Result<Vec<u8>> {
    markdown_to_wordml_with_config(markdown, letter, &Config::compiled_default())
}

/// Convert markdown to WordprocessingML body content with custom config.
pub fn markdown_to_wordml_with_config(
    markdown: &str,
    letter: &Letter,
    config: &Config,
) -> Result<Vec<u8>> {
    let source = parse_with_config(markdown, config);
    letter_to_wordml(&source, letter, config)
}

/// Convert markdown to `.docx` bytes on the given template.
pub fn markdown_to_docx_with_config(
    markdown: &str,
    template: &Template,
    letter: &Letter,
    config: &Config,
) -> Result<Vec<u8>> {
    letter.validate()?;
    let body = markdown_to_wordml_with_config(markdown, letter, config)?;
    let document = template.document_with_body(&body);

    let mut out = Cursor::new(Vec::new());
    write_package(template, &document, &mut out).map_err(|e| Error::Io(e.into()))?;
    Ok(out.into_inner())
}

/// The files and letter details for one conversion.
#[derive(Debug, Clone)]
pub struct Job {
    pub template: PathBuf,
    pub source: PathBuf,
    pub output: PathBuf,
    pub letter: Letter,
}

/// Run one conversion from files to file.
///
/// Inputs are all read and validated before anything is written; the output
/// either appears complete or not at all.
pub fn convert(job: &Job, config: &Config) -> Result<()> {
    job.letter.validate()?;

    let template = Template::open(&job.template)?;
    let markdown = fs::read_to_string(&job.source)
        .map_err(|e| Error::input(InputRole::Source, &job.source, e))?;

    let source = parse_with_config(&markdown, config);
    log::debug!(
        "parsed {} blocks from {}",
        source.blocks.len(),
        job.source.display()
    );

    let body = letter_to_wordml(&source, &job.letter, config)?;
    let document = template.document_with_body(&body);
    save(&template, &document, &job.output)
}
