use std::fs;
use std::path::Path;

use chrono::format::{Item, StrftimeItems};
use serde::Deserialize;

use crate::error::{Error, InputRole, Result};

static DEFAULT_CONFIG: &str = include_str!("default_config.toml");

/// Style configuration for a letter. Built once and never mutated while rendering.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub font: FontConfig,
    pub styles: StylesConfig,
    pub lists: ListConfig,
    pub letter: LetterConfig,
    pub signoff: SignOffConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub name: String,
    /// Body text size in points
    pub body_size: f32,
    pub line_spacing: f32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            name: "Calibri".to_string(),
            body_size: 11.0,
            line_spacing: 1.2,
        }
    }
}

/// Size, weight and paragraph spacing for one kind of block.
///
/// Keys missing from a partially specified table take the body paragraph values.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct BlockStyle {
    pub size: f32,
    pub bold: bool,
    pub space_before: f32,
    pub space_after: f32,
}

impl BlockStyle {
    const fn new(size: f32, bold: bool, space_before: f32, space_after: f32) -> Self {
        Self {
            size,
            bold,
            space_before,
            space_after,
        }
    }
}

impl Default for BlockStyle {
    fn default() -> Self {
        Self::new(11.0, false, 0.0, 6.0)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StylesConfig {
    pub title: BlockStyle,
    pub heading1: BlockStyle,
    pub heading2: BlockStyle,
    pub heading3: BlockStyle,
    pub paragraph: BlockStyle,
    pub list: BlockStyle,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            title: BlockStyle::new(14.0, true, 0.0, 0.0),
            heading1: BlockStyle::new(11.0, true, 12.0, 6.0),
            heading2: BlockStyle::new(14.0, true, 12.0, 6.0),
            heading3: BlockStyle::new(12.0, true, 12.0, 6.0),
            paragraph: BlockStyle::new(11.0, false, 0.0, 6.0),
            list: BlockStyle::new(11.0, false, 0.0, 6.0),
        }
    }
}

impl StylesConfig {
    /// Style for a heading level. Levels past 3 use the level 3 style.
    pub fn heading(&self, level: u8) -> &BlockStyle {
        match level {
            1 => &self.heading1,
            2 => &self.heading2,
            _ => &self.heading3,
        }
    }
}

/// How list items are numbered at one nesting depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NumberStyle {
    Decimal,
    LowerAlpha,
    UpperAlpha,
    LowerRoman,
    UpperRoman,
}

impl NumberStyle {
    /// Render the `n`th (1-based) label, including the trailing period.
    pub fn label(self, n: usize) -> String {
        let n = n.max(1);
        let body = match self {
            NumberStyle::Decimal => n.to_string(),
            NumberStyle::LowerAlpha => alpha(n),
            NumberStyle::UpperAlpha => alpha(n).to_uppercase(),
            NumberStyle::LowerRoman => roman(n),
            NumberStyle::UpperRoman => roman(n).to_uppercase(),
        };
        format!("{body}.")
    }
}

// a, b, ..., z, aa, ab, ...
fn alpha(mut n: usize) -> String {
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(b'a' + (n % 26) as u8);
        n /= 26;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

fn roman(mut n: usize) -> String {
    const NUMERALS: &[(usize, &str)] = &[
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut out = String::new();
    for &(value, numeral) in NUMERALS {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    /// Spaces per nesting level in the markdown source
    pub indent_width: usize,
    /// Left indent per nesting level, in points
    pub indent: f32,
    pub bullets: Vec<String>,
    pub numbering: Vec<NumberStyle>,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            indent_width: 2,
            indent: 18.0,
            bullets: vec!["•".to_string(), "○".to_string(), "▪".to_string()],
            numbering: vec![
                NumberStyle::Decimal,
                NumberStyle::LowerAlpha,
                NumberStyle::LowerRoman,
            ],
        }
    }
}

impl ListConfig {
    /// Bullet glyph for a nesting depth, cycling through the configured glyphs.
    pub fn bullet(&self, depth: usize) -> &str {
        if self.bullets.is_empty() {
            return "•";
        }
        &self.bullets[depth % self.bullets.len()]
    }

    /// Number style for a nesting depth, cycling through the configured styles.
    pub fn number_style(&self, depth: usize) -> NumberStyle {
        if self.numbering.is_empty() {
            return NumberStyle::Decimal;
        }
        self.numbering[depth % self.numbering.len()]
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LetterConfig {
    pub salutation: String,
    /// strftime pattern used when no date is supplied
    pub date_format: String,
    /// Blank lines between title, address block, date and salutation
    pub gap_lines: usize,
}

impl Default for LetterConfig {
    fn default() -> Self {
        Self {
            salutation: "Dear {name},".to_string(),
            date_format: "%-d %B %Y".to_string(),
            gap_lines: 2,
        }
    }
}

impl LetterConfig {
    pub fn salutation_for(&self, name: &str, title: &str) -> String {
        self.salutation
            .replace("{name}", name)
            .replace("{title}", title)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SignOffConfig {
    pub closing: String,
    pub name: String,
    pub qualifications: String,
    pub title: String,
    pub qualifications_size: f32,
    /// Blank lines between the closing phrase and the name
    pub gap_lines: usize,
}

impl Default for SignOffConfig {
    fn default() -> Self {
        Self {
            closing: "Kind regards,".to_string(),
            name: "Your Name".to_string(),
            qualifications: "Your Qualifications Here".to_string(),
            title: "Your Professional Title".to_string(),
            qualifications_size: 10.0,
            gap_lines: 1,
        }
    }
}

impl Config {
    /// The style sheet shipped with the binary.
    pub fn compiled_default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    /// Load a user config file. Missing keys fall back to the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| Error::input(InputRole::Config, path, e))?;
        let config = Self::from_toml(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        log::info!("loaded style configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a config from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.font.name.trim().is_empty() {
            return Err(Error::Config("font.name must not be empty".to_string()));
        }
        if self.font.body_size <= 0.0 || self.signoff.qualifications_size <= 0.0 {
            return Err(Error::Config("font sizes must be positive".to_string()));
        }
        if self.font.line_spacing <= 0.0 {
            return Err(Error::Config(
                "font.line_spacing must be positive".to_string(),
            ));
        }

        let styles = [
            ("title", &self.styles.title),
            ("heading1", &self.styles.heading1),
            ("heading2", &self.styles.heading2),
            ("heading3", &self.styles.heading3),
            ("paragraph", &self.styles.paragraph),
            ("list", &self.styles.list),
        ];
        for (name, style) in styles {
            if style.size <= 0.0 {
                return Err(Error::Config(format!("styles.{name}.size must be positive")));
            }
            if style.space_before < 0.0 || style.space_after < 0.0 {
                return Err(Error::Config(format!(
                    "styles.{name} spacing must not be negative"
                )));
            }
        }

        if self.lists.indent_width == 0 {
            return Err(Error::Config(
                "lists.indent_width must be at least 1".to_string(),
            ));
        }
        if self.lists.indent < 0.0 {
            return Err(Error::Config("lists.indent must not be negative".to_string()));
        }
        if self.lists.bullets.is_empty() || self.lists.bullets.iter().any(|b| b.is_empty()) {
            return Err(Error::Config(
                "lists.bullets needs at least one non-empty glyph".to_string(),
            ));
        }
        if self.lists.numbering.is_empty() {
            return Err(Error::Config(
                "lists.numbering needs at least one style".to_string(),
            ));
        }

        if StrftimeItems::new(&self.letter.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::Config(format!(
                "letter.date_format {:?} is not a valid date pattern",
                self.letter.date_format
            )));
        }

        Ok(())
    }
}
