/// Inline text spans with formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Text(String),
    Bold(String),
}

impl Span {
    pub fn text(&self) -> &str {
        match self {
            Span::Text(text) | Span::Bold(text) => text,
        }
    }

    pub fn is_bold(&self) -> bool {
        matches!(self, Span::Bold(_))
    }
}

/// Block-level elements parsed from Markdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        level: u8,
        text: String,
    },
    Paragraph {
        content: Vec<Span>,
    },
    BulletItem {
        depth: usize,
        content: Vec<Span>,
    },
    NumberedItem {
        depth: usize,
        content: Vec<Span>,
    },
    PageBreak,
}

impl Block {
    /// List depth, or `None` for blocks that are not list items.
    pub fn list_depth(&self) -> Option<usize> {
        match self {
            Block::BulletItem { depth, .. } | Block::NumberedItem { depth, .. } => Some(*depth),
            _ => None,
        }
    }
}

/// A parsed source document.
///
/// The first `#` heading is lifted out into `title` and does not appear in `blocks`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Source {
    pub title: Option<String>,
    pub blocks: Vec<Block>,
}
