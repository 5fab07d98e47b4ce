use std::fmt::Write;

use chrono::Local;

use crate::config::Config;
use crate::error::{Error, Result};

/// Who the letter is addressed to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recipient {
    pub name: String,
    pub title: String,
    pub organisation: String,
    /// Street address, one entry per line
    pub address: Vec<String>,
    /// City and postcode
    pub city: String,
    pub country: String,
}

impl Recipient {
    /// Every field is required; whitespace-only counts as empty.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("recipient name", &self.name),
            ("recipient title", &self.title),
            ("recipient organisation", &self.organisation),
            ("recipient city", &self.city),
            ("recipient country", &self.country),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(Error::EmptyField(field));
            }
        }
        if self.address.is_empty() || self.address.iter().any(|line| line.trim().is_empty()) {
            return Err(Error::EmptyField("recipient address"));
        }
        Ok(())
    }

    /// Lines of the address block below the name, in print order.
    pub fn address_block(&self) -> Vec<&str> {
        let mut lines = vec![self.title.as_str(), self.organisation.as_str()];
        lines.extend(self.address.iter().map(String::as_str));
        lines.push(&self.city);
        lines.push(&self.country);
        lines
    }
}

/// Everything about one letter that does not come from the markdown body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Letter {
    pub recipient: Recipient,
    /// Overrides the source's `#` title when set
    pub title: Option<String>,
    /// Printed verbatim; today's date is used when absent
    pub date: Option<String>,
}

impl Letter {
    pub fn validate(&self) -> Result<()> {
        self.recipient.validate()?;
        if matches!(&self.title, Some(title) if title.trim().is_empty()) {
            return Err(Error::EmptyField("document title"));
        }
        if matches!(&self.date, Some(date) if date.trim().is_empty()) {
            return Err(Error::EmptyField("date"));
        }
        Ok(())
    }

    /// The title to print: explicit, else the source heading, else none.
    pub fn resolve_title<'a>(&'a self, source_title: Option<&'a str>) -> Option<&'a str> {
        self.title.as_deref().or(source_title)
    }

    pub fn resolve_date(&self, config: &Config) -> Result<String> {
        match &self.date {
            Some(date) => Ok(date.clone()),
            None => today(&config.letter.date_format),
        }
    }
}

/// Today's local date in the given strftime pattern.
pub fn today(pattern: &str) -> Result<String> {
    let mut out = String::new();
    write!(out, "{}", Local::now().date_naive().format(pattern))
        .map_err(|_| Error::Config(format!("invalid date format {:?}", pattern)))?;
    Ok(out)
}
