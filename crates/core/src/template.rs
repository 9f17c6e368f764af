use crate::date::format_date;
use crate::store::FileStore;
use anyhow::Result;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Today,
    ModifiedAt,
}

impl Placeholder {
    pub fn token(self) -> &'static str {
        match self {
            Placeholder::Today => "{today}",
            Placeholder::ModifiedAt => "{modifiedAt}",
        }
    }
}

/// How many occurrences of a placeholder get substituted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderMode {
    /// Only the first occurrence; later ones stay literal.
    #[default]
    First,
    All,
}

/// A user supplied name template.
///
/// `{today}` is fixed once for the whole batch through [`NameTemplate::with_today`],
/// while `{modifiedAt}` is resolved per file by [`NameTemplate::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTemplate {
    raw: String,
    mode: PlaceholderMode,
}

impl NameTemplate {
    pub fn new(raw: impl Into<String>, mode: PlaceholderMode) -> Self {
        Self {
            raw: raw.into(),
            mode,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn mode(&self) -> PlaceholderMode {
        self.mode
    }

    pub fn contains(&self, placeholder: Placeholder) -> bool {
        self.raw.contains(placeholder.token())
    }

    pub fn with_today(&self, now: &DateTime<Local>) -> Self {
        Self {
            raw: substitute(&self.raw, Placeholder::Today, &format_date(now), self.mode),
            mode: self.mode,
        }
    }

    /// Resolved name for the file at `path`. The file is only stat'ed when the
    /// template actually contains `{modifiedAt}`.
    pub fn resolve<S: FileStore + ?Sized>(&self, path: &Path, store: &S) -> Result<String> {
        if !self.contains(Placeholder::ModifiedAt) {
            return Ok(self.raw.clone());
        }
        let modified = store.modified_at(path)?;
        Ok(substitute(
            &self.raw,
            Placeholder::ModifiedAt,
            &format_date(&modified),
            self.mode,
        ))
    }
}

fn substitute(input: &str, placeholder: Placeholder, value: &str, mode: PlaceholderMode) -> String {
    match mode {
        PlaceholderMode::First => input.replacen(placeholder.token(), value, 1),
        PlaceholderMode::All => input.replace(placeholder.token(), value),
    }
}
