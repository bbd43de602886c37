//! Splitting dataset lines into fields.
//!
//! A line that is too short or whose field does not parse is an error, never
//! skipped; the first bad line fails the whole job.

use std::fmt::Display;
use std::str::FromStr;

use crate::error::PipelineError;

/// How the fields of a line are separated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// Runs of whitespace, leading and trailing whitespace ignored.
    Whitespace,
    /// Single commas. Empty fields are kept.
    Comma,
}

/// One line of a dataset, split into fields.
#[derive(Debug, Clone)]
pub struct Record<'a> {
    line: &'a str,
    fields: Vec<&'a str>,
}

impl<'a> Record<'a> {
    pub fn parse(line: &'a str, delimiter: Delimiter) -> Self {
        let fields = match delimiter {
            Delimiter::Whitespace => line.split_whitespace().collect(),
            Delimiter::Comma => line.split(',').collect(),
        };
        Self { line, fields }
    }

    #[inline]
    pub fn whitespace(line: &'a str) -> Self {
        Self::parse(line, Delimiter::Whitespace)
    }

    #[inline]
    pub fn csv(line: &'a str) -> Self {
        Self::parse(line, Delimiter::Comma)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The raw field at `index`.
    pub fn field(&self, index: usize) -> Result<&'a str, PipelineError> {
        self.fields
            .get(index)
            .copied()
            .ok_or_else(|| PipelineError::MissingField {
                index,
                found: self.fields.len(),
                line: self.line.to_string(),
            })
    }

    /// The field at `index` parsed as `T`. Surrounding whitespace is trimmed.
    pub fn parse_field<T>(&self, index: usize) -> Result<T, PipelineError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = self.field(index)?;
        raw.trim()
            .parse::<T>()
            .map_err(|e| PipelineError::ParseField {
                index,
                value: raw.to_string(),
                line: self.line.to_string(),
                reason: e.to_string(),
            })
    }
}
