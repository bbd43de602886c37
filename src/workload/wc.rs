//! Word count over free text.
//!
//! Words are lower-cased and split on anything that is not a letter, a digit
//! or `_`. Prints `<word> :\t\t\t\t <count>`, rarest words first.

use std::io::Write;

use anyhow::Result;
use bytes::Bytes;

use crate::Context;

pub fn normalize_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// `(word, count)` ascending by count, ties broken by word.
pub fn word_counts(ctx: &Context, input: &str) -> Result<Vec<(String, u64)>> {
    ctx.text_file(input)?
        .flat_map(|line| normalize_words(&line))
        .map(|word| (word, 1u64))
        .reduce_by_key(|x, y| x + y)
        .sort_by(|(word, count)| (*count, word.clone()))
        .collect()
}

pub fn run(ctx: &Context, input: &str, _aux: Bytes, out: &mut dyn Write) -> Result<()> {
    for (word, count) in word_counts(ctx, input)? {
        writeln!(out, "{} :\t\t\t\t {}", word, count)?;
    }
    Ok(())
}
