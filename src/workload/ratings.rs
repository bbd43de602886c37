//! Rating histogram over a whitespace-separated ratings dataset.
//!
//! Each line is `user movie rating [timestamp]`. Two tables come out of it:
//! how many ratings each movie received, and how often each rating value
//! occurs.
//!
//! The per-movie counts are printed as `<count> <movie>` in shuffle order,
//! unless `--sort-movies` is given, in which case they are sorted ascending
//! by count. The rating counts are always printed as `<rating> <count>`,
//! ascending by rating.

use std::io::Write;

use anyhow::Result;
use bytes::Bytes;
use clap::Parser;
use tracing::info;

use crate::dataset::FrequencyTable;
use crate::record::Record;
use crate::utils::decode_args;
use crate::Context;

const MOVIE_FIELD: usize = 1;
const RATING_FIELD: usize = 2;

#[derive(Parser, Debug)]
#[clap(no_binary_name = true)]
struct Args {
    /// Sort the per-movie counts by count instead of leaving shuffle order
    #[clap(long)]
    sort_movies: bool,
}

/// `(count, movie)` for every movie referenced by the dataset.
///
/// Unless `sorted`, the order is whatever the shuffle produced.
pub fn movie_counts(ctx: &Context, input: &str, sorted: bool) -> Result<Vec<(u64, u32)>> {
    let flipped = ctx
        .text_file(input)?
        .try_map(|line| {
            let movie = Record::whitespace(&line).parse_field::<u32>(MOVIE_FIELD)?;
            Ok((movie, 1u64))
        })
        .reduce_by_key(|x, y| x + y)
        .flip();

    if sorted {
        flipped.sort_by_key(true).collect()
    } else {
        flipped.collect()
    }
}

/// Occurrences of each rating value. Ratings are kept as they appear in the file.
pub fn rating_counts(ctx: &Context, input: &str) -> Result<FrequencyTable<String>> {
    ctx.text_file(input)?
        .try_map(|line| Ok(Record::whitespace(&line).field(RATING_FIELD)?.to_string()))
        .count_by_value()
}

pub fn run(ctx: &Context, input: &str, aux: Bytes, out: &mut dyn Write) -> Result<()> {
    let args = Args::try_parse_from(decode_args(&aux)?)?;

    let movies = movie_counts(ctx, input, args.sort_movies)?;
    for (count, movie) in &movies {
        writeln!(out, "{} {}", count, movie)?;
    }
    info!(movies = movies.len(), sorted = args.sort_movies, "movie counts done");

    let ratings = rating_counts(ctx, input)?;
    info!(ratings = ratings.len(), total = ratings.total(), "rating counts done");
    for (rating, count) in ratings.into_sorted() {
        writeln!(out, "{} {}", rating, count)?;
    }
    Ok(())
}
