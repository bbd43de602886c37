//! Extreme temperature per weather station.
//!
//! Input is CSV, `station,date,entry_type,value` where `value` is in tenths
//! of a degree Celsius. Readings of one entry type (`TMAX` unless
//! `--entry-type` says otherwise) are converted to Fahrenheit and reduced per
//! station, keeping the highest, or the lowest with `--min`.

use std::io::Write;

use anyhow::Result;
use bytes::Bytes;
use clap::Parser;

use crate::record::Record;
use crate::utils::decode_args;
use crate::Context;

#[derive(Parser, Debug)]
#[clap(no_binary_name = true)]
struct Args {
    /// Only readings of this type are considered
    #[clap(short, long, default_value = "TMAX")]
    entry_type: String,

    /// Keep the lowest reading instead of the highest
    #[clap(long)]
    min: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Max,
    Min,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub station: String,
    pub entry_type: String,
    pub fahrenheit: f64,
}

pub fn parse_reading(line: &str) -> Result<Reading> {
    let record = Record::csv(line);
    let tenths_celsius = record.parse_field::<f64>(3)?;
    Ok(Reading {
        station: record.field(0)?.to_string(),
        entry_type: record.field(2)?.to_string(),
        fahrenheit: tenths_celsius * 0.1 * (9.0 / 5.0) + 32.0,
    })
}

/// `(station, temperature)` ascending by station.
pub fn extremes_by_station(
    ctx: &Context,
    input: &str,
    entry_type: &str,
    extreme: Extreme,
) -> Result<Vec<(String, f64)>> {
    let entry_type = entry_type.to_string();
    ctx.text_file(input)?
        .try_map(|line| parse_reading(&line))
        .filter(move |reading| reading.entry_type == entry_type)
        .map(|reading| (reading.station, reading.fahrenheit))
        .reduce_by_key(move |a: f64, b: f64| match extreme {
            Extreme::Max => a.max(b),
            Extreme::Min => a.min(b),
        })
        .sort_by_key(true)
        .collect()
}

pub fn run(ctx: &Context, input: &str, aux: Bytes, out: &mut dyn Write) -> Result<()> {
    let args = Args::try_parse_from(decode_args(&aux)?)?;
    let extreme = if args.min { Extreme::Min } else { Extreme::Max };

    for (station, temperature) in extremes_by_station(ctx, input, &args.entry_type, extreme)? {
        writeln!(out, "{}\t{:.2}F", station, temperature)?;
    }
    Ok(())
}
