//! Average number of friends by age.
//!
//! Input is CSV, `id,name,age,friends`. Prints `<age>, <average>` ascending
//! by age, the average rounded down.

use std::io::Write;

use anyhow::Result;
use bytes::Bytes;

use crate::record::Record;
use crate::Context;

const AGE_FIELD: usize = 2;
const FRIENDS_FIELD: usize = 3;

pub fn averages_by_age(ctx: &Context, input: &str) -> Result<Vec<(u32, u64)>> {
    ctx.text_file(input)?
        .try_map(|line| {
            let record = Record::csv(&line);
            Ok((
                record.parse_field::<u32>(AGE_FIELD)?,
                record.parse_field::<u64>(FRIENDS_FIELD)?,
            ))
        })
        .map_values(|friends| (friends, 1u64))
        .reduce_by_key(|(f1, n1), (f2, n2)| (f1 + f2, n1 + n2))
        .map_values(|(total, n)| total / n)
        .sort_by_key(true)
        .collect()
}

pub fn run(ctx: &Context, input: &str, _aux: Bytes, out: &mut dyn Write) -> Result<()> {
    for (age, average) in averages_by_age(ctx, input)? {
        writeln!(out, "{}, {}", age, average)?;
    }
    Ok(())
}
