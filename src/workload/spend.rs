//! Total amount spent per customer.
//!
//! Input is CSV, `customer,item,amount`. Prints `<customer> $<total>`
//! ascending by customer id.

use std::io::Write;

use anyhow::Result;
use bytes::Bytes;

use crate::record::Record;
use crate::Context;

pub fn totals_by_customer(ctx: &Context, input: &str) -> Result<Vec<(u32, f64)>> {
    ctx.text_file(input)?
        .try_map(|line| {
            let record = Record::csv(&line);
            Ok((record.parse_field::<u32>(0)?, record.parse_field::<f64>(2)?))
        })
        .reduce_by_key(|x, y| x + y)
        .sort_by_key(true)
        .collect()
}

pub fn run(ctx: &Context, input: &str, _aux: Bytes, out: &mut dyn Write) -> Result<()> {
    for (customer, total) in totals_by_customer(ctx, input)? {
        writeln!(out, "{} ${:.2}", customer, total)?;
    }
    Ok(())
}
