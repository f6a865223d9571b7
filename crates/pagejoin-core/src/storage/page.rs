//! Page layout arithmetic.
//!
//! Records are fixed width. A page stores one presence bit per slot followed
//! by the slots themselves, so a slot costs `record_size * 8 + 1` bits.

use crate::catalog::Schema;
use crate::error::Error;

/// Number of records of `schema` that fit in one page.
///
/// Fails when not even one record fits, or when the record or page size in
/// bits does not fit in a `usize`.
pub fn records_per_page(page_size: usize, schema: &Schema) -> Result<usize, Error> {
    let record_size = schema.size_in_bytes().ok_or_else(|| {
        Error::InvalidConfiguration(format!("record size of {} overflows", schema))
    })?;
    let record_bits = record_size
        .checked_mul(8)
        .and_then(|bits| bits.checked_add(1))
        .ok_or_else(|| {
            Error::InvalidConfiguration(format!(
                "a {}-byte record of {} is too large",
                record_size, schema
            ))
        })?;
    let page_bits = page_size.checked_mul(8).ok_or_else(|| {
        Error::InvalidConfiguration(format!("page size of {} bytes is too large", page_size))
    })?;

    let count = page_bits / record_bits;
    if count == 0 {
        return Err(Error::InvalidConfiguration(format!(
            "a {}-byte record of {} does not fit in a {}-byte page",
            record_size, schema, page_size
        )));
    }
    Ok(count)
}

/// Pages needed to hold `num_records` records.
pub fn pages_for(num_records: u64, records_per_page: usize) -> u64 {
    if records_per_page == 0 {
        return 0;
    }
    num_records.div_ceil(records_per_page as u64)
}
