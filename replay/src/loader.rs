use std::{io::Read, str};

use chrono::NaiveDateTime;
use csv::ByteRecord;
use log::{debug, info, warn};
use structures::{Event, Palette};

use crate::{
    constants::{COLOR_COLUMN, TIMESTAMP_COLUMN, TIMESTAMP_FORMAT, X_COLUMN, Y_COLUMN},
    errors::LoadError,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Fail on rows with unparseable coordinates or color instead of dropping them.
    pub strict: bool,
}

/// Reads a placement dataset (header row first) into events, in file order.
///
/// Rows whose x, y or color index do not parse are dropped unless `options.strict` is set.
/// An unparseable timestamp always aborts loading. Columns other than timestamp, x, y and
/// color are never decoded, so they may hold arbitrary bytes.
pub fn load_events<R: Read>(
    reader: R,
    palette: &Palette,
    options: LoadOptions,
) -> Result<Vec<Event>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    info!("Collecting data...");

    let mut events = Vec::new();
    let mut num_dropped: u64 = 0;

    for (i, result) in csv_reader.byte_records().enumerate() {
        let record = result?;
        // Header is line 1; quoted newlines make the enumerate index drift from the file line
        let line = record
            .position()
            .map(|position| position.line())
            .unwrap_or(i as u64 + 2);

        match parse_record(&record, line, palette, options)? {
            Some(event) => events.push(event),
            None => num_dropped += 1,
        }
    }

    if num_dropped > 0 {
        warn!(
            "Dropped {} rows with malformed coordinates or color",
            num_dropped
        );
    }

    Ok(events)
}

fn parse_record(
    record: &ByteRecord,
    line: u64,
    palette: &Palette,
    options: LoadOptions,
) -> Result<Option<Event>, LoadError> {
    let (x, y, color) = match parse_numeric_fields(record, line) {
        Ok(fields) => fields,
        Err(err) if !options.strict => {
            debug!("Skipping {}", err);
            return Ok(None);
        }
        Err(err) => return Err(err),
    };

    let timestamp_bytes = record.get(TIMESTAMP_COLUMN).unwrap_or_default();
    let placed_at = str::from_utf8(timestamp_bytes)
        .ok()
        .and_then(parse_timestamp)
        .ok_or_else(|| LoadError::MalformedTimestamp {
            line,
            value: String::from_utf8_lossy(timestamp_bytes).into_owned(),
        })?;

    let color_index = match u8::try_from(color) {
        Ok(index) if (index as usize) < palette.len() => index,
        _ => {
            return Err(LoadError::InvalidColorIndex {
                line,
                color_index: color,
                palette_len: palette.len(),
            })
        }
    };

    Ok(Some(Event::new(x, y, color_index, placed_at)))
}

fn parse_numeric_fields(record: &ByteRecord, line: u64) -> Result<(u32, u32, u32), LoadError> {
    Ok((
        parse_numeric_field(record, line, X_COLUMN, "x")?,
        parse_numeric_field(record, line, Y_COLUMN, "y")?,
        parse_numeric_field(record, line, COLOR_COLUMN, "color index")?,
    ))
}

fn parse_numeric_field(
    record: &ByteRecord,
    line: u64,
    column: usize,
    field: &'static str,
) -> Result<u32, LoadError> {
    let bytes = record.get(column).unwrap_or_default();

    str::from_utf8(bytes)
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .ok_or_else(|| LoadError::MalformedRecord {
            line,
            field,
            value: String::from_utf8_lossy(bytes).into_owned(),
        })
}

/// Parses `2017-03-31 00:00:00.123 UTC`. The fraction is optional and any zone abbreviation
/// is read as UTC.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let (date_time, zone) = value.rsplit_once(' ')?;

    if !(3..=5).contains(&zone.len()) || !zone.chars().all(|c| c.is_ascii_uppercase()) {
        return None;
    }

    NaiveDateTime::parse_from_str(date_time, TIMESTAMP_FORMAT).ok()
}
