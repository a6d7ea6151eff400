//! Positional TSV parsing of the feed.

use super::RawRecord;

const COLUMN_COUNT: usize = 6;

/// Parse the raw feed text into records, preserving file order.
///
/// Lines with too few columns are padded with empty fields and logged;
/// whether such a row survives is decided by the populate pipeline's
/// row filtering, not here. A description containing tabs is kept whole
/// because splitting stops after the sixth field.
pub fn parse_records(text: &str) -> Vec<RawRecord> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(row_index, line)| parse_line(row_index, line))
        .collect()
}

fn parse_line(row_index: usize, line: &str) -> RawRecord {
    let mut fields: Vec<&str> = line.splitn(COLUMN_COUNT, '\t').collect();
    if fields.len() < COLUMN_COUNT {
        log::warn!(
            "malformed row {}: expected {} tab-separated columns, got {}",
            row_index,
            COLUMN_COUNT,
            fields.len()
        );
        fields.resize(COLUMN_COUNT, "");
    }

    RawRecord {
        row_index,
        mirna_name: fields[0].to_string(),
        disease_name: fields[1].to_string(),
        direction: fields[2].to_string(),
        detection_method: fields[3].to_string(),
        year: fields[4].to_string(),
        description: fields[5].to_string(),
    }
}
