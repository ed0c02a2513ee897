use crate::domain::Record;

/// Boundary token written before the first record, between every pair of
/// records, and after the last. Chosen to be unlikely to occur inside a
/// telemetry payload; a record containing it would be split on decode.
pub const MARKER: &str = "PULSE_SPOOL_RECORD_BOUNDARY";

/// Encode queued records as a marker-delimited snapshot.
///
/// An empty queue yields a zero-length result rather than a lone marker pair,
/// matching "no records means no spool file need be written".
pub fn encode(records: &[Record]) -> Vec<u8> {
    if records.is_empty() {
        return Vec::new();
    }

    let payload_len: usize = records.iter().map(Record::len).sum();
    let mut out = Vec::with_capacity(payload_len + (records.len() + 1) * MARKER.len());

    out.extend_from_slice(MARKER.as_bytes());
    for record in records {
        out.extend_from_slice(record.as_bytes());
        out.extend_from_slice(MARKER.as_bytes());
    }
    out
}

/// Decode a snapshot back into its ordered record sequence.
///
/// Each maximal span strictly between two consecutive marker occurrences is
/// one record. Bytes before the first marker or after the last are not part
/// of any record and are discarded, which gives tolerance against partial
/// external corruption at either end of the file. Fewer than two markers
/// decodes to nothing.
///
/// Never errors on malformed input: a best-effort durability mechanism
/// degrades to "fewer records recovered".
pub fn decode(bytes: &[u8]) -> Vec<Record> {
    let text = String::from_utf8_lossy(bytes);
    let text: &str = &text;
    let marker_len = MARKER.len();

    let mut records = Vec::new();
    let Some(mut start) = text.find(MARKER) else {
        return records;
    };
    start += marker_len;

    while let Some(offset) = text[start..].find(MARKER) {
        records.push(Record::from(&text[start..start + offset]));
        start += offset + marker_len;
    }
    records
}
