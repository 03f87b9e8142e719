//! # Result Set Persistence
//!
//! Line-oriented save/load of the scan result set.
//!
//! The file format is UTF-8 text: `#` header lines followed by one candidate
//! per line, `ID,Address,Type,ValueHex,Rendered`. The type column is the
//! [`ValueType::ordinal`] value, the address is `0x` hex, and the value is a
//! lowercase hex dump of the candidate's bytes with no separators (exactly
//! two characters per byte).
//!
//! On load, the `Rendered` column is ignored and the display string is
//! rebuilt from the bytes through the codec, so a stale or hand-edited
//! rendering can never disagree with the pattern it describes.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{MacmemError, Result};
use crate::types::{Address, ProcessId, ScanCandidate};
use crate::value::ValueType;

/// Write the result set to `path`, replacing any existing file.
///
/// Returns the number of candidates written.
pub fn save_results(path: &Path, process: &str, pid: ProcessId, candidates: &[ScanCandidate]) -> Result<usize>
{
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);

    writeln!(out, "# macmem scan results")?;
    writeln!(out, "# Process: {process} (PID: {pid})")?;
    writeln!(out, "# Results: {}", candidates.len())?;
    writeln!(out, "# Format: ID,Address,Type,ValueHex,Rendered")?;

    for (id, candidate) in candidates.iter().enumerate() {
        writeln!(
            out,
            "{id},0x{:x},{},{},{}",
            candidate.address.value(),
            candidate.ty.ordinal(),
            encode_hex(&candidate.bytes),
            candidate.rendered
        )?;
    }

    out.flush()?;
    Ok(candidates.len())
}

/// Read a result set previously written by [`save_results`].
///
/// Header lines and blank lines are skipped. Every other line must match the
/// save format; the first malformed line aborts the load with
/// [`MacmemError::MalformedResults`].
pub fn load_results(path: &Path) -> Result<Vec<ScanCandidate>>
{
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut candidates = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        candidates.push(parse_line(trimmed).map_err(|reason| {
            MacmemError::MalformedResults(format!("line {}: {reason}", number + 1))
        })?);
    }

    Ok(candidates)
}

fn parse_line(line: &str) -> std::result::Result<ScanCandidate, String>
{
    // Rendered is the remainder, so strings containing commas survive.
    let mut fields = line.splitn(5, ',');
    let id = fields.next().ok_or("missing ID field")?;
    let address = fields.next().ok_or("missing address field")?;
    let ordinal = fields.next().ok_or("missing type field")?;
    let value_hex = fields.next().ok_or("missing value field")?;
    let _rendered = fields.next().ok_or("missing rendered field")?;

    id.parse::<usize>().map_err(|_| format!("bad ID '{id}'"))?;

    let address = Address::parse(address).map_err(|_| format!("bad address '{address}'"))?;

    let ty = ordinal
        .parse::<u8>()
        .ok()
        .and_then(ValueType::from_ordinal)
        .ok_or_else(|| format!("bad type ordinal '{ordinal}'"))?;

    let bytes = decode_hex(value_hex).ok_or_else(|| format!("bad value hex '{value_hex}'"))?;
    if bytes.is_empty() {
        return Err("empty value".to_string());
    }
    if let Some(width) = ty.width() {
        if bytes.len() != width {
            return Err(format!("{ty} value must be {width} bytes, got {}", bytes.len()));
        }
    }

    Ok(ScanCandidate::observed(address, ty, bytes))
}

fn encode_hex(bytes: &[u8]) -> String
{
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn decode_hex(text: &str) -> Option<Vec<u8>>
{
    if text.len() % 2 != 0 {
        return None;
    }
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&text[i..i + 2], 16).ok())
        .collect()
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_hex_round_trip()
    {
        let bytes = vec![0x00, 0xde, 0xad, 0xff];
        assert_eq!(encode_hex(&bytes), "00deadff");
        assert_eq!(decode_hex("00deadff"), Some(bytes));
    }

    #[test]
    fn test_decode_hex_rejects_garbage()
    {
        assert_eq!(decode_hex("abc"), None); // odd length
        assert_eq!(decode_hex("zz"), None);
    }

    #[test]
    fn test_parse_line_preserves_commas_in_rendered()
    {
        let candidate = parse_line("0,0x1000,6,68692c7468657265,hi,there").unwrap();
        assert_eq!(candidate.ty, ValueType::String);
        assert_eq!(candidate.rendered, "hi,there");
    }

    #[test]
    fn test_parse_line_rejects_wrong_width()
    {
        // Int must be exactly 4 bytes.
        assert!(parse_line("0,0x1000,2,ffff,-1").is_err());
    }
}
