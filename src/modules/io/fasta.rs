//! FASTA format I/O
//!
//! This module reads and writes FASTA text held in memory. Reading from and
//! writing to files is left to the caller.

use serde::{Deserialize, Serialize};

use crate::engines::compute::string_ops;
use crate::modules::seq::Sequence;

/// Residues per line when writing
pub const LINE_WIDTH: usize = 60;

/// A FASTA record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FastaRecord {
    /// Header line without the leading '>'
    pub header: String,
    /// Sequence lines joined together, whitespace trimmed, not normalized
    pub sequence: String,
}

impl FastaRecord {
    /// Create a new FASTA record
    pub fn new(header: &str, sequence: &str) -> Self {
        Self {
            header: header.to_string(),
            sequence: sequence.to_string(),
        }
    }

    /// First word of the header
    pub fn id(&self) -> &str {
        self.header.split_whitespace().next().unwrap_or("")
    }

    /// Normalized sequence carrying the record id
    pub fn to_sequence(&self) -> Sequence {
        Sequence::normalize(&self.sequence).with_id(self.id())
    }

    /// Format as FASTA text with 60-column lines
    pub fn to_fasta_string(&self) -> String {
        let mut output = String::with_capacity(self.sequence.len() + self.header.len() + 8);

        output.push('>');
        output.push_str(&self.header);
        output.push('\n');

        for chunk in self.sequence.as_bytes().chunks(LINE_WIDTH) {
            output.push_str(&String::from_utf8_lossy(chunk));
            output.push('\n');
        }

        output
    }
}

/// Parse FASTA text
///
/// Text before the first header belongs to no record and is dropped. A
/// record still open at end of input is emitted.
pub fn parse_fasta(content: &str) -> Vec<FastaRecord> {
    let mut records = Vec::new();
    let mut current: Option<FastaRecord> = None;

    for line in content.lines() {
        let line = line.trim();
        if let Some(header) = line.strip_prefix('>') {
            if let Some(record) = current.take() {
                records.push(record);
            }
            current = Some(FastaRecord::new(header.trim(), ""));
        } else if let Some(record) = current.as_mut() {
            record.sequence.push_str(line);
        }
    }

    if let Some(record) = current {
        records.push(record);
    }

    log::debug!("Parsed {} FASTA records", records.len());
    records
}

/// Write records as one FASTA string
pub fn write_fasta_string(records: &[FastaRecord]) -> String {
    records.iter().map(FastaRecord::to_fasta_string).collect()
}

/// Concatenate every record into one normalized sequence
///
/// Input without any header line is treated as plain sequence text.
pub fn clean_fasta(content: &str) -> Sequence {
    let records = parse_fasta(content);
    if records.is_empty() {
        return Sequence::normalize(content);
    }

    let joined: Vec<u8> = records
        .iter()
        .flat_map(|record| string_ops::normalize(record.sequence.as_bytes()))
        .collect();

    // `normalize` only emits IUPAC bytes, so the value is valid by construction
    Sequence::new(&joined).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fasta() {
        let content = "junk before header\n>seq1 First sequence\nACGT \n  acgt\n>seq2\nGGCC\n";
        let records = parse_fasta(content);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].header, "seq1 First sequence");
        assert_eq!(records[0].id(), "seq1");
        assert_eq!(records[0].sequence, "ACGTacgt");
        assert_eq!(records[1].header, "seq2");
        assert_eq!(records[1].sequence, "GGCC");
    }

    #[test]
    fn test_unterminated_record_is_emitted() {
        let records = parse_fasta(">only\nACGT");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sequence, "ACGT");

        let records = parse_fasta(">empty");
        assert_eq!(records.len(), 1);
        assert!(records[0].sequence.is_empty());
    }

    #[test]
    fn test_headerless_text_has_no_records() {
        assert!(parse_fasta("ACGTACGT\nACGT").is_empty());
        assert!(parse_fasta("").is_empty());
    }

    #[test]
    fn test_write_fasta_wraps_lines() {
        let record = FastaRecord::new("long", &"A".repeat(130));
        let text = record.to_fasta_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], ">long");
        assert_eq!(lines[1].len(), LINE_WIDTH);
        assert_eq!(lines[2].len(), LINE_WIDTH);
        assert_eq!(lines[3].len(), 10);
        assert_eq!(lines.len(), 4);

        let both = write_fasta_string(&[FastaRecord::new("a", "AC"), FastaRecord::new("b", "GT")]);
        assert_eq!(both, ">a\nAC\n>b\nGT\n");
        assert_eq!(parse_fasta(&both).len(), 2);
    }

    #[test]
    fn test_clean_fasta() {
        let cleaned = clean_fasta(">part1\nacg-t\n>part2\nGG CC\n");
        assert_eq!(cleaned.as_bytes(), b"ACGTGGCC");

        let plain = clean_fasta("aattcc\ngg");
        assert_eq!(plain.as_bytes(), b"AATTCCGG");
    }

    #[test]
    fn test_record_to_sequence() {
        let record = FastaRecord::new("vec pUC19 backbone", "gaattc");
        let seq = record.to_sequence();
        assert_eq!(seq.id(), Some("vec"));
        assert_eq!(seq.as_bytes(), b"GAATTC");
    }
}
