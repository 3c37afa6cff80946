use std::io::{self, Write};

use crate::algorithm::engine::SearchResults;
use crate::common::{Hit, Hsp};

/// Column names of one tabular line.
pub const COLUMNS: [&str; 13] = [
    "qseqid", "sseqid", "pident", "length", "mismatch", "gapopen", "qstart", "qend", "sstart",
    "send", "evalue", "bitscore", "orientation",
];

/// Tabular output configuration
#[derive(Debug, Clone)]
pub struct TabularConfig {
    /// Emit `#` comment lines (query, databank, fields, hit count) per query
    pub with_comments: bool,
    pub delimiter: char,
    pub identity_decimals: usize,
}

impl Default for TabularConfig {
    fn default() -> Self {
        Self {
            with_comments: false,
            delimiter: '\t',
            identity_decimals: 3,
        }
    }
}

/// Scientific notation with a signed, at least two-digit exponent
/// (`1.23e-05`, `1e+100`).
fn format_scientific(value: f64, precision: usize) -> String {
    let raw = format!("{:.*e}", precision, value);
    let Some(exp_pos) = raw.find('e') else {
        return raw;
    };
    let (mantissa, exponent) = raw.split_at(exp_pos);
    let exponent = &exponent[1..];
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{}e{}{:0>2}", mantissa, sign, digits)
}

/// E-value column: `0.0` below 1e-180, two-decimal scientific below
/// 0.0009, then fixed precision shrinking as the value grows.
pub fn format_evalue(evalue: f64) -> String {
    if evalue < 1.0e-180 {
        "0.0".to_string()
    } else if evalue < 0.0009 {
        format_scientific(evalue, 2)
    } else if evalue < 0.1 {
        format!("{:.3}", evalue)
    } else if evalue < 1.0 {
        format!("{:.2}", evalue)
    } else if evalue < 10.0 {
        format!("{:.1}", evalue)
    } else {
        format!("{:.0}", evalue)
    }
}

pub fn format_bit_score(bits: f64) -> String {
    if bits > 99999.0 {
        format_scientific(bits, 3)
    } else if bits > 99.9 {
        format!("{:.0}", bits)
    } else {
        format!("{:.1}", bits)
    }
}

/// Format one HSP as a tabular line (no trailing newline)
pub fn format_hsp(query_name: &str, hit: &Hit, hsp: &Hsp, config: &TabularConfig) -> String {
    let d = config.delimiter;
    format!(
        "{}{d}{}{d}{:.prec$}{d}{}{d}{}{d}{}{d}{}{d}{}{d}{}{d}{}{d}{}{d}{}{d}{}",
        query_name,
        hit.target_name,
        hsp.identity,
        hsp.alignment_len,
        hsp.mismatches,
        hsp.gap_opens,
        hsp.query_from,
        hsp.query_to,
        hsp.target_from,
        hsp.target_to,
        format_evalue(hsp.evalue),
        format_bit_score(hsp.normalized_score),
        hsp.orientation,
        d = d,
        prec = config.identity_decimals,
    )
}

pub struct TabularWriter<W: Write> {
    writer: W,
    config: TabularConfig,
}

impl<W: Write> TabularWriter<W> {
    pub fn new(writer: W, config: TabularConfig) -> Self {
        Self { writer, config }
    }

    /// Write every HSP of every hit, in result order.
    pub fn write_results(&mut self, results: &SearchResults, databank: &str) -> io::Result<()> {
        if self.config.with_comments {
            writeln!(self.writer, "# kblast {}", env!("CARGO_PKG_VERSION"))?;
            writeln!(self.writer, "# Query: {}", results.query_name)?;
            writeln!(self.writer, "# Database: {}", databank)?;
            writeln!(self.writer, "# Fields: {}", COLUMNS.join(", "))?;
            let total: usize = results.hits.iter().map(|h| h.hsps.len()).sum();
            writeln!(self.writer, "# {} hits found", total)?;
        }
        for hit in &results.hits {
            for hsp in &hit.hsps {
                writeln!(
                    self.writer,
                    "{}",
                    format_hsp(&results.query_name, hit, hsp, &self.config)
                )?;
            }
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
