//! Conversion of decoded entries to text files.
//!
//! Three layouts are supported, matching the formats PDIC itself imports:
//! - CSV with a `word,trans,exp,level,memory,modify,pron` header
//! - plain text, two lines per entry
//! - one-line text, `word /// trans / exp`
//!
//! Lines always end in CRLF. The output is UTF-16LE with a BOM by default (what
//! PDIC expects), UTF-8 without a BOM, or any other encoding `encoding_rs`
//! knows a label for.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use byteorder::{LittleEndian, WriteBytesExt};
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use log::debug;

use crate::pdic::types::error::Result;
use crate::pdic::types::models::Entry;

const CSV_HEADER: &str = "word,trans,exp,level,memory,modify,pron";
const NEWLINE: &str = "\r\n";

/// Layout of the converted file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    Text,
    OneLine,
}

impl OutputFormat {
    /// File extension used when no output path is given.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Text | OutputFormat::OneLine => "txt",
        }
    }
}

/// Character encoding of the converted file.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum OutputEncoding {
    /// UTF-16LE with a byte order mark.
    #[default]
    Unicode,
    /// UTF-8 without a byte order mark.
    Utf8,
    /// Any other encoding. Characters it cannot represent are written as
    /// numeric character references.
    Other(&'static Encoding),
}

impl FromStr for OutputEncoding {
    type Err = String;

    fn from_str(label: &str) -> std::result::Result<Self, Self::Err> {
        match label.to_ascii_lowercase().as_str() {
            "unicode" => return Ok(Self::Unicode),
            "utf8" => return Ok(Self::Utf8),
            _ => {}
        }
        match Encoding::for_label(label.as_bytes()) {
            Some(enc) if enc == UTF_16LE => Ok(Self::Unicode),
            Some(enc) if enc == UTF_8 => Ok(Self::Utf8),
            Some(enc) if enc == UTF_16BE => {
                Err("UTF-16BE output is not supported; use 'unicode' for UTF-16LE".to_string())
            }
            Some(enc) => Ok(Self::Other(enc)),
            None => Err(format!("Unknown encoding label: {}", label)),
        }
    }
}

impl fmt::Display for OutputEncoding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OutputEncoding::Unicode => write!(f, "UTF-16LE (BOM)"),
            OutputEncoding::Utf8 => write!(f, "UTF-8"),
            OutputEncoding::Other(enc) => write!(f, "{}", enc.name()),
        }
    }
}

/// Replaces the input's extension with the one for `format`.
pub fn default_output_path(input: &Path, format: OutputFormat) -> PathBuf {
    input.with_extension(format.extension())
}

/// Renders entries one at a time in the chosen layout.
#[derive(Debug)]
pub struct EntryFormatter {
    format: OutputFormat,
    first: bool,
}

impl EntryFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            first: true,
        }
    }

    /// Text written before the first entry.
    pub fn preamble(&self) -> &'static str {
        match self.format {
            OutputFormat::Csv => CSV_HEADER,
            OutputFormat::Text | OutputFormat::OneLine => "",
        }
    }

    /// Renders one entry, including whatever separator precedes it.
    pub fn format_entry(&mut self, entry: &Entry) -> String {
        let first = std::mem::replace(&mut self.first, false);
        match self.format {
            OutputFormat::Csv => format!(
                "{NEWLINE}\"{}\",\"{}\",\"{}\",{},{},{},\"{}\"",
                csv_escape(&entry.word),
                csv_escape(&entry.trans),
                csv_escape(entry.exp.as_deref().unwrap_or_default()),
                entry.level,
                u8::from(entry.memory),
                u8::from(entry.modify),
                csv_escape(entry.pron.as_deref().unwrap_or_default()),
            ),
            OutputFormat::Text => {
                let mut out = format!("{}{NEWLINE}{}", entry.word, entry.trans);
                if let Some(exp) = entry.exp.as_deref().filter(|e| !e.is_empty()) {
                    out.push_str(" / ");
                    out.push_str(exp);
                }
                out.push_str(NEWLINE);
                out
            }
            OutputFormat::OneLine => {
                let mut out = String::new();
                if !first {
                    out.push_str(NEWLINE);
                }
                out.push_str(&entry.word);
                out.push_str(" /// ");
                out.push_str(&flatten_lines(&entry.trans));
                out.push_str(" / ");
                if let Some(exp) = entry.exp.as_deref() {
                    out.push_str(&flatten_lines(exp));
                }
                out
            }
        }
    }
}

fn csv_escape(field: &str) -> String {
    field.replace('"', "\"\"")
}

/// Joins multi-line text with ` \ ` so it fits on one line.
fn flatten_lines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', " \\ ")
}

/// Encodes text pieces into the output stream.
struct EncodedWriter<W> {
    out: W,
    encoding: OutputEncoding,
}

impl<W: Write> EncodedWriter<W> {
    fn new(mut out: W, encoding: OutputEncoding) -> Result<Self> {
        if encoding == OutputEncoding::Unicode {
            out.write_u16::<LittleEndian>(0xfeff)?;
        }
        Ok(Self { out, encoding })
    }

    fn write_str(&mut self, text: &str) -> Result<()> {
        match self.encoding {
            OutputEncoding::Unicode => {
                for unit in text.encode_utf16() {
                    self.out.write_u16::<LittleEndian>(unit)?;
                }
            }
            OutputEncoding::Utf8 => self.out.write_all(text.as_bytes())?,
            OutputEncoding::Other(enc) => {
                let (bytes, _, had_unmappable) = enc.encode(text);
                if had_unmappable {
                    debug!("Unmappable characters written as references in {}", enc.name());
                }
                self.out.write_all(&bytes)?;
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Writes every entry to `out`, returning how many were written.
///
/// Stops at the first error from `entries` or from the writer; whatever was
/// written before stays in `out`.
pub fn write_entries<W, I>(
    out: W,
    entries: I,
    format: OutputFormat,
    encoding: OutputEncoding,
) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = Result<Entry>>,
{
    let mut writer = EncodedWriter::new(out, encoding)?;
    let mut formatter = EntryFormatter::new(format);
    writer.write_str(formatter.preamble())?;

    let mut count = 0;
    for entry in entries {
        let entry = entry?;
        writer.write_str(&formatter.format_entry(&entry))?;
        count += 1;
    }

    writer.finish()?;
    Ok(count)
}
