/// Stored text normalization for input files
///
/// Extraction tools on Windows often emit a BOM, UTF-16, or CRLF line
/// endings. Everything is normalized to BOM-less UTF-8 with `\n` before
/// parsing so the line grammar only has one shape to deal with. Bytes that
/// are not valid UTF-8 are read as Latin-1; decoding never fails.
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Utf8Bom,
    Utf16Le,
    Utf16Be,
    Latin1,
}

impl Encoding {
    pub fn detect(content: &[u8]) -> Self {
        if content.starts_with(&[0xEF, 0xBB, 0xBF]) {
            Self::Utf8Bom
        } else if content.starts_with(&[0xFF, 0xFE]) {
            Self::Utf16Le
        } else if content.starts_with(&[0xFE, 0xFF]) {
            Self::Utf16Be
        } else if std::str::from_utf8(content).is_ok() {
            Self::Utf8
        } else {
            Self::Latin1
        }
    }
}

/// Decode raw bytes into normalized text.
pub fn decode(bytes: &[u8]) -> String {
    let text = match Encoding::detect(bytes) {
        Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        Encoding::Utf8Bom => String::from_utf8_lossy(&bytes[3..]).into_owned(),
        Encoding::Utf16Le => decode_utf16(&bytes[2..], u16::from_le_bytes),
        Encoding::Utf16Be => decode_utf16(&bytes[2..], u16::from_be_bytes),
        Encoding::Latin1 => {
            log::debug!("input is not valid UTF-8, reading it as Latin-1");
            bytes.iter().map(|&b| char::from(b)).collect()
        }
    };
    normalize_newlines(&text)
}

fn decode_utf16(content: &[u8], to_unit: fn([u8; 2]) -> u16) -> String {
    let units: Vec<u16> = content
        .chunks_exact(2)
        .map(|chunk| to_unit([chunk[0], chunk[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// `\r\n` and lone `\r` both become `\n`.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Read a file and normalize its text.
pub fn read_text(path: &Path) -> Result<String, io::Error> {
    let bytes = std::fs::read(path)?;
    Ok(decode(&bytes))
}
