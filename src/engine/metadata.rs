//! WAV metadata
//!
//! Reads artist and title from the RIFF `LIST/INFO` chunk (`IART`, `INAM`).
//! Missing tags default to "Unknown".

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{Result, SndfxError};

/// Value used for any tag that is absent from the file
pub const UNKNOWN: &str = "Unknown";

/// Artist and title of a recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub artist: String,
    pub title: String,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            artist: UNKNOWN.to_string(),
            title: UNKNOWN.to_string(),
        }
    }
}

impl Metadata {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
        }
    }
}

/// Read the INFO tags of a WAV file
pub fn read_info(path: &Path) -> Result<Metadata> {
    let file = File::open(path).map_err(|source| SndfxError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_info(&mut BufReader::new(file)).map_err(|source| SndfxError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Walk the RIFF chunk list looking for `LIST/INFO`
///
/// Non-RIFF input yields default metadata rather than an error; the audio
/// decoder is responsible for rejecting malformed files.
pub fn parse_info<R: Read + Seek>(reader: &mut R) -> std::io::Result<Metadata> {
    let mut metadata = Metadata::default();

    let mut header = [0u8; 12];
    if read_fully(reader, &mut header)? < header.len() {
        return Ok(metadata);
    }
    if &header[0..4] != b"RIFF" || &header[8..12] != b"WAVE" {
        return Ok(metadata);
    }

    while let Some((id, size)) = read_chunk_header(reader)? {
        if &id == b"LIST" && size >= 4 {
            let mut kind = [0u8; 4];
            if read_fully(reader, &mut kind)? < kind.len() {
                break;
            }
            if &kind == b"INFO" {
                let mut body = Vec::new();
                (&mut *reader).take(size as u64 - 4).read_to_end(&mut body)?;
                apply_info_entries(&body, &mut metadata);
                skip_padding(reader, size)?;
                continue;
            }
            reader.seek(SeekFrom::Current(padded(size) - 4))?;
        } else {
            reader.seek(SeekFrom::Current(padded(size)))?;
        }
    }

    Ok(metadata)
}

fn apply_info_entries(body: &[u8], metadata: &mut Metadata) {
    let mut pos = 0;
    while pos + 8 <= body.len() {
        let id = &body[pos..pos + 4];
        let size = u32::from_le_bytes([body[pos + 4], body[pos + 5], body[pos + 6], body[pos + 7]])
            as usize;
        let start = pos + 8;
        let end = start.saturating_add(size).min(body.len());
        let value = decode_text(&body[start..end]);

        if !value.is_empty() {
            match id {
                b"IART" => metadata.artist = value,
                b"INAM" => metadata.title = value,
                _ => {}
            }
        }

        pos = start.saturating_add(size).saturating_add(size & 1);
    }
}

fn decode_text(bytes: &[u8]) -> String {
    let trimmed = match bytes.iter().position(|&b| b == 0) {
        Some(nul) => &bytes[..nul],
        None => bytes,
    };
    String::from_utf8_lossy(trimmed).trim().to_string()
}

fn read_chunk_header<R: Read>(reader: &mut R) -> std::io::Result<Option<([u8; 4], u32)>> {
    let mut header = [0u8; 8];
    if read_fully(reader, &mut header)? < header.len() {
        return Ok(None);
    }
    let id = [header[0], header[1], header[2], header[3]];
    let size = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    Ok(Some((id, size)))
}

/// Chunk bodies are padded to an even length
fn padded(size: u32) -> i64 {
    size as i64 + (size & 1) as i64
}

fn skip_padding<R: Seek>(reader: &mut R, size: u32) -> std::io::Result<()> {
    if size & 1 == 1 {
        reader.seek(SeekFrom::Current(1))?;
    }
    Ok(())
}

/// Like `read_exact`, but reports a short read instead of failing
fn read_fully<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}
