//! High score database
//!
//! One best time per level, stored in a small binary file:
//!
//! ```text
//! "SCDB1.0"                      header magic
//! u32                            level count
//! per level:
//!   u32 len + bytes              name
//!   u32 len + bytes              difficulty
//!   u32 len + bytes              mode
//!   u32 len + bytes              creator
//!   u32                          high score (frames)
//! "ENDSCDB"                      footer magic
//! ```
//!
//! All integers are little-endian.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::catalog::LevelCatalog;
use crate::consts::FRAMES_PER_SECOND;
use crate::sim::LevelFactory;

pub const SCORE_HEADER: &[u8] = b"SCDB1.0";
pub const SCORE_FOOTER: &[u8] = b"ENDSCDB";

/// Longest identity string accepted in the file
const MAX_STRING_LEN: u32 = 4096;

#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error("score file I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("score file has a bad header")]
    BadHeader,
    #[error("score file has a bad footer")]
    BadFooter,
    #[error("score file is truncated")]
    Truncated,
    #[error("score file string of {0} bytes is too long")]
    StringTooLong(u32),
    #[error("score file string is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// A stored best time and the level it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRecord {
    pub name: String,
    pub difficulty: String,
    pub mode: String,
    pub creator: String,
    pub high_score: u32,
}

impl ScoreRecord {
    pub fn for_level(level: &LevelFactory, high_score: u32) -> Self {
        Self {
            name: level.name().to_string(),
            difficulty: level.difficulty().to_string(),
            mode: level.mode().to_string(),
            creator: level.creator().to_string(),
            high_score,
        }
    }

    pub fn matches(&self, level: &LevelFactory) -> bool {
        self.name == level.name()
            && self.difficulty == level.difficulty()
            && self.mode == level.mode()
            && self.creator == level.creator()
    }
}

/// Write the best time of every level
pub fn write_scores<W: Write>(out: &mut W, levels: &[LevelFactory]) -> Result<(), ScoreError> {
    out.write_all(SCORE_HEADER)?;
    out.write_all(&(levels.len() as u32).to_le_bytes())?;
    for level in levels {
        write_string(out, level.name())?;
        write_string(out, level.difficulty())?;
        write_string(out, level.mode())?;
        write_string(out, level.creator())?;
        out.write_all(&level.high_score().to_le_bytes())?;
    }
    out.write_all(SCORE_FOOTER)?;
    Ok(())
}

pub fn read_scores<R: Read>(input: &mut R) -> Result<Vec<ScoreRecord>, ScoreError> {
    let mut magic = [0u8; SCORE_HEADER.len()];
    read_exact(input, &mut magic)?;
    if magic != SCORE_HEADER {
        return Err(ScoreError::BadHeader);
    }

    let count = read_u32(input)?;
    let mut records = Vec::with_capacity(count.min(256) as usize);
    for _ in 0..count {
        records.push(ScoreRecord {
            name: read_string(input)?,
            difficulty: read_string(input)?,
            mode: read_string(input)?,
            creator: read_string(input)?,
            high_score: read_u32(input)?,
        });
    }

    let mut magic = [0u8; SCORE_FOOTER.len()];
    read_exact(input, &mut magic).map_err(|e| match e {
        ScoreError::Truncated => ScoreError::BadFooter,
        e => e,
    })?;
    if magic != SCORE_FOOTER {
        return Err(ScoreError::BadFooter);
    }

    Ok(records)
}

/// Save every level's best time to `path`
pub fn save(catalog: &LevelCatalog, path: impl AsRef<Path>) -> Result<(), ScoreError> {
    let path = path.as_ref();
    let mut out = BufWriter::new(File::create(path)?);
    write_scores(&mut out, catalog.levels())?;
    out.flush()?;
    log::info!("High scores saved to {} ({} levels)", path.display(), catalog.len());
    Ok(())
}

/// Restore best times from `path`. A missing file is not an error.
pub fn load(catalog: &LevelCatalog, path: impl AsRef<Path>) -> Result<usize, ScoreError> {
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::info!("No high scores at {}, starting fresh", path.display());
            return Ok(0);
        }
        Err(e) => return Err(e.into()),
    };
    let records = read_scores(&mut BufReader::new(file))?;
    let matched = catalog.apply_scores(&records);
    log::info!("Loaded {} of {} high scores", matched, records.len());
    Ok(matched)
}

/// Render a frame count as `SSS:CC` (seconds and hundredths at 60 fps)
pub fn format_time(frames: u32) -> String {
    let seconds = frames / FRAMES_PER_SECOND;
    let hundredths = (frames % FRAMES_PER_SECOND) * 100 / FRAMES_PER_SECOND;
    format!("{:03}:{:02}", seconds, hundredths)
}

fn write_string<W: Write>(out: &mut W, s: &str) -> Result<(), ScoreError> {
    // Anything the reader would reject must not reach the file
    let len = u32::try_from(s.len()).unwrap_or(u32::MAX);
    if len > MAX_STRING_LEN {
        return Err(ScoreError::StringTooLong(len));
    }
    out.write_all(&len.to_le_bytes())?;
    out.write_all(s.as_bytes())?;
    Ok(())
}

fn read_exact<R: Read>(input: &mut R, buf: &mut [u8]) -> Result<(), ScoreError> {
    input.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => ScoreError::Truncated,
        _ => ScoreError::Io(e),
    })
}

fn read_u32<R: Read>(input: &mut R) -> Result<u32, ScoreError> {
    let mut buf = [0u8; 4];
    read_exact(input, &mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_string<R: Read>(input: &mut R) -> Result<String, ScoreError> {
    let len = read_u32(input)?;
    if len > MAX_STRING_LEN {
        return Err(ScoreError::StringTooLong(len));
    }
    let mut buf = vec![0u8; len as usize];
    read_exact(input, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}
