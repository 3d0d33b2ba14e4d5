use std::io::{self, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::memory::{Bus, Word};

/// Inclusive address range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpRange {
    pub start: u32,
    pub end: u32,
}

impl DumpRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Checks the range against a memory of `size` words.
    pub fn validate(&self, size: usize) -> Result<(), DumpError> {
        if self.start > self.end {
            return Err(DumpError::Inverted {
                start: self.start,
                end: self.end,
            });
        }
        if self.end as usize >= size {
            return Err(DumpError::OutOfBounds {
                start: self.start,
                end: self.end,
                size,
            });
        }
        Ok(())
    }
}

/// Parses `start-end`, e.g. `100-220`.
impl FromStr for DumpRange {
    type Err = DumpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || DumpError::Syntax(s.to_string());
        let (a, b) = s.split_once('-').ok_or_else(bad)?;
        let start = a.trim().parse::<u32>().map_err(|_| bad())?;
        let end = b.trim().parse::<u32>().map_err(|_| bad())?;
        Ok(Self { start, end })
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DumpError {
    #[error("range error: start {start} is after end {end}")]
    Inverted { start: u32, end: u32 },
    #[error("range error: [{start}, {end}] exceeds memory of {size} words")]
    OutOfBounds { start: u32, end: u32, size: usize },
    #[error("range must be start-end, got '{0}'")]
    Syntax(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpRow {
    pub address: u32,
    pub value: Word,
}

/// Reads every address of `range` in ascending order.
pub fn dump<B: Bus>(mem: &B, range: DumpRange) -> Result<Vec<DumpRow>, DumpError> {
    range.validate(mem.size())?;
    (range.start..=range.end)
        .map(|address| {
            let value = mem.read_word(address).map_err(|e| DumpError::OutOfBounds {
                start: range.start,
                end: range.end,
                size: e.size,
            })?;
            Ok(DumpRow { address, value })
        })
        .collect()
}

/// Writes rows as a two-column CSV with an `address,value` header.
pub fn write_csv<W: Write>(mut out: W, rows: &[DumpRow]) -> io::Result<()> {
    writeln!(out, "address,value")?;
    for row in rows {
        writeln!(out, "{},{}", row.address, row.value)?;
    }
    out.flush()
}
