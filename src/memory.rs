use serde::{Deserialize, Serialize};

/// Register and data-memory cell. Signed so that negative values can be
/// seeded by a host even though the ISA itself only produces non-negative ones.
pub type Word = i64;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("address {addr} outside data memory of {size} words")]
pub struct OutOfRange {
    pub addr: u32,
    pub size: usize,
}

/// Word-addressed data memory.
pub trait Bus {
    fn size(&self) -> usize;
    fn read_word(&self, addr: u32) -> Result<Word, OutOfRange>;
    fn write_word(&mut self, addr: u32, val: Word) -> Result<(), OutOfRange>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataMemory {
    pub words: Vec<Word>,
}

impl DataMemory {
    pub fn new(size: usize) -> Self {
        Self {
            words: vec![0; size],
        }
    }

    fn slot(&self, addr: u32) -> Result<usize, OutOfRange> {
        let off = addr as usize;
        if off < self.words.len() {
            Ok(off)
        } else {
            Err(OutOfRange {
                addr,
                size: self.words.len(),
            })
        }
    }
}

impl Bus for DataMemory {
    fn size(&self) -> usize {
        self.words.len()
    }
    fn read_word(&self, addr: u32) -> Result<Word, OutOfRange> {
        Ok(self.words[self.slot(addr)?])
    }
    fn write_word(&mut self, addr: u32, val: Word) -> Result<(), OutOfRange> {
        let off = self.slot(addr)?;
        self.words[off] = val;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_past_the_end_fails() {
        let mut mem = DataMemory::new(4);
        mem.write_word(3, -7).unwrap();
        assert_eq!(mem.read_word(3), Ok(-7));
        assert_eq!(mem.read_word(4), Err(OutOfRange { addr: 4, size: 4 }));
        assert_eq!(mem.write_word(9, 1), Err(OutOfRange { addr: 9, size: 4 }));
    }
}
