use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::decoder::{CodecError, Decoder};
use crate::disasm::fmt_instruction;
use crate::dump::DumpRange;
use crate::exec::Executor;
use crate::instructions::INSTR_SIZE;
use crate::memory::{Bus, OutOfRange, Word};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    pub register_count: usize,
    pub memory_size: usize,
    pub dump_range: Option<DumpRange>,
    /// Host-imposed budget on executed words; `None` runs to the end.
    pub max_steps: Option<u64>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            register_count: 32,
            memory_size: 1 << 16,
            dump_range: None,
            max_steps: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cpu {
    /// Byte offset of the next word in the program buffer.
    pub pc: u32,
    pub regs: Vec<Word>,
    /// Instructions completed so far.
    pub retired: u64,
    pub cfg: MachineConfig,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Trap {
    #[error("Invalid instruction {raw:#010x} at {pc:#06x}: {source}")]
    InvalidInstruction {
        pc: u32,
        raw: u32,
        #[source]
        source: CodecError,
    },
    #[error("Register r{index} out of range at {pc:#06x} (register file holds {count})")]
    RegisterOutOfRange { pc: u32, index: u32, count: usize },
    #[error("Memory index out of range at {pc:#06x}: {source}")]
    Bus {
        pc: u32,
        #[source]
        source: OutOfRange,
    },
    #[error("Domain error at {pc:#06x}: SQRT of negative value {value} at address {addr}")]
    Domain { pc: u32, addr: u32, value: Word },
}

/// Result of a single [`Cpu::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Executed,
    /// Fewer than one full word left in the program.
    Halted,
}

impl Cpu {
    pub fn new(cfg: MachineConfig) -> Self {
        Self {
            pc: 0,
            regs: vec![0; cfg.register_count],
            retired: 0,
            cfg,
        }
    }

    pub fn reg(&self, index: u32) -> Result<Word, Trap> {
        self.regs
            .get(index as usize)
            .copied()
            .ok_or_else(|| self.reg_trap(index))
    }

    pub fn set_reg(&mut self, index: u32, val: Word) -> Result<(), Trap> {
        let trap = self.reg_trap(index);
        let slot = self.regs.get_mut(index as usize).ok_or(trap)?;
        *slot = val;
        Ok(())
    }

    fn reg_trap(&self, index: u32) -> Trap {
        Trap::RegisterOutOfRange {
            pc: self.pc,
            index,
            count: self.regs.len(),
        }
    }

    /// Fetches the word at `pc`, decodes and executes it.
    ///
    /// The program counter only advances once the instruction completed, so
    /// after a trap it still points at the faulting word.
    pub fn step<B: Bus, D: Decoder, X: Executor>(
        &mut self,
        code: &[u8],
        bus: &mut B,
        dec: &D,
        exec: &X,
    ) -> Result<Step, Trap> {
        let pc = self.pc;
        let start = pc as usize;
        let Some(bytes) = code
            .get(start..start.saturating_add(INSTR_SIZE))
            .and_then(|b| <[u8; INSTR_SIZE]>::try_from(b).ok())
        else {
            return Ok(Step::Halted);
        };
        let raw = u32::from_le_bytes(bytes);
        let instr = dec
            .decode(raw)
            .map_err(|source| Trap::InvalidInstruction { pc, raw, source })?;
        trace!(pc, raw = %format!("{raw:#010x}"), "{}", fmt_instruction(&instr));
        exec.exec(self, bus, instr)?;
        self.pc = pc + INSTR_SIZE as u32;
        self.retired += 1;
        Ok(Step::Executed)
    }
}
