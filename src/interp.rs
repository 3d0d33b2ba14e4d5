//! Sequential run loop over a program buffer.
//!
//! A program is a flat run of 4-byte little-endian words executed from
//! offset 0 to the end; there are no jumps, so the buffer length alone
//! decides when a run stops. A trailing partial word is ignored.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cpu::{Cpu, MachineConfig, Step, Trap};
use crate::decoder::Decoder;
use crate::dump::{dump, DumpError, DumpRange, DumpRow};
use crate::exec::{Executor, IntExecutor};
use crate::instructions::INSTR_SIZE;
use crate::isa::uvm::UvmCodec;
use crate::memory::{DataMemory, Word};

/// Execution state: register file plus data memory, owned by one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    pub cpu: Cpu,
    pub mem: DataMemory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub retired: u64,
    /// Bytes after the last whole word.
    pub trailing_bytes: usize,
    /// The step budget stopped the run before the end of the program.
    pub exhausted: bool,
}

/// A trap together with the state as it stood when the run stopped.
#[derive(thiserror::Error, Debug)]
#[error("execution stopped after {} instruction(s): {trap}", .machine.cpu.retired)]
pub struct Fault {
    #[source]
    pub trap: Trap,
    pub machine: Box<Machine>,
}

impl Machine {
    pub fn new(cfg: MachineConfig) -> Self {
        Self {
            cpu: Cpu::new(cfg),
            mem: DataMemory::new(cfg.memory_size),
        }
    }

    pub fn registers(&self) -> &[Word] {
        &self.cpu.regs
    }

    pub fn memory(&self) -> &[Word] {
        &self.mem.words
    }

    pub fn dump(&self, range: DumpRange) -> Result<Vec<DumpRow>, DumpError> {
        dump(&self.mem, range)
    }

    /// Runs `code` with the stock codec and executor.
    pub fn run(&mut self, code: &[u8]) -> Result<RunSummary, Trap> {
        self.run_with(code, &UvmCodec::new(), &IntExecutor)
    }

    /// Runs from the current program counter until the buffer ends, the
    /// step budget runs out, or an instruction traps. State changes made
    /// before a trap are kept.
    pub fn run_with<D: Decoder, X: Executor>(
        &mut self,
        code: &[u8],
        dec: &D,
        exec: &X,
    ) -> Result<RunSummary, Trap> {
        let trailing_bytes = code.len() % INSTR_SIZE;
        if trailing_bytes != 0 {
            warn!(trailing_bytes, "ignoring partial word at end of program");
        }
        debug!(
            words = code.len() / INSTR_SIZE,
            registers = self.cpu.regs.len(),
            memory = self.mem.words.len(),
            "run start"
        );

        let budget = self.cpu.cfg.max_steps;
        let mut steps = 0u64;
        let exhausted = loop {
            if budget.is_some_and(|max| steps >= max) {
                break (self.cpu.pc as usize) + INSTR_SIZE <= code.len();
            }
            match self.cpu.step(code, &mut self.mem, dec, exec)? {
                Step::Executed => steps += 1,
                Step::Halted => break false,
            }
        };
        if exhausted {
            warn!(steps, pc = self.cpu.pc, "step budget exhausted");
        }
        debug!(retired = self.cpu.retired, "run stop");

        Ok(RunSummary {
            retired: self.cpu.retired,
            trailing_bytes,
            exhausted,
        })
    }
}

/// Executes `code` on fresh, zeroed state sized by `cfg`.
///
/// On a trap the returned [`Fault`] carries the partially mutated state.
pub fn execute(code: &[u8], cfg: MachineConfig) -> Result<Machine, Fault> {
    let mut machine = Machine::new(cfg);
    match machine.run(code) {
        Ok(_) => Ok(machine),
        Err(trap) => Err(Fault {
            trap,
            machine: Box::new(machine),
        }),
    }
}
