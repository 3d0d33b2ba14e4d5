pub mod asm;
pub mod cpu;
pub mod decoder;
pub mod disasm;
pub mod dump;
pub mod exec;
pub mod instructions;
pub mod interp;
pub mod memory;

pub mod isa {
    pub mod uvm; // four-opcode word machine
}

pub use asm::{assemble, assemble_source, AsmError};
pub use cpu::{Cpu, MachineConfig, Trap};
pub use decoder::{CodecError, Instruction};
pub use dump::{DumpRange, DumpRow};
pub use instructions::Opcode;
pub use interp::{execute, Fault, Machine, RunSummary};
pub use memory::{Bus, DataMemory, Word};
