use serde::{Deserialize, Serialize};

use crate::instructions::Opcode;

/// Validated instruction, one variant per opcode.
///
/// Serialises with a `cmd` tag so an IR listing reads like the source
/// document: `{"cmd":"LOAD_CONST","reg":0,"value":123}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Instruction {
    LoadConst { reg: u32, value: u32 },
    ReadMem { reg: u32, addr: u32 },
    WriteMem { addr: u32, src_reg: u32 },
    Sqrt { reg: u32, addr: u32 },
}

impl Instruction {
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::LoadConst { .. } => Opcode::LoadConst,
            Instruction::ReadMem { .. } => Opcode::ReadMem,
            Instruction::WriteMem { .. } => Opcode::WriteMem,
            Instruction::Sqrt { .. } => Opcode::Sqrt,
        }
    }

    /// Operand values in the order of the opcode's layout fields (B, C).
    pub fn operands(&self) -> [u32; 2] {
        match *self {
            Instruction::LoadConst { reg, value } => [value, reg],
            Instruction::ReadMem { reg, addr } => [reg, addr],
            Instruction::WriteMem { addr, src_reg } => [addr, src_reg],
            Instruction::Sqrt { reg, addr } => [reg, addr],
        }
    }

    /// Inverse of [`Instruction::operands`].
    pub fn from_operands(opcode: Opcode, [b, c]: [u32; 2]) -> Self {
        match opcode {
            Opcode::LoadConst => Instruction::LoadConst { reg: c, value: b },
            Opcode::ReadMem => Instruction::ReadMem { reg: b, addr: c },
            Opcode::WriteMem => Instruction::WriteMem { addr: b, src_reg: c },
            Opcode::Sqrt => Instruction::Sqrt { reg: b, addr: c },
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("unknown opcode {opcode} in word {raw:#010x}")]
    UnknownOpcode { opcode: u32, raw: u32 },
    #[error("{opcode} field '{field}' = {value} does not fit in {width} bits")]
    FieldOverflow {
        opcode: Opcode,
        field: &'static str,
        value: u64,
        width: u32,
    },
    #[error("{opcode} takes {expected} operands, got {got}")]
    Arity {
        opcode: Opcode,
        expected: usize,
        got: usize,
    },
}

pub trait Decoder {
    fn decode(&self, raw: u32) -> Result<Instruction, CodecError>;
}

pub trait Encoder {
    fn encode(&self, instr: &Instruction) -> Result<u32, CodecError>;
}
