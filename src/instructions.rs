use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Bytes per instruction word.
pub const INSTR_SIZE: usize = 4;

/// Opcode field, common to every encoding.
pub const OPCODE_FIELD: Field = Field { name: "opcode", offset: 0, width: 6 };

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Opcode {
    LoadConst = 29,
    ReadMem = 4,
    WriteMem = 43,
    Sqrt = 2,
}

impl Opcode {
    pub const ALL: [Opcode; 4] = [
        Opcode::LoadConst,
        Opcode::ReadMem,
        Opcode::WriteMem,
        Opcode::Sqrt,
    ];

    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.code() == code)
    }

    /// Looks up a command name as written in program documents (`"LOAD_CONST"`).
    pub fn from_mnemonic(name: &str) -> Option<Self> {
        TABLE.iter().find(|d| d.mnemonic == name).map(|d| d.opcode)
    }

    pub fn desc(self) -> &'static InstrDesc {
        match self {
            Opcode::LoadConst => &TABLE[0],
            Opcode::ReadMem => &TABLE[1],
            Opcode::WriteMem => &TABLE[2],
            Opcode::Sqrt => &TABLE[3],
        }
    }

    pub fn mnemonic(self) -> &'static str {
        self.desc().mnemonic
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// A named, contiguous bit range inside an instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub offset: u32,
    pub width: u32,
}

impl Field {
    /// Largest value representable in this field.
    pub const fn max(&self) -> u32 {
        (1 << self.width) - 1
    }

    pub fn fits(&self, value: u64) -> bool {
        value >> self.width == 0
    }

    pub fn bits(&self) -> Range<usize> {
        self.offset as usize..(self.offset + self.width) as usize
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InstrDesc {
    pub opcode: Opcode,
    pub mnemonic: &'static str,
    /// Operand fields B and C, in encoding order.
    pub fields: [Field; 2],
}

pub const TABLE: &[InstrDesc] = &[
    InstrDesc {
        opcode: Opcode::LoadConst,
        mnemonic: "LOAD_CONST",
        fields: [
            Field { name: "value", offset: 6, width: 20 },
            Field { name: "reg", offset: 26, width: 5 },
        ],
    },
    InstrDesc {
        opcode: Opcode::ReadMem,
        mnemonic: "READ_MEM",
        fields: [
            Field { name: "reg", offset: 6, width: 5 },
            Field { name: "addr", offset: 11, width: 19 },
        ],
    },
    InstrDesc {
        opcode: Opcode::WriteMem,
        mnemonic: "WRITE_MEM",
        fields: [
            Field { name: "addr", offset: 6, width: 19 },
            Field { name: "src_reg", offset: 25, width: 5 },
        ],
    },
    InstrDesc {
        opcode: Opcode::Sqrt,
        mnemonic: "SQRT",
        fields: [
            Field { name: "reg", offset: 6, width: 5 },
            Field { name: "addr", offset: 11, width: 19 },
        ],
    },
];
