//! Structured program documents to binary.
//!
//! A document is a JSON (or YAML) object with a top-level `program` list. Each entry
//! names its command under `cmd` and carries that command's operand keys:
//!
//! ```json
//! {"program": [
//!   {"cmd": "LOAD_CONST", "reg": 0, "value": 625},
//!   {"cmd": "WRITE_MEM", "addr": 200, "src_reg": 0},
//!   {"cmd": "SQRT", "reg": 1, "addr": 200}
//! ]}
//! ```
//!
//! Lowering checks every operand against the layout table, so encoding never
//! truncates. Register and address values are not checked against any
//! machine size; the same binary runs under any configuration.

use std::num::IntErrorKind;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::decoder::{CodecError, Encoder, Instruction};
use crate::instructions::{Field, InstrDesc, Opcode, INSTR_SIZE};
use crate::isa::uvm::UvmCodec;

pub type Entry = Map<String, Value>;

#[derive(Debug, Deserialize)]
pub struct Document {
    pub program: Vec<Entry>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    #[error("schema error: {0}")]
    Schema(String),
    #[error("entry {index}: missing 'cmd'")]
    MissingCommand { index: usize },
    #[error("entry {index}: unknown command {cmd}")]
    UnknownCommand { index: usize, cmd: String },
    #[error("entry {index}: {cmd} missing field '{field}'")]
    MissingField {
        index: usize,
        cmd: Opcode,
        field: &'static str,
    },
    #[error("entry {index}: {cmd} field '{field}' is not a non-negative integer: {value}")]
    InvalidOperand {
        index: usize,
        cmd: Opcode,
        field: &'static str,
        value: String,
    },
    #[error("entry {index}: {cmd} field '{field}' = {value} does not fit in {width} bits")]
    OutOfRange {
        index: usize,
        cmd: Opcode,
        field: &'static str,
        /// As written in the document; it may exceed `u64`.
        value: String,
        width: u32,
    },
    #[error("entry {index}: {source}")]
    Encode {
        index: usize,
        #[source]
        source: CodecError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Yaml,
}

impl SourceFormat {
    /// `.yaml`/`.yml` files are YAML, anything else JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                SourceFormat::Yaml
            }
            _ => SourceFormat::Json,
        }
    }
}

/// Parses a JSON document and returns its `program` entries.
pub fn parse_document(text: &str) -> Result<Vec<Entry>, AsmError> {
    parse_document_as(text, SourceFormat::Json)
}

pub fn parse_document_as(text: &str, format: SourceFormat) -> Result<Vec<Entry>, AsmError> {
    let doc: Document = match format {
        SourceFormat::Json => serde_json::from_str(text).map_err(|e| AsmError::Schema(e.to_string()))?,
        SourceFormat::Yaml => serde_yaml::from_str(text).map_err(|e| AsmError::Schema(e.to_string()))?,
    };
    Ok(doc.program)
}

/// Validates every entry and lowers it to an [`Instruction`].
pub fn to_ir(entries: &[Entry]) -> Result<Vec<Instruction>, AsmError> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let instr = lower(index, entry)?;
            debug!(index, ?instr, "lowered");
            Ok(instr)
        })
        .collect()
}

fn lower(index: usize, entry: &Entry) -> Result<Instruction, AsmError> {
    let cmd = match entry.get("cmd") {
        None | Some(Value::Null) => return Err(AsmError::MissingCommand { index }),
        Some(Value::String(s)) => Opcode::from_mnemonic(s).ok_or_else(|| AsmError::UnknownCommand {
            index,
            cmd: format!("'{s}'"),
        })?,
        Some(other) => {
            return Err(AsmError::UnknownCommand {
                index,
                cmd: other.to_string(),
            })
        }
    };
    let desc = cmd.desc();

    // Presence of both fields is checked before either value is coerced.
    let [b, c] = desc.fields;
    let lookup = |field: &Field| {
        operand_key(desc, field, entry).ok_or(AsmError::MissingField {
            index,
            cmd,
            field: field.name,
        })
    };
    let (vb, vc) = (lookup(&b)?, lookup(&c)?);
    let values = [coerce(index, cmd, &b, vb)?, coerce(index, cmd, &c, vc)?];
    Ok(Instruction::from_operands(cmd, values))
}

/// Finds the entry value for `field`. `WRITE_MEM` also accepts `offset` for
/// its address, and `offset` wins when both keys are present.
fn operand_key<'a>(desc: &InstrDesc, field: &Field, entry: &'a Entry) -> Option<&'a Value> {
    match (desc.opcode, field.name) {
        (Opcode::WriteMem, "addr") => entry.get("offset").or_else(|| entry.get("addr")),
        _ => entry.get(field.name),
    }
}

fn coerce(index: usize, cmd: Opcode, field: &Field, value: &Value) -> Result<u32, AsmError> {
    let invalid = || AsmError::InvalidOperand {
        index,
        cmd,
        field: field.name,
        value: value.to_string(),
    };
    let out_of_range = |shown: String| AsmError::OutOfRange {
        index,
        cmd,
        field: field.name,
        value: shown,
        width: field.width,
    };
    let n = match value {
        Value::Number(n) => match (n.as_u64(), n.as_f64()) {
            (Some(u), _) => u,
            // whole numbers past u64 arrive as floats
            (None, Some(f)) if f >= 0.0 && f.fract() == 0.0 => {
                if f >= u64::MAX as f64 {
                    return Err(out_of_range(value.to_string()));
                }
                f as u64
            }
            _ => return Err(invalid()),
        },
        Value::String(s) => match s.trim().parse::<u64>() {
            Ok(n) => n,
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => {
                return Err(out_of_range(s.trim().to_string()))
            }
            Err(_) => return Err(invalid()),
        },
        _ => return Err(invalid()),
    };
    if !field.fits(n) {
        return Err(out_of_range(n.to_string()));
    }
    Ok(n as u32)
}

/// Encodes lowered instructions, one little-endian word each, in order.
pub fn encode_program(ir: &[Instruction]) -> Result<Vec<u8>, AsmError> {
    let codec = UvmCodec::new();
    let mut out = Vec::with_capacity(ir.len() * INSTR_SIZE);
    for (index, instr) in ir.iter().enumerate() {
        let raw = codec
            .encode(instr)
            .map_err(|source| AsmError::Encode { index, source })?;
        out.extend_from_slice(&raw.to_le_bytes());
    }
    Ok(out)
}

pub fn assemble(entries: &[Entry]) -> Result<Vec<u8>, AsmError> {
    encode_program(&to_ir(entries)?)
}

/// Parses, validates and encodes a whole document.
pub fn assemble_source(text: &str) -> Result<Vec<u8>, AsmError> {
    assemble(&parse_document(text)?)
}

/// `0x1D, 0x1F, ...`
pub fn fmt_bytes_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("0x{b:02X}"))
        .collect::<Vec<_>>()
        .join(", ")
}
