use crate::decoder::{Decoder, Instruction};
use crate::instructions::INSTR_SIZE;
use crate::isa::uvm::UvmCodec;

pub fn fmt_instruction(i: &Instruction) -> String {
    match *i {
        Instruction::LoadConst { reg, value } => format!("LOAD_CONST r{reg}, #{value}"),
        Instruction::ReadMem { reg, addr } => format!("READ_MEM r{reg}, [{addr}]"),
        Instruction::WriteMem { addr, src_reg } => format!("WRITE_MEM [{addr}], r{src_reg}"),
        Instruction::Sqrt { reg, addr } => format!("SQRT r{reg}, [{addr}]"),
    }
}

/// One line per whole word: offset, optional raw bytes, then the
/// instruction or a `.word` fallback for undecodable words. Trailing
/// bytes that do not fill a word get a final note line.
pub fn listing(code: &[u8], show_bytes: bool) -> Vec<String> {
    let dec = UvmCodec::new();
    let words = code.chunks_exact(INSTR_SIZE);
    let tail = words.remainder().len();
    let mut out: Vec<String> = words
        .enumerate()
        .map(|(i, chunk)| {
            let raw = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            let text = match dec.decode(raw) {
                Ok(instr) => fmt_instruction(&instr),
                Err(_) => format!(".word {raw:#010x}"),
            };
            let off = i * INSTR_SIZE;
            if show_bytes {
                let bytes = chunk.iter().map(|b| format!("{b:02x}")).collect::<Vec<_>>().join(" ");
                format!("{off:#06x}:  {bytes}  {text}")
            } else {
                format!("{off:#06x}:  {text}")
            }
        })
        .collect();
    if tail > 0 {
        out.push(format!("; {tail} trailing byte(s) ignored"));
    }
    out
}
