use serde::Serialize;

use uvm::disasm::fmt_instruction;
use uvm::Instruction;

#[derive(Debug, Clone, Serialize)]
pub struct IrLine {
    pub index: usize,
    #[serde(flatten)]
    pub instr: Instruction,
    pub text: String,
}

/// IR records as printed by `build --test`: `000: {"cmd":"LOAD_CONST",...}`.
pub fn ir_listing(ir: &[Instruction]) -> serde_json::Result<Vec<String>> {
    ir.iter()
        .enumerate()
        .map(|(index, instr)| Ok(format!("{index:03}: {}", serde_json::to_string(instr)?)))
        .collect()
}

pub fn ir_lines(ir: &[Instruction]) -> Vec<IrLine> {
    ir.iter()
        .enumerate()
        .map(|(index, instr)| IrLine {
            index,
            instr: *instr,
            text: fmt_instruction(instr),
        })
        .collect()
}
