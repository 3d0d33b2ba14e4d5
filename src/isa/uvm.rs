use bitvec::prelude::*;

use crate::decoder::{CodecError, Decoder, Encoder, Instruction};
use crate::instructions::{Opcode, INSTR_SIZE, OPCODE_FIELD};

/// Codec for the four-opcode word machine.
///
/// Both directions read offsets and widths from [`crate::instructions::TABLE`];
/// bits outside the opcode's fields are written as zero and ignored on decode.
#[derive(Debug, Default, Clone, Copy)]
pub struct UvmCodec;

impl UvmCodec {
    pub fn new() -> Self {
        Self
    }
}

/// Packs `values` (one per layout field, in table order) under `opcode`.
///
/// Fails instead of truncating when a value does not fit its field.
pub fn pack(opcode: Opcode, values: &[u64]) -> Result<u32, CodecError> {
    let desc = opcode.desc();
    if values.len() != desc.fields.len() {
        return Err(CodecError::Arity {
            opcode,
            expected: desc.fields.len(),
            got: values.len(),
        });
    }
    if let Some((field, &value)) = desc.fields.iter().zip(values).find(|(f, v)| !f.fits(**v)) {
        return Err(CodecError::FieldOverflow {
            opcode,
            field: field.name,
            value,
            width: field.width,
        });
    }

    let mut raw = 0u32;
    let bits = raw.view_bits_mut::<Lsb0>();
    bits[OPCODE_FIELD.bits()].store_le(opcode.code());
    for (field, &value) in desc.fields.iter().zip(values) {
        bits[field.bits()].store_le(value as u32);
    }
    Ok(raw)
}

/// Splits a word into its opcode and operand fields (table order).
pub fn unpack(raw: u32) -> Result<(Opcode, [u32; 2]), CodecError> {
    let bits = raw.view_bits::<Lsb0>();
    let code: u32 = bits[OPCODE_FIELD.bits()].load_le();
    let opcode = Opcode::from_code(code).ok_or(CodecError::UnknownOpcode { opcode: code, raw })?;
    let [b, c] = opcode.desc().fields;
    Ok((opcode, [bits[b.bits()].load_le(), bits[c.bits()].load_le()]))
}

pub fn to_bytes(raw: u32) -> [u8; INSTR_SIZE] {
    raw.to_le_bytes()
}

pub fn from_bytes(bytes: [u8; INSTR_SIZE]) -> u32 {
    u32::from_le_bytes(bytes)
}

impl Decoder for UvmCodec {
    fn decode(&self, raw: u32) -> Result<Instruction, CodecError> {
        let (opcode, operands) = unpack(raw)?;
        Ok(Instruction::from_operands(opcode, operands))
    }
}

impl Encoder for UvmCodec {
    fn encode(&self, instr: &Instruction) -> Result<u32, CodecError> {
        let [b, c] = instr.operands();
        pack(instr.opcode(), &[b as u64, c as u64])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_const_bit_positions() {
        // value=1 lands on bit 6, reg=1 on bit 26
        let raw = pack(Opcode::LoadConst, &[1, 1]).unwrap();
        assert_eq!(raw, 29 | (1 << 6) | (1 << 26));
    }

    #[test]
    fn unused_high_bits_are_ignored_on_decode() {
        let raw = pack(Opcode::Sqrt, &[3, 7]).unwrap();
        assert_eq!(unpack(raw | (1 << 31)).unwrap(), (Opcode::Sqrt, [3, 7]));
    }

    #[test]
    fn arity_is_checked() {
        let err = pack(Opcode::ReadMem, &[1]).unwrap_err();
        assert_eq!(
            err,
            CodecError::Arity { opcode: Opcode::ReadMem, expected: 2, got: 1 }
        );
    }
}
