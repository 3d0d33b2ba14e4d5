use pretty_assertions::assert_eq;

use uvm::decoder::{CodecError, Decoder, Encoder};
use uvm::instructions::{Opcode, TABLE};
use uvm::isa::uvm::{from_bytes, pack, to_bytes, unpack, UvmCodec};
use uvm::Instruction;

#[test]
fn round_trip_at_field_limits() {
    let codec = UvmCodec::new();
    for desc in TABLE {
        let [b, c] = desc.fields;
        for (vb, vc) in [(0, 0), (b.max(), 0), (0, c.max()), (b.max(), c.max()), (b.max() / 3, c.max() / 2)] {
            let instr = Instruction::from_operands(desc.opcode, [vb, vc]);
            let raw = codec.encode(&instr).unwrap();
            assert_eq!(raw & 0x3F, desc.opcode.code());
            assert_eq!(codec.decode(raw).unwrap(), instr);
            assert_eq!(from_bytes(to_bytes(raw)), raw);
        }
    }
}

#[test]
fn width_boundary_accepts_max_rejects_next() {
    for desc in TABLE {
        for (i, field) in desc.fields.iter().enumerate() {
            let mut ok = [0u64; 2];
            ok[i] = field.max() as u64;
            assert!(pack(desc.opcode, &ok).is_ok(), "{}.{}", desc.mnemonic, field.name);

            let mut over = [0u64; 2];
            over[i] = 1u64 << field.width;
            assert_eq!(
                pack(desc.opcode, &over),
                Err(CodecError::FieldOverflow {
                    opcode: desc.opcode,
                    field: field.name,
                    value: 1u64 << field.width,
                    width: field.width,
                })
            );
        }
    }
}

#[test]
fn documented_layouts() {
    // LOAD_CONST value=123 reg=0
    assert_eq!(pack(Opcode::LoadConst, &[123, 0]).unwrap(), 29 | (123 << 6));
    // READ_MEM reg=5 addr=300
    assert_eq!(pack(Opcode::ReadMem, &[5, 300]).unwrap(), 4 | (5 << 6) | (300 << 11));
    // WRITE_MEM addr=200 src_reg=3
    assert_eq!(pack(Opcode::WriteMem, &[200, 3]).unwrap(), 43 | (200 << 6) | (3 << 25));
    // SQRT reg=1 addr=200
    assert_eq!(pack(Opcode::Sqrt, &[1, 200]).unwrap(), 2 | (1 << 6) | (200 << 11));
}

#[test]
fn words_are_little_endian() {
    let raw = pack(Opcode::LoadConst, &[123, 0]).unwrap();
    assert_eq!(to_bytes(raw), [0xDD, 0x1E, 0x00, 0x00]);
}

#[test]
fn unknown_opcode_is_a_decode_fault() {
    for code in [0u32, 1, 3, 30, 63] {
        let raw = code | (7 << 6);
        assert_eq!(unpack(raw), Err(CodecError::UnknownOpcode { opcode: code, raw }));
    }
}
