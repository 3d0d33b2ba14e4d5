use pretty_assertions::assert_eq;

use uvm::asm::encode_program;
use uvm::dump::{dump, write_csv, DumpError};
use uvm::{execute, DataMemory, DumpRange, DumpRow, Instruction, MachineConfig};

#[test]
fn inclusive_range_in_ascending_order() {
    let code = encode_program(&[
        Instruction::LoadConst { reg: 0, value: 11 },
        Instruction::WriteMem { addr: 101, src_reg: 0 },
    ])
    .unwrap();
    let m = execute(&code, MachineConfig::default()).unwrap();
    let rows = m.dump(DumpRange::new(100, 102)).unwrap();
    assert_eq!(
        rows,
        vec![
            DumpRow { address: 100, value: 0 },
            DumpRow { address: 101, value: 11 },
            DumpRow { address: 102, value: 0 },
        ]
    );
}

#[test]
fn single_address_and_last_word() {
    let mut mem = DataMemory::new(8);
    mem.words[7] = -1;
    assert_eq!(
        dump(&mem, DumpRange::new(7, 7)).unwrap(),
        vec![DumpRow { address: 7, value: -1 }]
    );
}

#[test]
fn range_errors() {
    let mem = DataMemory::new(65536);
    assert_eq!(
        dump(&mem, DumpRange::new(65530, 65536)),
        Err(DumpError::OutOfBounds { start: 65530, end: 65536, size: 65536 })
    );
    assert_eq!(
        dump(&mem, DumpRange::new(5, 4)),
        Err(DumpError::Inverted { start: 5, end: 4 })
    );
    assert!(dump(&mem, DumpRange::new(0, 65535)).is_ok());
}

#[test]
fn csv_report() {
    let mut mem = DataMemory::new(4);
    mem.words[2] = 25;
    let rows = dump(&mem, "1-3".parse().unwrap()).unwrap();
    let mut out = Vec::new();
    write_csv(&mut out, &rows).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "address,value\n1,0\n2,25\n3,0\n");
}
