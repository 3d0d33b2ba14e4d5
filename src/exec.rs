use num_traits::ToPrimitive;

use crate::cpu::{Cpu, Trap};
use crate::decoder::Instruction;
use crate::memory::{Bus, Word};

pub trait Executor {
    fn exec<B: Bus>(&self, cpu: &mut Cpu, bus: &mut B, instr: Instruction) -> Result<(), Trap>;
}

/// Integer executor. Every operand is read and checked before the
/// destination is written, so a trapping instruction leaves state untouched.
pub struct IntExecutor;

impl Executor for IntExecutor {
    fn exec<B: Bus>(&self, cpu: &mut Cpu, bus: &mut B, instr: Instruction) -> Result<(), Trap> {
        let pc = cpu.pc;
        let bus_trap = |source| Trap::Bus { pc, source };
        match instr {
            Instruction::LoadConst { reg, value } => {
                cpu.set_reg(reg, Word::from(value))?;
            }
            Instruction::ReadMem { reg, addr } => {
                let val = bus.read_word(addr).map_err(bus_trap)?;
                cpu.set_reg(reg, val)?;
            }
            Instruction::WriteMem { addr, src_reg } => {
                let val = cpu.reg(src_reg)?;
                bus.write_word(addr, val).map_err(bus_trap)?;
            }
            Instruction::Sqrt { reg, addr } => {
                let value = bus.read_word(addr).map_err(bus_trap)?;
                let n = value.to_u64().ok_or(Trap::Domain { pc, addr, value })?;
                // isqrt(i64::MAX) < 2^32, always representable
                cpu.set_reg(reg, isqrt(n) as Word)?;
            }
        }
        Ok(())
    }
}

/// Floor of the square root, by Newton iteration on integers.
pub fn isqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    let mut x = n;
    let mut y = n / 2 + (n & 1);
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isqrt_is_exact_around_perfect_squares() {
        for r in [0u64, 1, 2, 3, 25, 1 << 20, 3_037_000_499] {
            let sq = r * r;
            assert_eq!(isqrt(sq), r);
            assert_eq!(isqrt(sq + 2 * r), r); // (r+1)^2 - 1
            if sq > 0 {
                assert_eq!(isqrt(sq - 1), r - 1);
            }
        }
        assert_eq!(isqrt(u64::MAX), 4_294_967_295);
        assert_eq!(isqrt(i64::MAX as u64), 3_037_000_499);
    }
}
