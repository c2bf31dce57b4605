use super::{mask_u128, Instruction};
use crate::urcl::{Machine, RuntimeTrap};

/// `value << amount`, with any amount that would not fit inside a `u128`
/// treated as a full shift-out (result `0`) rather than triggering the
/// panic a native shift would for an out-of-range amount.
fn shl(value: u128, amount: u64) -> u128 {
    match u32::try_from(amount) {
        Ok(amount) if amount < 128 => value << amount,
        _ => 0,
    }
}

fn shr(value: u128, amount: u64) -> u128 {
    match u32::try_from(amount) {
        Ok(amount) if amount < 128 => value >> amount,
        _ => 0,
    }
}

pub fn exec_rsh(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let b = instr.b.as_ref().unwrap().load(machine) as u128;
    let result = mask_u128(shr(b, 1), machine);
    instr.a.as_ref().unwrap().store(machine, result)
}

pub fn exec_lsh(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let b = instr.b.as_ref().unwrap().load(machine) as u128;
    let result = mask_u128(shl(b, 1), machine);
    instr.a.as_ref().unwrap().store(machine, result)
}

pub fn exec_bsr(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let b = instr.b.as_ref().unwrap().load(machine) as u128;
    let c = instr.c.as_ref().unwrap().load(machine);
    let result = mask_u128(shr(b, c), machine);
    instr.a.as_ref().unwrap().store(machine, result)
}

pub fn exec_bsl(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let b = instr.b.as_ref().unwrap().load(machine) as u128;
    let c = instr.c.as_ref().unwrap().load(machine);
    let result = mask_u128(shl(b, c), machine);
    instr.a.as_ref().unwrap().store(machine, result)
}

pub fn exec_or(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let b = instr.b.as_ref().unwrap().load(machine);
    let c = instr.c.as_ref().unwrap().load(machine);
    instr.a.as_ref().unwrap().store(machine, b | c)
}

pub fn exec_and(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let b = instr.b.as_ref().unwrap().load(machine);
    let c = instr.c.as_ref().unwrap().load(machine);
    instr.a.as_ref().unwrap().store(machine, b & c)
}

pub fn exec_xor(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let b = instr.b.as_ref().unwrap().load(machine);
    let c = instr.c.as_ref().unwrap().load(machine);
    instr.a.as_ref().unwrap().store(machine, b ^ c)
}

pub fn exec_nor(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let b = instr.b.as_ref().unwrap().load(machine);
    let c = instr.c.as_ref().unwrap().load(machine);
    let result = !(b | c) & machine.bit_mask();
    instr.a.as_ref().unwrap().store(machine, result)
}

pub fn exec_nand(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let b = instr.b.as_ref().unwrap().load(machine);
    let c = instr.c.as_ref().unwrap().load(machine);
    let result = !(b & c) & machine.bit_mask();
    instr.a.as_ref().unwrap().store(machine, result)
}

pub fn exec_xnor(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let b = instr.b.as_ref().unwrap().load(machine);
    let c = instr.c.as_ref().unwrap().load(machine);
    let result = !(b ^ c) & machine.bit_mask();
    instr.a.as_ref().unwrap().store(machine, result)
}

pub fn exec_not(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let b = instr.b.as_ref().unwrap().load(machine);
    let result = !b & machine.bit_mask();
    instr.a.as_ref().unwrap().store(machine, result)
}

#[cfg(test)]
mod tests {
    use crate::urcl::instruction::{Instruction, Opcode};
    use crate::urcl::{Emulator, Machine, Operand};

    #[test]
    fn lsh_by_one_matches_bsl_by_one() {
        let mut machine = Emulator::new(0xFF);
        Operand::Register(1).store(&mut machine, 0b0011).unwrap();
        let lsh = Instruction::new(Opcode::Lsh, Some(Operand::Register(2)), Some(Operand::Register(1)), None, None);
        lsh.execute(&mut machine).unwrap();
        assert_eq!(machine.read_register(2), 0b0110);
    }

    #[test]
    fn bsr_by_full_width_yields_zero_not_a_panic() {
        let mut machine = Emulator::new(0xFF);
        Operand::Register(1).store(&mut machine, 0xFF).unwrap();
        Operand::Register(2).store(&mut machine, 200).unwrap();
        let bsr = Instruction::new(
            Opcode::Bsr,
            Some(Operand::Register(3)),
            Some(Operand::Register(1)),
            Some(Operand::Register(2)),
            None,
        );
        bsr.execute(&mut machine).unwrap();
        assert_eq!(machine.read_register(3), 0);
    }

    #[test]
    fn nor_is_masked_to_the_configured_width() {
        let mut machine = Emulator::new(0xF);
        Operand::Register(1).store(&mut machine, 0b1010).unwrap();
        Operand::Register(2).store(&mut machine, 0b0101).unwrap();
        let nor = Instruction::new(
            Opcode::Nor,
            Some(Operand::Register(3)),
            Some(Operand::Register(1)),
            Some(Operand::Register(2)),
            None,
        );
        nor.execute(&mut machine).unwrap();
        assert_eq!(machine.read_register(3), 0);
    }
}
