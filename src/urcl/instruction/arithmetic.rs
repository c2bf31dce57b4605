use super::{mask_i128, mask_u128, Instruction};
use crate::urcl::{Machine, RuntimeTrap};

pub fn exec_add(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let b = instr.b.as_ref().unwrap().load(machine) as i128;
    let c = instr.c.as_ref().unwrap().load(machine) as i128;
    let result = mask_i128(b + c, machine);
    instr.a.as_ref().unwrap().store(machine, result)
}

pub fn exec_sub(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let b = instr.b.as_ref().unwrap().load(machine) as i128;
    let c = instr.c.as_ref().unwrap().load(machine) as i128;
    let result = mask_i128(b - c, machine);
    instr.a.as_ref().unwrap().store(machine, result)
}

pub fn exec_mlt(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let b = instr.b.as_ref().unwrap().load(machine) as u128;
    let c = instr.c.as_ref().unwrap().load(machine) as u128;
    let result = mask_u128(b * c, machine);
    instr.a.as_ref().unwrap().store(machine, result)
}

pub fn exec_div(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let b = instr.b.as_ref().unwrap().load(machine) as u128;
    let c = instr.c.as_ref().unwrap().load(machine) as u128;
    if c == 0 {
        return Err(RuntimeTrap::DivideByZero);
    }
    let result = mask_u128(b / c, machine);
    instr.a.as_ref().unwrap().store(machine, result)
}

pub fn exec_mod(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let b = instr.b.as_ref().unwrap().load(machine) as u128;
    let c = instr.c.as_ref().unwrap().load(machine) as u128;
    if c == 0 {
        return Err(RuntimeTrap::DivideByZero);
    }
    let result = mask_u128(b % c, machine);
    instr.a.as_ref().unwrap().store(machine, result)
}

pub fn exec_inc(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let b = instr.b.as_ref().unwrap().load(machine) as i128;
    let result = mask_i128(b + 1, machine);
    instr.a.as_ref().unwrap().store(machine, result)
}

pub fn exec_dec(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let b = instr.b.as_ref().unwrap().load(machine) as i128;
    let result = mask_i128(b - 1, machine);
    instr.a.as_ref().unwrap().store(machine, result)
}

pub fn exec_neg(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let b = instr.b.as_ref().unwrap().load(machine) as i128;
    let result = mask_i128(-b, machine);
    instr.a.as_ref().unwrap().store(machine, result)
}

#[cfg(test)]
mod tests {
    use crate::urcl::instruction::{Instruction, Opcode};
    use crate::urcl::{Emulator, Machine, Operand};

    fn emu(mask: u64) -> Emulator {
        Emulator::new(mask)
    }

    #[test]
    fn add_truncates_to_the_configured_mask() {
        let mut machine = emu(0xFF);
        Operand::Register(1).store(&mut machine, 200).unwrap();
        Operand::Register(2).store(&mut machine, 100).unwrap();
        let add = Instruction::new(
            Opcode::Add,
            Some(Operand::Register(3)),
            Some(Operand::Register(1)),
            Some(Operand::Register(2)),
            None,
        );
        add.execute(&mut machine).unwrap();
        assert_eq!(machine.read_register(3), 44);
    }

    #[test]
    fn sub_wraps_below_zero() {
        let mut machine = emu(0xFF);
        Operand::Register(1).store(&mut machine, 1).unwrap();
        Operand::Register(2).store(&mut machine, 2).unwrap();
        let sub = Instruction::new(
            Opcode::Sub,
            Some(Operand::Register(3)),
            Some(Operand::Register(1)),
            Some(Operand::Register(2)),
            None,
        );
        sub.execute(&mut machine).unwrap();
        assert_eq!(machine.read_register(3), 0xFF);
    }

    #[test]
    fn mlt_does_not_overflow_before_masking() {
        let mut machine = emu(u64::MAX);
        Operand::Register(1).store(&mut machine, u64::MAX).unwrap();
        Operand::Register(2).store(&mut machine, u64::MAX).unwrap();
        let mlt = Instruction::new(
            Opcode::Mlt,
            Some(Operand::Register(3)),
            Some(Operand::Register(1)),
            Some(Operand::Register(2)),
            None,
        );
        mlt.execute(&mut machine).unwrap();
        assert_eq!(machine.read_register(3), 1);
    }

    #[test]
    fn div_by_zero_traps() {
        let mut machine = emu(0xFF);
        Operand::Register(1).store(&mut machine, 10).unwrap();
        let div = Instruction::new(
            Opcode::Div,
            Some(Operand::Register(3)),
            Some(Operand::Register(1)),
            Some(Operand::Register(0)),
            None,
        );
        assert_eq!(div.execute(&mut machine), Err(crate::urcl::RuntimeTrap::DivideByZero));
    }

    #[test]
    fn neg_of_one_is_all_ones_under_mask() {
        let mut machine = emu(0xF);
        Operand::Register(1).store(&mut machine, 1).unwrap();
        let neg = Instruction::new(Opcode::Neg, Some(Operand::Register(2)), Some(Operand::Register(1)), None, None);
        neg.execute(&mut machine).unwrap();
        assert_eq!(machine.read_register(2), 0xF);
    }
}
