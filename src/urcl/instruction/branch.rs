use super::{write_special, CompiledExtra, Instruction};
use crate::urcl::{Machine, RuntimeTrap, Word};

/// Write `target - 1` into `PC`: the step loop's unconditional
/// post-increment lands on `target`.
fn jump_to(machine: &mut dyn Machine, target: Word) {
    write_special(machine, "PC", target.wrapping_sub(1));
}

fn branch_if(instr: &Instruction, machine: &mut dyn Machine, taken: bool) -> Result<(), RuntimeTrap> {
    if taken {
        let target = instr.a.as_ref().unwrap().load(machine);
        jump_to(machine, target);
    }
    Ok(())
}

pub fn exec_jmp(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let target = instr.a.as_ref().unwrap().load(machine);
    jump_to(machine, target);
    Ok(())
}

pub fn exec_brz(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let b = instr.b.as_ref().unwrap().load(machine);
    branch_if(instr, machine, b == 0)
}

pub fn exec_bnz(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let b = instr.b.as_ref().unwrap().load(machine);
    branch_if(instr, machine, b != 0)
}

pub fn exec_bev(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let b = instr.b.as_ref().unwrap().load(machine);
    branch_if(instr, machine, b % 2 == 0)
}

pub fn exec_bod(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let b = instr.b.as_ref().unwrap().load(machine);
    branch_if(instr, machine, b % 2 != 0)
}

fn sign_mask(instr: &Instruction, machine: &dyn Machine) -> Word {
    match instr.extra {
        CompiledExtra::SignMask(mask) => mask,
        _ => machine.sign_bit_mask(),
    }
}

pub fn exec_brp(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let mask = sign_mask(instr, machine);
    let b = instr.b.as_ref().unwrap().load(machine);
    branch_if(instr, machine, b & mask == 0)
}

pub fn exec_brn(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let mask = sign_mask(instr, machine);
    let b = instr.b.as_ref().unwrap().load(machine);
    branch_if(instr, machine, b & mask != 0)
}

fn int_max(instr: &Instruction, machine: &dyn Machine) -> Word {
    match instr.extra {
        CompiledExtra::IntMax(mask) => mask,
        _ => machine.bit_mask(),
    }
}

pub fn exec_brc(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let mask = int_max(instr, machine);
    let b = instr.b.as_ref().unwrap().load(machine);
    let c = instr.c.as_ref().unwrap().load(machine);
    branch_if(instr, machine, b > mask.wrapping_sub(c))
}

pub fn exec_bnc(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let mask = int_max(instr, machine);
    let b = instr.b.as_ref().unwrap().load(machine);
    let c = instr.c.as_ref().unwrap().load(machine);
    branch_if(instr, machine, b <= mask.wrapping_sub(c))
}

pub fn exec_bre(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let b = instr.b.as_ref().unwrap().load(machine);
    let c = instr.c.as_ref().unwrap().load(machine);
    branch_if(instr, machine, b == c)
}

pub fn exec_bne(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let b = instr.b.as_ref().unwrap().load(machine);
    let c = instr.c.as_ref().unwrap().load(machine);
    branch_if(instr, machine, b != c)
}

pub fn exec_brl(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let b = instr.b.as_ref().unwrap().load(machine);
    let c = instr.c.as_ref().unwrap().load(machine);
    branch_if(instr, machine, b < c)
}

pub fn exec_brg(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let b = instr.b.as_ref().unwrap().load(machine);
    let c = instr.c.as_ref().unwrap().load(machine);
    branch_if(instr, machine, b > c)
}

pub fn exec_ble(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let b = instr.b.as_ref().unwrap().load(machine);
    let c = instr.c.as_ref().unwrap().load(machine);
    branch_if(instr, machine, b <= c)
}

pub fn exec_bge(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let b = instr.b.as_ref().unwrap().load(machine);
    let c = instr.c.as_ref().unwrap().load(machine);
    branch_if(instr, machine, b >= c)
}

#[cfg(test)]
mod tests {
    use crate::urcl::instruction::{Instruction, Opcode};
    use crate::urcl::{Emulator, Machine, Operand};

    #[test]
    fn brz_branches_to_target_minus_one() {
        let mut machine = Emulator::new(0xFF);
        Operand::Register(1).store(&mut machine, 0).unwrap();
        let brz = Instruction::new(
            Opcode::Brz,
            Some(Operand::Immediate(10)),
            Some(Operand::Register(1)),
            None,
            None,
        );
        brz.execute(&mut machine).unwrap();
        assert_eq!(super::super::read_special(&mut machine, "PC"), 9);
    }

    #[test]
    fn brc_fires_on_unsigned_carry() {
        let mut machine = Emulator::new(0xFF);
        Operand::Register(1).store(&mut machine, 200).unwrap();
        Operand::Register(2).store(&mut machine, 100).unwrap();
        let brc = Instruction::new(
            Opcode::Brc,
            Some(Operand::Immediate(5)),
            Some(Operand::Register(1)),
            Some(Operand::Register(2)),
            None,
        );
        brc.execute(&mut machine).unwrap();
        assert_eq!(super::super::read_special(&mut machine, "PC"), 4);
    }

    #[test]
    fn bnc_does_not_fire_when_brc_would() {
        let mut machine = Emulator::new(0xFF);
        Operand::Register(1).store(&mut machine, 200).unwrap();
        Operand::Register(2).store(&mut machine, 100).unwrap();
        let pc_before = super::super::read_special(&mut machine, "PC");
        let bnc = Instruction::new(
            Opcode::Bnc,
            Some(Operand::Immediate(5)),
            Some(Operand::Register(1)),
            Some(Operand::Register(2)),
            None,
        );
        bnc.execute(&mut machine).unwrap();
        assert_eq!(super::super::read_special(&mut machine, "PC"), pc_before);
    }
}
