use super::Instruction;
use crate::urcl::{Machine, RuntimeTrap};

pub fn exec_break(_instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    machine.enter_debug();
    Ok(())
}

pub fn exec_hlt(_instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    machine.halt();
    Ok(())
}

pub fn exec_bits(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let bits = instr.a.as_ref().unwrap().load(machine);
    let bits = u32::try_from(bits).map_err(|_| RuntimeTrap::InvalidBitWidth)?;
    machine.set_bit_mask(bits)
}

#[cfg(test)]
mod tests {
    use crate::urcl::instruction::{Instruction, Opcode};
    use crate::urcl::{Emulator, Machine, Operand, RuntimeTrap};

    #[test]
    fn hlt_halts_a_running_program() {
        let mut machine = Emulator::new(0xFF);
        machine.load_program_rom(vec![Instruction::new(Opcode::Hlt, None, None, None, None)]).unwrap();
        machine.execute();
        assert!(!machine.running());
    }

    #[test]
    fn bits_zero_traps() {
        let mut machine = Emulator::new(0xFF);
        let bits = Instruction::new(Opcode::Bits, Some(Operand::Immediate(0)), None, None, None);
        assert_eq!(bits.execute(&mut machine), Err(RuntimeTrap::InvalidBitWidth));
    }

    #[test]
    fn bits_eight_narrows_the_mask() {
        let mut machine = Emulator::new(0xFFFF);
        let bits = Instruction::new(Opcode::Bits, Some(Operand::Immediate(8)), None, None, None);
        bits.execute(&mut machine).unwrap();
        assert_eq!(machine.bit_mask(), 0xFF);
    }
}
