use super::Instruction;
use crate::urcl::{Machine, RuntimeTrap};

pub fn exec_lod(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let address = instr.b.as_ref().unwrap().load(machine);
    let value = machine.read_memory(address);
    instr.a.as_ref().unwrap().store(machine, value)
}

pub fn exec_str(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let address = instr.a.as_ref().unwrap().load(machine);
    let value = instr.b.as_ref().unwrap().load(machine);
    machine.write_memory(address, value);
    Ok(())
}

pub fn exec_cpy(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let dst = instr.a.as_ref().unwrap().load(machine);
    let src = instr.b.as_ref().unwrap().load(machine);
    let value = machine.read_memory(src);
    machine.write_memory(dst, value);
    Ok(())
}

pub fn exec_mov(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let value = instr.b.as_ref().unwrap().load(machine);
    instr.a.as_ref().unwrap().store(machine, value)
}

pub fn exec_imm(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let value = instr.b.as_ref().unwrap().load(machine);
    instr.a.as_ref().unwrap().store(machine, value)
}

#[cfg(test)]
mod tests {
    use crate::urcl::instruction::{Instruction, Opcode};
    use crate::urcl::{Emulator, Machine, Operand};

    #[test]
    fn str_then_lod_round_trips_through_memory() {
        let mut machine = Emulator::new(0xFF);
        let str_instr = Instruction::new(
            Opcode::Str,
            Some(Operand::Immediate(0x10)),
            Some(Operand::Immediate(0x2a)),
            None,
            None,
        );
        str_instr.execute(&mut machine).unwrap();

        let lod = Instruction::new(
            Opcode::Lod,
            Some(Operand::Register(1)),
            Some(Operand::Immediate(0x10)),
            None,
            None,
        );
        lod.execute(&mut machine).unwrap();
        assert_eq!(machine.read_register(1), 0x2a);
    }

    #[test]
    fn read_of_unwritten_address_is_zero() {
        let machine = Emulator::new(0xFF);
        assert_eq!(machine.read_memory(0x1234), 0);
    }

    #[test]
    fn cpy_copies_between_two_addresses() {
        let mut machine = Emulator::new(0xFF);
        machine.write_memory(5, 9);
        let cpy = Instruction::new(Opcode::Cpy, Some(Operand::Immediate(6)), Some(Operand::Immediate(5)), None, None);
        cpy.execute(&mut machine).unwrap();
        assert_eq!(machine.read_memory(6), 9);
    }
}
