use super::{read_special, write_special, Instruction};
use crate::urcl::{Machine, RuntimeTrap};

pub fn exec_psh(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let sp = read_special(machine, "SP");
    let new_sp = sp.wrapping_sub(1);
    write_special(machine, "SP", new_sp);
    let value = instr.a.as_ref().unwrap().load(machine);
    machine.write_memory(new_sp, value);
    Ok(())
}

pub fn exec_pop(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let sp = read_special(machine, "SP");
    let value = machine.read_memory(sp);
    instr.a.as_ref().unwrap().store(machine, value)?;
    write_special(machine, "SP", sp.wrapping_add(1));
    Ok(())
}

/// `SP := SP-1; mem[SP] := PC; PC := a-1`, then tells the machine about the
/// new frame. `indicate_call` runs after `PC` is overwritten and reads it
/// back (already at `target - 1`) to learn the callee's entry address; the
/// call-site address passed in is the raw pre-overwrite `PC` of this `CAL`.
pub fn exec_cal(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let current_pc = read_special(machine, "PC");

    let sp = read_special(machine, "SP");
    let new_sp = sp.wrapping_sub(1);
    write_special(machine, "SP", new_sp);
    machine.write_memory(new_sp, current_pc);

    let target = instr.a.as_ref().unwrap().load(machine);
    write_special(machine, "PC", target.wrapping_sub(1));

    machine.indicate_call(current_pc);
    Ok(())
}

/// `PC := mem[SP]; SP := SP+1`. Unlike a branch, the popped value is the
/// raw call-site address, not `target - 1` — the step loop's ordinary
/// post-increment is what lands execution back on the instruction after
/// the matching `CAL`.
pub fn exec_ret(_instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let sp = read_special(machine, "SP");
    let return_pc = machine.read_memory(sp);
    write_special(machine, "PC", return_pc);
    write_special(machine, "SP", sp.wrapping_add(1));
    machine.indicate_return();
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::urcl::instruction::{Instruction, Opcode};
    use crate::urcl::{Emulator, Machine, Operand};

    #[test]
    fn psh_then_pop_leaves_sp_unchanged() {
        let mut machine = Emulator::new(0xF);
        let psh = Instruction::new(Opcode::Psh, Some(Operand::Immediate(7)), None, None, None);
        psh.execute(&mut machine).unwrap();
        assert_eq!(super::super::read_special(&mut machine, "SP"), 0xF);
        assert_eq!(machine.read_memory(0xF), 7);

        let pop = Instruction::new(Opcode::Pop, Some(Operand::Register(1)), None, None, None);
        pop.execute(&mut machine).unwrap();
        assert_eq!(super::super::read_special(&mut machine, "SP"), 0);
        assert_eq!(machine.read_register(1), 7);
    }

    #[test]
    fn cal_then_ret_returns_past_the_call_site() {
        let mut machine = Emulator::new(0xFF);
        // Pretend PC is currently 1 (as if this were the second instruction).
        super::super::write_special(&mut machine, "PC", 1);

        let cal = Instruction::new(Opcode::Cal, Some(Operand::Immediate(10)), None, None, None);
        cal.execute(&mut machine).unwrap();
        assert_eq!(super::super::read_special(&mut machine, "PC"), 9);
        assert_eq!(machine.call_stack_depth(), 1);

        let ret = Instruction::new(Opcode::Ret, None, None, None, None);
        ret.execute(&mut machine).unwrap();
        assert_eq!(super::super::read_special(&mut machine, "PC"), 1);
        assert_eq!(machine.call_stack_depth(), 0);
    }
}
