use super::Instruction;
use crate::urcl::{Machine, RuntimeTrap};

pub fn exec_in(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let value = instr.b.as_ref().unwrap().load(machine);
    instr.a.as_ref().unwrap().store(machine, value)
}

pub fn exec_out(instr: &Instruction, machine: &mut dyn Machine) -> Result<(), RuntimeTrap> {
    let value = instr.b.as_ref().unwrap().load(machine);
    instr.a.as_ref().unwrap().store(machine, value)
}

#[cfg(test)]
mod tests {
    use crate::urcl::instruction::{Instruction, Opcode};
    use crate::urcl::{Emulator, Machine, Operand};

    #[test]
    fn out_writes_land_in_the_text_port_output_queue() {
        let mut machine = Emulator::new(0xFF);
        let mut out = Instruction::new(
            Opcode::Out,
            Some(Operand::Port { name: "TEXT".into(), id: None }),
            Some(Operand::Immediate(b'!' as u64)),
            None,
            None,
        );
        out.compile(&mut machine).unwrap();
        out.execute(&mut machine).unwrap();
        assert_eq!(machine.ports_mut().text_port_mut().unwrap().drain_output(), vec![b'!' as u64]);
    }

    #[test]
    fn in_reads_from_the_text_port_input_queue() {
        let mut machine = Emulator::new(0xFF);
        machine.ports_mut().text_port_mut().unwrap().push_input(b'A' as u64);
        let mut in_instr = Instruction::new(
            Opcode::In,
            Some(Operand::Register(1)),
            Some(Operand::Port { name: "TEXT".into(), id: None }),
            None,
            None,
        );
        in_instr.compile(&mut machine).unwrap();
        in_instr.execute(&mut machine).unwrap();
        assert_eq!(machine.read_register(1), b'A' as u64);
    }
}
