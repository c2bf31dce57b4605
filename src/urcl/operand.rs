use std::fmt;

use super::{Machine, RuntimeTrap};

/// A value an instruction reads from and optionally writes to.
///
/// Every variant implements the same `load`/`store`/`compile` contract
/// described by the language, but only `Register`, `SpecialRegister` and
/// `Port` are storable. `Immediate` and `Label` are read-only; a parser that
/// hands either of them to an instruction slot that writes back produces a
/// [`RuntimeTrap::NotStorable`] the first (and only) time it is executed.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// `Rn` / `$n`. Register 0 is the permanent zero register.
    Register(u32),
    /// A name-addressed scalar such as `PC` or `SP`. `id` is filled in by
    /// [`Operand::compile`] and is `None` until then.
    SpecialRegister { name: String, id: Option<u32> },
    /// A literal value, masked to the machine's bit width at compile time.
    Immediate(u64),
    /// `.NAME`, resolved to a program index either at parse time (backward
    /// reference) or when the parser later reaches the label definition.
    Label { name: String, address: Option<u32> },
    /// `%NAME`, resolved to a port id by [`Operand::compile`].
    Port { name: String, id: Option<u32> },
}

impl Operand {
    /// Resolve any name to a machine-assigned id. Idempotent: re-running
    /// `compile` after a fresh `load_program_rom` simply re-resolves.
    pub fn compile(&mut self, machine: &mut dyn Machine) -> Result<(), String> {
        match self {
            Operand::SpecialRegister { name, id } => {
                *id = Some(machine.special_register_id(name));
            }
            Operand::Port { name, id } => {
                *id = Some(machine.port_id(name).map_err(|_| {
                    format!("Port \"{name}\" does not exist.")
                })?);
            }
            Operand::Immediate(value) => {
                *value &= machine.bit_mask();
            }
            Operand::Register(_) | Operand::Label { .. } => {}
        }
        Ok(())
    }

    /// Shift a [`Label`](Operand::Label)'s address; used when splicing
    /// compiled programs together. No-op on every other variant.
    pub fn add_offset(&mut self, offset: i64) {
        if let Operand::Label { address: Some(a), .. } = self {
            *a = (*a as i64 + offset) as u32;
        }
    }

    pub fn load(&self, machine: &dyn Machine) -> u64 {
        match self {
            Operand::Register(index) => machine.read_register(*index),
            Operand::SpecialRegister { id, .. } => {
                machine.read_special_register(id.expect("operand used before compile"))
            }
            Operand::Immediate(value) => *value,
            Operand::Label { address, .. } => address.expect("undefined label reached execution") as u64,
            Operand::Port { id, .. } => machine.read_port(id.expect("operand used before compile")),
        }
    }

    pub fn store(&self, machine: &mut dyn Machine, value: u64) -> Result<(), RuntimeTrap> {
        match self {
            Operand::Register(index) => {
                machine.write_register(*index, value);
                Ok(())
            }
            Operand::SpecialRegister { id, .. } => {
                machine.write_special_register(id.expect("operand used before compile"), value);
                Ok(())
            }
            Operand::Port { id, .. } => {
                machine.write_port(id.expect("operand used before compile"), value);
                Ok(())
            }
            Operand::Immediate(_) | Operand::Label { .. } => Err(RuntimeTrap::NotStorable),
        }
    }

    /// True for the operand kinds that satisfy a `Register`-constrained
    /// parameter slot (`Register` or `SpecialRegister`, i.e. anything
    /// writable by name rather than by address).
    pub fn is_register_like(&self) -> bool {
        matches!(self, Operand::Register(_) | Operand::SpecialRegister { .. })
    }

    pub fn is_immediate(&self) -> bool {
        matches!(self, Operand::Immediate(_))
    }

    pub fn is_port(&self) -> bool {
        matches!(self, Operand::Port { .. })
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Register(index) => write!(f, "R{index}"),
            Operand::SpecialRegister { name, .. } => write!(f, "{name}"),
            Operand::Immediate(value) => write!(f, "0x{value:x}"),
            Operand::Label { name, address } => {
                if !name.is_empty() {
                    write!(f, "{name}")
                } else {
                    write!(f, "0x{:x}", address.unwrap_or(0))
                }
            }
            Operand::Port { name, .. } => write!(f, "%{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::urcl::Emulator;

    #[test]
    fn register_zero_discards_writes() {
        let mut emu = Emulator::new(0xFF);
        let zero = Operand::Register(0);
        zero.store(&mut emu, 123).unwrap();
        assert_eq!(zero.load(&emu), 0);
    }

    #[test]
    fn immediate_and_label_reject_store() {
        let mut emu = Emulator::new(0xFF);
        assert_eq!(
            Operand::Immediate(5).store(&mut emu, 1),
            Err(RuntimeTrap::NotStorable)
        );
        assert_eq!(
            Operand::Label { name: ".L".into(), address: Some(2) }.store(&mut emu, 1),
            Err(RuntimeTrap::NotStorable)
        );
    }

    #[test]
    fn display_forms_round_trip_through_parser() {
        assert_eq!(Operand::Register(3).to_string(), "R3");
        assert_eq!(
            Operand::SpecialRegister { name: "PC".into(), id: None }.to_string(),
            "PC"
        );
        assert_eq!(Operand::Immediate(0x2a).to_string(), "0x2a");
        assert_eq!(
            Operand::Port { name: "TEXT".into(), id: None }.to_string(),
            "%TEXT"
        );
    }

    #[test]
    fn special_register_compile_resolves_id() {
        let mut emu = Emulator::new(0xFF);
        let mut op = Operand::SpecialRegister { name: "PC".into(), id: None };
        op.compile(&mut emu).unwrap();
        match op {
            Operand::SpecialRegister { id: Some(_), .. } => {}
            _ => panic!("expected resolved id"),
        }
    }
}
