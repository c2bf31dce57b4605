//! End-to-end scenarios driving the parser and emulator together.

use super::debug::{channel, Command, Report};
use super::parser::Parser;
use super::{Emulator, Machine, Word};

fn build(source: &str, mask: Word) -> Emulator {
    let outcome = Parser::parse(source, "t");
    assert!(outcome.is_ok(), "{:?}", outcome.errors);
    let mut emulator = Emulator::new(mask);
    emulator.load_program_rom(outcome.program).unwrap();
    for (name, address) in &outcome.labels {
        emulator.add_label(*address as Word, name.clone());
    }
    emulator
}

fn special_register(emulator: &Emulator, name: &str) -> Word {
    emulator.special_registers().find(|(n, _)| *n == name).map(|(_, v)| v).unwrap()
}

#[test]
fn arithmetic_truncates_to_the_configured_mask() {
    let mut emulator = build("IMM R1 200\nIMM R2 100\nADD R3 R1 R2\nHLT\n", 0xFF);
    emulator.execute();
    assert!(!emulator.running());
    assert_eq!(emulator.read_register(3), 44);
}

#[test]
fn unsigned_carry_branch_jumps_past_the_fallthrough_halt() {
    let mut emulator = build("IMM R1 200\nIMM R2 100\nBRC .O R1 R2\nHLT\n.O\nHLT\n", 0xFF);
    emulator.execute();
    assert!(!emulator.running());
    assert_eq!(emulator.pc(), 4);
}

#[test]
fn call_and_return_attribute_hotpaths_to_the_callee() {
    let mut emulator = build("IMM R1 0\nCAL .F\nHLT\n.F\nADD R1 R1 1\nRET\n", 0xFFFF);
    emulator.execute();
    assert!(!emulator.running());
    assert_eq!(emulator.read_register(1), 1);

    let hotpaths = emulator.hotpaths().normalized();
    assert_eq!(hotpaths.len(), 2);
    let callee = &hotpaths[".F"];
    assert!((callee[&5] - 0.5).abs() < 1e-9);
    assert!((callee[&6] - 0.5).abs() < 1e-9);
    assert!(hotpaths.contains_key("0"));
}

#[test]
fn breakpoint_pauses_once_then_continue_runs_to_completion() {
    let mut emulator = build("IMM R1 0\nCAL .F\nHLT\n.F\nADD R1 R1 1\nRET\n", 0xFFFF);
    emulator.set_breakpoint(5); // ADD's source line

    let (host, executor) = channel();
    executor.install(&mut emulator);

    let handle = std::thread::spawn(move || {
        emulator.execute();
        emulator
    });

    assert!(matches!(host.recv().unwrap(), Report::Open));
    match host.recv().unwrap() {
        Report::Status(status) => {
            assert_eq!(status.line, Some(5));
            assert_eq!(status.registers.get("R1"), Some(&0));
        }
        other => panic!("expected a status frame, got {other:?}"),
    }
    host.send(Command::Continue).unwrap();
    assert!(matches!(host.recv().unwrap(), Report::Close));

    let emulator = handle.join().unwrap();
    assert!(!emulator.running());
    assert_eq!(emulator.read_register(1), 1);
}

#[test]
fn stack_wraps_below_zero_under_a_narrow_mask() {
    let mut emulator = build("PSH 1\nPOP R1\nHLT\n", 0xF);
    assert_eq!(special_register(&emulator, "SP"), 0);

    emulator.step_into();
    assert_eq!(special_register(&emulator, "SP"), 15);
    assert_eq!(emulator.read_memory(15), 1);

    emulator.step_into();
    assert_eq!(emulator.read_register(1), 1);
    assert_eq!(special_register(&emulator, "SP"), 0);
}

#[test]
fn forward_referenced_label_parses_and_runs() {
    let outcome = Parser::parse("JMP .L\nHLT\n.L\nHLT\n", "t");
    assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
    assert_eq!(outcome.labels.get(".L"), Some(&2));

    let mut emulator = Emulator::new(0xFF);
    emulator.load_program_rom(outcome.program).unwrap();
    emulator.execute();
    assert!(!emulator.running());
    assert_eq!(emulator.pc(), 2);
}
