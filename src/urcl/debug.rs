use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use super::ports::Port;
use super::{Emulator, Machine, Word};

/// Host → emulator. Typed counterpart of the wire protocol's string tags.
#[derive(Debug, Clone)]
pub enum Command {
    Step,
    Over,
    Out,
    Continue,
    Break(u32),
    Unbreak(u32),
    Memory(Word),
    /// One octet of input for the `TEXT` port.
    Io(Word),
    Close,
}

/// Emulator → host.
#[derive(Debug, Clone)]
pub enum Report {
    Open,
    Status(StatusFrame),
    Memory(Word),
    /// One octet of output from the `TEXT` port.
    Io(Word),
    Close,
}

/// The dictionary emitted at every pause.
#[derive(Debug, Clone, Default)]
pub struct StatusFrame {
    pub line: Option<u32>,
    pub registers: HashMap<String, Word>,
    pub stack: Vec<(Word, Word)>,
    pub call_stack: Vec<(Word, Option<String>)>,
    pub hotpaths: HashMap<String, HashMap<u32, f64>>,
}

fn status_frame(emulator: &Emulator) -> StatusFrame {
    let mut registers: HashMap<String, Word> = emulator
        .special_registers()
        .map(|(name, value)| (name.to_string(), value))
        .collect();
    for (index, &value) in emulator.general_registers().iter().enumerate() {
        registers.insert(format!("R{index}"), value);
    }
    StatusFrame {
        line: emulator.current_line(),
        registers,
        stack: emulator.stack_view(),
        call_stack: emulator.call_stack_view(),
        hotpaths: emulator.hotpaths().normalized(),
    }
}

/// The host side of the two channels: send commands, receive reports.
pub struct HostHandle {
    commands: Sender<Command>,
    reports: Receiver<Report>,
}

impl HostHandle {
    pub fn send(&self, command: Command) -> Result<(), mpsc::SendError<Command>> {
        self.commands.send(command)
    }

    /// Blocks for the next report. Returns `Err` once the executor side has
    /// dropped (the emulator thread exited).
    pub fn recv(&self) -> Result<Report, mpsc::RecvError> {
        self.reports.recv()
    }

    /// Non-blocking poll, for a host (such as a UI redraw loop) that cannot
    /// afford to wait on `recv`.
    pub fn try_recv(&self) -> Result<Report, mpsc::TryRecvError> {
        self.reports.try_recv()
    }
}

/// The emulator side: installed into an [`Emulator`] as its break callback
/// and (via [`ChannelTextPort`]) as its `TEXT` port. Both share the same
/// command receiver, which is safe because the emulator only ever consumes
/// from one of the two at a time: a `TEXT` read blocks the executing
/// instruction, and a pause blocks the break callback, and the emulator
/// never runs both at once on its single thread.
pub struct ExecutorHandle {
    commands: Arc<Mutex<Receiver<Command>>>,
    reports: Sender<Report>,
}

impl ExecutorHandle {
    /// Registers this handle as `emulator`'s break callback and replaces its
    /// default `TEXT` port with one tunnelled over the same channel pair.
    pub fn install(self, emulator: &mut Emulator) {
        emulator.ports_mut().register(
            "TEXT",
            Box::new(ChannelTextPort { commands: self.commands.clone(), reports: self.reports.clone() }),
        );
        emulator.set_break_callback(move |emu| run_pause(emu, &self.commands, &self.reports));
    }
}

/// The `TEXT` port a host-driven session installs in place of the default
/// in-process [`super::ports::TextPort`]: reads block on the commands queue
/// for an `io` packet, writes emit one immediately on the reports queue.
struct ChannelTextPort {
    commands: Arc<Mutex<Receiver<Command>>>,
    reports: Sender<Report>,
}

impl Port for ChannelTextPort {
    fn read(&mut self, _bit_mask: Word) -> Word {
        let commands = self.commands.lock().expect("debug channel mutex poisoned");
        loop {
            match commands.recv() {
                Ok(Command::Io(value)) => return value,
                Ok(Command::Close) | Err(_) => return 0,
                Ok(_) => continue,
            }
        }
    }

    fn write(&mut self, value: Word, bit_mask: Word) {
        let _ = self.reports.send(Report::Io(value & bit_mask));
    }
}

/// A fresh pair of unidirectional channels: commands flow
/// host → emulator, reports flow emulator → host.
pub fn channel() -> (HostHandle, ExecutorHandle) {
    let (command_tx, command_rx) = mpsc::channel();
    let (report_tx, report_rx) = mpsc::channel();
    (
        HostHandle { commands: command_tx, reports: report_rx },
        ExecutorHandle { commands: Arc::new(Mutex::new(command_rx)), reports: report_tx },
    )
}

/// The break callback body: `open`, a status frame, zero or more
/// `memory`/`break`/`unbreak` prefix commands, then exactly one of
/// `step`/`over`/`out`/`continue`, then `close`.
fn run_pause(emulator: &mut Emulator, commands: &Arc<Mutex<Receiver<Command>>>, reports: &Sender<Report>) {
    if reports.send(Report::Open).is_err() {
        return;
    }
    if reports.send(Report::Status(status_frame(emulator))).is_err() {
        return;
    }

    let commands = commands.lock().expect("debug channel mutex poisoned");
    loop {
        match commands.recv() {
            Ok(Command::Memory(address)) => {
                let value = emulator.read_memory(address);
                if reports.send(Report::Memory(value)).is_err() {
                    return;
                }
            }
            Ok(Command::Break(line)) => emulator.set_breakpoint(line),
            Ok(Command::Unbreak(line)) => emulator.remove_breakpoint(line),
            // `io` is not a prefix command: it only ever
            // arrives while an `IN` instruction is blocked in
            // `ChannelTextPort::read`, never while paused at a break.
            Ok(Command::Io(_)) => continue,
            Ok(Command::Step) => {
                emulator.step_into();
                break;
            }
            Ok(Command::Over) => {
                emulator.step_over();
                break;
            }
            Ok(Command::Out) => {
                emulator.step_out();
                break;
            }
            Ok(Command::Continue) => {
                emulator.resume();
                break;
            }
            Ok(Command::Close) | Err(_) => break,
        }
    }

    let _ = reports.send(Report::Close);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::urcl::instruction::{Instruction, Opcode};
    use crate::urcl::Operand;

    #[test]
    fn breakpoint_pause_emits_open_status_close_then_continue_resumes() {
        use crate::urcl::instruction::SourceSpan;

        let mut emulator = Emulator::new(0xFF);
        let add_source = Some(SourceSpan { source_name: "t".into(), line_index: 2 });
        emulator
            .load_program_rom(vec![
                Instruction::new(Opcode::Imm, Some(Operand::Register(1)), Some(Operand::Immediate(200)), None, None),
                Instruction::new(Opcode::Imm, Some(Operand::Register(2)), Some(Operand::Immediate(100)), None, None),
                Instruction::new(
                    Opcode::Add,
                    Some(Operand::Register(3)),
                    Some(Operand::Register(1)),
                    Some(Operand::Register(2)),
                    add_source,
                ),
                Instruction::new(Opcode::Hlt, None, None, None, None),
            ])
            .unwrap();
        emulator.set_breakpoint(3);

        let (host, executor) = channel();
        executor.install(&mut emulator);

        let handle = std::thread::spawn(move || {
            emulator.execute();
            emulator
        });

        assert!(matches!(host.recv().unwrap(), Report::Open));
        match host.recv().unwrap() {
            Report::Status(status) => assert_eq!(status.line, Some(3)),
            other => panic!("expected a status frame, got {other:?}"),
        }
        host.send(Command::Continue).unwrap();
        assert!(matches!(host.recv().unwrap(), Report::Close));

        let emulator = handle.join().unwrap();
        assert_eq!(emulator.read_register(3), 44);
    }

    #[test]
    fn step_command_pauses_again_after_one_instruction() {
        let mut emulator = Emulator::new(0xFF);
        emulator
            .load_program_rom(vec![
                Instruction::new(Opcode::Imm, Some(Operand::Register(1)), Some(Operand::Immediate(1)), None, None),
                Instruction::new(Opcode::Imm, Some(Operand::Register(2)), Some(Operand::Immediate(2)), None, None),
                Instruction::new(Opcode::Hlt, None, None, None, None),
            ])
            .unwrap();
        emulator.pause();

        let (host, executor) = channel();
        executor.install(&mut emulator);

        let handle = std::thread::spawn(move || {
            emulator.execute();
            emulator
        });

        assert!(matches!(host.recv().unwrap(), Report::Open));
        match host.recv().unwrap() {
            Report::Status(status) => assert_eq!(status.registers.get("R1"), Some(&0)),
            other => panic!("expected a status frame, got {other:?}"),
        }
        host.send(Command::Step).unwrap();

        // `step` executes exactly one instruction and re-enters the break
        // callback rather than running on, so a second open/status pair
        // must arrive before the program is allowed to close.
        assert!(matches!(host.recv().unwrap(), Report::Open));
        match host.recv().unwrap() {
            Report::Status(status) => assert_eq!(status.registers.get("R1"), Some(&1)),
            other => panic!("expected a status frame, got {other:?}"),
        }

        host.send(Command::Continue).unwrap();
        assert!(matches!(host.recv().unwrap(), Report::Close));

        let emulator = handle.join().unwrap();
        assert_eq!(emulator.read_register(1), 1);
        assert_eq!(emulator.read_register(2), 2);
    }
}
