#![allow(clippy::upper_case_acronyms)] // URCL mnemonics are all-caps by convention

/// Program counter / call stack movement, the hot-path tick, and the
/// top-level `step`/`execute` loop.
pub mod executor;
/// One variant per opcode, the per-slot operand-kind catalogue, and the
/// compile/execute dispatch.
pub mod instruction;
/// Value representations (register, special register, immediate, label,
/// port) with the uniform load/store/compile contract.
pub mod operand;
/// Line-oriented source parser.
pub mod parser;
/// Name-addressed port table plus the built-in `TEXT`/`RAND` ports.
pub mod ports;
/// Breakpoint/go-point sets and the break-callback handshake that lets a
/// foreign thread drive the emulator over two message queues.
pub mod debug;
#[cfg(test)]
mod tests;

use std::collections::HashMap;

use indexmap::IndexMap;

pub use instruction::{Instruction, Opcode};
pub use operand::Operand;
pub use parser::{ParseOutcome, Parser};
pub use ports::{Port, PortTable};

/// Page size in words. A build-time constant, not a runtime parameter.
pub const PAGE_SIZE: u64 = 0x10000;

/// A masked machine word. URCL's integer width is configurable rather than
/// fixed, so this stores the widest word this emulator supports and callers
/// mask down through [`Emulator::bit_mask`].
pub type Word = u64;

/// Everything an [`Operand`] or [`Instruction`] needs from the machine it
/// runs against. `Emulator` is the only implementor; the trait exists so the
/// operand/instruction layer never reaches into `Emulator`'s fields
/// directly.
pub trait Machine {
    fn read_register(&self, index: u32) -> Word;
    fn write_register(&mut self, index: u32, value: Word);

    /// Resolve (creating on first use) the slot for a special register name.
    fn special_register_id(&mut self, name: &str) -> u32;
    fn read_special_register(&self, id: u32) -> Word;
    fn write_special_register(&mut self, id: u32, value: Word);

    fn read_memory(&self, address: Word) -> Word;
    fn write_memory(&mut self, address: Word, value: Word);

    fn port_id(&self, name: &str) -> Result<u32, CompileError>;
    fn read_port(&mut self, id: u32) -> Word;
    fn write_port(&mut self, id: u32, value: Word);

    fn sign_bit_mask(&self) -> Word;
    fn bit_mask(&self) -> Word;
    fn set_bit_mask(&mut self, bits: u32) -> Result<(), RuntimeTrap>;

    fn halt(&mut self);
    /// Enter the paused (debug) state; does not itself invoke the break
    /// callback — that happens in the `step` loop once the instruction
    /// returns.
    fn enter_debug(&mut self);

    /// Record a new call frame. `call_site` is the raw `PC` of the `CAL`
    /// instruction itself; the callee's entry address is read back from the
    /// machine's current `PC` (already written to `target - 1` by the time
    /// this is called).
    fn indicate_call(&mut self, call_site: Word);
    fn indicate_return(&mut self);
}

/// Failure a parser records against a 1-based source line; never fatal to
/// the parse as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError(pub String);

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::error::Error for CompileError {}

/// A condition that can only be detected while executing a compiled
/// instruction. Halts the executor; no partial recovery is attempted inside
/// the instruction that raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeTrap {
    /// Store attempted against an `Immediate` or `Label` operand.
    NotStorable,
    /// `DIV`/`MOD` with a zero divisor.
    DivideByZero,
    /// `BITS` with `n == 0` (or, in practice, `n > 64`).
    InvalidBitWidth,
}

impl std::fmt::Display for RuntimeTrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeTrap::NotStorable => write!(f, "store into a non-storable operand"),
            RuntimeTrap::DivideByZero => write!(f, "division or modulo by zero"),
            RuntimeTrap::InvalidBitWidth => write!(f, "BITS requires 0 < n <= 64"),
        }
    }
}
impl std::error::Error for RuntimeTrap {}

/// A sparse, page-allocated memory. Missing pages read as zero; the first
/// store into a page allocates it.
#[derive(Debug, Default)]
pub struct PagedMemory {
    pages: HashMap<u64, Box<[Word; PAGE_SIZE as usize]>>,
}

impl PagedMemory {
    pub fn read(&self, address: Word, bit_mask: Word) -> Word {
        let address = wrap_address(address, bit_mask);
        let page = address / PAGE_SIZE;
        let offset = (address % PAGE_SIZE) as usize;
        self.pages.get(&page).map_or(0, |p| p[offset])
    }

    pub fn write(&mut self, address: Word, value: Word, bit_mask: Word) {
        let address = wrap_address(address, bit_mask);
        let page = address / PAGE_SIZE;
        let offset = (address % PAGE_SIZE) as usize;
        let slot = self
            .pages
            .entry(page)
            .or_insert_with(|| Box::new([0; PAGE_SIZE as usize]));
        slot[offset] = value & bit_mask;
    }

    pub fn allocated_pages(&self) -> usize {
        self.pages.len()
    }
}

/// Addresses are unsigned; a negative (two's-complement-looking) input
/// wraps by adding `bit_mask + 1`.
fn wrap_address(address: Word, bit_mask: Word) -> Word {
    let signed = address as i128;
    if signed < 0 {
        (signed + bit_mask as i128 + 1) as u64
    } else {
        address
    }
}

/// Per-function, per-line execution-count histogram, exposed normalised to
/// `[0, 1]`.
#[derive(Debug, Default, Clone)]
pub struct HotPaths {
    by_function: HashMap<String, HashMap<u32, u64>>,
}

impl HotPaths {
    fn tick(&mut self, function: String, line: u32) {
        *self.by_function.entry(function).or_default().entry(line).or_insert(0) += 1;
    }

    /// Normalise each function's line counts to sum to 1.0.
    pub fn normalized(&self) -> HashMap<String, HashMap<u32, f64>> {
        self.by_function
            .iter()
            .map(|(func, lines)| {
                let total: u64 = lines.values().sum();
                let normalized = lines
                    .iter()
                    .map(|(&line, &count)| (line, count as f64 / total as f64))
                    .collect();
                (func.clone(), normalized)
            })
            .collect()
    }
}

/// A call-frame pair recorded by `indicate_call`, popped by `indicate_return`.
/// Resuming after `RET` is handled entirely through the memory-backed
/// return stack; this pair exists only for call-stack display and hot-path
/// attribution.
#[derive(Debug, Clone, Copy)]
struct CallFrame {
    /// Entry address of the function now executing (the `CAL` target).
    function_entry: Word,
    /// Raw `PC` of the `CAL` instruction itself (used for hot-path
    /// attribution of enclosing frames).
    call_site: Word,
}

/// Owns all machine state: registers, memory, ports, the call stack, and the
/// accumulated hot-path counters. Constructed once per program; breakpoints,
/// go-points and hot-paths persist for the emulator's lifetime.
pub struct Emulator {
    general_registers: Vec<Word>,
    special_registers: Vec<Word>,
    special_register_names: IndexMap<String, u32>,
    bit_mask: Word,
    bit_count: u32,
    memory: PagedMemory,
    ports: PortTable,
    call_stack: Vec<CallFrame>,
    hotpaths: HotPaths,
    program_rom: Vec<Instruction>,
    /// address -> label name, populated by the host from the parser's label
    /// map after a successful parse.
    labels: HashMap<Word, String>,
    running: bool,
    debugging: bool,
    breakpoints: std::collections::HashSet<u32>,
    gopoints: std::collections::HashSet<u32>,
    break_callback: Option<Box<dyn FnMut(&mut Emulator) + Send>>,
}

impl Emulator {
    pub fn new(integer_mask: Word) -> Self {
        let mut emulator = Self {
            general_registers: vec![0],
            special_registers: Vec::new(),
            special_register_names: IndexMap::new(),
            bit_mask: 0,
            bit_count: 0,
            memory: PagedMemory::default(),
            ports: PortTable::with_defaults(),
            call_stack: Vec::new(),
            hotpaths: HotPaths::default(),
            program_rom: Vec::new(),
            labels: HashMap::new(),
            running: false,
            debugging: false,
            breakpoints: std::collections::HashSet::new(),
            gopoints: std::collections::HashSet::new(),
            break_callback: None,
        };
        emulator.set_bit_mask_raw(integer_mask);
        // PC and SP always exist, in that order,.
        let _ = emulator.special_register_id("PC");
        let _ = emulator.special_register_id("SP");
        emulator
    }

    fn set_bit_mask_raw(&mut self, mask: Word) {
        self.bit_mask = mask;
        self.bit_count = bit_count(mask);
    }

    pub fn program_len(&self) -> usize {
        self.program_rom.len()
    }

    pub fn instruction_at(&self, address: Word) -> Option<&Instruction> {
        self.program_rom.get(address as usize)
    }

    /// Compile and install a new program ROM, replacing any previous one.
    /// Register/memory/port state is left untouched — only a fresh
    /// `Emulator` resets those.
    pub fn load_program_rom(&mut self, mut program: Vec<Instruction>) -> Result<(), CompileError> {
        for instruction in &mut program {
            instruction.compile(self)?;
        }
        self.program_rom = program;
        Ok(())
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn debugging(&self) -> bool {
        self.debugging
    }

    pub fn pc(&self) -> Word {
        let id = self.special_register_names["PC"];
        self.read_special_register(id)
    }

    fn set_pc(&mut self, value: Word) {
        let id = self.special_register_names["PC"];
        self.write_special_register(id, value);
    }

    pub fn general_registers(&self) -> &[Word] {
        &self.general_registers
    }

    pub fn special_registers(&self) -> impl Iterator<Item = (&str, Word)> + '_ {
        self.special_register_names
            .iter()
            .map(|(name, &id)| (name.as_str(), self.special_registers[id as usize]))
    }

    pub fn call_stack_depth(&self) -> usize {
        self.call_stack.len()
    }

    /// `(address, label-or-none)` for each frame, innermost last.
    pub fn call_stack_view(&self) -> Vec<(Word, Option<String>)> {
        self.call_stack
            .iter()
            .map(|frame| (frame.function_entry, self.label_for_address(frame.function_entry)))
            .collect()
    }

    /// A bounded window of the stack around `SP` (at most 32 words).
    pub fn stack_view(&self) -> Vec<(Word, Word)> {
        let sp = self.special_registers[self.special_register_names["SP"] as usize];
        if sp == 0 {
            return Vec::new();
        }
        let max_sp = if self.bit_mask - sp < 32 {
            self.bit_mask
        } else {
            sp + 32
        };
        (sp..=max_sp)
            .map(|addr| (addr, self.read_memory(addr)))
            .collect()
    }

    pub fn hotpaths(&self) -> &HotPaths {
        &self.hotpaths
    }

    pub fn ports(&self) -> &PortTable {
        &self.ports
    }

    pub fn ports_mut(&mut self) -> &mut PortTable {
        &mut self.ports
    }

    pub fn breakpoints(&self) -> &std::collections::HashSet<u32> {
        &self.breakpoints
    }

    pub fn set_breakpoint(&mut self, line: u32) {
        self.breakpoints.insert(line);
    }

    pub fn remove_breakpoint(&mut self, line: u32) {
        self.breakpoints.remove(&line);
    }

    /// Install (replacing any previous) the callback invoked each time the
    /// emulator enters the debug state. Swapped in by the host before
    /// `execute`.
    pub fn set_break_callback(&mut self, callback: impl FnMut(&mut Emulator) + Send + 'static) {
        self.break_callback = Some(Box::new(callback));
    }

    /// 1-based source line of the instruction about to execute, or `None`
    /// if it carries no source annotation (injected/spliced code).
    pub fn current_line(&self) -> Option<u32> {
        self.instruction_at(self.pc())
            .and_then(|i| i.source.as_ref())
            .map(|s| (s.line_index + 1) as u32)
    }

    /// Record the address a label was defined at, so the call stack and
    /// hot-path views can show names instead of raw addresses.
    pub fn add_label(&mut self, address: Word, name: impl Into<String>) {
        self.labels.insert(address, name.into());
    }

    /// The label at `address`, if the parser defined one there.
    pub fn label_for_address(&self, address: Word) -> Option<String> {
        self.labels.get(&address).cloned()
    }

    /// Resolve an address to a label name, falling back to zero-padded hex
    /// sized to the configured bit width.
    pub fn address_name(&self, address: Word) -> String {
        self.label_for_address(address).unwrap_or_else(|| self.hex_address(address))
    }

    fn hex_address(&self, address: Word) -> String {
        let digits = (self.bit_count.max(1) as usize).div_ceil(4);
        format!("0x{address:0width$X}", width = digits)
    }
}

fn bit_count(mut value: Word) -> u32 {
    let mut result = 0;
    while value > 0 {
        result += 1;
        value >>= 1;
    }
    result
}

impl Machine for Emulator {
    fn read_register(&self, index: u32) -> Word {
        self.general_registers.get(index as usize).copied().unwrap_or(0)
    }

    fn write_register(&mut self, index: u32, value: Word) {
        if index == 0 {
            return;
        }
        if self.general_registers.len() <= index as usize {
            self.general_registers.resize(index as usize + 1, 0);
        }
        self.general_registers[index as usize] = value & self.bit_mask;
    }

    fn special_register_id(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.special_register_names.get(name) {
            return id;
        }
        let id = self.special_registers.len() as u32;
        self.special_register_names.insert(name.to_string(), id);
        self.special_registers.push(0);
        id
    }

    fn read_special_register(&self, id: u32) -> Word {
        self.special_registers[id as usize]
    }

    fn write_special_register(&mut self, id: u32, value: Word) {
        self.special_registers[id as usize] = value & self.bit_mask;
    }

    fn read_memory(&self, address: Word) -> Word {
        self.memory.read(address, self.bit_mask)
    }

    fn write_memory(&mut self, address: Word, value: Word) {
        self.memory.write(address, value, self.bit_mask);
    }

    fn port_id(&self, name: &str) -> Result<u32, CompileError> {
        self.ports
            .id_of(name)
            .ok_or_else(|| CompileError(format!("Port \"{name}\" does not exist.")))
    }

    fn read_port(&mut self, id: u32) -> Word {
        self.ports.read(id, self.bit_mask)
    }

    fn write_port(&mut self, id: u32, value: Word) {
        self.ports.write(id, value, self.bit_mask);
    }

    fn sign_bit_mask(&self) -> Word {
        1u64.checked_shl(self.bit_count.saturating_sub(1)).unwrap_or(0)
    }

    fn bit_mask(&self) -> Word {
        self.bit_mask
    }

    fn set_bit_mask(&mut self, bits: u32) -> Result<(), RuntimeTrap> {
        if bits == 0 || bits > 64 {
            return Err(RuntimeTrap::InvalidBitWidth);
        }
        let mask = if bits == 64 { u64::MAX } else { (1u64 << bits) - 1 };
        self.set_bit_mask_raw(mask);
        Ok(())
    }

    fn halt(&mut self) {
        self.running = false;
    }

    fn enter_debug(&mut self) {
        self.debugging = true;
    }

    fn indicate_call(&mut self, call_site: Word) {
        let function_entry = self.pc().wrapping_add(1);
        self.call_stack.push(CallFrame { function_entry, call_site });
    }

    fn indicate_return(&mut self) {
        self.call_stack.pop();
    }
}
