use std::collections::VecDeque;

use indexmap::IndexMap;
use rand::Rng;

use super::Word;

/// A single named port. `read`/`write` never block inside this trait — true
/// blocking I/O is a property of the host-bridged port a debug controller
/// installs in place of [`TextPort`], not of the core emulator loop.
pub trait Port: Send {
    fn read(&mut self, bit_mask: Word) -> Word;
    fn write(&mut self, value: Word, bit_mask: Word);

    /// Lets [`PortTable::text_port_mut`] reach the concrete `TextPort`
    /// without widening this trait's contract for every other implementor.
    fn as_text_port(&mut self) -> Option<&mut TextPort> {
        None
    }
}

/// The default `TEXT` port: an in-process character queue. A host wanting
/// true interactive I/O replaces this entry in the table with one backed by
/// the debug controller's reports/commands channels; this implementation
/// exists so the core is fully testable and runnable without a host attached.
#[derive(Debug, Default)]
pub struct TextPort {
    input: VecDeque<Word>,
    output: VecDeque<Word>,
}

impl TextPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one character (as a word) for the next `IN` to consume.
    pub fn push_input(&mut self, value: Word) {
        self.input.push_back(value);
    }

    /// Drain everything written by `OUT` since the last drain, in order.
    pub fn drain_output(&mut self) -> Vec<Word> {
        self.output.drain(..).collect()
    }
}

impl Port for TextPort {
    fn read(&mut self, _bit_mask: Word) -> Word {
        self.input.pop_front().unwrap_or(0)
    }

    fn write(&mut self, value: Word, bit_mask: Word) {
        self.output.push_back(value & bit_mask);
    }

    fn as_text_port(&mut self) -> Option<&mut TextPort> {
        Some(self)
    }
}

/// The default `RAND` port: reads return a uniform value in
/// `[0, bit_mask]`; writes are ignored.
#[derive(Debug, Default)]
pub struct RandPort;

impl Port for RandPort {
    fn read(&mut self, bit_mask: Word) -> Word {
        if bit_mask == 0 {
            return 0;
        }
        rand::thread_rng().gen_range(0..=bit_mask)
    }

    fn write(&mut self, _value: Word, _bit_mask: Word) {}
}

/// Name-addressed, insertion-ordered port table. `TEXT` and `RAND` always
/// exist; a host may register more before load, or replace an entry (e.g.
/// swap `TEXT` for a channel-backed implementation).
pub struct PortTable {
    ports: IndexMap<String, Box<dyn Port>>,
}

impl PortTable {
    pub fn with_defaults() -> Self {
        let mut ports: IndexMap<String, Box<dyn Port>> = IndexMap::new();
        ports.insert("TEXT".to_string(), Box::new(TextPort::new()));
        ports.insert("RAND".to_string(), Box::new(RandPort));
        Self { ports }
    }

    pub fn register(&mut self, name: impl Into<String>, port: Box<dyn Port>) {
        self.ports.insert(name.into(), port);
    }

    pub fn id_of(&self, name: &str) -> Option<u32> {
        self.ports.get_index_of(name).map(|i| i as u32)
    }

    pub fn name_of(&self, id: u32) -> Option<&str> {
        self.ports.get_index(id as usize).map(|(name, _)| name.as_str())
    }

    pub fn read(&mut self, id: u32, bit_mask: Word) -> Word {
        match self.ports.get_index_mut(id as usize) {
            Some((_, port)) => port.read(bit_mask),
            None => 0,
        }
    }

    pub fn write(&mut self, id: u32, value: Word, bit_mask: Word) {
        if let Some((_, port)) = self.ports.get_index_mut(id as usize) {
            port.write(value, bit_mask);
        }
    }

    /// The concrete `TextPort`, for a host that wants to push input or
    /// drain output directly rather than through a channel-backed port.
    pub fn text_port_mut(&mut self) -> Option<&mut TextPort> {
        self.ports.get_mut("TEXT").and_then(|port| port.as_text_port())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_port_reads_back_pushed_input() {
        let mut table = PortTable::with_defaults();
        table.text_port_mut().unwrap().push_input(b'A' as Word);
        let id = table.id_of("TEXT").unwrap();
        assert_eq!(table.read(id, 0xFF), b'A' as Word);
    }

    #[test]
    fn text_port_buffers_output_for_the_host_to_drain() {
        let mut table = PortTable::with_defaults();
        let id = table.id_of("TEXT").unwrap();
        table.write(id, b'!' as Word, 0xFF);
        assert_eq!(table.text_port_mut().unwrap().drain_output(), vec![b'!' as Word]);
    }

    #[test]
    fn rand_port_stays_within_the_bit_mask() {
        let mut table = PortTable::with_defaults();
        let id = table.id_of("RAND").unwrap();
        for _ in 0..64 {
            assert!(table.read(id, 0xF) <= 0xF);
        }
    }

    #[test]
    fn unknown_port_name_has_no_id() {
        let table = PortTable::with_defaults();
        assert_eq!(table.id_of("NOPE"), None);
    }
}
