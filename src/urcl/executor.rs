use super::{Emulator, Machine, Word};

impl Emulator {
    /// Run until the running flag clears: the program counter walks off the
    /// end of the ROM, `HLT` executes, or a debug pause with no registered
    /// callback is reached (in which case `step` simply stops advancing).
    pub fn execute(&mut self) {
        self.running = true;
        while self.running {
            self.step();
        }
    }

    /// One iteration of the fetch/dispatch loop. Consults
    /// go-points and breakpoints before deciding whether to run the
    /// instruction or hand control to the break callback.
    pub fn step(&mut self) {
        let address = self.pc();
        if address >= self.program_rom.len() as Word {
            self.running = false;
            return;
        }

        if self.gopoints.remove(&(address as u32)) {
            self.debugging = true;
        } else if !self.breakpoints.is_empty() {
            if let Some(line) = self.current_line() {
                if self.breakpoints.contains(&line) {
                    self.debugging = true;
                }
            }
        }

        if self.debugging && self.break_callback.is_some() {
            let mut callback = self.break_callback.take().expect("checked above");
            callback(self);
            self.break_callback = Some(callback);
        } else {
            self.step_into();
        }
    }

    /// Execute exactly the current instruction, tick its hot-path counter,
    /// and (if still running) advance `PC` by one. Branches land on their
    /// target because they write `target - 1` and rely on this increment.
    pub fn step_into(&mut self) {
        let address = self.pc();
        self.mark_hotpath(address);

        let instruction = self
            .program_rom
            .get(address as usize)
            .expect("step_into called with PC outside the ROM")
            .clone();

        if let Err(trap) = instruction.execute(self) {
            tracing::error!(%trap, address, "runtime trap, halting");
            self.running = false;
            return;
        }

        if self.running {
            self.set_pc(self.pc() + 1);
        }
    }

    /// Run through a `CAL` and its callee without pausing inside it: set a
    /// go-point at the next instruction, then run one step.
    pub fn step_over(&mut self) {
        self.gopoints.insert((self.pc() + 1) as u32);
        self.step_into();
        self.debugging = false;
    }

    /// Run until the current function returns: set a go-point at the
    /// instruction after the innermost pending `CAL` (if any), then run one
    /// step.
    pub fn step_out(&mut self) {
        if let Some(frame) = self.call_stack.last() {
            self.gopoints.insert((frame.call_site + 1) as u32);
        }
        self.step_into();
        self.debugging = false;
    }

    /// Leave the debug state without advancing; the next `step` call resumes
    /// normal execution.
    pub fn resume(&mut self) {
        self.debugging = false;
    }

    /// Force the very next `step` to hand control to the break callback,
    /// even with no breakpoint or go-point set. A host uses this to load a
    /// program paused at its first instruction rather than running it
    /// straight through.
    pub fn pause(&mut self) {
        self.debugging = true;
    }

    /// Attribute one execution tick to the function owning `address`, then
    /// recurse up the call-source stack so every pending call site also
    /// gets a tick for this step. An instruction with no source annotation
    /// (injected/spliced code) records no tick at all.
    pub(super) fn mark_hotpath(&mut self, address: Word) {
        self.mark_hotpath_indexed(address, -1);
    }

    /// `source_index < 0` means "called for the currently-executing
    /// instruction"; `source_index >= 0` means "called recursively while
    /// attributing ticks to an enclosing call site", and indexes into
    /// `call_stack` one frame further out each recursion.
    fn mark_hotpath_indexed(&mut self, address: Word, source_index: i64) {
        let Some(line) = self
            .instruction_at(address)
            .and_then(|i| i.source.as_ref())
            .map(|s| (s.line_index + 1) as u32)
        else {
            return;
        };

        let function = if source_index < 0 {
            match self.call_stack.last() {
                Some(frame) => self.address_name(frame.function_entry),
                None => "0".to_string(),
            }
        } else if self.call_stack.len() > 1 {
            self.address_name(self.call_stack[(source_index - 1) as usize].function_entry)
        } else {
            "0".to_string()
        };
        self.hotpaths.tick(function, line);

        if source_index != 0 && !self.call_stack.is_empty() {
            let next_index = if source_index < 0 {
                self.call_stack.len() as i64 - 1
            } else {
                source_index - 1
            };
            let call_site = self.call_stack[next_index as usize].call_site;
            self.mark_hotpath_indexed(call_site, next_index);
        }
    }
}
