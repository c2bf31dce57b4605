use std::collections::HashMap;

use super::instruction::{Opcode, SourceSpan};
use super::{Instruction, Operand};

/// Everything a successful (or partially successful) parse produced:
/// whatever program text did compile, the label table, and every
/// diagnostic collected along the way. Callers only commit to execution
/// once `errors` is empty.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub program: Vec<Instruction>,
    pub labels: HashMap<String, u32>,
    /// `(1-based line, message)`.
    pub errors: Vec<(u32, String)>,
    /// `(1-based line, message)`.
    pub warnings: Vec<(u32, String)>,
}

impl ParseOutcome {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    A,
    B,
    C,
}

impl Slot {
    fn ordinal(self) -> &'static str {
        match self {
            Slot::A => "First",
            Slot::B => "Second",
            Slot::C => "Third",
        }
    }

    fn missing_message(self, op: &str) -> String {
        let which = match self {
            Slot::A => "first",
            Slot::B => "second",
            Slot::C => "third",
        };
        format!("Missing {which} operand of {op}.")
    }
}

/// A reference to a not-yet-defined label: the instruction slot to patch
/// once the definition is reached, plus the line to blame if it never is.
struct ForwardRef {
    instruction_index: usize,
    slot: Slot,
    line_index: usize,
}

/// Line-oriented source parser. Stateless across calls —
/// construct one per parse.
pub struct Parser;

impl Parser {
    pub fn parse(source: &str, source_name: &str) -> ParseOutcome {
        let mut outcome = ParseOutcome::default();
        let mut unmarked: HashMap<String, Vec<ForwardRef>> = HashMap::new();

        for (line_index, raw_line) in source.lines().enumerate() {
            let line = normalize_line(raw_line);
            if line.is_empty() {
                continue;
            }

            let mut warnings = Vec::new();
            let errors = parse_line(&line, line_index, source_name, &mut outcome, &mut unmarked, &mut warnings);
            for error in errors {
                outcome.errors.push((line_index as u32 + 1, error));
            }
            for warning in warnings {
                outcome.warnings.push((line_index as u32 + 1, warning));
            }
        }

        for (name, refs) in unmarked {
            for reference in refs {
                outcome.errors.push((reference.line_index as u32 + 1, format!("\"{name}\" is undefined.")));
            }
        }

        outcome
    }
}

fn normalize_line(raw: &str) -> String {
    let without_comment = match raw.find("//") {
        Some(idx) => &raw[..idx],
        None => raw,
    };
    collapse_whitespace(without_comment.trim())
}

/// Collapse interior runs of whitespace (optionally preceded by a comma)
/// into a single space, matching the source's `,?\s+` pattern.
fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ',' || c.is_whitespace() {
            while chars.peek().is_some_and(|c| c.is_whitespace()) {
                chars.next();
            }
            result.push(' ');
        } else {
            result.push(c);
        }
    }
    result.trim().to_string()
}

#[allow(clippy::too_many_arguments)]
fn parse_line(
    line: &str,
    line_index: usize,
    source_name: &str,
    outcome: &mut ParseOutcome,
    unmarked: &mut HashMap<String, Vec<ForwardRef>>,
    warnings: &mut Vec<String>,
) -> Vec<String> {
    let mut errors = Vec::new();

    if let Some(name) = line.strip_prefix('.') {
        if name.contains(' ') || line.contains(' ') {
            errors.push("Invalid syntax.".to_string());
            return errors;
        }
        let address = outcome.program.len() as u32;
        outcome.labels.insert(line.to_string(), address);
        if let Some(refs) = unmarked.remove(line) {
            for reference in refs {
                patch_label(&mut outcome.program, &reference, address);
            }
        }
        return errors;
    }

    let parts: Vec<&str> = line.split(' ').collect();
    let operation = parts[0].to_uppercase();

    let mut operand_at = |idx: usize, errors: &mut Vec<String>| -> Option<Operand> {
        let token = *parts.get(idx)?;
        match parse_operand(token, &outcome.labels, warnings) {
            Ok(operand) => Some(operand),
            Err(message) => {
                errors.push(message);
                None
            }
        }
    };

    let a = operand_at(1, &mut errors);
    let b = operand_at(2, &mut errors);
    let c = operand_at(3, &mut errors);

    let Some(opcode) = Opcode::from_mnemonic(&operation) else {
        errors.push(format!("Unknown operation \"{operation}\"."));
        return errors;
    };

    let operand_count = parts.len() - 1;
    let slots = opcode.spec().slots;
    let plural = |n: usize| if n == 1 { "was" } else { "were" };

    for (slot, value, present) in [(Slot::A, &a, parts.len() > 1), (Slot::B, &b, parts.len() > 2), (Slot::C, &c, parts.len() > 3)] {
        let expected = match slot {
            Slot::A => slots.first(),
            Slot::B => slots.get(1),
            Slot::C => slots.get(2),
        };
        match (expected, value, present) {
            (Some(_), None, true) => {}
            (Some(_), None, false) => errors.push(slot.missing_message(&operation)),
            (Some(kind), Some(operand), _) => {
                if !kind.accepts(operand) {
                    errors.push(format!("{} operand of {operation} must match the type of {}.", slot.ordinal(), kind.display_name()));
                }
            }
            (None, Some(_), _) => {
                let allowed = slots.len();
                let was_were = plural(operand_count);
                errors.push(if allowed == 0 {
                    format!("{operation} takes no operands but {operand_count} {was_were} specified.")
                } else {
                    let s = if allowed == 1 { "" } else { "s" };
                    format!("{operation} takes {allowed} operand{s} but {operand_count} {was_were} specified.")
                });
            }
            (None, None, _) => {}
        }
    }

    if !errors.is_empty() {
        return errors;
    }

    // Only an instruction that actually gets pushed can be patched later;
    // register each unresolved label's slot now that we know this one will.
    let instruction_index = outcome.program.len();
    for (slot, operand) in [(Slot::A, &a), (Slot::B, &b), (Slot::C, &c)] {
        if let Some(Operand::Label { name, address: None }) = operand {
            unmarked.entry(name.clone()).or_default().push(ForwardRef { instruction_index, slot, line_index });
        }
    }

    let instruction = Instruction::new(opcode, a, b, c, Some(SourceSpan { source_name: source_name.to_string(), line_index: line_index as i64 }));
    outcome.program.push(instruction);
    errors
}

fn patch_label(program: &mut [Instruction], reference: &ForwardRef, address: u32) {
    let operand = match reference.slot {
        Slot::A => &mut program[reference.instruction_index].a,
        Slot::B => &mut program[reference.instruction_index].b,
        Slot::C => &mut program[reference.instruction_index].c,
    };
    if let Some(Operand::Label { address: a, .. }) = operand {
        *a = Some(address);
    }
}

fn parse_operand(token: &str, labels: &HashMap<String, u32>, warnings: &mut Vec<String>) -> Result<Operand, String> {
    if token.is_empty() {
        return Err("Empty operand.".to_string());
    }
    let first = token.chars().next().unwrap();

    if first == '.' && token.len() > 1 {
        let existing = labels.get(token).copied();
        return Ok(Operand::Label { name: token.to_string(), address: existing });
    }

    if first == '%' && token.len() > 1 {
        return Ok(Operand::Port { name: token[1..].to_string(), id: None });
    }

    if (first == 'R' || first == 'r' || first == '$') && token.len() > 1 {
        if let Ok(index) = token[1..].parse::<u32>() {
            return Ok(Operand::Register(index));
        }
    }

    if first.is_ascii_digit() || first == '-' {
        if let Some(value) = parse_immediate(token) {
            return Ok(Operand::Immediate(value));
        }
    } else if first.is_alphabetic() {
        let name = token.to_uppercase();
        if name != "PC" && name != "SP" {
            warnings.push(format!("Use of non-standard register \"{name}\"."));
        }
        return Ok(Operand::SpecialRegister { name, id: None });
    }

    Err(format!("Invalid operand \"{token}\"."))
}

fn parse_immediate(token: &str) -> Option<u64> {
    if let Some(sign_rest) = token.strip_prefix('-') {
        let value: i64 = sign_rest.parse().ok().map(|v: i64| -v)?;
        return Some(value as u64);
    }
    let upper = token.to_uppercase();
    if token.len() >= 3 {
        if let Some(rest) = upper.strip_prefix("0X") {
            return u64::from_str_radix(rest, 16).ok();
        }
        if let Some(rest) = upper.strip_prefix("0O") {
            return u64::from_str_radix(rest, 8).ok();
        }
        if let Some(rest) = upper.strip_prefix("0B") {
            return u64::from_str_radix(rest, 2).ok();
        }
    }
    token.parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_referenced_label_resolves() {
        let outcome = Parser::parse("JMP .L\nHLT\n.L HLT\n", "t");
        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
        assert_eq!(outcome.labels.get(".L"), Some(&2));
        match &outcome.program[0].a {
            Some(Operand::Label { address, .. }) => assert_eq!(*address, Some(2)),
            other => panic!("expected a patched label operand, got {other:?}"),
        }
    }

    #[test]
    fn undefined_label_is_an_error_per_reference() {
        let outcome = Parser::parse("JMP .NOPE\n", "t");
        assert_eq!(outcome.errors, vec![(1, "\"\u{2e}NOPE\" is undefined.".to_string())]);
    }

    #[test]
    fn unknown_opcode_is_reported() {
        let outcome = Parser::parse("FROB R1\n", "t");
        assert_eq!(outcome.errors, vec![(1, "Unknown operation \"FROB\".".to_string())]);
    }

    #[test]
    fn missing_operand_is_reported_with_ordinal() {
        let outcome = Parser::parse("ADD R1 R2\n", "t");
        assert_eq!(outcome.errors, vec![(1, "Missing third operand of ADD.".to_string())]);
    }

    #[test]
    fn operand_kind_mismatch_is_reported() {
        let outcome = Parser::parse("LOD 5 R1\n", "t");
        assert_eq!(outcome.errors, vec![(1, "First operand of LOD must match the type of Register.".to_string())]);
    }

    #[test]
    fn non_standard_special_register_warns() {
        let outcome = Parser::parse("MOV FLAG PC\n", "t");
        assert_eq!(outcome.warnings, vec![(1, "Use of non-standard register \"FLAG\".".to_string())]);
    }

    #[test]
    fn extra_operand_is_reported() {
        let outcome = Parser::parse("HLT R1\n", "t");
        assert_eq!(outcome.errors, vec![(1, "HLT takes no operands but 1 was specified.".to_string())]);
    }

    #[test]
    fn hex_octal_binary_immediates_parse() {
        let outcome = Parser::parse("IMM R1 0x10\nIMM R2 0o17\nIMM R3 0b101\n", "t");
        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
        assert_eq!(outcome.program[0].b, Some(Operand::Immediate(16)));
        assert_eq!(outcome.program[1].b, Some(Operand::Immediate(15)));
        assert_eq!(outcome.program[2].b, Some(Operand::Immediate(5)));
    }

    #[test]
    fn comment_and_whitespace_are_normalized() {
        let outcome = Parser::parse("  IMM   R1,   5  // set r1\n", "t");
        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
        assert_eq!(outcome.program[0].b, Some(Operand::Immediate(5)));
    }

    #[test]
    fn label_line_with_interior_space_is_invalid_syntax() {
        let outcome = Parser::parse(".L ABEL\n", "t");
        assert_eq!(outcome.errors, vec![(1, "Invalid syntax.".to_string())]);
    }
}
