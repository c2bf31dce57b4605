use std::collections::BTreeSet;

use egui::RichText;
use serde::{Deserialize, Serialize};

use crate::app;
use crate::panes::{Pane, PaneDisplay, PaneTree};

use super::UrclPane;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EditorPane {
    program: String,
    /// Register/memory word width in bits; `integer_mask = (1 << bits) - 1`.
    bits: u32,
    breakpoints: BTreeSet<u32>,
    new_breakpoint: String,
    #[serde(skip)]
    errors: Vec<(u32, String)>,
}

impl Default for EditorPane {
    fn default() -> Self {
        Self {
            program: "IMM R1 0\nCAL .COUNT_UP\nHLT\n\n.COUNT_UP\nADD R1 R1 1\nOUT %TEXT R1\nRET\n".to_string(),
            bits: 32,
            breakpoints: BTreeSet::new(),
            new_breakpoint: String::new(),
            errors: Vec::new(),
        }
    }
}

impl PaneDisplay for EditorPane {
    fn render(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical().show(ui, |ui| {
            egui_code_editor::CodeEditor::default()
                .with_syntax(
                    egui_code_editor::Syntax::new("urcl")
                        .with_comment("//")
                        .with_keywords(BTreeSet::from([
                            "LOD", "STR", "CPY", "MOV", "IMM", "ADD", "SUB", "MLT", "DIV", "MOD",
                            "INC", "DEC", "NEG", "RSH", "LSH", "BSR", "BSL", "OR", "AND", "XOR",
                            "NOR", "NAND", "XNOR", "NOT", "JMP", "BRZ", "BNZ", "BEV", "BOD", "BRP",
                            "BRN", "BRC", "BNC", "BRE", "BNE", "BRL", "BRG", "BLE", "BGE", "PSH",
                            "POP", "CAL", "RET", "IN", "OUT", "BREAK", "HLT", "BITS", "NOP",
                        ]))
                        .with_case_sensitive(false),
                )
                .vscroll(false)
                .with_theme(egui_code_editor::ColorTheme::SONOKAI)
                .show(ui, &mut self.program);

            for (line, message) in &self.errors {
                ui.label(
                    RichText::new(format!("Line {line}: {message}"))
                        .small()
                        .color(ui.visuals().warn_fg_color),
                );
            }

            ui.horizontal(|ui| {
                ui.label("Word width:");
                ui.add(egui::DragValue::new(&mut self.bits).range(1..=64).suffix(" bits"));
            });

            ui.horizontal(|ui| {
                ui.label("Breakpoint line:");
                ui.add(egui::TextEdit::singleline(&mut self.new_breakpoint).desired_width(48.0));
                if ui.button("Add").clicked() {
                    if let Ok(line) = self.new_breakpoint.trim().parse::<u32>() {
                        self.breakpoints.insert(line);
                    }
                    self.new_breakpoint.clear();
                }
            });
            ui.horizontal_wrapped(|ui| {
                let mut to_remove = None;
                for &line in &self.breakpoints {
                    if ui.button(format!("{line} ✕")).clicked() {
                        to_remove = Some(line);
                    }
                }
                if let Some(line) = to_remove {
                    self.breakpoints.remove(&line);
                }
            });

            if ui.button("Compile & Run").clicked() {
                let mask = if self.bits >= 64 { u64::MAX } else { (1u64 << self.bits) - 1 };
                let breakpoints: Vec<u32> = self.breakpoints.iter().copied().collect();
                match app::load_and_run(&self.program, mask, &breakpoints) {
                    Ok(()) => self.errors.clear(),
                    Err(errors) => self.errors = errors,
                }
            }
        });
    }

    fn title(&self) -> impl Into<egui::WidgetText> {
        "Editor"
    }

    fn children() -> PaneTree {
        PaneTree::Pane(
            "Editor".to_string(),
            Pane::UrclPanes(Box::new(UrclPane::Editor(EditorPane::default()))),
        )
    }
}
