use serde::{Deserialize, Serialize};

use crate::app::SESSION;
use crate::panes::{Pane, PaneDisplay, PaneTree};

use super::UrclPane;

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct MemoryPane {
    address_input: String,
}

impl PaneDisplay for MemoryPane {
    fn render(&mut self, ui: &mut egui::Ui) {
        let mut guard = SESSION.lock().unwrap();
        let Some(session) = guard.as_mut() else {
            ui.label("No program loaded.");
            return;
        };

        ui.horizontal(|ui| {
            ui.label("Address:");
            ui.add(egui::TextEdit::singleline(&mut self.address_input).desired_width(80.0));
            if ui.button("Read").clicked() {
                if let Ok(address) = self.address_input.trim().parse::<u64>() {
                    session.query_memory(address);
                }
            }
        });
        if let Some((address, value)) = session.last_memory {
            ui.monospace(format!("mem[{address}] = {value}"));
        }

        ui.separator();
        ui.label("Stack (SP .. SP+N):");
        let stack = session.status.as_ref().map(|s| s.stack.clone()).unwrap_or_default();
        egui::ScrollArea::vertical().max_height(200.0).show(ui, |ui| {
            egui::Grid::new("urcl_stack_grid").striped(true).show(ui, |ui| {
                for (address, value) in &stack {
                    ui.monospace(format!("{address}"));
                    ui.monospace(format!("{value}"));
                    ui.end_row();
                }
            });
        });
    }

    fn title(&self) -> impl Into<egui::WidgetText> {
        "Memory"
    }

    fn children() -> PaneTree {
        PaneTree::Pane(
            "Memory".to_string(),
            Pane::UrclPanes(Box::new(UrclPane::Memory(MemoryPane::default()))),
        )
    }
}
