use serde::{Deserialize, Serialize};

use crate::app::SESSION;
use crate::panes::{Pane, PaneDisplay, PaneTree};
use crate::urcl::debug::Command;

use super::UrclPane;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct IoPane {
    input: String,
}

impl PaneDisplay for IoPane {
    fn render(&mut self, ui: &mut egui::Ui) {
        let mut guard = SESSION.lock().unwrap();
        let Some(session) = guard.as_mut() else {
            ui.label("No program loaded.");
            return;
        };

        ui.label("TEXT port output:");
        let output: String = session.output.iter().map(|&word| (word as u8) as char).collect();
        egui::ScrollArea::vertical().max_height(200.0).show(ui, |ui| {
            ui.monospace(output);
        });

        ui.separator();
        ui.horizontal(|ui| {
            ui.add(egui::TextEdit::singleline(&mut self.input).hint_text("input for IN"));
            if ui.button("Send").clicked() {
                for byte in self.input.bytes() {
                    let _ = session.host.send(Command::Io(byte as u64));
                }
                self.input.clear();
            }
        });
    }

    fn title(&self) -> impl Into<egui::WidgetText> {
        "I/O"
    }

    fn children() -> PaneTree {
        PaneTree::Pane("I/O".to_string(), Pane::UrclPanes(Box::new(UrclPane::Io(IoPane::default()))))
    }
}
