use serde::{Deserialize, Serialize};

use crate::app::SESSION;
use crate::panes::{Pane, PaneDisplay, PaneTree};

use super::UrclPane;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct RegistersPane;

impl PaneDisplay for RegistersPane {
    fn render(&mut self, ui: &mut egui::Ui) {
        let guard = SESSION.lock().unwrap();
        let Some(status) = guard.as_ref().and_then(|s| s.status.as_ref()) else {
            ui.label("Not paused.");
            return;
        };

        let mut generals: Vec<(u32, &String, &u64)> = Vec::new();
        let mut specials: Vec<(&String, &u64)> = Vec::new();
        for (name, value) in &status.registers {
            match name.strip_prefix('R').and_then(|n| n.parse::<u32>().ok()) {
                Some(index) => generals.push((index, name, value)),
                None => specials.push((name, value)),
            }
        }
        specials.sort_by_key(|(name, _)| name.as_str());
        generals.sort_by_key(|(index, _, _)| *index);

        egui::Grid::new("urcl_registers_grid").striped(true).show(ui, |ui| {
            for (name, value) in specials {
                ui.label(name);
                ui.monospace(format!("{value}"));
                ui.end_row();
            }
            for (_, name, value) in generals {
                ui.label(name);
                ui.monospace(format!("{value}"));
                ui.end_row();
            }
        });
    }

    fn title(&self) -> impl Into<egui::WidgetText> {
        "Registers"
    }

    fn children() -> PaneTree {
        PaneTree::Pane(
            "Registers".to_string(),
            Pane::UrclPanes(Box::new(UrclPane::Registers(RegistersPane))),
        )
    }
}
