use serde::{Deserialize, Serialize};

use crate::app::SESSION;
use crate::panes::{Pane, PaneDisplay, PaneTree};

use super::UrclPane;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct CallStackPane;

impl PaneDisplay for CallStackPane {
    fn render(&mut self, ui: &mut egui::Ui) {
        let guard = SESSION.lock().unwrap();
        let Some(status) = guard.as_ref().and_then(|s| s.status.as_ref()) else {
            ui.label("Not paused.");
            return;
        };

        ui.label("Call stack (innermost first):");
        egui::Grid::new("urcl_call_stack_grid").striped(true).show(ui, |ui| {
            for (address, label) in status.call_stack.iter().rev() {
                ui.monospace(format!("{address}"));
                ui.label(label.as_deref().unwrap_or("?"));
                ui.end_row();
            }
        });

        ui.separator();
        ui.label("Hot paths (fraction of ticks per line):");
        egui::ScrollArea::vertical().max_height(200.0).show(ui, |ui| {
            let mut functions: Vec<_> = status.hotpaths.iter().collect();
            functions.sort_by_key(|(name, _)| name.as_str());
            for (function, lines) in functions {
                ui.collapsing(function, |ui| {
                    let mut lines: Vec<_> = lines.iter().collect();
                    lines.sort_by_key(|(line, _)| **line);
                    for (line, fraction) in lines {
                        ui.label(format!("line {line}: {:.0}%", fraction * 100.0));
                    }
                });
            }
        });
    }

    fn title(&self) -> impl Into<egui::WidgetText> {
        "Call Stack"
    }

    fn children() -> PaneTree {
        PaneTree::Pane(
            "Call Stack".to_string(),
            Pane::UrclPanes(Box::new(UrclPane::CallStack(CallStackPane))),
        )
    }
}
