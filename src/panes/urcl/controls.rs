use serde::{Deserialize, Serialize};

use crate::app::{self, SESSION};
use crate::panes::{Pane, PaneDisplay, PaneTree};
use crate::urcl::debug::Command;

use super::UrclPane;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct ControlsPane;

impl PaneDisplay for ControlsPane {
    fn render(&mut self, ui: &mut egui::Ui) {
        let mut stop_requested = false;
        {
            let mut guard = SESSION.lock().unwrap();
            let Some(session) = guard.as_mut() else {
                ui.label("No program loaded. Compile one from the Editor pane.");
                return;
            };

            if session.finished {
                ui.label("Program finished.");
            } else if session.status.is_some() {
                ui.label("Paused.");
            } else {
                ui.label("Running…");
            }

            ui.horizontal_wrapped(|ui| {
                if ui.add_enabled(!session.finished, egui::Button::new("Step")).clicked() {
                    let _ = session.host.send(Command::Step);
                }
                if ui.add_enabled(!session.finished, egui::Button::new("Step Over")).clicked() {
                    let _ = session.host.send(Command::Over);
                }
                if ui.add_enabled(!session.finished, egui::Button::new("Step Out")).clicked() {
                    let _ = session.host.send(Command::Out);
                }
                if ui.add_enabled(!session.finished, egui::Button::new("Continue")).clicked() {
                    let _ = session.host.send(Command::Continue);
                }
            });

            stop_requested = ui.button("Stop").clicked();

            if let Some(status) = &session.status {
                ui.separator();
                ui.label(match status.line {
                    Some(line) => format!("At line {line}"),
                    None => "At an unmapped instruction".to_string(),
                });
            }
        }

        if stop_requested {
            app::stop_session();
        }
    }

    fn title(&self) -> impl Into<egui::WidgetText> {
        "Controls"
    }

    fn children() -> PaneTree {
        PaneTree::Pane(
            "Controls".to_string(),
            Pane::UrclPanes(Box::new(UrclPane::Controls(ControlsPane))),
        )
    }
}
