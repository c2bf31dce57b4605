mod call_stack;
mod controls;
mod editor;
mod io;
mod memory;
mod registers;

use super::PaneDisplay;
use super::PaneTree;
use serde::{Deserialize, Serialize};

pub use call_stack::CallStackPane;
pub use controls::ControlsPane;
pub use editor::EditorPane;
pub use io::IoPane;
pub use memory::MemoryPane;
pub use registers::RegistersPane;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrclPane {
    Editor(EditorPane),
    Controls(ControlsPane),
    Registers(RegistersPane),
    Memory(MemoryPane),
    CallStack(CallStackPane),
    Io(IoPane),
}

impl PaneDisplay for UrclPane {
    fn title(&self) -> impl Into<egui::WidgetText> {
        match self {
            UrclPane::Editor(pane) => pane.title().into(),
            UrclPane::Controls(pane) => pane.title().into(),
            UrclPane::Registers(pane) => pane.title().into(),
            UrclPane::Memory(pane) => pane.title().into(),
            UrclPane::CallStack(pane) => pane.title().into(),
            UrclPane::Io(pane) => pane.title().into(),
        }
    }

    fn render(&mut self, ui: &mut egui::Ui) {
        match self {
            UrclPane::Editor(pane) => pane.render(ui),
            UrclPane::Controls(pane) => pane.render(ui),
            UrclPane::Registers(pane) => pane.render(ui),
            UrclPane::Memory(pane) => pane.render(ui),
            UrclPane::CallStack(pane) => pane.render(ui),
            UrclPane::Io(pane) => pane.render(ui),
        }
    }

    fn children() -> PaneTree {
        PaneTree::Children(
            "URCL".to_owned(),
            vec![
                EditorPane::children(),
                ControlsPane::children(),
                RegistersPane::children(),
                MemoryPane::children(),
                CallStackPane::children(),
                IoPane::children(),
            ],
        )
    }
}
