use std::collections::HashMap;
use std::sync::Mutex;
use std::thread::JoinHandle;

use egui::Theme;
use egui_dock::{AllowedSplits, DockArea, DockState, NodeIndex, Style, SurfaceIndex, TabViewer};
use lazy_static::lazy_static;

use crate::panes::{Pane, PaneDisplay, UrclPane};
use crate::theme::{self, BaseThemeChoice};
use crate::urcl::debug::{channel, Command, HostHandle, Report, StatusFrame};
use crate::urcl::parser::Parser;
use crate::urcl::{Emulator, Word};

/// One loaded program: the background thread driving it, and the host-side
/// channel handle through which the UI steps it and reads its status.
pub struct Session {
    pub host: HostHandle,
    thread: Option<JoinHandle<Emulator>>,
    pub labels: HashMap<String, u32>,
    pub status: Option<StatusFrame>,
    pub finished: bool,
    /// Set when the UI sends a `memory` query, cleared once the matching
    /// reply lands in `last_memory`.
    pending_memory: Option<Word>,
    pub last_memory: Option<(Word, Word)>,
    /// Everything the `TEXT` port has written, oldest first.
    pub output: Vec<Word>,
}

impl Session {
    /// Drains every report the executor thread has queued without
    /// blocking. Call once per UI frame.
    pub fn poll(&mut self) {
        loop {
            match self.host.try_recv() {
                Ok(Report::Status(status)) => self.status = Some(status),
                Ok(Report::Memory(value)) => {
                    if let Some(address) = self.pending_memory.take() {
                        self.last_memory = Some((address, value));
                    }
                }
                Ok(Report::Io(value)) => self.output.push(value),
                Ok(Report::Close) => self.finished = true,
                Ok(Report::Open) => {}
                Err(_) => break,
            }
        }
    }

    pub fn query_memory(&mut self, address: Word) {
        self.pending_memory = Some(address);
        let _ = self.host.send(Command::Memory(address));
    }
}

lazy_static! {
    pub static ref SESSION: Mutex<Option<Session>> = Mutex::new(None);
}
#[cfg(not(target_arch = "wasm32"))]
lazy_static! {
    pub static ref LAST_PAINT_ID: Mutex<u64> = Mutex::new(0); // this is pretty botch, more info later
}

/// Parse `source`, load it into a fresh [`Emulator`] paused at its first
/// instruction, and hand it to a background thread driven through the debug
/// channel pair. Replaces (and cooperatively shuts down) any prior session.
pub fn load_and_run(source: &str, integer_mask: Word, breakpoints: &[u32]) -> Result<(), Vec<(u32, String)>> {
    let outcome = Parser::parse(source, "program");
    if !outcome.is_ok() {
        return Err(outcome.errors);
    }

    let mut emulator = Emulator::new(integer_mask);
    if let Err(error) = emulator.load_program_rom(outcome.program) {
        return Err(vec![(0, error.0)]);
    }
    for (name, address) in &outcome.labels {
        emulator.add_label(*address as Word, name.clone());
    }
    for &line in breakpoints {
        emulator.set_breakpoint(line);
    }
    emulator.pause();

    let (host, executor) = channel();
    executor.install(&mut emulator);

    let thread = std::thread::spawn(move || {
        emulator.execute();
        emulator
    });

    stop_session();
    *SESSION.lock().unwrap() = Some(Session {
        host,
        thread: Some(thread),
        labels: outcome.labels,
        status: None,
        finished: false,
        pending_memory: None,
        last_memory: None,
        output: Vec::new(),
    });
    Ok(())
}

/// Ask the current session's executor to close and join its thread. A
/// no-op if no session is loaded.
pub fn stop_session() {
    let mut slot = SESSION.lock().unwrap();
    if let Some(mut session) = slot.take() {
        let _ = session.host.send(Command::Close);
        if let Some(thread) = session.thread.take() {
            let _ = thread.join();
        }
    }
}

#[derive(Default)]
struct TreeBehavior {
    added_nodes: Vec<Pane>,
    last_added: Option<(NodeIndex, SurfaceIndex)>,
}

impl TabViewer for TreeBehavior {
    type Tab = Pane;

    fn title(&mut self, tab: &mut Self::Tab) -> egui::WidgetText {
        tab.title().into()
    }

    fn ui(&mut self, ui: &mut egui::Ui, tab: &mut Self::Tab) {
        tab.render(ui);
    }

    fn add_popup(&mut self, ui: &mut egui::Ui, surface: egui_dock::SurfaceIndex, node: NodeIndex) {
        ui.set_min_width(60.0); // this is vaguely the size of the "Panes" button
        ui.style_mut().visuals.button_frame = false;

        self.add_pane_menu_items(ui, Pane::children());
        self.last_added = Some((node, surface));
    }
}
impl TreeBehavior {
    fn add_pane_menu_items(&mut self, ui: &mut egui::Ui, pane_tree: crate::panes::PaneTree) {
        match pane_tree {
            crate::panes::PaneTree::Pane(name, pane_variant) => {
                ui.style_mut().visuals.button_frame = false;
                if ui.button(name).clicked() {
                    // Queue the pane and the target node ID for addition in the next frame
                    self.added_nodes.push(pane_variant);
                    ui.close();
                }
            }
            crate::panes::PaneTree::Children(name, children) => {
                ui.style_mut().visuals.button_frame = false;
                ui.menu_button(name, |ui| {
                    for child in children {
                        self.add_pane_menu_items(ui, child);
                    }
                });
            }
        }
    }
}

pub struct TemplateApp {
    dock_state: DockState<Pane>,
    tree_behavior: TreeBehavior,
    #[cfg(target_arch = "wasm32")]
    has_dismissed_fps: bool,
    #[cfg(target_arch = "wasm32")]
    bad_fps_score: u32,
    #[cfg(target_arch = "wasm32")]
    curr_bad_fps_prompt_open: bool,
}

impl Default for TemplateApp {
    fn default() -> Self {
        let span = tracing::info_span!("TemplateApp::default");
        let _guard = span.enter();

        tracing::info!("Creating new TemplateApp with the default URCL layout");

        let editor_pane = Pane::UrclPanes(Box::new(UrclPane::Editor(
            crate::panes::urcl::EditorPane::default(),
        )));
        let registers_pane = Pane::UrclPanes(Box::new(UrclPane::Registers(
            crate::panes::urcl::RegistersPane::default(),
        )));
        let controls_pane = Pane::UrclPanes(Box::new(UrclPane::Controls(
            crate::panes::urcl::ControlsPane::default(),
        )));
        let memory_pane = Pane::UrclPanes(Box::new(UrclPane::Memory(
            crate::panes::urcl::MemoryPane::default(),
        )));
        let call_stack_pane = Pane::UrclPanes(Box::new(UrclPane::CallStack(
            crate::panes::urcl::CallStackPane::default(),
        )));
        let io_pane = Pane::UrclPanes(Box::new(UrclPane::Io(crate::panes::urcl::IoPane::default())));

        let mut dock_state = DockState::new(vec![editor_pane]);
        let root_id = NodeIndex::root();

        dock_state
            .main_surface_mut()
            .split_left(root_id, 0.25, vec![controls_pane]);

        dock_state
            .main_surface_mut()
            .split_right(root_id, 0.7, vec![registers_pane, call_stack_pane]);

        dock_state
            .main_surface_mut()
            .split_below(root_id, 0.65, vec![memory_pane, io_pane]);

        tracing::info!("TemplateApp initialization complete");
        Self {
            dock_state,
            tree_behavior: TreeBehavior::default(),
            #[cfg(target_arch = "wasm32")]
            has_dismissed_fps: false,
            #[cfg(target_arch = "wasm32")]
            bad_fps_score: 0,
            #[cfg(target_arch = "wasm32")]
            curr_bad_fps_prompt_open: false,
        }
    }
}

impl TemplateApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let span = tracing::info_span!("TemplateApp::new");
        let _guard = span.enter();

        theme::set_global_theme(BaseThemeChoice::Dark, Some(&cc.egui_ctx));

        Default::default()
    }
}

impl eframe::App for TemplateApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, _storage: &mut dyn eframe::Storage) {}

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let update_span = tracing::info_span!("TemplateApp::update");
        let _update_guard = update_span.enter();

        if let Some(session) = SESSION.lock().unwrap().as_mut() {
            session.poll();
        }

        #[cfg(target_arch = "wasm32")]
        if !self.has_dismissed_fps {
            let fps = ctx.input(|i| i.stable_dt);
            if fps < 50.0 {
                self.bad_fps_score += 1;
            } else {
                self.bad_fps_score -= 1;
            }

            if self.bad_fps_score >= 300 {
                self.curr_bad_fps_prompt_open = true;
            }
        }

        #[cfg(target_arch = "wasm32")]
        if self.curr_bad_fps_prompt_open {
            egui::Window::new("Bad fps detected").collapsible(false).show(ctx, |ui| {
                ui.horizontal_wrapped(|ui| {
                    use egui::{Hyperlink, RichText};

                    ui.label("It seems you have bad fps on the web version of the tool. The desktop version is likely to run far better. You can find downloads");
                    ui.add(Hyperlink::from_label_and_url(RichText::new("here").strong(), "https://github.com/JackCrumpLeys/textbook210_emulator/releases/tag/main").open_in_new_tab(true));
                    ui.label(".");
                });
                ui.separator();
                ui.horizontal_top(|ui| {
                    if ui.button("Ok").clicked() {
                        self.curr_bad_fps_prompt_open = false;
                        self.has_dismissed_fps = true;
                    }
                })
            });
        }

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            // The top panel is often a good place for a menu bar:
            #[allow(deprecated)] // idk what egui is on about here
            egui::menu::bar(ui, |ui| {
                // File Menu (standard)
                let is_web = cfg!(target_arch = "wasm32");
                if !is_web {
                    ui.menu_button("File", |ui| {
                        if ui.button("Quit").clicked() {
                            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                        }
                    });
                    ui.add_space(16.0);
                }
                // Windows Menu (layout reset)
                ui.menu_button("Windows", |ui| {
                    if ui.button("Reset Layout").clicked() {
                        tracing::info!("Resetting layout to default");
                        *self = Self::default(); // Reset the entire app state
                    }
                });

                // UI Menu (scaling, theme)
                ui.menu_button("UI", |ui| {
                    // slider for ui scale
                    let mut scale = ctx.zoom_factor();
                    let res = ui.add(egui::Slider::new(&mut scale, 0.5..=5.0).text("UI Scale"));
                    if !res.dragged() && res.changed() {
                        tracing::info!("Setting new UI scale: {}", scale);
                        ctx.set_zoom_factor(scale);
                    }
                    egui::widgets::global_theme_preference_buttons(ui);
                });
            });
        });

        let curr_theme = match ctx.theme() {
            Theme::Light => BaseThemeChoice::Light,
            Theme::Dark => BaseThemeChoice::Dark,
        };
        if theme::CURRENT_THEME_SETTINGS.lock().unwrap().base_theme != curr_theme {
            theme::set_global_theme(curr_theme, Some(ctx));
        }

        egui::CentralPanel::default().show(ctx, |_ui| {
            // The central panel the region left after adding TopPanel's and SidePanel's
        });

        DockArea::new(&mut self.dock_state)
            .show_add_buttons(true)
            .show_add_popup(true)
            .show_leaf_close_all_buttons(false)
            .draggable_tabs(false)
            .style(Style::from_egui(ctx.style().as_ref()))
            .allowed_splits(AllowedSplits::None)
            .show(ctx, &mut self.tree_behavior);

        if let Some((nodei, sur)) = self.tree_behavior.last_added {
            self.tree_behavior.added_nodes.drain(..).for_each(|node| {
                self.dock_state.set_focused_node_and_surface((sur, nodei));
                self.dock_state.push_to_focused_leaf(node);
            });
        }

        // why do we need this? Well our update loop cannot get the egui context so cannot
        // see the pass number, we need this to request a repaint if the session state
        // changes on the background executor thread.
        #[cfg(not(target_arch = "wasm32"))]
        {
            *LAST_PAINT_ID.lock().unwrap() = ctx.cumulative_pass_nr_for(egui::ViewportId::ROOT);
        }
        ctx.request_repaint_after(std::time::Duration::from_millis(50));
    }
}
