use eframe::egui;

use crate::state::{AppState, Tab};
use crate::ui::{panels, wiki};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CallVolumeApp {
    pub state: AppState,
}

impl eframe::App for CallVolumeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar and tabs ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Central panel: selected tab ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| match self.state.tab {
                    Tab::Main => panels::main_tab(ui, &mut self.state),
                    Tab::Wiki => wiki::wiki_tab(ui),
                });
        });
    }
}
