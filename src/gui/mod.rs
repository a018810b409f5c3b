pub mod app;
pub mod colors;
pub mod dialogs;
pub mod menus;
pub mod search;
pub mod table;

use crate::AppConfig;

/// Entry point: launch the native GUI window
pub fn run(config: AppConfig) -> crate::Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title("FindView — Search")
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([640.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "FindView",
        native_options,
        Box::new(|cc| Ok(Box::new(app::FindViewApp::new(cc, config)))),
    )
    .map_err(|e| crate::FindViewError::Gui(e.to_string()))
}
