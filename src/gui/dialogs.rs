use eframe::egui;
use std::path::PathBuf;

// ============================================================================
// Confirm dialog
// ============================================================================

/// Returns `Some(true)` for confirmed, `Some(false)` for cancelled, `None` while open.
pub fn show_delete_dialog(ctx: &egui::Context, paths: &[PathBuf]) -> Option<bool> {
    let mut result: Option<bool> = None;
    let mut open = true;

    egui::Window::new("Delete permanently?")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .open(&mut open)
        .show(ctx, |ui| {
            ui.label(format!(
                "{} item(s) will be removed. This cannot be undone.",
                paths.len()
            ));
            ui.add_space(4.0);
            egui::ScrollArea::vertical()
                .max_height(160.0)
                .show(ui, |ui| {
                    for path in paths.iter().take(50) {
                        ui.monospace(path.display().to_string());
                    }
                    if paths.len() > 50 {
                        ui.weak(format!("… and {} more", paths.len() - 50));
                    }
                });
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Delete").clicked() {
                    result = Some(true);
                }
                if ui.button("Cancel").clicked() {
                    result = Some(false);
                }
            });
        });

    if !open {
        return Some(false);
    }
    result
}

// ============================================================================
// Info / About dialog
// ============================================================================

pub fn show_info_dialog(ctx: &egui::Context, title: &str, lines: &[String]) -> bool {
    let mut open = true;

    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            for line in lines {
                if line.is_empty() {
                    ui.add_space(4.0);
                } else {
                    ui.label(line);
                }
            }
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                open = false;
            }
        });

    open
}
