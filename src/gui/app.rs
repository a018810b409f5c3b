//! Main FindView application

use crate::actions;
use crate::gui::dialogs;
use crate::gui::menus::show_menu;
use crate::gui::search::{show_search_panel, SearchForm};
use crate::gui::table::show_results_table;
use crate::logging;
use crate::menu::{header_menu, RowAction};
use crate::results::ResultTable;
use crate::search::{SearchContext, SearchController, SearchOutcome};
use crate::{AccountDirectory, AppConfig, FsMetadata, SystemRunner};
use eframe::egui;
use std::path::PathBuf;
use std::sync::Arc;

/// What the status bar shows
enum Status {
    Ready,
    Searching,
    Results(String),
    Error(String),
}

/// Main application state
pub struct FindViewApp {
    form: SearchForm,
    table: ResultTable,
    search: SearchController,
    users: Vec<String>,
    groups: Vec<String>,
    /// Quick filter text bound to the filter box
    filter_text: String,
    /// Inline validation message under the search form
    validation_error: Option<String>,
    status: Status,
    /// Paths waiting for delete confirmation
    pending_delete: Option<Vec<PathBuf>>,
    show_about: bool,
}

impl FindViewApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let accounts = AccountDirectory::load().unwrap_or_else(|e| {
            logging::warn("APP", &format!("Could not read account databases: {}", e));
            AccountDirectory::default()
        });

        let context = SearchContext {
            program: config.find_program.clone(),
            max_rows: config.max_rows,
            runner: Arc::new(SystemRunner::from_config(&config)),
            metadata: Arc::new(FsMetadata::new(accounts.clone())),
        };

        let form = SearchForm {
            directory: config.start_directory.clone(),
            ..Default::default()
        };

        Self {
            form,
            table: ResultTable::new(config.max_rows),
            search: SearchController::new(context),
            users: accounts.user_list(),
            groups: accounts.group_list(),
            filter_text: String::new(),
            validation_error: None,
            status: Status::Ready,
            pending_delete: None,
            show_about: false,
        }
    }

    fn browse_directory(&mut self) {
        let start = self
            .form
            .directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("/"));
        if let Some(dir) = rfd::FileDialog::new()
            .set_title("Select Directory")
            .set_directory(start)
            .pick_folder()
        {
            if dir.is_dir() {
                self.form.directory = Some(dir);
                self.validation_error = None;
            }
        }
    }

    fn start_search(&mut self) {
        match self.search.start(&self.form.criteria()) {
            Ok(()) => {
                self.validation_error = None;
                self.status = Status::Searching;
            }
            Err(e) if e.is_user_error() => {
                self.validation_error = Some(e.to_string());
            }
            Err(e) => {
                logging::error("APP", &format!("Could not start search: {}", e));
                self.status = Status::Error(e.to_string());
            }
        }
    }

    /// Process background messages
    fn process_messages(&mut self) {
        let Some(outcome) = self.search.poll() else {
            return;
        };
        match outcome {
            SearchOutcome::Completed {
                parsed, warnings, ..
            } => {
                self.table.apply(parsed);
                self.table.set_filter(&self.filter_text);
                let mut message = self.table.status_message();
                if !warnings.is_empty() {
                    message.push_str(&format!(
                        " ({} locations could not be read)",
                        warnings.len()
                    ));
                }
                self.status = Status::Results(message);
            }
            SearchOutcome::Failed(e) => {
                self.table.clear();
                self.status = Status::Error(e.to_string());
            }
            SearchOutcome::Cancelled => {
                self.table.clear();
                self.status = Status::Results("Search cancelled.".to_string());
            }
        }
    }

    fn run_action(&mut self, action: RowAction) {
        let paths = self.table.selected_paths();
        if paths.is_empty() {
            return;
        }

        let result = match action {
            RowAction::OpenFolder => actions::open_folder(&paths[0]),
            RowAction::CopyPath => actions::copy_paths(&paths),
            RowAction::MoveToTrash => {
                let (removed, result) = actions::move_to_trash(&paths);
                self.table.remove_paths(&removed);
                logging::log_action(action.label(), paths.len(), &result);
                self.status = match result {
                    Ok(()) => Status::Results(format!(
                        "Moved {} item(s) to trash. {}",
                        removed.len(),
                        self.table.status_message()
                    )),
                    Err(e) => Status::Error(format!(
                        "Moved {} of {} item(s) to trash: {}",
                        removed.len(),
                        paths.len(),
                        e
                    )),
                };
                return;
            }
            RowAction::Delete => {
                self.pending_delete = Some(paths);
                return;
            }
        };

        logging::log_action(action.label(), paths.len(), &result);
        if let Err(e) = result {
            self.status = Status::Error(e.to_string());
        }
    }

    fn confirm_delete(&mut self, ctx: &egui::Context) {
        let Some(paths) = &self.pending_delete else {
            return;
        };
        let Some(confirmed) = dialogs::show_delete_dialog(ctx, paths) else {
            return;
        };
        let paths = self.pending_delete.take().unwrap_or_default();
        if !confirmed {
            return;
        }

        let (removed, result) = actions::delete(&paths);
        self.table.remove_paths(&removed);
        logging::log_action("Delete", paths.len(), &result);
        self.status = match result {
            Ok(()) => Status::Results(format!(
                "Deleted {} item(s). {}",
                removed.len(),
                self.table.status_message()
            )),
            Err(e) => Status::Error(format!(
                "Deleted {} of {} item(s): {}",
                removed.len(),
                paths.len(),
                e
            )),
        };
    }

    /// Render menu bar
    fn render_menu(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Select Directory…").clicked() {
                        ui.close_menu();
                        self.browse_directory();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("View", |ui| {
                    ui.menu_button("Columns", |ui| {
                        let table = &self.table;
                        if let Some(column) =
                            show_menu(ui, &header_menu(), |c| table.is_column_visible(c))
                        {
                            self.table.toggle_column(column);
                        }
                    });
                    ui.checkbox(&mut self.form.advanced_open, "Advanced Search");
                });

                ui.menu_button("Help", |ui| {
                    if ui.button("About FindView").clicked() {
                        self.show_about = true;
                        ui.close_menu();
                    }
                });
            });
        });
    }

    fn render_search_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("search_panel").show(ctx, |ui| {
            ui.add_space(4.0);
            let response = show_search_panel(
                ui,
                &mut self.form,
                &self.users,
                &self.groups,
                self.search.is_busy(),
            );
            if let Some(message) = &self.validation_error {
                ui.colored_label(egui::Color32::from_rgb(230, 80, 80), message);
            }
            ui.add_space(4.0);

            if response.browse {
                self.browse_directory();
            }
            if response.cancel {
                self.search.cancel();
            }
            if response.search {
                self.start_search();
            }
        });
    }

    /// Render status bar
    fn render_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| match &self.status {
                Status::Ready => {
                    ui.label("Ready");
                }
                Status::Searching => {
                    ui.spinner();
                    ui.label("Searching…");
                }
                Status::Results(message) => {
                    ui.label(message);
                    let selected = self.table.selected_entries().len();
                    if selected > 0 {
                        ui.separator();
                        ui.label(format!("{} selected", selected));
                    }
                }
                Status::Error(message) => {
                    ui.colored_label(egui::Color32::from_rgb(230, 80, 80), format!("Error: {}", message));
                }
            });
        });
    }

    fn render_about_dialog(&mut self, ctx: &egui::Context) {
        if self.show_about {
            let lines = vec![
                "FindView".to_string(),
                format!("Version {}", crate::VERSION),
                String::new(),
                "Search panel for the find utility".to_string(),
                format!("Log: {}", logging::FindViewLogger::get_log_path().display()),
            ];
            self.show_about = dialogs::show_info_dialog(ctx, "About FindView", &lines);
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() || self.pending_delete.is_some() {
            return;
        }
        let (down, up, all, delete) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::ArrowDown),
                i.key_pressed(egui::Key::ArrowUp),
                i.modifiers.command && i.key_pressed(egui::Key::A),
                i.key_pressed(egui::Key::Delete),
            )
        });
        if down {
            self.table.select_next();
        }
        if up {
            self.table.select_prev();
        }
        if all {
            self.table.select_all();
        }
        if delete {
            self.run_action(RowAction::Delete);
        }
    }
}

impl eframe::App for FindViewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_messages();
        self.handle_keys(ctx);

        self.render_menu(ctx);
        self.render_search_panel(ctx);
        self.render_status_bar(ctx);
        self.render_about_dialog(ctx);
        self.confirm_delete(ctx);

        let mut action = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Filter:");
                let edit = ui.add(
                    egui::TextEdit::singleline(&mut self.filter_text)
                        .desired_width(260.0)
                        .hint_text("regex on name or path"),
                );
                if edit.changed() {
                    self.table.set_filter(&self.filter_text);
                }
                ui.weak(format!("{} of {} rows", self.table.view_len(), self.table.row_count()));
            });
            ui.separator();
            action = show_results_table(ui, &mut self.table);
        });

        if let Some(action) = action {
            self.run_action(action);
        }

        if self.search.is_busy() {
            ctx.request_repaint();
        }
    }
}

impl Drop for FindViewApp {
    fn drop(&mut self) {
        if self.search.is_busy() {
            logging::info("APP", "Closing with a search in flight; cancelling");
        }
        logging::flush();
    }
}
