//! Search form state and the panel that edits it

use crate::query::{
    Comparison, NamePattern, Permissions, SearchCriteria, SizeFilter, SizeUnit, TimeFilter,
    TimeKind, TypeFilter,
};
use eframe::egui;
use std::path::PathBuf;

/// Widget state backing the search panel
pub struct SearchForm {
    pub directory: Option<PathBuf>,
    pub pattern: String,
    pub case_insensitive: bool,
    pub invert: bool,
    pub empty_only: bool,
    pub as_root: bool,
    pub kind: TypeFilter,
    /// `None` is the "Choose" entry
    pub time_kind: Option<TimeKind>,
    pub time_comparison: Comparison,
    pub minutes: u32,
    pub size_comparison: Option<Comparison>,
    pub size_amount: u64,
    pub size_unit: SizeUnit,
    pub permissions: Permissions,
    pub owner: Option<String>,
    pub group: Option<String>,
    /// Advanced pane expanded
    pub advanced_open: bool,
}

impl Default for SearchForm {
    fn default() -> Self {
        Self {
            directory: None,
            pattern: String::new(),
            case_insensitive: false,
            invert: false,
            empty_only: false,
            as_root: false,
            kind: TypeFilter::Any,
            time_kind: None,
            time_comparison: Comparison::Less,
            minutes: 0,
            size_comparison: None,
            size_amount: 0,
            size_unit: SizeUnit::Bytes,
            permissions: Permissions::default(),
            owner: None,
            group: None,
            advanced_open: false,
        }
    }
}

impl SearchForm {
    pub fn criteria(&self) -> SearchCriteria {
        SearchCriteria {
            directory: self.directory.clone().unwrap_or_default(),
            name: (!self.pattern.trim().is_empty()).then(|| NamePattern {
                pattern: self.pattern.clone(),
                case_insensitive: self.case_insensitive,
            }),
            invert: self.invert,
            empty_only: self.empty_only,
            kind: self.kind,
            time: self.time_kind.map(|kind| TimeFilter {
                kind,
                comparison: self.time_comparison,
                minutes: self.minutes,
            }),
            permissions: self.permissions,
            size: self.size_comparison.map(|comparison| SizeFilter {
                comparison,
                amount: self.size_amount,
                unit: self.size_unit,
            }),
            owner: self.owner.clone(),
            group: self.group.clone(),
            as_root: self.as_root,
        }
    }
}

/// What the user asked for this frame
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PanelResponse {
    pub browse: bool,
    pub search: bool,
    pub cancel: bool,
}

pub fn show_search_panel(
    ui: &mut egui::Ui,
    form: &mut SearchForm,
    users: &[String],
    groups: &[String],
    busy: bool,
) -> PanelResponse {
    let mut response = PanelResponse::default();

    ui.horizontal(|ui| {
        if ui.add_enabled(!busy, egui::Button::new("\u{1F4C1} Browse…")).clicked() {
            response.browse = true;
        }
        match &form.directory {
            Some(dir) => ui.label(format!("Directory: {}", dir.display())),
            None => ui.weak("No directory selected"),
        };
    });

    ui.horizontal(|ui| {
        ui.label("Name:");
        let edit = ui.add(
            egui::TextEdit::singleline(&mut form.pattern)
                .desired_width(260.0)
                .hint_text("e.g. *.log"),
        );
        if edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) && !busy {
            response.search = true;
        }
        ui.checkbox(&mut form.case_insensitive, "Ignore case");
        ui.checkbox(&mut form.invert, "Invert");
        ui.checkbox(&mut form.empty_only, "Only empty");
        ui.checkbox(&mut form.as_root, "Search as root");

        ui.separator();
        if busy {
            ui.spinner();
            if ui.button("Cancel").clicked() {
                response.cancel = true;
            }
        } else if ui.button("\u{1F50D} Search").clicked() {
            response.search = true;
        }
    });

    let arrow = if form.advanced_open { "\u{25B2}" } else { "\u{25BC}" };
    if ui
        .selectable_label(form.advanced_open, format!("Advanced Search {}", arrow))
        .clicked()
    {
        form.advanced_open = !form.advanced_open;
    }

    if form.advanced_open {
        show_advanced(ui, form, users, groups);
    }

    response
}

fn show_advanced(ui: &mut egui::Ui, form: &mut SearchForm, users: &[String], groups: &[String]) {
    egui::Grid::new("advanced_search")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            ui.label("Type:");
            egui::ComboBox::from_id_salt("search_type")
                .selected_text(form.kind.label())
                .show_ui(ui, |ui| {
                    for kind in TypeFilter::all() {
                        ui.selectable_value(&mut form.kind, *kind, kind.label());
                    }
                });
            ui.end_row();

            ui.label("Time:");
            ui.horizontal(|ui| {
                egui::ComboBox::from_id_salt("time_type")
                    .selected_text(form.time_kind.map(|k| k.label()).unwrap_or("Choose"))
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut form.time_kind, None, "Choose");
                        for kind in TimeKind::all() {
                            ui.selectable_value(&mut form.time_kind, Some(*kind), kind.label());
                        }
                    });
                ui.add_enabled_ui(form.time_kind.is_some(), |ui| {
                    comparison_combo(ui, "time_criteria", &mut form.time_comparison);
                    ui.add(egui::DragValue::new(&mut form.minutes).suffix(" min"));
                });
            });
            ui.end_row();

            ui.label("Size:");
            ui.horizontal(|ui| {
                egui::ComboBox::from_id_salt("size_criteria")
                    .selected_text(form.size_comparison.map(|c| c.label()).unwrap_or("Choose"))
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut form.size_comparison, None, "Choose");
                        for c in Comparison::all() {
                            ui.selectable_value(&mut form.size_comparison, Some(*c), c.label());
                        }
                    });
                ui.add_enabled_ui(form.size_comparison.is_some(), |ui| {
                    ui.add(egui::DragValue::new(&mut form.size_amount));
                    egui::ComboBox::from_id_salt("size_units")
                        .selected_text(form.size_unit.label())
                        .show_ui(ui, |ui| {
                            for unit in SizeUnit::all() {
                                ui.selectable_value(&mut form.size_unit, *unit, unit.label());
                            }
                        });
                });
            });
            ui.end_row();

            ui.label("Permissions:");
            ui.horizontal(|ui| {
                ui.checkbox(&mut form.permissions.readable, "Readable");
                ui.checkbox(&mut form.permissions.writable, "Writable");
                ui.checkbox(&mut form.permissions.executable, "Executable");
            });
            ui.end_row();

            ui.label("User:");
            name_combo(ui, "users", &mut form.owner, users);
            ui.end_row();

            ui.label("Group:");
            name_combo(ui, "groups", &mut form.group, groups);
            ui.end_row();
        });
}

fn comparison_combo(ui: &mut egui::Ui, id: &str, value: &mut Comparison) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(value.label())
        .show_ui(ui, |ui| {
            for c in Comparison::all() {
                ui.selectable_value(value, *c, c.label());
            }
        });
}

fn name_combo(ui: &mut egui::Ui, id: &str, value: &mut Option<String>, names: &[String]) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(value.as_deref().unwrap_or("Choose"))
        .height(300.0)
        .show_ui(ui, |ui| {
            ui.selectable_value(value, None, "Choose");
            for name in names {
                ui.selectable_value(value, Some(name.clone()), name);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::build_query;

    #[test]
    fn default_form_has_no_directory() {
        let criteria = SearchForm::default().criteria();
        assert!(build_query(&criteria).is_err());
    }

    #[test]
    fn choose_entries_leave_filters_unset() {
        let form = SearchForm {
            directory: Some(PathBuf::from("/opt")),
            minutes: 15,
            size_amount: 4,
            ..Default::default()
        };
        assert_eq!(build_query(&form.criteria()).unwrap(), vec!["/opt"]);
    }

    #[test]
    fn form_maps_to_criteria() {
        let form = SearchForm {
            directory: Some(PathBuf::from("/opt")),
            pattern: "*.so".to_string(),
            case_insensitive: true,
            time_kind: Some(TimeKind::Access),
            time_comparison: Comparison::Greater,
            minutes: 15,
            size_comparison: Some(Comparison::Less),
            size_amount: 4,
            size_unit: SizeUnit::Kibibytes,
            group: Some("staff".to_string()),
            as_root: true,
            ..Default::default()
        };
        let criteria = form.criteria();
        assert!(criteria.as_root);
        assert_eq!(
            build_query(&criteria).unwrap(),
            vec!["/opt", "-iname", "*.so", "-amin", "+15", "-size", "-4k", "-group", "staff"]
        );
    }
}
