//! Results table rendering with virtual scrolling

use crate::gui::colors;
use crate::gui::menus::show_menu;
use crate::menu::{header_menu, row_menu, RowAction};
use crate::results::{Column, ResultTable};
use eframe::egui;
use egui_extras::{Column as TableColumn, TableBuilder};

const ROW_HEIGHT: f32 = 20.0;

/// Initial width per column; the last visible column takes the remainder
fn initial_width(column: Column) -> f32 {
    match column {
        Column::Name | Column::Path => 150.0,
        Column::Size => 90.0,
        Column::User | Column::Group => 90.0,
        _ => 140.0,
    }
}

/// Render the table and apply header/selection interactions directly.
/// Returns a row action chosen from the context menu, if any.
pub fn show_results_table(ui: &mut egui::Ui, table: &mut ResultTable) -> Option<RowAction> {
    let columns = table.visible_columns();
    if columns.is_empty() {
        // Keep the header menu reachable when every column is hidden
        let label = ui.label("All columns are hidden. Right-click to show some.");
        label.context_menu(|ui| {
            if let Some(column) = show_menu(ui, &header_menu(), |_| false) {
                table.toggle_column(column);
            }
        });
        return None;
    }

    let mut clicked_column: Option<Column> = None;
    let mut toggled_column: Option<Column> = None;
    let mut row_click: Option<(usize, bool, bool)> = None;
    let mut right_click: Option<usize> = None;
    let mut action: Option<RowAction> = None;

    let modifiers = ui.input(|i| i.modifiers);
    let available_height = ui.available_height();
    let header_items = header_menu();
    let row_items = row_menu();

    {
        let view: &ResultTable = table;
        let mut builder = TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .min_scrolled_height(0.0)
            .max_scroll_height(available_height)
            .sense(egui::Sense::click());

        for (i, column) in columns.iter().enumerate() {
            builder = if i + 1 == columns.len() {
                builder.column(TableColumn::remainder().at_least(40.0).clip(true))
            } else {
                builder.column(
                    TableColumn::initial(initial_width(*column))
                        .at_least(40.0)
                        .clip(true),
                )
            };
        }

        builder
            .header(24.0, |mut header| {
                for column in &columns {
                    header.col(|ui| {
                        let active = view.sort_column == *column;
                        let text = if active {
                            format!("{}{}", column.label(), view.sort_order.indicator())
                        } else {
                            column.label().to_string()
                        };
                        let response = ui.selectable_label(active, text);
                        if response.clicked() {
                            clicked_column = Some(*column);
                        }
                        response.context_menu(|ui| {
                            if let Some(c) =
                                show_menu(ui, &header_items, |c| view.is_column_visible(c))
                            {
                                toggled_column = Some(c);
                            }
                        });
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, view.view_len(), |mut row| {
                    let position = row.index();
                    let Some(entry) = view.entry_at(position) else {
                        return;
                    };
                    row.set_selected(view.is_selected(position));

                    for column in &columns {
                        row.col(|ui| {
                            let text = column.display(entry);
                            match column {
                                Column::Name => {
                                    let ext = entry
                                        .path
                                        .extension()
                                        .map(|e| e.to_string_lossy().to_lowercase())
                                        .unwrap_or_default();
                                    let icon = colors::icon_for_entry(entry.is_directory, &ext);
                                    ui.colored_label(
                                        colors::color_for_extension(&ext),
                                        format!("{} {}", icon, text),
                                    )
                                    .on_hover_text(entry.path.display().to_string());
                                }
                                Column::Path => {
                                    ui.label(&text).on_hover_text(&text);
                                }
                                Column::Size => {
                                    let size = ui.label(&text);
                                    if let Some(bytes) = entry.size {
                                        size.on_hover_text(format!("{} bytes", bytes));
                                    }
                                }
                                _ => {
                                    ui.label(&text);
                                }
                            }
                        });
                    }

                    let response = row.response();
                    if response.clicked() {
                        row_click = Some((
                            position,
                            modifiers.command || modifiers.ctrl,
                            modifiers.shift,
                        ));
                    }
                    if response.secondary_clicked() {
                        right_click = Some(position);
                    }
                    response.context_menu(|ui| {
                        if let Some(a) = show_menu(ui, &row_items, |_| false) {
                            action = Some(a);
                        }
                    });
                });
            });
    }

    if let Some((position, ctrl, shift)) = row_click {
        table.click_row(position, ctrl, shift);
    }
    if let Some(position) = right_click {
        table.ensure_selected(position);
    }
    if let Some(column) = toggled_column {
        table.toggle_column(column);
    }
    if let Some(column) = clicked_column {
        table.click_header(column);
    }

    action
}
