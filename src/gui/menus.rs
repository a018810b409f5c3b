//! Renders any declarative menu from `crate::menu`

use crate::menu::MenuItem;
use eframe::egui;

/// Draw `items` into an open menu and return the id of the item activated
/// this frame. Checkable items stay open so several can be toggled.
pub fn show_menu<Id: Copy>(
    ui: &mut egui::Ui,
    items: &[MenuItem<Id>],
    is_checked: impl Fn(Id) -> bool,
) -> Option<Id> {
    let mut chosen = None;
    for item in items {
        if item.checkable {
            let mut checked = is_checked(item.id);
            if ui.checkbox(&mut checked, item.text()).clicked() {
                chosen = Some(item.id);
            }
        } else if ui.button(item.text()).clicked() {
            chosen = Some(item.id);
            ui.close_menu();
        }
    }
    chosen
}
