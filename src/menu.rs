//! Context menu definitions
//!
//! Both menus are plain data; `gui::menus::show_menu` renders any of them.

use crate::results::Column;

/// One entry in a context menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem<Id> {
    pub label: &'static str,
    pub icon: Option<&'static str>,
    pub id: Id,
    pub checkable: bool,
}

/// Actions offered on selected result rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowAction {
    OpenFolder,
    CopyPath,
    MoveToTrash,
    Delete,
}

impl RowAction {
    pub fn label(&self) -> &'static str {
        match self {
            RowAction::OpenFolder => "Open Folder",
            RowAction::CopyPath => "Copy Path",
            RowAction::MoveToTrash => "Move to Trash",
            RowAction::Delete => "Delete",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            RowAction::OpenFolder => "\u{1F4C2}",
            RowAction::CopyPath => "\u{1F4CB}",
            RowAction::MoveToTrash => "\u{1F5D1}",
            RowAction::Delete => "\u{274C}",
        }
    }

    /// Actions that change the file system and need confirmation
    pub fn is_destructive(&self) -> bool {
        matches!(self, RowAction::Delete)
    }
}

/// One checkable item per table column
pub fn header_menu() -> Vec<MenuItem<Column>> {
    Column::ALL
        .into_iter()
        .map(|column| MenuItem {
            label: column.label(),
            icon: None,
            id: column,
            checkable: true,
        })
        .collect()
}

pub fn row_menu() -> Vec<MenuItem<RowAction>> {
    [
        RowAction::OpenFolder,
        RowAction::CopyPath,
        RowAction::MoveToTrash,
        RowAction::Delete,
    ]
    .into_iter()
    .map(|action| MenuItem {
        label: action.label(),
        icon: Some(action.icon()),
        id: action,
        checkable: false,
    })
    .collect()
}

impl<Id> MenuItem<Id> {
    /// Label with the icon glyph prefixed, as shown in the menu
    pub fn text(&self) -> String {
        match self.icon {
            Some(icon) => format!("{} {}", icon, self.label),
            None => self.label.to_string(),
        }
    }
}
