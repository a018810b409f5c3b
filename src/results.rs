//! Result table model
//!
//! Holds the rows of the most recent search, the sorted/filtered view over
//! them, column visibility, and the selection. Rendering lives in
//! `gui::table`; nothing here depends on egui.

use crate::metadata::{FoundEntry, MetadataSource};
use chrono::{DateTime, Local};
use rayon::prelude::*;
use regex::{Regex, RegexBuilder};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

/// Rows materialized per search unless configured otherwise
pub const DEFAULT_MAX_ROWS: usize = 2000;

/// The fixed nine-column layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Name,
    Path,
    Size,
    User,
    Group,
    CreationTime,
    LastAccess,
    LastModification,
    LastChange,
}

impl Column {
    pub const ALL: [Column; 9] = [
        Column::Name,
        Column::Path,
        Column::Size,
        Column::User,
        Column::Group,
        Column::CreationTime,
        Column::LastAccess,
        Column::LastModification,
        Column::LastChange,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Column> {
        Self::ALL.get(index).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Column::Name => "Name",
            Column::Path => "Path",
            Column::Size => "Size",
            Column::User => "User",
            Column::Group => "Group",
            Column::CreationTime => "Creation Time",
            Column::LastAccess => "Last Access",
            Column::LastModification => "Last Modification",
            Column::LastChange => "Last Change",
        }
    }

    pub fn visible_by_default(self) -> bool {
        !matches!(
            self,
            Column::Group | Column::LastAccess | Column::LastModification | Column::LastChange
        )
    }

    /// Raw value used for ordering, independent of the displayed text
    pub fn sort_key(self, entry: &FoundEntry) -> SortKey {
        match self {
            Column::Name => SortKey::Text(entry.name.to_lowercase()),
            Column::Path => SortKey::Text(entry.directory.to_lowercase()),
            Column::Size => SortKey::Number(entry.size),
            Column::User => SortKey::Text(entry.owner.clone().unwrap_or_default()),
            Column::Group => SortKey::Text(entry.group.clone().unwrap_or_default()),
            Column::CreationTime => SortKey::Time(entry.created),
            Column::LastAccess => SortKey::Time(entry.accessed),
            Column::LastModification => SortKey::Time(entry.modified),
            Column::LastChange => SortKey::Time(entry.changed),
        }
    }

    /// Displayed cell text
    pub fn display(self, entry: &FoundEntry) -> String {
        match self {
            Column::Name => entry.name.clone(),
            Column::Path => entry.directory.clone(),
            Column::Size => entry.size.map(crate::format_size).unwrap_or_else(unavailable),
            Column::User => entry.owner.clone().unwrap_or_else(unavailable),
            Column::Group => entry.group.clone().unwrap_or_else(unavailable),
            Column::CreationTime => display_time(entry.created),
            Column::LastAccess => display_time(entry.accessed),
            Column::LastModification => display_time(entry.modified),
            Column::LastChange => display_time(entry.changed),
        }
    }
}

fn unavailable() -> String {
    "unavailable".to_string()
}

fn display_time(time: Option<DateTime<Local>>) -> String {
    time.as_ref()
        .map(crate::format_timestamp)
        .unwrap_or_else(unavailable)
}

/// Ordering key for one cell. Missing values sort first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Text(String),
    Number(Option<u64>),
    Time(Option<DateTime<Local>>),
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn indicator(&self) -> &'static str {
        match self {
            SortOrder::Ascending => " \u{25B2}",
            SortOrder::Descending => " \u{25BC}",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

/// Output of one search, parsed and resolved
#[derive(Debug, Clone, Default)]
pub struct ParsedOutput {
    pub entries: Vec<FoundEntry>,
    /// All non-empty lines, including those beyond the row cap
    pub total: usize,
}

/// Split raw `find` output into entries, resolving at most `max_rows` of them
pub fn parse_output(raw: &str, max_rows: usize, source: &dyn MetadataSource) -> ParsedOutput {
    let lines: Vec<&str> = raw.lines().filter(|l| !l.trim().is_empty()).collect();
    let shown = lines.len().min(max_rows);
    let entries = lines[..shown]
        .par_iter()
        .map(|line| source.lookup(Path::new(line)))
        .collect();
    ParsedOutput {
        entries,
        total: lines.len(),
    }
}

/// Quick filter over name and path
#[derive(Debug, Clone)]
struct RowFilter {
    text: String,
    regex: Option<Regex>,
}

impl RowFilter {
    fn new(text: &str) -> Self {
        let regex = RegexBuilder::new(text)
            .case_insensitive(true)
            .build()
            .ok();
        Self {
            text: text.to_lowercase(),
            regex,
        }
    }

    fn matches(&self, entry: &FoundEntry) -> bool {
        match &self.regex {
            Some(re) => re.is_match(&entry.name) || re.is_match(&entry.directory),
            // Invalid regex: plain substring
            None => {
                entry.name.to_lowercase().contains(&self.text)
                    || entry.directory.to_lowercase().contains(&self.text)
            }
        }
    }
}

/// Rows, view, sort, visibility, and selection for the results table
pub struct ResultTable {
    rows: Vec<FoundEntry>,
    /// Indices into `rows`, sorted and filtered
    view: Vec<usize>,
    total_found: usize,
    max_rows: usize,
    pub sort_column: Column,
    pub sort_order: SortOrder,
    filter: Option<RowFilter>,
    visible: [bool; 9],
    /// Selected rows (indices into `rows`)
    selections: BTreeSet<usize>,
    /// Anchor for shift-selection ranges (view position)
    anchor: Option<usize>,
    /// Cursor for keyboard navigation (view position)
    pub selected: Option<usize>,
}

impl Default for ResultTable {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ROWS)
    }
}

impl ResultTable {
    pub fn new(max_rows: usize) -> Self {
        let mut visible = [true; 9];
        for column in Column::ALL {
            visible[column.index()] = column.visible_by_default();
        }
        Self {
            rows: Vec::new(),
            view: Vec::new(),
            total_found: 0,
            max_rows,
            // Descending on Path, as the panel always started out
            sort_column: Column::Path,
            sort_order: SortOrder::Descending,
            filter: None,
            visible,
            selections: BTreeSet::new(),
            anchor: None,
            selected: None,
        }
    }

    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    /// Replace the table with parsed `find` output
    pub fn populate(&mut self, raw: &str, source: &dyn MetadataSource) {
        self.clear();
        if raw.trim().is_empty() {
            return;
        }
        self.apply(parse_output(raw, self.max_rows, source));
    }

    /// Replace the table with output parsed elsewhere
    pub fn apply(&mut self, mut parsed: ParsedOutput) {
        self.clear();
        parsed.entries.truncate(self.max_rows);
        self.total_found = parsed.total.max(parsed.entries.len());
        self.rows = parsed.entries;
        self.rebuild_view();
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.view.clear();
        self.total_found = 0;
        self.clear_selection();
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn total_found(&self) -> usize {
        self.total_found
    }

    /// Rows currently shown after filtering
    pub fn view_len(&self) -> usize {
        self.view.len()
    }

    /// Entry at a view position
    pub fn entry_at(&self, position: usize) -> Option<&FoundEntry> {
        self.view.get(position).and_then(|&i| self.rows.get(i))
    }

    /// Entries in view order
    pub fn iter_view(&self) -> impl Iterator<Item = &FoundEntry> {
        self.view.iter().filter_map(|&i| self.rows.get(i))
    }

    pub fn status_message(&self) -> String {
        if self.total_found == 0 {
            return "No files found.".to_string();
        }
        format!(
            "{} files found. Showing {} of them.",
            self.total_found,
            self.rows.len()
        )
    }

    // ------------------------------------------------------------------
    // Sorting and filtering
    // ------------------------------------------------------------------

    /// Header click: same column flips the order, a new column starts ascending
    pub fn click_header(&mut self, column: Column) {
        let order = if self.sort_column == column {
            self.sort_order.flipped()
        } else {
            SortOrder::Ascending
        };
        self.sort_by(column, order);
    }

    pub fn sort_by(&mut self, column: Column, order: SortOrder) {
        self.sort_column = column;
        self.sort_order = order;
        self.sort_view();
    }

    pub fn filter_text(&self) -> &str {
        self.filter.as_ref().map(|f| f.text.as_str()).unwrap_or("")
    }

    pub fn set_filter(&mut self, text: &str) {
        let text = text.trim();
        self.filter = (!text.is_empty()).then(|| RowFilter::new(text));
        self.rebuild_view();
    }

    fn rebuild_view(&mut self) {
        self.view = (0..self.rows.len())
            .filter(|&i| {
                self.filter
                    .as_ref()
                    .is_none_or(|f| f.matches(&self.rows[i]))
            })
            .collect();
        let view: HashSet<usize> = self.view.iter().copied().collect();
        self.selections.retain(|i| view.contains(i));
        self.sort_view();
    }

    fn sort_view(&mut self) {
        let keys: Vec<SortKey> = self
            .rows
            .iter()
            .map(|e| self.sort_column.sort_key(e))
            .collect();
        let descending = self.sort_order == SortOrder::Descending;
        self.view.sort_by(|&a, &b| {
            let cmp = keys[a].cmp(&keys[b]);
            if descending {
                cmp.reverse()
            } else {
                cmp
            }
        });
        self.anchor = None;
        self.selected = None;
    }

    // ------------------------------------------------------------------
    // Column visibility
    // ------------------------------------------------------------------

    pub fn is_column_visible(&self, column: Column) -> bool {
        self.visible[column.index()]
    }

    pub fn set_column_visible(&mut self, column: Column, visible: bool) {
        self.visible[column.index()] = visible;
    }

    pub fn toggle_column(&mut self, column: Column) {
        let i = column.index();
        self.visible[i] = !self.visible[i];
    }

    pub fn visible_columns(&self) -> Vec<Column> {
        Column::ALL
            .into_iter()
            .filter(|c| self.is_column_visible(*c))
            .collect()
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn is_selected(&self, position: usize) -> bool {
        self.view
            .get(position)
            .is_some_and(|i| self.selections.contains(i))
    }

    /// Plain click selects one row, ctrl toggles, shift extends from the anchor
    pub fn click_row(&mut self, position: usize, ctrl: bool, shift: bool) {
        let Some(&row) = self.view.get(position) else {
            return;
        };
        if shift {
            let anchor = self.anchor.unwrap_or(position);
            let (start, end) = if anchor <= position {
                (anchor, position)
            } else {
                (position, anchor)
            };
            self.selections.clear();
            for pos in start..=end {
                self.selections.insert(self.view[pos]);
            }
        } else if ctrl {
            if !self.selections.remove(&row) {
                self.selections.insert(row);
            }
            self.anchor = Some(position);
        } else {
            self.selections.clear();
            self.selections.insert(row);
            self.anchor = Some(position);
        }
        self.selected = Some(position);
    }

    /// Right-click on an unselected row makes it the only selection
    pub fn ensure_selected(&mut self, position: usize) {
        if !self.is_selected(position) {
            self.click_row(position, false, false);
        }
    }

    pub fn select_next(&mut self) {
        let total = self.view.len();
        if total == 0 {
            return;
        }
        let i = match self.selected {
            Some(i) => (i + 1).min(total - 1),
            None => 0,
        };
        self.click_row(i, false, false);
    }

    pub fn select_prev(&mut self) {
        if self.view.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(0) | None => 0,
            Some(i) => i - 1,
        };
        self.click_row(i, false, false);
    }

    pub fn select_all(&mut self) {
        self.selections = self.view.iter().copied().collect();
    }

    pub fn clear_selection(&mut self) {
        self.selections.clear();
        self.anchor = None;
        self.selected = None;
    }

    /// Selected entries in view order
    pub fn selected_entries(&self) -> Vec<&FoundEntry> {
        self.view
            .iter()
            .filter(|&&i| self.selections.contains(&i))
            .filter_map(|&i| self.rows.get(i))
            .collect()
    }

    pub fn selected_paths(&self) -> Vec<PathBuf> {
        self.selected_entries()
            .into_iter()
            .map(|e| e.path.clone())
            .collect()
    }

    /// Drop rows for paths that were trashed or deleted
    pub fn remove_paths(&mut self, paths: &[PathBuf]) -> usize {
        let gone: HashSet<&PathBuf> = paths.iter().collect();
        let before = self.rows.len();
        self.rows.retain(|e| !gone.contains(&e.path));
        let removed = before - self.rows.len();
        self.total_found = self.total_found.saturating_sub(removed);
        self.clear_selection();
        self.rebuild_view();
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Metadata derived from the path so tests never touch the disk.
    /// `/d/name@SIZE` sets the size.
    struct FakeSource;

    impl MetadataSource for FakeSource {
        fn lookup(&self, path: &Path) -> FoundEntry {
            let mut e = FoundEntry::bare(path);
            e.size = e
                .name
                .split_once('@')
                .and_then(|(_, s)| s.parse().ok());
            e
        }
    }

    fn lines(n: usize) -> String {
        (0..n).map(|i| format!("/data/file{}\n", i)).collect()
    }

    fn names(table: &ResultTable) -> Vec<String> {
        table.iter_view().map(|e| e.name.clone()).collect()
    }

    #[test]
    fn whitespace_output_clears_previous_rows() {
        let mut table = ResultTable::default();
        table.populate(&lines(10), &FakeSource);
        assert_eq!(table.row_count(), 10);

        table.populate("  \n\n\t\n", &FakeSource);
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.view_len(), 0);
        assert_eq!(table.status_message(), "No files found.");
    }

    #[test]
    fn caps_rows_and_reports_total() {
        let mut table = ResultTable::default();
        table.populate(&lines(5000), &FakeSource);
        assert_eq!(table.row_count(), 2000);
        assert_eq!(table.total_found(), 5000);
        assert_eq!(
            table.status_message(),
            "5000 files found. Showing 2000 of them."
        );
    }

    #[test]
    fn parse_keeps_output_order_and_skips_blank_lines() {
        let parsed = parse_output("/a/x\n\n/b/y\r\n/c/z", 2, &FakeSource);
        assert_eq!(parsed.total, 3);
        let paths: Vec<_> = parsed.entries.iter().map(|e| e.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("/a/x"), PathBuf::from("/b/y")]);
    }

    #[test]
    fn new_search_fully_replaces_rows() {
        let mut table = ResultTable::default();
        table.populate(&lines(100), &FakeSource);
        table.click_row(5, false, false);
        table.populate("/x/a\n/x/b\n/x/c\n", &FakeSource);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.total_found(), 3);
        assert!(table.selected_entries().is_empty());
    }

    #[test]
    fn size_sorts_by_raw_bytes() {
        let mut table = ResultTable::default();
        table.populate("/d/big@10240\n/d/small@2048\n/d/unknown\n/d/mid@5000\n", &FakeSource);
        table.sort_by(Column::Size, SortOrder::Ascending);
        assert_eq!(names(&table), vec!["unknown", "small@2048", "mid@5000", "big@10240"]);

        table.click_header(Column::Size);
        assert_eq!(table.sort_order, SortOrder::Descending);
        assert_eq!(names(&table)[0], "big@10240");
    }

    #[test]
    fn default_sort_is_descending_path() {
        let mut table = ResultTable::default();
        assert_eq!(table.sort_column, Column::Path);
        assert_eq!(table.sort_order, SortOrder::Descending);
        table.populate("/a/one\n/c/two\n/b/three\n", &FakeSource);
        assert_eq!(names(&table), vec!["two", "three", "one"]);
    }

    #[test]
    fn time_columns_sort_chronologically() {
        let mut a = FoundEntry::bare("/t/a");
        a.modified = Local.timestamp_opt(2_000_000_000, 0).single();
        let mut b = FoundEntry::bare("/t/b");
        b.modified = Local.timestamp_opt(1_000_000_000, 0).single();
        let mut table = ResultTable::default();
        table.apply(ParsedOutput {
            entries: vec![a, b],
            total: 2,
        });
        table.sort_by(Column::LastModification, SortOrder::Ascending);
        assert_eq!(names(&table), vec!["b", "a"]);
    }

    #[test]
    fn toggling_one_column_leaves_others_alone() {
        let mut table = ResultTable::default();
        table.populate(&lines(3), &FakeSource);
        let before: Vec<bool> = Column::ALL.iter().map(|c| table.is_column_visible(*c)).collect();
        let rows_before = names(&table);

        table.toggle_column(Column::Group);

        for column in Column::ALL {
            let was = before[column.index()];
            let now = table.is_column_visible(column);
            if column.index() == 4 {
                assert_ne!(was, now);
            } else {
                assert_eq!(was, now);
            }
        }
        assert_eq!(names(&table), rows_before);
    }

    #[test]
    fn hidden_by_default() {
        let table = ResultTable::default();
        let hidden: Vec<usize> = Column::ALL
            .into_iter()
            .filter(|c| !table.is_column_visible(*c))
            .map(Column::index)
            .collect();
        assert_eq!(hidden, vec![4, 6, 7, 8]);
        assert_eq!(Column::from_index(4), Some(Column::Group));
        assert_eq!(Column::from_index(9), None);
        assert_eq!(table.visible_columns().len(), 5);
    }

    #[test]
    fn filter_narrows_view_not_store() {
        let mut table = ResultTable::default();
        table.populate("/src/main.rs\n/src/lib.rs\n/docs/README.md\n", &FakeSource);
        table.set_filter(r"\.RS$");
        assert_eq!(table.view_len(), 2);
        assert_eq!(table.row_count(), 3);

        // Invalid regex falls back to substring
        table.set_filter("readme(");
        assert_eq!(table.view_len(), 0);
        table.set_filter("docs");
        assert_eq!(table.view_len(), 1);

        table.set_filter("");
        assert_eq!(table.view_len(), 3);
    }

    #[test]
    fn selection_ctrl_and_shift() {
        let mut table = ResultTable::default();
        table.populate(&lines(6), &FakeSource);
        table.sort_by(Column::Name, SortOrder::Ascending);

        table.click_row(1, false, false);
        table.click_row(3, false, true);
        assert_eq!(table.selected_entries().len(), 3);

        table.click_row(5, true, false);
        assert_eq!(table.selected_entries().len(), 4);
        table.click_row(5, true, false);
        assert_eq!(table.selected_entries().len(), 3);

        table.ensure_selected(0);
        assert_eq!(table.selected_paths(), vec![PathBuf::from("/data/file0")]);
    }

    #[test]
    fn remove_paths_updates_counts() {
        let mut table = ResultTable::default();
        table.populate(&lines(4), &FakeSource);
        let removed = table.remove_paths(&[PathBuf::from("/data/file1"), PathBuf::from("/nope")]);
        assert_eq!(removed, 1);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.status_message(), "3 files found. Showing 3 of them.");
    }

    #[test]
    fn missing_metadata_renders_unavailable() {
        let e = FoundEntry::bare("/gone/file");
        assert_eq!(Column::Size.display(&e), "unavailable");
        assert_eq!(Column::LastChange.display(&e), "unavailable");
        assert_eq!(Column::Path.display(&e), "/gone");
    }
}
