//! Search criteria and the `find` argument builder
//!
//! Widget state is collected into a [`SearchCriteria`] and turned into an
//! argv for `find`. Tokens are never joined into a shell string.

use crate::error::{FindViewError, Result};
use serde::Serialize;
use std::path::PathBuf;

// ============================================================================
// Filter enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TypeFilter {
    #[default]
    Any,
    File,
    Directory,
    Symlink,
}

impl TypeFilter {
    pub fn label(&self) -> &'static str {
        match self {
            TypeFilter::Any => "All",
            TypeFilter::File => "File",
            TypeFilter::Directory => "Directory",
            TypeFilter::Symlink => "Symbolic Link",
        }
    }

    /// Single-character `-type` code, `None` for any
    pub fn code(&self) -> Option<&'static str> {
        match self {
            TypeFilter::Any => None,
            TypeFilter::File => Some("f"),
            TypeFilter::Directory => Some("d"),
            TypeFilter::Symlink => Some("l"),
        }
    }

    pub fn all() -> &'static [TypeFilter] {
        &[
            TypeFilter::Any,
            TypeFilter::File,
            TypeFilter::Directory,
            TypeFilter::Symlink,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Comparison {
    Less,
    #[default]
    Equal,
    Greater,
}

impl Comparison {
    pub fn label(&self) -> &'static str {
        match self {
            Comparison::Less => "Smaller (<)",
            Comparison::Equal => "Equal (=)",
            Comparison::Greater => "Greater (>)",
        }
    }

    /// Prefix `find` uses for numeric arguments
    pub fn prefix(&self) -> &'static str {
        match self {
            Comparison::Less => "-",
            Comparison::Equal => "",
            Comparison::Greater => "+",
        }
    }

    pub fn all() -> &'static [Comparison] {
        &[Comparison::Less, Comparison::Equal, Comparison::Greater]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TimeKind {
    Access,
    #[default]
    Modify,
    Change,
}

impl TimeKind {
    pub fn label(&self) -> &'static str {
        match self {
            TimeKind::Access => "Access",
            TimeKind::Modify => "Modify",
            TimeKind::Change => "Change",
        }
    }

    pub fn flag(&self) -> &'static str {
        match self {
            TimeKind::Access => "-amin",
            TimeKind::Modify => "-mmin",
            TimeKind::Change => "-cmin",
        }
    }

    pub fn all() -> &'static [TimeKind] {
        &[TimeKind::Access, TimeKind::Modify, TimeKind::Change]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SizeUnit {
    #[default]
    Bytes,
    Kibibytes,
    Mebibytes,
    Gibibytes,
}

impl SizeUnit {
    pub fn label(&self) -> &'static str {
        match self {
            SizeUnit::Bytes => "Bytes",
            SizeUnit::Kibibytes => "Kibibytes",
            SizeUnit::Mebibytes => "Mebibytes",
            SizeUnit::Gibibytes => "Gibibytes",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            SizeUnit::Bytes => "c",
            SizeUnit::Kibibytes => "k",
            SizeUnit::Mebibytes => "M",
            SizeUnit::Gibibytes => "G",
        }
    }

    pub fn all() -> &'static [SizeUnit] {
        &[
            SizeUnit::Bytes,
            SizeUnit::Kibibytes,
            SizeUnit::Mebibytes,
            SizeUnit::Gibibytes,
        ]
    }
}

// ============================================================================
// Criteria
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamePattern {
    pub pattern: String,
    /// `-iname` instead of `-name`
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeFilter {
    pub kind: TimeKind,
    pub comparison: Comparison,
    pub minutes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizeFilter {
    pub comparison: Comparison,
    pub amount: u64,
    pub unit: SizeUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Permissions {
    pub readable: bool,
    pub writable: bool,
    pub executable: bool,
}

/// Everything the user configured for one search
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SearchCriteria {
    pub directory: PathBuf,
    pub name: Option<NamePattern>,
    pub invert: bool,
    pub empty_only: bool,
    pub kind: TypeFilter,
    pub time: Option<TimeFilter>,
    pub permissions: Permissions,
    pub size: Option<SizeFilter>,
    /// `None` means any owner
    pub owner: Option<String>,
    /// `None` means any group
    pub group: Option<String>,
    pub as_root: bool,
}

impl SearchCriteria {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Default::default()
        }
    }

    /// Short human summary for logs and the CLI header
    pub fn describe(&self) -> String {
        let mut parts = vec![format!("in {}", self.directory.display())];
        if let Some(name) = self.active_name() {
            parts.push(format!(
                "name {}'{}'",
                if name.case_insensitive { "~" } else { "" },
                name.pattern
            ));
        }
        if let Some(code) = self.kind.code() {
            parts.push(format!("type {}", code));
        }
        if let Some(t) = &self.time {
            parts.push(format!("{} {}{}min", t.kind.label().to_lowercase(), t.comparison.prefix(), t.minutes));
        }
        if let Some(s) = &self.size {
            parts.push(format!("size {}{}{}", s.comparison.prefix(), s.amount, s.unit.code()));
        }
        if let Some(owner) = &self.owner {
            parts.push(format!("user {}", owner));
        }
        if let Some(group) = &self.group {
            parts.push(format!("group {}", group));
        }
        if self.as_root {
            parts.push("as root".to_string());
        }
        parts.join(", ")
    }

    fn active_name(&self) -> Option<&NamePattern> {
        self.name.as_ref().filter(|n| !n.pattern.trim().is_empty())
    }
}

/// Translate criteria into `find` arguments, in a fixed order
pub fn build_query(criteria: &SearchCriteria) -> Result<Vec<String>> {
    if criteria.directory.as_os_str().is_empty() {
        return Err(FindViewError::MissingDirectory);
    }

    let mut args = vec![criteria.directory.to_string_lossy().into_owned()];

    if let Some(name) = criteria.active_name() {
        let flag = if name.case_insensitive { "-iname" } else { "-name" };
        args.push(flag.to_string());
        args.push(name.pattern.clone());
    }

    if criteria.invert {
        args.push("-invert".to_string());
    }

    if criteria.empty_only {
        args.push("-empty".to_string());
    }

    if let Some(code) = criteria.kind.code() {
        args.push("-type".to_string());
        args.push(code.to_string());
    }

    // TIME
    if let Some(time) = &criteria.time {
        args.push(time.kind.flag().to_string());
        args.push(format!("{}{}", time.comparison.prefix(), time.minutes));
    }

    // PERMISSIONS
    let perms = &criteria.permissions;
    for (set, flag) in [
        (perms.readable, "-readable"),
        (perms.writable, "-writable"),
        (perms.executable, "-executable"),
    ] {
        if set {
            args.push(flag.to_string());
        }
    }

    // SIZE
    if let Some(size) = &criteria.size {
        args.push("-size".to_string());
        args.push(format!(
            "{}{}{}",
            size.comparison.prefix(),
            size.amount,
            size.unit.code()
        ));
    }

    // OWNER
    if let Some(owner) = &criteria.owner {
        args.push("-user".to_string());
        args.push(owner.clone());
    }

    if let Some(group) = &criteria.group {
        args.push("-group".to_string());
        args.push(group.clone());
    }

    Ok(args)
}
