//! System users and groups
//!
//! Feeds the owner/group dropdowns and resolves numeric ids in result rows.

use crate::error::Result;
use std::collections::HashMap;
use std::path::Path;

/// Users and groups known to the system
#[derive(Debug, Clone, Default)]
pub struct AccountDirectory {
    users: HashMap<u32, String>,
    groups: HashMap<u32, String>,
}

impl AccountDirectory {
    /// Read `/etc/passwd` and `/etc/group`
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("/etc/passwd"), Path::new("/etc/group"))
    }

    pub fn load_from(passwd: &Path, group: &Path) -> Result<Self> {
        let passwd = std::fs::read_to_string(passwd)?;
        let group = std::fs::read_to_string(group)?;
        Ok(Self::parse(&passwd, &group))
    }

    /// Parse the colon-separated databases; malformed lines are skipped
    pub fn parse(passwd: &str, group: &str) -> Self {
        Self {
            users: parse_id_table(passwd),
            groups: parse_id_table(group),
        }
    }

    pub fn user_name(&self, uid: u32) -> Option<&str> {
        self.users.get(&uid).map(String::as_str)
    }

    pub fn group_name(&self, gid: u32) -> Option<&str> {
        self.groups.get(&gid).map(String::as_str)
    }

    /// User names, sorted
    pub fn user_list(&self) -> Vec<String> {
        sorted_names(&self.users)
    }

    /// Group names, sorted
    pub fn group_list(&self) -> Vec<String> {
        sorted_names(&self.groups)
    }
}

/// `name:x:id:...` lines, both passwd and group share the first three fields
fn parse_id_table(content: &str) -> HashMap<u32, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter_map(|line| {
            let mut fields = line.split(':');
            let name = fields.next()?.trim();
            let _password = fields.next()?;
            let id = fields.next()?.trim().parse::<u32>().ok()?;
            (!name.is_empty()).then(|| (id, name.to_string()))
        })
        .collect()
}

fn sorted_names(table: &HashMap<u32, String>) -> Vec<String> {
    let mut names: Vec<String> = table.values().cloned().collect();
    names.sort();
    names.dedup();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASSWD: &str = "\
root:x:0:0:root:/root:/bin/bash
# comment line
daemon:x:1:1:daemon:/usr/sbin:/usr/sbin/nologin
alice:x:1000:1000:Alice,,,:/home/alice:/bin/zsh
broken-line
bob:x:notanumber:1001::/home/bob:/bin/sh
";

    const GROUP: &str = "\
root:x:0:
wheel:x:10:alice
alice:x:1000:
";

    #[test]
    fn resolves_ids() {
        let dir = AccountDirectory::parse(PASSWD, GROUP);
        assert_eq!(dir.user_name(0), Some("root"));
        assert_eq!(dir.user_name(1000), Some("alice"));
        assert_eq!(dir.user_name(1001), None);
        assert_eq!(dir.group_name(10), Some("wheel"));
    }

    #[test]
    fn lists_are_sorted_and_skip_malformed() {
        let dir = AccountDirectory::parse(PASSWD, GROUP);
        assert_eq!(dir.user_list(), vec!["alice", "daemon", "root"]);
        assert_eq!(dir.group_list(), vec!["alice", "root", "wheel"]);
    }

    #[test]
    fn load_from_files() {
        let tmp = tempfile::tempdir().unwrap();
        let passwd = tmp.path().join("passwd");
        let group = tmp.path().join("group");
        std::fs::write(&passwd, PASSWD).unwrap();
        std::fs::write(&group, GROUP).unwrap();
        let dir = AccountDirectory::load_from(&passwd, &group).unwrap();
        assert_eq!(dir.user_list().len(), 3);

        let missing = tmp.path().join("nope");
        assert!(AccountDirectory::load_from(&missing, &group).is_err());
    }
}
