//! Platform naming rules for destination paths.

use std::fmt::Debug;
use std::sync::Arc;

pub type RulesHandle = Arc<dyn PathRules + Send + Sync>;

/// How group labels and source paths turn into names on the destination
/// filesystem.
pub trait PathRules: Debug {
    /// Turns a group label into a directory name that is legal and can never
    /// address the destination root or its parent.
    fn sanitize(&self, label: &str) -> String;

    /// The final component of a source path.
    fn file_name<'a>(&self, path: &'a str) -> &'a str;

    /// The name to try for `name` on its `attempt`-th collision.
    ///
    /// Attempt `0` is the name itself. Later attempts insert `_<attempt>`
    /// before the extension, or append it when there is none. A leading dot
    /// marks a hidden file, not an extension.
    fn candidate(&self, name: &str, attempt: u32) -> String {
        if attempt == 0 {
            return name.to_string();
        }
        match name.rfind('.').filter(|&dot| dot > 0) {
            Some(dot) => format!("{}_{attempt}{}", &name[..dot], &name[dot..]),
            None => format!("{name}_{attempt}"),
        }
    }
}

/// Windows naming: `< > : " / \ | ? *` are replaced and trailing spaces and
/// periods stripped. Both slashes separate path components.
#[derive(Debug, Clone, Copy, Default)]
pub struct Windows;
impl Windows {
    const RESERVED: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
}
impl PathRules for Windows {
    fn sanitize(&self, label: &str) -> String {
        let replaced: String = label.chars().map(|c| if Self::RESERVED.contains(&c) { '_' } else { c }).collect();
        addressable(replaced.trim_end_matches([' ', '.']))
    }

    fn file_name<'a>(&self, path: &'a str) -> &'a str {
        path.rsplit(['/', '\\']).next().unwrap_or(path)
    }
}

/// POSIX naming: only `/` and NUL are replaced, nothing is stripped. Only `/`
/// separates path components.
#[derive(Debug, Clone, Copy, Default)]
pub struct Posix;
impl PathRules for Posix {
    fn sanitize(&self, label: &str) -> String {
        let replaced: String = label.chars().map(|c| if c == '/' || c == '\0' { '_' } else { c }).collect();
        addressable(&replaced)
    }

    fn file_name<'a>(&self, path: &'a str) -> &'a str {
        path.rsplit('/').next().unwrap_or(path)
    }
}

fn addressable(name: &str) -> String {
    match name {
        "" | "." | ".." => "_".to_string(),
        name => name.to_string(),
    }
}
