use std::path::{Path, PathBuf};

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Resolves a path from the configuration against the directory of the configuration.
pub fn resolve_path(root: &Path, file_path: &str) -> String {
    let p: PathBuf = [root, Path::new(file_path)].iter().collect();
    p.as_path().display().to_string()
}

/// A file-name friendly version of a label: lower case ascii, words joined by `_`.
pub fn slug(label: &str) -> String {
    let mut res = String::new();
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            res.push(c.to_ascii_lowercase());
        } else if !res.is_empty() && !res.ends_with('_') {
            res.push('_');
        }
    }
    while res.ends_with('_') {
        res.pop();
    }
    if res.is_empty() {
        "survey".to_string()
    } else {
        res
    }
}
