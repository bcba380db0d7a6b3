use std::path::{Component, Path, PathBuf};

/// Returns only the left-pad zeros needed to make `run_number` occupy `width` digits.
///
/// `zero_prefix(123, 6)` is `"000"`; numbers already as wide as `width` get an empty prefix.
pub fn zero_prefix(run_number: u64, width: usize) -> String {
    let digits = run_number.to_string().len();
    "0".repeat(width.saturating_sub(digits))
}

/// Returns the full zero-padded run id, e.g. `format_cycle_id(123, 6) == "000123"`.
pub fn format_cycle_id(run_number: u64, width: usize) -> String {
    format!("{:0width$}", run_number, width = width)
}

/// Joins `maybe_relative` onto `base` unless it is already absolute.
pub fn resolve_under(base: &Path, maybe_relative: &Path) -> PathBuf {
    if maybe_relative.is_absolute() {
        maybe_relative.to_path_buf()
    } else {
        base.join(maybe_relative)
    }
}

/// Lexically removes `.` and `..` components without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = match out.components().next_back() {
                    Some(Component::Normal(_)) => out.pop(),
                    _ => false,
                };
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()))
    }
}

/// Computes the path of `target` as seen from the directory `base`.
///
/// Both paths are made absolute against the current directory first, so the result
/// matches what a process started inside `base` would need to reach `target`.
/// Paths on different roots (e.g. different Windows drives) are returned absolute.
pub fn relative_to(target: &Path, base: &Path) -> PathBuf {
    let target = absolute(target);
    let base = absolute(base);

    let target_parts: Vec<Component> = target.components().collect();
    let base_parts: Vec<Component> = base.components().collect();

    if target_parts.first() != base_parts.first() {
        return target;
    }

    let common = target_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..base_parts.len() {
        rel.push("..");
    }
    for part in &target_parts[common..] {
        rel.push(part.as_os_str());
    }
    if rel.as_os_str().is_empty() {
        rel.push(".");
    }
    rel
}

/// Renders a path with `/` separators regardless of platform.
pub fn to_posix(path: &Path) -> String {
    let mut out = String::new();
    for (i, component) in path.components().enumerate() {
        match component {
            Component::RootDir => {
                out.push('/');
                continue;
            }
            Component::Prefix(prefix) => {
                out.push_str(&prefix.as_os_str().to_string_lossy());
                continue;
            }
            _ => {}
        }
        if i > 0 && !out.ends_with('/') {
            out.push('/');
        }
        out.push_str(&component.as_os_str().to_string_lossy());
    }
    out
}
