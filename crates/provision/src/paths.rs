//! Path expansion for configured locations.

use std::env;
use std::path::PathBuf;

/// Expand `%VAR%` references and a leading `~` in a configured path.
/// Unknown variables are left in place.
pub fn expand(raw: &str) -> PathBuf {
    expand_with(raw, |name| env::var(name).ok())
}

fn expand_with(raw: &str, lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('%') {
        let Some(len) = rest[start + 1..].find('%') else {
            break;
        };
        let name = &rest[start + 1..start + 1 + len];
        out.push_str(&rest[..start]);
        match lookup(name) {
            Some(value) => out.push_str(&value),
            None => {
                out.push('%');
                out.push_str(name);
                out.push('%');
            }
        }
        rest = &rest[start + len + 2..];
    }
    out.push_str(rest);

    let expanded = shellexpand::tilde(&out);
    PathBuf::from(expanded.as_ref())
}
