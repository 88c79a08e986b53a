//! Repository identifier normalization.

/// Coerce file paths and URLs into a comparable lowercase repo value.
///
/// URLs reduce to `host[:port]/path` with any trailing slash removed;
/// everything else is treated as a filesystem path and lexically cleaned.
/// An empty input stays empty.
#[must_use]
pub fn normalize_repo(raw: &str) -> String {
    let s = raw.trim();
    if s.is_empty() {
        return String::new();
    }
    if let Ok(u) = url::Url::parse(s) {
        if let Some(host) = u.host_str() {
            let mut out = host.to_string();
            if let Some(port) = u.port() {
                out.push_str(&format!(":{port}"));
            }
            out.push_str(u.path());
            return out.trim_end_matches('/').to_lowercase();
        }
    }
    clean_path(s).to_lowercase()
}

/// Lexical path cleaning: collapse `//`, drop `.` segments, resolve `..`
/// where possible, strip trailing slashes.
fn clean_path(s: &str) -> String {
    let rooted = s.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for comp in s.split('/') {
        match comp {
            "" | "." => {},
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else if !rooted {
                    parts.push("..");
                }
            },
            c => parts.push(c),
        }
    }
    let joined = parts.join("/");
    if rooted {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_reduces_to_host_and_path() {
        assert_eq!(
            normalize_repo("https://github.com/Acme/Widgets/"),
            "github.com/acme/widgets"
        );
        assert_eq!(
            normalize_repo("ssh://git.corp:2222/Team/Repo"),
            "git.corp:2222/team/repo"
        );
    }

    #[test]
    fn test_paths_are_cleaned_and_lowercased() {
        assert_eq!(normalize_repo("/Work/Proj//src/.."), "/work/proj");
        assert_eq!(normalize_repo("repos/./Thing/"), "repos/thing");
    }

    #[test]
    fn test_empty_stays_empty() {
        assert_eq!(normalize_repo("   "), "");
    }

    #[test]
    fn test_bare_name_passes_through() {
        assert_eq!(normalize_repo("MyRepo"), "myrepo");
    }
}
