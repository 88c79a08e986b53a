//! Fixed-tier risk classification of command text.

use regex::Regex;
use std::sync::LazyLock;
use ward_core::RiskClass;

/// CLI wrapper prefix tolerated on governed commands.
///
/// Agents issue both `ward approvals list` and bare `approvals list`; the
/// classifier tests both the normalized command and the form with this
/// prefix stripped.
const WRAPPER_PREFIX: &str = "ward ";

/// Read-only inspection commands.
const CLASS0_PREFIXES: &[&str] = &[
    "cat ",
    "date",
    "echo ",
    "find ",
    "git branch",
    "git diff",
    "git log",
    "git show",
    "git status",
    "head ",
    "ls",
    "ps ",
    "pwd",
    "rg ",
    "tail ",
    "ward approvals list",
    "ward approvals show",
    "ward policy",
    "ward runs",
    "wc ",
    "whoami",
];

/// Local, reversible write operations.
const CLASS1_PREFIXES: &[&str] = &[
    "cargo build",
    "cargo fmt",
    "cargo test",
    "git add",
    "git checkout ",
    "git commit",
    "git restore ",
    "make ",
    "node --test",
    "npm test",
    "ward init",
];

/// Network-mutating, service-lifecycle, and package-installing commands.
const CLASS2_PREFIXES: &[&str] = &[
    "apt ",
    "brew ",
    "cargo install",
    "cargo publish",
    "curl ",
    "docker push",
    "git fetch",
    "git pull",
    "git push",
    "go get ",
    "kubectl apply",
    "launchctl ",
    "npm install",
    "pip install",
    "pnpm install",
    "service ",
    "systemctl ",
    "ward serve",
    "wget ",
    "yarn add ",
];

/// Destructive or privilege-escalating commands.
const CLASS3_PREFIXES: &[&str] = &[
    "chown ",
    "dd ",
    "git clean -fd",
    "git reset --hard",
    "mkfs ",
    "reboot",
    "rm ",
    "shutdown",
    "sudo ",
];

static CLASS2_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\b(--token|--password|--secret)\b",
        r"\b(npm|pnpm|yarn)\s+add\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static class2 pattern"))
    .collect()
});

static CLASS3_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\brm\s+-rf\b",
        r"\bchmod\s+777\b",
        r"\b(?:cat|less|more)\s+~?/.+/(?:\.ssh|\.aws|\.gnupg)/",
        r"\bexport\s+[^=\s]*(?:token|secret|password|key)[^=\s]*=",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static class3 pattern"))
    .collect()
});

/// Classify a command into one of the four risk classes.
///
/// The command string is preferred; when empty, `args` are joined with
/// spaces. An empty normalized command is `Class3Critical`. Tiers are
/// tested in strict severity order, so the most severe match always wins
/// regardless of what else the command resembles.
#[must_use]
pub fn classify_command(command: &str, args: &[String]) -> (RiskClass, &'static str) {
    let normalized = normalize_command(command, args);
    if normalized.is_empty() {
        return (RiskClass::Class3Critical, "empty command is denied");
    }
    let unprefixed = normalized
        .strip_prefix(WRAPPER_PREFIX)
        .map_or(normalized.as_str(), str::trim)
        .to_string();

    let both = [normalized.as_str(), unprefixed.as_str()];

    if both.iter().any(|c| {
        matches_prefix(c, CLASS3_PREFIXES) || matches_regex(c, &CLASS3_PATTERNS)
    }) {
        return (
            RiskClass::Class3Critical,
            "critical/destructive command pattern",
        );
    }
    if both.iter().any(|c| {
        matches_prefix(c, CLASS2_PREFIXES) || matches_regex(c, &CLASS2_PATTERNS)
    }) {
        return (
            RiskClass::Class2Sensitive,
            "sensitive command requires approval",
        );
    }
    if both.iter().any(|c| matches_prefix(c, CLASS0_PREFIXES)) {
        return (RiskClass::Class0Safe, "read-only command");
    }
    if both.iter().any(|c| matches_prefix(c, CLASS1_PREFIXES)) {
        return (
            RiskClass::Class1ControlledWrite,
            "controlled repo-local write operation",
        );
    }
    (
        RiskClass::Class1ControlledWrite,
        "default controlled-write policy (allow with audit)",
    )
}

/// Lowercased, trimmed command text; falls back to joining `args`.
pub(crate) fn normalize_command(command: &str, args: &[String]) -> String {
    let c = command.trim();
    if !c.is_empty() {
        return c.to_lowercase();
    }
    if args.is_empty() {
        return String::new();
    }
    args.join(" ").trim().to_lowercase()
}

fn matches_prefix(command: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| command.starts_with(p))
}

fn matches_regex(command: &str, patterns: &[Regex]) -> bool {
    patterns.iter().any(|p| p.is_match(command))
}
