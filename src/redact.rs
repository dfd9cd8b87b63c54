// ABOUTME: Secret redaction and cwd path rewriting for session JSONL bytes.
// ABOUTME: Pure pattern substitutions used by the `clean` command and the git clean/smudge filters.

use std::path::Path;
use std::sync::OnceLock;

use regex::bytes::{Captures, Regex};

/// Literal written in place of a redacted credential value.
pub const REDACTION_MARKER: &str = "[REDACTED]";

/// A single pattern → replacement substitution.
///
/// Patterns run over raw bytes with Unicode mode off, so content that is not
/// valid UTF-8 passes through untouched. Group 1 of every pattern captures the
/// key, colon and whitespace in front of the value so those bytes survive
/// unchanged.
pub struct RedactionRule {
    pub name: &'static str,
    pattern: Regex,
    replacement: &'static [u8],
}

impl RedactionRule {
    fn new(name: &'static str, pattern: &str, replacement: &'static str) -> Self {
        Self {
            name,
            pattern: Regex::new(&format!("(?-u){pattern}")).expect("valid redaction regex"),
            replacement: replacement.as_bytes(),
        }
    }

    /// Apply this rule to `content`.
    pub fn apply(&self, content: &[u8]) -> Vec<u8> {
        self.pattern
            .replace_all(content, self.replacement)
            .into_owned()
    }
}

/// Credential rules, in application order.
pub fn credential_rules() -> &'static [RedactionRule] {
    static RULES: OnceLock<Vec<RedactionRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        vec![
            RedactionRule::new(
                "primary-api-key",
                r#"("primaryApiKey"\s*:\s*)"sk-ant-(?:[^"\\]|\\.)*""#,
                r#"${1}"[REDACTED]""#,
            ),
            // Escaped forms: group 2 is the run of backslashes escaping the
            // value's quotes, reused so nesting depth is preserved.
            RedactionRule::new(
                "primary-api-key-escaped",
                r#"(\\+"primaryApiKey\\+"\s*:\s*)(\\+)"sk-ant-[^"\\]*\\+""#,
                r#"${1}${2}"[REDACTED]${2}""#,
            ),
            RedactionRule::new(
                "auth-token-escaped",
                r#"(\\+"ANTHROPIC_AUTH_TOKEN\\+"\s*:\s*)(\\+)"[^"\\]*\\+""#,
                r#"${1}${2}"[REDACTED]${2}""#,
            ),
            RedactionRule::new(
                "generic-credential",
                r#"(?i)("(?:apiKey|api_key|authorization|token|bearer)"\s*:\s*)"(?:[^"\\]|\\.)*""#,
                r#"${1}"[REDACTED]""#,
            ),
        ]
    })
}

/// Path rules used only by the git clean filter.
fn cwd_rules() -> &'static [RedactionRule] {
    static RULES: OnceLock<Vec<RedactionRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        vec![
            // Drive-letter paths; separators are one or two backslashes
            // depending on whether the writer escaped them.
            RedactionRule::new(
                "cwd-windows",
                r#"("cwd"\s*:\s*")[A-Za-z]:(?:\\{1,2}[^"\\]+)*\\{1,2}([^"\\]+)""#,
                r#"${1}${2}""#,
            ),
            RedactionRule::new(
                "cwd-unix",
                r#"("cwd"\s*:\s*")/(?:[^"/]+/)*([^"/]+)""#,
                r#"${1}${2}""#,
            ),
        ]
    })
}

fn bare_cwd_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?-u)("cwd"\s*:\s*)"([^"\\/]+)""#).expect("valid cwd regex")
    })
}

fn apply_all(rules: &[RedactionRule], content: &[u8]) -> Vec<u8> {
    rules
        .iter()
        .fold(content.to_vec(), |acc, rule| rule.apply(&acc))
}

/// Strip credentials from session content. Everything that does not match a
/// credential rule is left byte-for-byte intact.
pub fn redact(content: &[u8]) -> Vec<u8> {
    apply_all(credential_rules(), content)
}

/// Collapse absolute `cwd` values to their final path segment.
pub fn collapse_cwd(content: &[u8]) -> Vec<u8> {
    apply_all(cwd_rules(), content)
}

/// The git clean filter: credentials first, then `cwd` paths.
pub fn clean_filter(content: &[u8]) -> Vec<u8> {
    collapse_cwd(&redact(content))
}

/// The git smudge filter: expand bare `cwd` project names back to `working_dir`.
///
/// Values that already contain a path separator are left alone.
pub fn smudge(content: &[u8], working_dir: &Path) -> Vec<u8> {
    let encoded =
        serde_json::Value::String(working_dir.to_string_lossy().into_owned()).to_string();
    bare_cwd_pattern()
        .replace_all(content, |caps: &Captures| {
            let mut out = caps[1].to_vec();
            out.extend_from_slice(encoded.as_bytes());
            out
        })
        .into_owned()
}
