use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Paths produced by one orchestrator run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredFile {
    /// Input file that was processed
    pub original: PathBuf,
    /// Archived first-seen copy (`None` when archiving was not requested)
    pub archived: Option<PathBuf>,
    /// Whether this run wrote the archive copy
    pub archived_now: bool,
    /// Stripped PNG output
    pub processed: PathBuf,
}

impl StoredFile {
    /// File name of the processed output
    pub fn processed_name(&self) -> String {
        self.processed
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Characters that survive sanitizing
static UNSAFE_CHARS: OnceLock<Regex> = OnceLock::new();

fn unsafe_chars() -> &'static Regex {
    UNSAFE_CHARS.get_or_init(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("static regex"))
}

/// Reduce a client-supplied filename to a safe flat basename.
///
/// Non-ASCII letters are transliterated (`ü` to `u`), other non-ASCII
/// characters are dropped. Path separators and whitespace runs become `_`,
/// anything outside `[A-Za-z0-9_.-]` is dropped and leading/trailing `.`/`_`
/// are trimmed. Returns `None` when nothing usable is left.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let mut folded = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii() {
            folded.push(c);
        } else if c.is_alphabetic() {
            folded.push_str(deunicode::deunicode_char(c).unwrap_or(""));
        }
    }

    let spaced = folded.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = unsafe_chars().replace_all(&joined, "");
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Case-insensitive extension check against an allow-list
pub fn is_allowed_extension(name: &str, allowed: &[String]) -> bool {
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => {
            allowed.iter().any(|a| a.eq_ignore_ascii_case(ext))
        }
        _ => false,
    }
}

/// A name that can be joined onto a flat directory without escaping it
pub fn is_plain_basename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && Path::new(name).file_name().is_some()
}

/// Processed output name for an input: the stem with a `.png` extension
pub fn processed_file_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{stem}.png")
}
