use regex::Regex;
use std::sync::LazyLock;

static ELLIPSIS_PERIOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\u{2026}\.").expect("valid ellipsis pattern"));

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid digit pattern"));

static QUOTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["“”‘’]"#).expect("valid quote pattern"));

/// Anchor a configured segment suffix pattern at the end of the text
pub fn compile_trim_suffix(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("(?:{})$", pattern))
}

/// Prepare text for a voice: drop the configured trailing suffix and the
/// period that some editions append after an ellipsis.
pub fn normalize_text(text: &str, trim_suffix: Option<&Regex>) -> String {
    let text = match trim_suffix {
        Some(re) => re.replace(text, ""),
        None => text.into(),
    };
    ELLIPSIS_PERIOD.replace_all(&text, "\u{2026}").into_owned()
}

pub fn strip_numbers(text: &str) -> String {
    DIGITS.replace_all(text, "").into_owned()
}

pub fn strip_quotes(text: &str) -> String {
    QUOTES.replace_all(text, "").into_owned()
}
