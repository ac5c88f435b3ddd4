//! Line grammar of the text format.
//!
//! ```text
//! \\ Name: Temperature alarms
//! \\ Row: 0
//! com.industry.analytics.Analytic("Threshold",["Temp"],["Alarm"],{"threshold":"30.0d"})
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

static MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\\\\\s*([A-Za-z]+)\s*:\s*(.*?)\s*$").expect("marker pattern compiles")
});

static ANALYTIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"^\s*([A-Za-z_]\w*(?:\.[A-Za-z_]\w*)*)\.Analytic\(\s*"#,
        r#""((?:[^"\\]|\\.)*)"\s*,\s*"#,
        r#"(\[(?:"(?:[^"\\]|\\.)*"|[^\]"])*\])\s*,\s*"#,
        r#"(\[(?:"(?:[^"\\]|\\.)*"|[^\]"])*\])\s*,\s*"#,
        r#"(\{.*\})\s*\)\s*;?\s*$"#,
    ))
    .expect("analytic pattern compiles")
});

static QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""(?:[^"\\]|\\.)*""#).expect("quoted pattern compiles"));

pub(crate) const COMMENT_PREFIX: &str = "\\\\";

/// One non-blank line of input.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Line<'a> {
    /// `\\ Key: Value`
    Marker { key: &'a str, value: &'a str },
    /// Any other `\\` line.
    Comment,
    Analytic(AnalyticLine<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AnalyticLine<'a> {
    pub namespace: &'a str,
    pub name: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub properties: &'a str,
}

/// Classifies `line`; `None` means it matches no production of the grammar.
pub(crate) fn classify(line: &str) -> Option<Line<'_>> {
    if line.trim_start().starts_with(COMMENT_PREFIX) {
        return Some(match MARKER.captures(line.trim()) {
            Some(caps) => {
                let (_, [key, value]) = caps.extract();
                Line::Marker { key, value }
            }
            None => Line::Comment,
        });
    }

    let caps = ANALYTIC.captures(line)?;
    let (_, [namespace, name, inputs, outputs, properties]) = caps.extract();
    Some(Line::Analytic(AnalyticLine {
        namespace,
        name: unescape(&format!("\"{}\"", name)),
        inputs: quoted_strings(inputs),
        outputs: quoted_strings(outputs),
        properties,
    }))
}

/// Every double-quoted string in `text`, unescaped; anything between them
/// (brackets, commas, stray tokens) is ignored.
pub(crate) fn quoted_strings(text: &str) -> Vec<String> {
    QUOTED
        .find_iter(text)
        .map(|m| unescape(m.as_str()))
        .collect()
}

/// Quotes `value` the way the format's string literals are written.
pub(crate) fn quote(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn unescape(quoted: &str) -> String {
    serde_json::from_str::<String>(quoted)
        .unwrap_or_else(|_| quoted.trim_matches('"').to_string())
}
