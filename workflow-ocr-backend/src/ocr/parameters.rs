//! Translation of the free-form `ocrmypdf_parameters` string.
//!
//! Callers send OCRmyPDF options the way they would type them on a command
//! line, e.g. `--skip-text --language eng+deu --tesseract-pagesegmode 7`. The
//! string is turned into a typed, insertion-ordered mapping which the engine
//! later renders back onto its own command line.

use tracing::warn;

const OPTION_MARKER: &str = "--";

/// Options the engine invoker sets itself and callers may not override.
const RESERVED_OPTIONS: [&str; 3] = ["sidecar", "progress-bar", "no-progress-bar"];

/// Typed value of a single option.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Flag(bool),
    Text(String),
    Integer(i64),
    Float(f64),
    List(Vec<String>),
}

impl ParamValue {
    fn from_token(token: &str) -> Self {
        if token.contains('+') {
            return Self::List(token.split('+').map(str::to_string).collect());
        }
        if is_ascii_digits(token) {
            // digit runs too long for i64 stay textual
            return token
                .parse()
                .map(Self::Integer)
                .unwrap_or_else(|_| Self::Text(token.to_string()));
        }
        if is_decimal(token) {
            if let Ok(value) = token.parse() {
                return Self::Float(value);
            }
        }
        if token.eq_ignore_ascii_case("true") {
            return Self::Flag(true);
        }
        if token.eq_ignore_ascii_case("false") {
            return Self::Flag(false);
        }
        Self::Text(token.to_string())
    }
}

fn is_ascii_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// At least one digit and exactly one decimal point: `1.5`, `.5`, `5.`.
fn is_decimal(s: &str) -> bool {
    s.bytes().filter(|&b| b == b'.').count() == 1
        && s.bytes().any(|b| b.is_ascii_digit())
        && s.bytes().all(|b| b == b'.' || b.is_ascii_digit())
}

/// Insertion-ordered option mapping; a repeated name replaces the earlier value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedParameters {
    entries: Vec<(String, ParamValue)>,
}

impl ParsedParameters {
    /// Parse a raw parameter string. Never fails: fragments that do not
    /// look like options are skipped, odd values fall back to text.
    ///
    /// Only the first whitespace-separated token after an option name is
    /// used as its value; anything after it in the same fragment is dropped.
    pub fn parse(raw: Option<&str>) -> Self {
        let mut parsed = Self::default();
        let Some(raw) = raw else {
            return parsed;
        };

        for fragment in raw.split(OPTION_MARKER).map(str::trim) {
            if fragment.is_empty() {
                continue;
            }

            let mut tokens = fragment.split_whitespace();
            let Some(name) = tokens.next() else {
                continue;
            };
            let value = match tokens.next() {
                Some(token) => ParamValue::from_token(token),
                None => ParamValue::Flag(true),
            };

            parsed.insert(name, value);
        }

        parsed
    }

    fn insert(&mut self, name: &str, value: ParamValue) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Render the options as OCRmyPDF command-line arguments.
    ///
    /// `Flag(false)` is omitted, lists repeat the option once per item and
    /// underscores in names become dashes.
    pub fn to_cli_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        for (name, value) in self.iter() {
            let option = name.replace('_', "-");
            if RESERVED_OPTIONS.contains(&option.as_str()) {
                warn!(option = %option, "Ignoring OCR parameter reserved by the engine invoker");
                continue;
            }
            let flag = format!("{OPTION_MARKER}{option}");

            match value {
                ParamValue::Flag(true) => args.push(flag),
                ParamValue::Flag(false) => {}
                ParamValue::Text(text) => args.extend([flag, text.clone()]),
                ParamValue::Integer(n) => args.extend([flag, n.to_string()]),
                ParamValue::Float(f) => args.extend([flag, f.to_string()]),
                ParamValue::List(items) => {
                    for item in items {
                        args.extend([flag.clone(), item.clone()]);
                    }
                }
            }
        }

        args
    }
}
