//! Quarter cell sub-parse for quarterly extracts.
//!
//! The collector writes the INE period object as JSON (`{"Codigo":"II","Nombre":"T2"}`);
//! extracts produced by older tooling hold the single-quoted literal form
//! (`{'Codigo': 'II', 'Nombre': 'T2', 'Cod_IOE': None}`). Both are accepted.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Quarter {
    #[serde(rename = "Codigo")]
    pub code: String,
    #[serde(rename = "Nombre")]
    pub name: String,
}

/// `None` when the cell is empty or not a `{Codigo, Nombre}` object
pub fn parse_quarter(cell: &str) -> Option<Quarter> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    serde_json::from_str(cell)
        .or_else(|_| serde_json::from_str(&literal_to_json(cell)))
        .ok()
}

/// Rewrite a single-quoted literal dict as JSON: either quote style becomes `"`,
/// and bare `None`, `True` and `False` become `null`, `true` and `false`
fn literal_to_json(cell: &str) -> String {
    let mut out = String::with_capacity(cell.len());
    let mut chars = cell.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                out.push('"');
                while let Some(inner) = chars.next() {
                    match inner {
                        '\\' => match chars.next() {
                            Some('\'') => out.push('\''),
                            Some(escaped) => {
                                out.push('\\');
                                out.push(escaped);
                            }
                            None => out.push_str("\\\\"),
                        },
                        q if q == c => break,
                        '"' => out.push_str("\\\""),
                        other => out.push(other),
                    }
                }
                out.push('"');
            }
            c if c.is_ascii_alphabetic() => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if !(next.is_ascii_alphanumeric() || next == '_') {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                out.push_str(match word.as_str() {
                    "None" => "null",
                    "True" => "true",
                    "False" => "false",
                    other => other,
                });
            }
            other => out.push(other),
        }
    }

    out
}
