//! Metadata snapshot of a registry and the help/version renderers built on it.

use serde::{Deserialize, Serialize};

/// Minimum width of the token column in the `FLAGS:` listing.
pub const FLAG_COLUMN_WIDTH: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct FlagMeta {
    pub token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub takes_value: bool,
}

/// Application descriptor plus every registered flag, in registry order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct AppMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<FlagMeta>,
}

impl AppMeta {
    /// Encode as pretty-printed JSON (for completion generators, docs, etc).
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Decode a snapshot produced by [`AppMeta::to_json`].
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Render the help listing printed by `-h`.
///
/// The description line is omitted when empty. Value-taking flags are marked
/// with `(requires value)`.
pub fn render_help(meta: &AppMeta) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str(&meta.name);
    out.push('\n');
    if !meta.description.is_empty() {
        out.push_str(&meta.description);
        out.push('\n');
    }

    out.push_str("\nUSAGE:\n");
    out.push_str(&format!("  {} [flag] [value]\n", meta.name));

    out.push_str("\nFLAGS:\n");
    for flag in &meta.flags {
        if flag.takes_value {
            out.push_str(&format!(
                "  {:<width$} {} (requires value)\n",
                flag.token,
                flag.description,
                width = FLAG_COLUMN_WIDTH
            ));
        } else {
            out.push_str(&format!(
                "  {:<width$} {}\n",
                flag.token,
                flag.description,
                width = FLAG_COLUMN_WIDTH
            ));
        }
    }

    out.push('\n');
    out
}

/// Render the line printed by `-v`.
pub fn render_version(name: &str, version: &str) -> String {
    format!("{name} v{version}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> AppMeta {
        AppMeta {
            name: "tool".to_string(),
            description: "Does things".to_string(),
            version: "0.3.1".to_string(),
            flags: vec![
                FlagMeta {
                    token: "-q".to_string(),
                    description: "Quiet".to_string(),
                    takes_value: false,
                },
                FlagMeta {
                    token: "--output-directory".to_string(),
                    description: "Where to write".to_string(),
                    takes_value: true,
                },
            ],
        }
    }

    #[test]
    fn help_pads_tokens_to_column_width() {
        let text = render_help(&meta());
        let expected = [
            "",
            "tool",
            "Does things",
            "",
            "USAGE:",
            "  tool [flag] [value]",
            "",
            "FLAGS:",
            "  -q              Quiet",
            "  --output-directory Where to write (requires value)",
            "",
            "",
        ]
        .join("\n");
        assert_eq!(text, expected);
    }

    #[test]
    fn help_skips_empty_description() {
        let meta = AppMeta {
            description: String::new(),
            ..meta()
        };
        let text = render_help(&meta);
        assert!(text.starts_with("\ntool\n\nUSAGE:\n"), "unexpected help:\n{text}");
    }

    #[test]
    fn version_line() {
        assert_eq!(render_version("tool", "0.3.1"), "tool v0.3.1\n");
    }

    #[test]
    fn json_uses_kebab_case_keys() {
        let json = meta().to_json().unwrap();
        assert!(json.contains("\"takes-value\": true"), "unexpected json:\n{json}");
        assert!(json.contains("\"token\": \"--output-directory\""));

        let decoded = AppMeta::from_json(&json).unwrap();
        assert_eq!(decoded.flags.len(), 2);
        assert!(decoded.flags[1].takes_value);
    }
}
