//! Rendering of the cracked passwords.

use std::{fmt::Display, fs, path::Path, str::FromStr};

use chrono::{DateTime, Local, SecondsFormat};
use serde::{Deserialize, Serialize};

use crate::{
    error::{BrutyfError, BrutyfResult},
    VERSION,
};

const SEPARATOR: &str = "------------------------";

/// A cracked hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrackResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub hash: String,
    pub password: String,
}

/// The available export formats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

#[derive(Serialize)]
struct JsonExport<'a> {
    generated: String,
    version: &'static str,
    total_found: usize,
    results: &'a [CrackResult],
}

impl OutputFormat {
    /// The usual file extension of this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }

    /// Renders the results, timestamped with the current time.
    pub fn render(&self, results: &[CrackResult]) -> BrutyfResult<String> {
        self.render_at(results, Local::now())
    }

    /// Renders the results, timestamped with `generated`.
    pub fn render_at(
        &self,
        results: &[CrackResult],
        generated: DateTime<Local>,
    ) -> BrutyfResult<String> {
        let rendered = match self {
            OutputFormat::Text => {
                let mut content = String::from("[ BrutyF Result ]\n");
                content.push_str(&format!(
                    "Generated: {}\n",
                    generated.format("%Y-%m-%d %H:%M:%S")
                ));
                content.push_str(SEPARATOR);
                content.push('\n');

                for result in results {
                    if let Some(username) = &result.username {
                        content.push_str(username);
                        content.push(':');
                    }
                    content.push_str(&format!("{}:{}\n", result.hash, result.password));
                }

                content.push_str(SEPARATOR);
                content.push('\n');
                content.push_str(&format!("Total: {} password(s) found\n", results.len()));
                content
            }

            OutputFormat::Json => serde_json::to_string_pretty(&JsonExport {
                generated: generated.to_rfc3339_opts(SecondsFormat::Secs, false),
                version: VERSION,
                total_found: results.len(),
                results,
            })?,

            OutputFormat::Csv => {
                let mut content = String::from("hash,password,username\n");

                for result in results {
                    content.push_str(&format!(
                        "{},{},{}\n",
                        csv_field(&result.hash),
                        csv_field(&result.password),
                        csv_field(result.username.as_deref().unwrap_or_default())
                    ));
                }

                content
            }
        };

        Ok(rendered)
    }

    /// Writes the rendered results to `path`.
    pub fn export(&self, results: &[CrackResult], path: &Path) -> BrutyfResult<()> {
        fs::write(path, self.render(results)?).map_err(|e| BrutyfError::open(path, e))
    }
}

fn csv_field(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

impl FromStr for OutputFormat {
    type Err = BrutyfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(BrutyfError::Unrecognized {
                kind: "output format",
                value: s.to_owned(),
            }),
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => f.write_str("text"),
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Csv => f.write_str("csv"),
        }
    }
}
