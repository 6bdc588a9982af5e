//! Module-file and configuration parser.
//!
//! A module file holds one module per line:
//!
//! ```text
//! <name> <area> <aspect_ratio>
//! ```
//!
//! Fields are whitespace separated and every line must have exactly three
//! of them; a blank line is a format error. A final newline is allowed.

use std::fs;
use std::path::Path;
use thiserror::Error;
use u_floorplan_core::{Module, ModuleCatalog, SaConfig};

/// Errors that can occur when loading input files.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line {line}: expected `<name> <area> <aspect_ratio>`, found {found} field(s)")]
    Format { line: usize, found: usize },

    #[error("Line {line}: invalid {field} {value:?}")]
    Number {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("Line {line}: {source}")]
    Module {
        line: usize,
        #[source]
        source: u_floorplan_core::Error,
    },

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ParseError {
    /// 1-based line the error refers to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Format { line, .. } | Self::Number { line, .. } | Self::Module { line, .. } => {
                Some(*line)
            }
            Self::Io(_) | Self::Json(_) => None,
        }
    }
}

/// Parser for module files and JSON annealing configurations.
#[derive(Debug, Default)]
pub struct ModuleFileParser;

impl ModuleFileParser {
    /// Creates a new parser.
    pub fn new() -> Self {
        Self
    }

    /// Parses a module file into a catalog.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<ModuleCatalog, ParseError> {
        let content = fs::read_to_string(path)?;
        self.parse_str(&content)
    }

    /// Parses module lines from a string.
    pub fn parse_str(&self, content: &str) -> Result<ModuleCatalog, ParseError> {
        let mut catalog = ModuleCatalog::new();

        for (idx, raw) in content.lines().enumerate() {
            let line = idx + 1;
            let module = self.parse_line(line, raw)?;
            catalog
                .add(module)
                .map_err(|source| ParseError::Module { line, source })?;
        }

        log::debug!("parsed {} modules", catalog.len());
        Ok(catalog)
    }

    /// Parses a single `<name> <area> <aspect_ratio>` line.
    fn parse_line(&self, line: usize, raw: &str) -> Result<Module, ParseError> {
        let fields: Vec<&str> = raw.split_whitespace().collect();
        match fields.as_slice() {
            [name, area, ratio] => {
                let area = parse_number(line, "area", area)?;
                let ratio = parse_number(line, "aspect ratio", ratio)?;
                Module::from_area(*name, area, ratio)
                    .map_err(|source| ParseError::Module { line, source })
            }
            other => Err(ParseError::Format {
                line,
                found: other.len(),
            }),
        }
    }

    /// Loads an annealing configuration from a JSON file.
    ///
    /// Missing fields take their default values.
    pub fn load_config(&self, path: impl AsRef<Path>) -> Result<SaConfig, ParseError> {
        let content = fs::read_to_string(path)?;
        self.parse_config(&content)
    }

    /// Parses an annealing configuration from a JSON string.
    pub fn parse_config(&self, json: &str) -> Result<SaConfig, ParseError> {
        Ok(serde_json::from_str(json)?)
    }
}

fn parse_number(line: usize, field: &'static str, value: &str) -> Result<f64, ParseError> {
    value.parse::<f64>().map_err(|_| ParseError::Number {
        line,
        field,
        value: value.to_string(),
    })
}
