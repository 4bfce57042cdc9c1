use serde::Deserialize;

use crate::error::LinkError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkConfig {
    pub name: String,
    /// Jurisdiction code registry rows must carry to be kept.
    #[serde(default = "default_jurisdiction")]
    pub jurisdiction: String,
    /// Field delimiter for all sources. Sniffed per file when absent.
    #[serde(default)]
    pub delimiter: Option<String>,
    pub sources: SourceFiles,
    pub output: OutputConfig,
}

fn default_jurisdiction() -> String {
    "NY".into()
}

// ---------------------------------------------------------------------------
// Sources + Output
// ---------------------------------------------------------------------------

/// Input file paths, relative to the config file's directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceFiles {
    pub registry: String,
    pub geography: String,
    pub reference: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    pub csv: String,
    /// Optional JSON run report.
    #[serde(default)]
    pub json: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl LinkConfig {
    pub fn from_toml(input: &str) -> Result<Self, LinkError> {
        let config: LinkConfig =
            toml::from_str(input).map_err(|e| LinkError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LinkError> {
        if self.name.trim().is_empty() {
            return Err(LinkError::ConfigValidation("name must not be empty".into()));
        }

        if self.jurisdiction.trim().is_empty() {
            return Err(LinkError::ConfigValidation(
                "jurisdiction must not be empty".into(),
            ));
        }

        let paths = [
            ("sources.registry", &self.sources.registry),
            ("sources.geography", &self.sources.geography),
            ("sources.reference", &self.sources.reference),
            ("output.csv", &self.output.csv),
        ];
        for (key, path) in paths {
            if path.trim().is_empty() {
                return Err(LinkError::ConfigValidation(format!("{key} must not be empty")));
            }
        }

        self.delimiter_byte()?;
        Ok(())
    }

    /// The configured delimiter as a single byte, if any.
    pub fn delimiter_byte(&self) -> Result<Option<u8>, LinkError> {
        let Some(ref d) = self.delimiter else {
            return Ok(None);
        };
        let d = if d == "\\t" { "\t" } else { d.as_str() };
        match d.as_bytes() {
            [b] if d.is_ascii() => Ok(Some(*b)),
            _ => Err(LinkError::ConfigValidation(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter.as_deref().unwrap_or_default()
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
