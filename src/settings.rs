use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::parser::chunk::DEFAULT_MAX_BLOCK_CHARS;

const DEFAULT_CONFIG_FILE: &str = "bible_pdf_parser";
const ENV_PREFIX: &str = "BPP";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub max_block_chars: usize,
    pub output_dir: PathBuf,
    pub debug_sample_chars: usize,
    pub write_debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_block_chars: DEFAULT_MAX_BLOCK_CHARS,
            output_dir: PathBuf::from("outputs"),
            debug_sample_chars: 2000,
            write_debug: true,
        }
    }
}

impl Settings {
    /// Defaults, then the config file (optional unless given explicitly),
    /// then `BPP_*` environment variables.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("max_block_chars", defaults.max_block_chars as u64)?
            .set_default("output_dir", defaults.output_dir.to_string_lossy().to_string())?
            .set_default("debug_sample_chars", defaults.debug_sample_chars as u64)?
            .set_default("write_debug", defaults.write_debug)?;

        builder = match file {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        let settings: Settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("failed to load configuration")?
            .try_deserialize()
            .context("invalid configuration")?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_block_chars == 0 {
            bail!("max_block_chars must be greater than zero");
        }
        Ok(())
    }
}
