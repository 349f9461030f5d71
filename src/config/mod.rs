//! Configuration management for gatekeep
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Embedded defaults (`default-config.toml`)
//! 2. User config at `~/.config/gatekeep/config.{toml,json,yaml,yml}`
//! 3. Repository config `gatekeep.{toml,json,yaml,yml}`, searched upward from the working directory
//! 4. `GATEKEEP_*` environment variables, nested with `__`
//!
//! An explicit `--config FILE` replaces layers 2 and 3.

mod formats;

use anyhow::{Context, Result, bail};
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use formats::{CONFIG_EXTENSIONS, FileProvider, file_provider};

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

/// Prefix for environment overrides, e.g. `GATEKEEP_TARGETS__EXCLUDE`
pub const ENV_PREFIX: &str = "GATEKEEP_";

/// File stem of the repository-level config file
pub const REPO_CONFIG_STEM: &str = "gatekeep";

/// Merged gatekeep configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatekeepConfig {
    pub targets: TargetsConfig,
    pub lint: ToolConfig,
    pub style: StyleConfig,
    pub spell: SpellConfig,
    pub copyright: ToolConfig,
    pub test: ToolConfig,
    pub test_ci: ToolConfig,
    pub coverage: CoverageConfig,
    pub docs: DocsConfig,
}

/// Module roots the gates operate on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetsConfig {
    /// Ordered target paths, passed positionally
    pub paths: Vec<String>,

    /// Directory name excluded from analysis (empty disables the exclusion)
    #[serde(default)]
    pub exclude: String,
}

/// An external program plus its fixed leading arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    pub program: String,

    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    pub program: String,
    pub max_line_length: u16,
}

/// Spelling-only analysis pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellConfig {
    pub program: String,

    #[serde(default)]
    pub args: Vec<String>,

    /// Dictionary name handed to the spell checker
    pub dictionary: String,

    /// Project word-list file
    pub private_dict: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageConfig {
    /// Program that runs the suite under instrumentation and reports
    pub program: String,

    /// Program that discards the persisted data file
    pub erase_program: String,

    /// Arguments following `run --source ... --omit ...`
    #[serde(default)]
    pub test_args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocsConfig {
    pub program: String,

    /// Documentation directory, entered with `-C`
    pub dir: PathBuf,
}

impl GatekeepConfig {
    /// Load from the standard layers
    pub fn load() -> Result<Self> {
        Self::load_with_custom_config(None)
    }

    /// Load using `custom_config` in place of the user and repository files
    pub fn load_with_custom_config(custom_config: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(custom_config)?
            .extract()
            .context("Failed to parse gatekeep configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Built-in defaults only
    pub fn defaults() -> Result<Self> {
        Figment::from(Toml::string(DEFAULT_CONFIG))
            .extract()
            .context("Embedded default configuration is invalid")
    }

    /// Assemble the layered figment without extracting it
    pub fn figment(custom_config: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG));

        if let Some(path) = custom_config {
            if !path.is_file() {
                bail!("Config file not found: {}", path.display());
            }
            figment = figment.merge(file_provider(path));
        } else {
            if let Some(user_base) = Self::user_config_base() {
                for ext in CONFIG_EXTENSIONS {
                    figment = figment.merge(file_provider(user_base.with_extension(ext)));
                }
            }
            for ext in CONFIG_EXTENSIONS {
                figment = figment.merge(file_provider(
                    Path::new(REPO_CONFIG_STEM).with_extension(ext),
                ));
            }
        }

        // Environment variables always have highest priority
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn validate(&self) -> Result<()> {
        if self.targets.paths.is_empty() {
            bail!("targets.paths must list at least one module root");
        }
        if self.targets.paths.iter().any(|p| p.trim().is_empty()) {
            bail!("targets.paths cannot contain empty entries");
        }
        if self.style.max_line_length == 0 {
            bail!("style.max_line_length cannot be 0");
        }

        let programs = [
            ("lint.program", &self.lint.program),
            ("style.program", &self.style.program),
            ("spell.program", &self.spell.program),
            ("copyright.program", &self.copyright.program),
            ("test.program", &self.test.program),
            ("test_ci.program", &self.test_ci.program),
            ("coverage.program", &self.coverage.program),
            ("coverage.erase_program", &self.coverage.erase_program),
            ("docs.program", &self.docs.program),
        ];
        for (key, program) in programs {
            if program.trim().is_empty() {
                bail!("{key} cannot be empty");
            }
        }

        Ok(())
    }

    fn user_config_base() -> Option<PathBuf> {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".config/gatekeep/config"))
    }
}
