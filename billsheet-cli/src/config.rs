use anyhow::{bail, Context, Result};
use billsheet_ingest::{StatementFormat, StatementParser};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_billsheet_home;

/// Overrides `[server].port` when set.
pub const PORT_ENV: &str = "BILLSHEET_PORT";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSection,
    /// Statement layout; the built-in CMB credit format when absent
    pub format: Option<StatementFormat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    pub max_upload_mb: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_upload_mb: 10,
        }
    }
}

impl ServerSection {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

impl Config {
    pub fn statement_format(&self) -> StatementFormat {
        self.format.clone().unwrap_or_default()
    }

    pub fn parser(&self) -> Result<StatementParser> {
        let format = self.statement_format();
        let name = format.name.clone();
        StatementParser::new(format).with_context(|| format!("statement format `{}`", name))
    }

    fn apply_env(&mut self, port: Option<String>) -> Result<()> {
        if let Some(raw) = port {
            self.server.port = raw
                .trim()
                .parse()
                .with_context(|| format!("{} is not a port: {:?}", PORT_ENV, raw))?;
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_billsheet_home()?.join("config.toml"))
}

fn resolve(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(p) => Ok(p.to_path_buf()),
        None => config_path(),
    }
}

/// Load the config file (an explicit `--config` path must exist; the default
/// one may not), then apply environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let p = resolve(path)?;
    let mut cfg = if p.exists() {
        let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
        toml::from_str(&s).with_context(|| format!("parse {}", p.display()))?
    } else if path.is_some() {
        bail!("config not found: {}", p.display());
    } else {
        Config::default()
    };
    cfg.apply_env(std::env::var(PORT_ENV).ok())?;
    Ok(cfg)
}

pub fn save_config(cfg: &Config, path: Option<&Path>) -> Result<PathBuf> {
    let p = resolve(path)?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(p)
}

/// Write the defaults, spelling out the built-in format so it can be edited.
pub fn init_config(path: Option<&Path>) -> Result<()> {
    let p = resolve(path)?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let cfg = Config {
        server: ServerSection::default(),
        format: Some(StatementFormat::default()),
    };
    let p = save_config(&cfg, Some(&p))?;
    println!("Wrote {}", p.display());
    Ok(())
}
