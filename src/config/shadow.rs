//! Configuration of the `shadow_demo` tool.
//!
//! ```json
//! {
//!   "background": "bg.jpg",
//!   "subject": "subject.png",
//!   "mask": "mask.png",
//!   "depth": "depth.png",
//!   "light": { "angle_deg": 135.0, "elevation_deg": 35.0 },
//!   "params": { "placement": { "anchor": "bottom-left", "margin_px": 8 } },
//!   "output": { "dir": "out", "report_json": "out/report.json" }
//! }
//! ```
//!
//! `mask` defaults to the subject's alpha channel; `depth`, `light`,
//! `params` and the report path are optional.
use crate::error::{Result, ShadowError};
use crate::light::LightSettings;
use crate::pipeline::ShadowParams;
use crate::placement::Anchor;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Deserialize)]
pub struct ShadowToolConfig {
    pub background: PathBuf,
    pub subject: PathBuf,
    #[serde(default)]
    pub mask: Option<PathBuf>,
    #[serde(default)]
    pub depth: Option<PathBuf>,
    #[serde(default)]
    pub light: LightSettings,
    #[serde(default)]
    pub params: ShadowParams,
    pub output: ShadowOutputConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ShadowOutputConfig {
    /// Directory receiving `composite.png`, `shadow_only.png`, `mask_debug.png`.
    pub dir: PathBuf,
    #[serde(default)]
    pub report_json: Option<PathBuf>,
    /// Optional grayscale dump of the final shadow layer.
    #[serde(default)]
    pub shadow_layer_png: Option<PathBuf>,
}

pub fn load_config(path: &Path) -> Result<ShadowToolConfig> {
    let data = fs::read_to_string(path)
        .map_err(|e| ShadowError::Config(format!("failed to read {}: {e}", path.display())))?;
    parse_config(&data)
        .map_err(|e| ShadowError::Config(format!("failed to parse {}: {e}", path.display())))
}

pub fn parse_config(json: &str) -> std::result::Result<ShadowToolConfig, serde_json::Error> {
    serde_json::from_str(json)
}

/// Parse `<config.json> [--angle DEG] [--elevation DEG] [--anchor NAME]`.
///
/// Flags override the values loaded from the config file.
pub fn parse_cli<I>(program: &str, args: I) -> Result<ShadowToolConfig>
where
    I: IntoIterator<Item = String>,
{
    let usage = || {
        ShadowError::Config(format!(
            "usage: {program} <config.json> [--angle DEG] [--elevation DEG] [--anchor bottom-center|bottom-left|bottom-right|custom(x,y)]"
        ))
    };
    let mut args = args.into_iter();
    let config_path = args.next().ok_or_else(usage)?;
    let mut config = load_config(Path::new(&config_path))?;

    while let Some(flag) = args.next() {
        let value = args.next().ok_or_else(usage)?;
        match flag.as_str() {
            "--angle" => config.light.angle_deg = parse_degrees(&flag, &value)?,
            "--elevation" => config.light.elevation_deg = parse_degrees(&flag, &value)?,
            "--anchor" => config.params.placement.anchor = value.parse::<Anchor>()?,
            _ => return Err(usage()),
        }
    }
    Ok(config)
}

fn parse_degrees(flag: &str, value: &str) -> Result<f32> {
    value
        .parse::<f32>()
        .map_err(|e| ShadowError::Config(format!("{flag} expects a number, got '{value}': {e}")))
}
