// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, path::PathBuf, str::FromStr};

use tokio::fs;

use synccal_core::{APP_NAME, Config as CoreConfig, SyncConfig, get_config_dir};

const SYNCCAL_CONFIG_ENV: &str = "SYNCCAL_CONFIG";
const SYNCCAL_DEV_ENV: &str = "SYNCCAL_DEV";

const SYNCCAL_DEV_VALID_TRUE: &[&str] = &["1", "true", "yes"];
const SYNCCAL_DEV_VALID_FALSE: &[&str] = &["0", "false", "no"];

#[tracing::instrument]
pub async fn parse_config(
    path: Option<PathBuf>,
) -> Result<(CoreConfig, SyncConfig), Box<dyn Error>> {
    let path = if let Some(path) = path {
        path
    } else if let Ok(env_path) = std::env::var(SYNCCAL_CONFIG_ENV) {
        PathBuf::from(env_path)
    } else {
        if let Some(true) = is_dev_mode() {
            return Err(format!(
                "Development environment detected ({SYNCCAL_DEV_ENV} is set): config must be explicitly specified via --config or {SYNCCAL_CONFIG_ENV} environment variable",
            ).into());
        }
        let config = get_config_dir()?.join(format!("{APP_NAME}/config.toml"));
        if !config.exists() {
            return Err(format!("No config found at: {}", config.display()).into());
        }
        config
    };

    fs::read_to_string(&path)
        .await
        .map_err(|e| format!("Failed to read config file at {}: {}", path.display(), e))?
        .parse::<ConfigRaw>()
        .map(|a| (a.core, a.sync))
}

#[derive(Debug, serde::Deserialize)]
struct ConfigRaw {
    #[serde(default)]
    core: CoreConfig,
    sync: SyncConfig,
}

impl FromStr for ConfigRaw {
    type Err = Box<dyn Error>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

fn is_dev_mode() -> Option<bool> {
    let val = std::env::var(SYNCCAL_DEV_ENV).ok()?;
    let lower = val.to_lowercase();
    if SYNCCAL_DEV_VALID_TRUE.contains(&lower.as_str()) {
        Some(true)
    } else if SYNCCAL_DEV_VALID_FALSE.contains(&lower.as_str()) {
        Some(false)
    } else {
        tracing::warn!(
            "Unrecognized value for {}: '{}'. Expected one of: true: {}, false: {}. Treating as unset.",
            SYNCCAL_DEV_ENV,
            val,
            SYNCCAL_DEV_VALID_TRUE.join(", "),
            SYNCCAL_DEV_VALID_FALSE.join(", ")
        );
        None
    }
}
