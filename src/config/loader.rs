use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::ComposerConfig;

pub const DEFAULT_CONFIG_PATHS: &[&str] = &["composer.toml", "config/composer.toml"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置 {path} 失败: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("解析配置 {path} 失败: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// 显式路径不存在时同样回退到默认配置。
pub fn load_config(path: Option<PathBuf>) -> Result<ComposerConfig, ConfigError> {
    let candidate_paths = match path {
        Some(p) => vec![p],
        None => DEFAULT_CONFIG_PATHS.iter().map(PathBuf::from).collect(),
    };

    for candidate in candidate_paths {
        if let Some(config) = try_load_file(&candidate)? {
            return Ok(config);
        }
    }

    Ok(ComposerConfig::default())
}

pub fn parse_config(path: &Path, contents: &str) -> Result<ComposerConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn try_load_file(path: &Path) -> Result<Option<ComposerConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config(path, &contents).map(Some)
}
