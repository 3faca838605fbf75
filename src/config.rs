use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::debug;

/// My Hours APIのデフォルトのURL。
pub const DEFAULT_API_URL: &str = "https://api2.myhours.com/api";

const APP_NAME: &str = "myhours-export";

/// My Hoursへの接続設定。
#[derive(Clone, Debug)]
pub struct Config {
    pub email: String,
    pub password: String,
    pub api_url: String,
}

impl Config {
    /// 環境変数から設定を読み込む。
    ///
    /// カレントディレクトリの`.env`、次に設定ディレクトリの`myhours-export/.env`を読み込んでから、
    /// `EMAIL`、`PASSWORD`、`MYHOURS_API_URL`を参照する。
    /// 既に設定されている環境変数は上書きしない。
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenv::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }
        if let Some(path) = config_env_path() {
            if dotenv::from_path(&path).is_ok() {
                debug!("Loaded environment from {}", path.display());
            }
        }

        Self::from_vars(|key| env::var(key).ok())
    }

    /// 変数の取得方法を指定して設定を作る。
    fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let email = var("EMAIL").context("EMAIL must be set")?;
        let password = var("PASSWORD").context("PASSWORD must be set")?;
        let api_url = var("MYHOURS_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Self {
            email,
            password,
            api_url,
        })
    }
}

/// 設定ディレクトリにある`.env`のパスを返す。
fn config_env_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(".env"))
}
