//! JSON description of an environment.
//!
//! ```json
//! {
//!   "device": "emulator-5554",
//!   "app": "org.example.game",
//!   "grid": {"rows": 10, "cols": 10},
//!   "reward": {"keyword": "LEVEL_COMPLETE", "reward": 1.0},
//!   "reset": [
//!     {"kind": "force_stop", "package": "org.example.game"},
//!     {"kind": "clear_app_data", "package": "org.example.game"}
//!   ]
//! }
//! ```

use crate::env::{AndroidEnv, ResetCmd};
use crate::error::Result;
use crate::reward::{ConstantReward, KeywordReward};
use droidlern_device::{Controller, Transport};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Device serial as reported by `adb devices`.
    pub device: String,
    /// Package to bind the environment to.
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub grid: Option<GridConfig>,
    /// Without a keyword reward every step pays `0.0`.
    #[serde(default)]
    pub reward: Option<KeywordReward>,
    #[serde(default)]
    pub reset: Vec<ResetStep>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    pub rows: u32,
    pub cols: u32,
}

/// One reset procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResetStep {
    InstallApk { path: PathBuf },
    OpenApp { package: String },
    ForceStop { package: String },
    ClearAppData { package: String },
    KeyEvent { code: u32 },
    Home,
    Reboot,
}

impl ResetStep {
    pub fn apply<T: Transport>(&self, controller: &mut Controller<T>) {
        match self {
            ResetStep::InstallApk { path } => {
                controller.install_apk(path);
            }
            ResetStep::OpenApp { package } => {
                controller.open_app(package);
            }
            ResetStep::ForceStop { package } => {
                controller.force_stop(package);
            }
            ResetStep::ClearAppData { package } => {
                controller.clear_app_data(package);
            }
            ResetStep::KeyEvent { code } => {
                controller.key_event(*code);
            }
            ResetStep::Home => {
                controller.home();
            }
            ResetStep::Reboot => {
                controller.reboot();
            }
        }
    }

    pub fn into_cmd<T: Transport + 'static>(self) -> ResetCmd<T> {
        Box::new(move |controller: &mut Controller<T>| self.apply(controller))
    }
}

impl EnvConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    /// Connects to the configured device and builds the (ungridded) environment.
    pub fn build<T: Transport + 'static>(&self, transport: T) -> Result<AndroidEnv<T>> {
        let controller = Controller::new(transport, self.device.clone())?;
        let reset_cmds = self
            .reset
            .iter()
            .cloned()
            .map(ResetStep::into_cmd)
            .collect();
        match &self.reward {
            Some(keyword) => AndroidEnv::new(controller, keyword.clone(), reset_cmds, self.app.clone()),
            None => AndroidEnv::new(controller, ConstantReward(0.0), reset_cmds, self.app.clone()),
        }
    }
}
