//! Configuration loading
//!
//! - **manifest**: configuration groups per scope, parsed from TOML
//! - **setting**: declared settings decoded into a closed enum

mod manifest;
mod setting;

pub use manifest::{ConfigurationGroup, Manifest, Scope};
pub use setting::{Action, DeleteKeySetting, DeleteSetting, SetSetting, Setting};
