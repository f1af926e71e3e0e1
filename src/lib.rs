pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod extract;
pub mod transform;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::{LocalStorage, YearbookTextLoader};
pub use core::{etl::EtlEngine, pipeline::DsiPipeline};
pub use domain::model::{StationCode, StationRecord, TargetStationSet};
pub use utils::error::{EtlError, Result};
