pub mod etl;
pub mod pipeline;

pub use crate::domain::model::{Extraction, StationRecord, TransformResult};
pub use crate::domain::ports::{ConfigProvider, PageSource, Pipeline, PostProcessOptions, Storage};
pub use crate::utils::error::Result;
