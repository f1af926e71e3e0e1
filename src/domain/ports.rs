use crate::domain::model::{Extraction, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Yields the raw text of every page of a yearbook, in page order.
///
/// Implementations block; the pipeline calls them from `spawn_blocking`.
pub trait PageSource: Send + Sync {
    fn load_pages(&self, path: &Path) -> Result<Vec<String>>;
}

/// Post-processing steps applied after extraction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PostProcessOptions {
    pub annual_averages: bool,
    pub correct_outliers: bool,
    pub fill_gaps: bool,
    /// (latitude, longitude) in decimal degrees.
    pub reference_point: Option<(f64, f64)>,
}

impl PostProcessOptions {
    pub fn any(&self) -> bool {
        self.annual_averages
            || self.correct_outliers
            || self.fill_gaps
            || self.reference_point.is_some()
    }
}

pub trait ConfigProvider: Send + Sync {
    fn input_dir(&self) -> &Path;
    fn output_path(&self) -> &str;
    fn output_file(&self) -> &str;
    /// Explicit years; empty means every `dsi_<year>` file in the input directory.
    fn years(&self) -> &[i32];
    fn target_stations(&self) -> &[String];
    fn concurrent_files(&self) -> usize;
    fn header_window(&self) -> usize;
    fn post_process(&self) -> PostProcessOptions;

    fn yearbook_candidates(&self, year: i32) -> Vec<PathBuf> {
        ["pdf", "txt"]
            .iter()
            .map(|ext| self.input_dir().join(format!("dsi_{}.{}", year, ext)))
            .collect()
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Extraction>;
    async fn transform(&self, data: Extraction) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
