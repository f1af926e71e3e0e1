use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting yearbook extraction...");
        self.monitor.log_stats("Start");

        // Extract
        tracing::info!("📄 Extracting station pages...");
        let extraction = self.pipeline.extract().await?;
        tracing::info!("Extracted {} station records", extraction.records.len());
        self.monitor.log_yearbooks(&extraction.report.yearbook_timings);
        self.monitor.log_stats("Extract");

        // Transform
        tracing::info!("🔄 Transforming records...");
        let transformed = self.pipeline.transform(extraction).await?;
        tracing::info!("Transformed {} records", transformed.records.len());
        self.monitor.log_stats("Transform");

        // Load
        tracing::info!("💾 Writing output...");
        let output_path = self.pipeline.load(transformed).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
