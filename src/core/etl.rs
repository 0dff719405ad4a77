use crate::core::{CleaningOperation, Pipeline, SummaryReport};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Outcome of one engine run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: SummaryReport,
    pub operation: Option<CleaningOperation>,
    pub cleaned_rows: Option<usize>,
    pub output_path: Option<String>,
}

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

    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("Starting cleaning run");

        let data = self.pipeline.extract().await?;
        tracing::info!("Loaded {} rows, {} columns", data.n_rows(), data.n_cols());
        self.monitor.log_stats("Load");

        let summary = self.pipeline.summarize(&data).await?;
        tracing::info!(
            "Missing values: {}, duplicate rows: {}",
            summary.total_missing,
            summary.duplicate_rows
        );

        let Some(result) = self.pipeline.transform(&data).await? else {
            self.monitor.log_final_stats();
            return Ok(RunReport {
                summary,
                operation: None,
                cleaned_rows: None,
                output_path: None,
            });
        };
        self.monitor.log_stats("Clean");

        let operation = result.operation;
        let cleaned_rows = result.dataset.n_rows();
        tracing::info!("{} ({} rows kept)", operation.success_message(), cleaned_rows);

        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("Export");
        self.monitor.log_final_stats();

        Ok(RunReport {
            summary,
            operation: Some(operation),
            cleaned_rows: Some(cleaned_rows),
            output_path: Some(output_path),
        })
    }
}
