use crate::core::Pipeline;
use crate::domain::model::ImportReport;
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

    pub async fn run(&self) -> Result<ImportReport> {
        tracing::info!("Starting import process...");
        self.monitor.log_stats("Start");

        // Extract
        let sources = self.pipeline.extract().await?;
        self.monitor.log_stats("Extract");

        // Transform
        let plans = self.pipeline.transform(sources).await?;
        tracing::debug!(
            "{} files ready to load, {} rejected",
            plans.plans.len(),
            plans.rejected.len()
        );
        self.monitor.log_stats("Transform");

        // Load
        let report = self.pipeline.load(plans).await?;
        self.monitor.log_stats("Load");

        tracing::info!(
            "Import process complete: {} imported, {} skipped, {} failed",
            report.imported(),
            report.skipped(),
            report.failed()
        );
        self.monitor.log_final_stats();

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CsvSource, TransformResult};
    use crate::domain::model::{FileOutcome, FileReport, RejectedFile};
    use chrono::Utc;
    use std::path::PathBuf;
    use std::sync::Mutex;

    #[derive(Default)]
    struct PhaseRecorder {
        phases: Mutex<Vec<&'static str>>,
    }

    #[async_trait::async_trait]
    impl Pipeline for PhaseRecorder {
        async fn extract(&self) -> Result<Vec<CsvSource>> {
            self.phases.lock().unwrap().push("extract");
            Ok(vec![CsvSource {
                path: PathBuf::from("a.csv"),
                compressed: false,
                table_name: "a".to_string(),
            }])
        }

        async fn transform(&self, sources: Vec<CsvSource>) -> Result<TransformResult> {
            self.phases.lock().unwrap().push("transform");
            Ok(TransformResult {
                plans: Vec::new(),
                rejected: sources
                    .iter()
                    .enumerate()
                    .map(|(position, s)| RejectedFile {
                        position,
                        report: FileReport::new(
                            s,
                            FileOutcome::Skipped {
                                reason: "test".to_string(),
                            },
                        ),
                    })
                    .collect(),
            })
        }

        async fn load(&self, result: TransformResult) -> Result<ImportReport> {
            self.phases.lock().unwrap().push("load");
            Ok(ImportReport {
                target: "test".to_string(),
                started_at: Utc::now(),
                finished_at: Utc::now(),
                files: result.rejected.into_iter().map(|r| r.report).collect(),
            })
        }
    }

    #[tokio::test]
    async fn test_engine_runs_phases_in_order() {
        let engine = EtlEngine::new(PhaseRecorder::default());
        let report = engine.run().await.unwrap();

        assert_eq!(report.skipped(), 1);
        assert_eq!(
            *engine.pipeline().phases.lock().unwrap(),
            vec!["extract", "transform", "load"]
        );
    }
}
