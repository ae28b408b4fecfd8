use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Runs extract, transform and load in order and returns the output path.
    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("🚀 Starting statement conversion");

        let phase = Instant::now();
        let rows = self.pipeline.extract().await?;
        tracing::info!("Extracted {} rows in {:?}", rows.len(), phase.elapsed());

        let phase = Instant::now();
        let result = self.pipeline.transform(rows).await?;
        tracing::info!(
            "Transformed into {} transactions ({} rejected) in {:?}",
            result.summary.transactions_written,
            result.summary.rows_rejected,
            phase.elapsed()
        );

        let phase = Instant::now();
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Loaded in {:?}", phase.elapsed());

        tracing::info!(
            "✅ Conversion finished in {:?}, output: {}",
            started.elapsed(),
            output_path
        );
        Ok(output_path)
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }
}
