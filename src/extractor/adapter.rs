use crate::extractor::classify::classify_failure;
use crate::extractor::traits::Extractor;
use crate::formats::ExtractionOptions;
use crate::normalizer::{ExtractionFailure, FailureKind};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Calls the engine and folds its failures into `ExtractionFailure`
#[derive(Clone)]
pub struct EngineAdapter {
    engine: Arc<dyn Extractor>,
}

impl EngineAdapter {
    pub fn new(engine: Arc<dyn Extractor>) -> Self {
        Self { engine }
    }

    pub fn engine_id(&self) -> &'static str {
        self.engine.id()
    }

    pub async fn extract(
        &self,
        url: &str,
        options: &ExtractionOptions,
    ) -> Result<Value, ExtractionFailure> {
        debug!(engine = self.engine.id(), format = %options.format, "Invoking extractor for {}", url);

        self.engine.extract(url, options).await.map_err(|e| {
            let failure = classify_failure(&e);
            match failure.kind {
                FailureKind::Unknown => error!("Error extracting video info from {}: {}", url, e),
                kind => warn!("Extraction of {} failed as {:?}", url, kind),
            }
            failure
        })
    }

    pub async fn health_check(&self) -> bool {
        match self.engine.health_check().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Extractor {} is unhealthy: {}", self.engine.id(), e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::traits::EngineError;
    use crate::formats::{FormatResolver, FormatToken};
    use async_trait::async_trait;

    struct FailingExtractor(&'static str);

    #[async_trait]
    impl Extractor for FailingExtractor {
        fn id(&self) -> &'static str {
            "failing"
        }

        async fn extract(&self, _url: &str, _options: &ExtractionOptions) -> Result<Value, EngineError> {
            Err(EngineError::Extraction(self.0.to_string()))
        }
    }

    #[tokio::test]
    async fn test_failures_are_classified() {
        let options = FormatResolver::default().resolve(FormatToken::Best, false);

        let adapter = EngineAdapter::new(Arc::new(FailingExtractor("ERROR: Video unavailable")));
        let failure = adapter.extract("u", &options).await.unwrap_err();
        assert_eq!(failure.kind, FailureKind::Unavailable);

        let adapter = EngineAdapter::new(Arc::new(FailingExtractor("HTTP Error 503")));
        let failure = adapter.extract("u", &options).await.unwrap_err();
        assert_eq!(failure, ExtractionFailure::unknown("HTTP Error 503"));
    }
}
