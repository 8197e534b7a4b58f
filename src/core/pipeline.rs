use crate::core::engine::{AssignmentEngine, EngineOptions, StepBudget};
use crate::domain::model::{DrawInput, DrawResult};
use crate::domain::ports::{ConfigProvider, Pipeline, RecordSink, RecordSource};
use crate::domain::services;
use crate::utils::error::{Result, SantaError};
use std::time::Duration;

/// Source -> engine -> sink, driven by a [`ConfigProvider`].
pub struct SantaPipeline<Src: RecordSource, Snk: RecordSink, C: ConfigProvider> {
    pub(crate) source: Src,
    pub(crate) sink: Snk,
    pub(crate) config: C,
}

impl<Src: RecordSource, Snk: RecordSink, C: ConfigProvider> SantaPipeline<Src, Snk, C> {
    pub fn new(source: Src, sink: Snk, config: C) -> Self {
        Self {
            source,
            sink,
            config,
        }
    }

    fn engine(&self) -> AssignmentEngine {
        AssignmentEngine::new(EngineOptions {
            seed: self.config.seed(),
            budget: StepBudget::Scaled(self.config.budget_factor()),
        })
    }
}

#[async_trait::async_trait]
impl<Src: RecordSource, Snk: RecordSink, C: ConfigProvider> Pipeline
    for SantaPipeline<Src, Snk, C>
{
    async fn extract(&self) -> Result<DrawInput> {
        let participants = self.source.read_participants().await?;
        let prior_pairs = self.source.read_prior_pairs().await?;

        tracing::debug!(
            "Read {} participant rows and {} prior pair rows",
            participants.len(),
            prior_pairs.len()
        );

        Ok(DrawInput {
            participants,
            prior_pairs,
        })
    }

    async fn transform(&self, input: DrawInput) -> Result<DrawResult> {
        let fields = self.config.fields().clone();
        let participants = services::participants_from_records(&input.participants, &fields)?;
        let forbidden = services::forbidden_pairs_from_records(&input.prior_pairs, &fields)?;

        let engine = self.engine();
        let max_attempts = self.config.max_attempts();

        // 搜尋是純 CPU 工作，交給 blocking 執行緒
        let task = tokio::task::spawn_blocking(move || {
            engine.assign_with_retries(&participants, &forbidden, max_attempts)
        });

        let joined = match self.config.timeout_seconds() {
            Some(seconds) => tokio::time::timeout(Duration::from_secs(seconds), task)
                .await
                .map_err(|_| SantaError::Timeout { seconds })?,
            None => task.await,
        };

        let (assignment, attempts) = joined.map_err(|e| SantaError::TaskFailed {
            message: e.to_string(),
        })??;

        let records = services::assignment_to_records(&assignment, &fields);
        Ok(DrawResult {
            assignment,
            records,
            attempts,
        })
    }

    async fn load(&self, result: DrawResult) -> Result<Vec<String>> {
        let written = self.sink.write_assignment(&result).await?;
        tracing::debug!("Sink wrote {} files", written.len());
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{FieldMapping, Record};
    use crate::utils::error::{AssignmentError, ErrorSeverity};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    struct MockSource {
        participants: Vec<Record>,
        prior_pairs: Vec<Record>,
    }

    #[async_trait]
    impl RecordSource for MockSource {
        async fn read_participants(&self) -> Result<Vec<Record>> {
            Ok(self.participants.clone())
        }

        async fn read_prior_pairs(&self) -> Result<Vec<Record>> {
            Ok(self.prior_pairs.clone())
        }
    }

    #[derive(Clone, Default)]
    struct MockSink {
        written: Arc<Mutex<Vec<DrawResult>>>,
    }

    #[async_trait]
    impl RecordSink for MockSink {
        async fn write_assignment(&self, result: &DrawResult) -> Result<Vec<String>> {
            self.written.lock().await.push(result.clone());
            Ok(vec!["memory://draw".to_string()])
        }
    }

    struct MockConfig {
        fields: FieldMapping,
        formats: Vec<String>,
        seed: Option<u64>,
        budget_factor: usize,
        timeout_seconds: Option<u64>,
    }

    impl MockConfig {
        fn seeded(seed: u64) -> Self {
            Self {
                fields: FieldMapping::default(),
                formats: vec!["csv".to_string()],
                seed: Some(seed),
                budget_factor: 32,
                timeout_seconds: Some(5),
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn participants_file(&self) -> &str {
            "staff.csv"
        }

        fn prior_pairs_file(&self) -> Option<&str> {
            None
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn output_formats(&self) -> &[String] {
            &self.formats
        }

        fn fields(&self) -> &FieldMapping {
            &self.fields
        }

        fn seed(&self) -> Option<u64> {
            self.seed
        }

        fn max_attempts(&self) -> u32 {
            2
        }

        fn budget_factor(&self) -> usize {
            self.budget_factor
        }

        fn timeout_seconds(&self) -> Option<u64> {
            self.timeout_seconds
        }
    }

    fn employee(id: &str, name: &str) -> Record {
        Record::new()
            .with("Employee_EmailID", id)
            .with("Employee_Name", name)
    }

    fn prior(giver: &str, receiver: &str) -> Record {
        Record::new()
            .with("Employee_EmailID", giver)
            .with("Secret_Child_EmailID", receiver)
    }

    fn staff() -> Vec<Record> {
        vec![
            employee("ana@acme.com", "Ana"),
            employee("bo@acme.com", "Bo"),
            employee("cy@acme.com", "Cy"),
            employee("di@acme.com", "Di"),
        ]
    }

    #[tokio::test]
    async fn test_transform_produces_valid_records() {
        let source = MockSource {
            participants: staff(),
            prior_pairs: vec![prior("ana@acme.com", "bo@acme.com")],
        };
        let pipeline = SantaPipeline::new(source, MockSink::default(), MockConfig::seeded(4));

        let input = pipeline.extract().await.unwrap();
        let result = pipeline.transform(input).await.unwrap();

        assert_eq!(result.records.len(), 4);
        assert_eq!(result.attempts, 1);
        assert_eq!(result.assignment.seed, 4);

        let mut receivers = HashSet::new();
        for record in &result.records {
            let giver = record.get("Employee_EmailID").unwrap();
            let receiver = record.get("Secret_Child_EmailID").unwrap();
            assert_ne!(giver, receiver);
            assert!(!(giver == "ana@acme.com" && receiver == "bo@acme.com"));
            assert!(receivers.insert(receiver.to_string()));
        }
        assert_eq!(result.records[0].get("Employee_Name"), Some("Ana"));
    }

    #[tokio::test]
    async fn test_transform_surfaces_infeasible() {
        let source = MockSource {
            participants: vec![employee("a@acme.com", "A"), employee("b@acme.com", "B")],
            prior_pairs: vec![prior("b@acme.com", "a@acme.com")],
        };
        let pipeline = SantaPipeline::new(source, MockSink::default(), MockConfig::seeded(1));

        let input = pipeline.extract().await.unwrap();
        let err = pipeline.transform(input).await.unwrap_err();

        assert!(matches!(
            err,
            SantaError::Assignment(AssignmentError::Infeasible { ref giver, .. }) if giver == "b@acme.com"
        ));
    }

    #[tokio::test]
    async fn test_transform_rejects_malformed_participants() {
        let source = MockSource {
            participants: vec![employee("a@acme.com", "A"), Record::new().with("Employee_Name", "B")],
            prior_pairs: vec![],
        };
        let pipeline = SantaPipeline::new(source, MockSink::default(), MockConfig::seeded(1));

        let input = pipeline.extract().await.unwrap();
        let err = pipeline.transform(input).await.unwrap_err();
        assert!(matches!(err, SantaError::MissingField { record: 2, .. }));
    }

    #[tokio::test]
    async fn test_load_hands_result_to_sink() {
        let sink = MockSink::default();
        let source = MockSource {
            participants: staff(),
            prior_pairs: vec![],
        };
        let pipeline = SantaPipeline::new(source, sink.clone(), MockConfig::seeded(9));

        let input = pipeline.extract().await.unwrap();
        let result = pipeline.transform(input).await.unwrap();
        let paths = pipeline.load(result.clone()).await.unwrap();

        assert_eq!(paths, vec!["memory://draw".to_string()]);
        let written = sink.written.lock().await;
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].assignment, result.assignment);
    }

    #[tokio::test]
    async fn test_transform_times_out_on_slow_draw() {
        // 2000 人的相容圖建構遠超過零秒
        let participants = (0..2_000)
            .map(|i| employee(&format!("p{i}@acme.com"), &format!("P{i}")))
            .collect();
        let source = MockSource {
            participants,
            prior_pairs: vec![],
        };
        let config = MockConfig {
            timeout_seconds: Some(0),
            ..MockConfig::seeded(3)
        };
        let pipeline = SantaPipeline::new(source, MockSink::default(), config);

        let input = pipeline.extract().await.unwrap();
        let err = pipeline.transform(input).await.unwrap_err();

        assert!(matches!(err, SantaError::Timeout { seconds: 0 }));
        assert!(err.is_retryable());
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }
}
