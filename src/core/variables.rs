use crate::domain::model::VariableUpsert;
use crate::domain::ports::VariableRepository;
use crate::utils::error::Result;
use futures::future::join_all;

pub const DEFAULT_BATCH_SIZE: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub chunk_sizes: Vec<usize>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.chunk_sizes.iter().sum()
    }
}

/// 分批 upsert：同一批內並行，批與批之間依序執行
///
/// 一批內的寫入全部結束後才回報錯誤，不會中途取消已送出的請求。
pub async fn bulk_upsert(
    repository: &dyn VariableRepository,
    inputs: &[VariableUpsert],
    batch_size: usize,
) -> Result<BatchReport> {
    let batch_size = batch_size.max(1);
    let mut report = BatchReport::default();

    for (index, chunk) in inputs.chunks(batch_size).enumerate() {
        tracing::debug!(
            "📝 Upserting variable chunk {} ({} variables)",
            index + 1,
            chunk.len()
        );

        let outcomes = join_all(chunk.iter().map(|input| repository.upsert_variable(input))).await;
        for outcome in outcomes {
            outcome?;
        }

        report.chunk_sizes.push(chunk.len());
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ProvisionError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingVariables {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        written: Mutex<Vec<String>>,
        fail_on: Option<String>,
    }

    #[async_trait]
    impl VariableRepository for RecordingVariables {
        async fn upsert_variable(&self, input: &VariableUpsert) -> Result<()> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail_on.as_deref() == Some(input.name.as_str()) {
                return Err(ProvisionError::Application {
                    message: format!("cannot set {}", input.name),
                });
            }
            self.written.lock().unwrap().push(input.name.clone());
            Ok(())
        }
    }

    fn inputs(count: usize) -> Vec<VariableUpsert> {
        (0..count)
            .map(|i| VariableUpsert {
                project_id: "p1".to_string(),
                environment_id: "e1".to_string(),
                service_id: Some("svc".to_string()),
                name: format!("VAR_{}", i),
                value: i.to_string(),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_twenty_five_variables_make_three_chunks() {
        let repo = RecordingVariables::default();
        let report = bulk_upsert(&repo, &inputs(25), 10).await.unwrap();

        assert_eq!(report.chunk_sizes, vec![10, 10, 5]);
        assert_eq!(report.total(), 25);
        assert_eq!(repo.written.lock().unwrap().len(), 25);
        assert!(repo.max_in_flight.load(Ordering::SeqCst) <= 10);
    }

    #[tokio::test]
    async fn test_empty_input_issues_no_chunks() {
        let repo = RecordingVariables::default();
        let report = bulk_upsert(&repo, &[], 10).await.unwrap();
        assert!(report.chunk_sizes.is_empty());
    }

    #[tokio::test]
    async fn test_zero_batch_size_is_treated_as_one() {
        let repo = RecordingVariables::default();
        let report = bulk_upsert(&repo, &inputs(3), 0).await.unwrap();
        assert_eq!(report.chunk_sizes, vec![1, 1, 1]);
    }

    #[tokio::test]
    async fn test_failure_stops_before_next_chunk() {
        let repo = RecordingVariables {
            fail_on: Some("VAR_3".to_string()),
            ..Default::default()
        };
        let err = bulk_upsert(&repo, &inputs(25), 10).await.unwrap_err();

        assert!(matches!(err, ProvisionError::Application { .. }));
        // 第一批其餘 9 筆仍完成，後續批次未送出
        assert_eq!(repo.written.lock().unwrap().len(), 9);
    }
}
