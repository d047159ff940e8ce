use crate::report::model::{BatchReport, GroupReport, Verdict};
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use gmstream::prelude::ReconcileConfig;
use gmstream::record::{StationRecord, TraceInput};
use gmstream::telemetry::MetricsRecorder;
use gmstream::ChannelGroup;
use log::{error, info, warn};
use std::sync::Arc;
use tokio::runtime::Builder;

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
    metrics: Arc<MetricsRecorder>,
}

/// Build, validate and export one group. Never fails: fatal errors become a
/// rejected report so the rest of the batch keeps going.
fn process_group(
    key: String,
    records: Vec<StationRecord>,
    config: &ReconcileConfig,
    metrics: &MetricsRecorder,
) -> GroupReport {
    let inputs = records.into_iter().map(TraceInput::Station).collect();
    let group = match ChannelGroup::with_config(inputs, None, config) {
        Ok(group) => group,
        Err(err) => {
            error!("group {} rejected: {}", key, err);
            metrics.record_rejected();
            return GroupReport {
                group_id: key,
                verdict: Verdict::Rejected,
                outcome: None,
                failures: Vec::new(),
                error: Some(err.to_string()),
                metadata: None,
            };
        }
    };

    let group_id = group.id().map(str::to_string).unwrap_or(key);
    let outcome = Some(format!("{:?}", group.outcome()));
    let failures = group.failure_reasons();

    let (verdict, metadata, error) = match group.export_metadata() {
        Err(err) => {
            error!("group {} metadata export failed: {}", group_id, err);
            metrics.record_rejected();
            (Verdict::Rejected, None, Some(err.to_string()))
        }
        Ok(metadata) if group.passed() => {
            info!("group {} passed", group_id);
            metrics.record_passed();
            (Verdict::Passed, Some(metadata), None)
        }
        Ok(metadata) => {
            warn!("group {} flagged: {}", group_id, failures.join("; "));
            metrics.record_flagged();
            (Verdict::Flagged, Some(metadata), None)
        }
    };

    GroupReport {
        group_id,
        verdict,
        outcome,
        failures,
        error,
        metadata,
    }
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self {
            config,
            metrics: Arc::new(MetricsRecorder::new()),
        }
    }

    /// Process every group on the blocking pool; reports come back in input
    /// order.
    pub fn execute(
        &self,
        groups: Vec<(String, Vec<StationRecord>)>,
    ) -> anyhow::Result<BatchReport> {
        let reconcile_config = self.config.to_reconcile_config();
        let metrics = self.metrics.clone();
        let reports = self.run_blocking(groups, move |(key, records)| {
            process_group(key, records, &reconcile_config, &metrics)
        })?;

        Ok(BatchReport {
            groups: reports,
            metrics: self.metrics.snapshot(),
        })
    }

    /// Run `job` over `items` with at most `workers` jobs in flight.
    fn run_blocking<T, R, F>(&self, items: Vec<T>, job: F) -> anyhow::Result<Vec<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        let workers = self.config.workers.max(1);
        let runtime = Builder::new_multi_thread()
            .worker_threads(workers)
            .max_blocking_threads(workers)
            .enable_all()
            .build()
            .context("creating batch runtime")?;
        let job = Arc::new(job);

        runtime.block_on(async {
            let handles: Vec<_> = items
                .into_iter()
                .map(|item| {
                    let job = job.clone();
                    tokio::task::spawn_blocking(move || job(item))
                })
                .collect();

            let mut results = Vec::with_capacity(handles.len());
            for handle in handles {
                results.push(handle.await.context("joining group worker")?);
            }
            Ok::<_, anyhow::Error>(results)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::scenario_batch;
    use crate::ingest::group_records;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn runner_reports_every_scenario() {
        let runner = Runner::new(WorkflowConfig::from_args(20, 2));
        let groups = group_records(scenario_batch(7).unwrap());
        let report = runner.execute(groups).unwrap();

        let verdict = |id: &str| {
            report
                .groups
                .iter()
                .find(|g| g.group_id == id)
                .map(|g| g.verdict)
                .unwrap()
        };
        assert_eq!(verdict("TE.ALGN.HN"), Verdict::Passed);
        assert_eq!(verdict("TE.SHFT.HN"), Verdict::Passed);
        assert_eq!(verdict("TE.HALF.HN"), Verdict::Passed);
        assert_eq!(verdict("TE.DISJ.HN"), Verdict::Flagged);
        assert_eq!(verdict("TE.DUPL.HN"), Verdict::Flagged);

        let disjoint = report.groups.iter().find(|g| g.group_id == "TE.DISJ.HN").unwrap();
        assert!(disjoint.failures[0].contains("incompatible time ranges"));
        assert_eq!(report.metrics.passed, 3);
        assert_eq!(report.metrics.flagged, 2);
        assert_eq!(report.metrics.rejected, 0);
    }

    #[test]
    fn fatal_errors_reject_only_their_group() {
        let runner = Runner::new(WorkflowConfig::from_args(20, 1));
        let mut mixed = scenario_batch(1).unwrap();
        mixed.truncate(3);
        let stray = mixed.pop().unwrap();
        let mut stray_header = stray.header().clone();
        stray_header.station = "OTHER".into();
        mixed.push(StationRecord::new(stray.data().to_vec(), stray_header));

        let groups = vec![
            ("TE.ALGN.HN".to_string(), mixed),
            ("TE.SHFT.HN".to_string(), scenario_batch(1).unwrap()[3..6].to_vec()),
        ];
        let report = runner.execute(groups).unwrap();
        assert_eq!(report.groups[0].verdict, Verdict::Rejected);
        assert!(report.groups[0].error.is_some());
        assert_eq!(report.groups[1].verdict, Verdict::Passed);
        assert_eq!(report.metrics.total(), 2);
    }

    #[test]
    fn workers_bound_concurrent_groups() {
        let runner = Runner::new(WorkflowConfig::from_args(20, 1));
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (active_job, peak_job) = (active.clone(), peak.clone());

        let order = runner
            .run_blocking((0..6).collect(), move |index: usize| {
                let now = active_job.fetch_add(1, Ordering::SeqCst) + 1;
                peak_job.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(10));
                active_job.fetch_sub(1, Ordering::SeqCst);
                index
            })
            .unwrap();

        assert_eq!(order, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }
}
