//! Simulation loop: generate → post → report → sleep, until shutdown

use crate::monitor::{MonitorClient, ServerResult};
use crate::readings::{Batch, ProcessSample};
use crate::report;
use anyhow::Result;
use chrono::Local;
use rand::rngs::StdRng;
use std::future::Future;
use std::io::Write;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Outcome of a single cycle, as printed
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Reported(ProcessSample, ServerResult),
    Failed(String),
}

/// Main simulator state
pub struct Simulator<W: Write> {
    client: MonitorClient,
    interval: Duration,
    rng: StdRng,
    out: W,
}

impl<W: Write> Simulator<W> {
    pub fn new(client: MonitorClient, interval: Duration, rng: StdRng, out: W) -> Self {
        Self {
            client,
            interval,
            rng,
            out,
        }
    }

    /// Run one cycle and print its report lines
    ///
    /// Submission failures are printed, never returned. The only error is a
    /// failed write to the output.
    pub async fn run_cycle(&mut self) -> std::io::Result<CycleOutcome> {
        let sample = ProcessSample::generate(&mut self.rng);
        let batch = Batch::from_sample(&sample, Local::now());

        match self.client.submit(&batch).await {
            Ok(result) => {
                writeln!(self.out, "{}", report::sample_line(Local::now(), &sample))?;
                writeln!(self.out, "{}", report::result_line(&result))?;
                self.out.flush()?;
                debug!("Cycle reported: {:?}", result);
                Ok(CycleOutcome::Reported(sample, result))
            }
            Err(e) => {
                warn!("Cycle failed: {:?}", e);
                let message = e.to_string();
                writeln!(self.out, "{}", report::error_line(&message))?;
                self.out.flush()?;
                Ok(CycleOutcome::Failed(message))
            }
        }
    }

    /// Loop until `shutdown` resolves
    ///
    /// The shutdown future is raced against both the in-flight request and the
    /// interval sleep.
    pub async fn run<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        writeln!(self.out, "{}", report::START_BANNER)?;
        writeln!(self.out, "{}", report::STOP_HINT)?;
        self.out.flush()?;

        info!(
            "Posting readings to {} every {}s",
            self.client.api_url(),
            self.interval.as_secs_f64()
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                outcome = self.run_cycle() => {
                    if let Err(e) = outcome {
                        error!("Failed to write report: {}", e);
                    }
                }
            }

            tokio::select! {
                _ = &mut shutdown => break,
                _ = sleep(self.interval) => {}
            }
        }

        info!("Shutdown requested, simulation stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readings::{Quality, Source};
    use process_devkit::{monitor_response, parameter_ids, TestHarness};
    use rand::SeedableRng;
    use serde_json::json;

    fn simulator(url: String, interval: Duration) -> Simulator<Vec<u8>> {
        let client = MonitorClient::new(url, Duration::from_secs(5)).unwrap();
        Simulator::new(client, interval, StdRng::seed_from_u64(1), Vec::new())
    }

    fn output(sim: &Simulator<Vec<u8>>) -> String {
        String::from_utf8(sim.out.clone()).unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end_cycle() {
        let mut harness = TestHarness::new().await.unwrap();
        harness.endpoint.respond_with_json(monitor_response(3, 1, 1));
        harness.expect_requests(1);

        let mut sim = simulator(harness.endpoint.url(), Duration::from_secs(30));
        let outcome = sim.run_cycle().await.unwrap();
        assert!(matches!(outcome, CycleOutcome::Reported(_, r) if r.processed == 3));

        let text = output(&sim);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].contains("] Temp: "));
        assert!(lines[0].contains("°C, Vib: "));
        assert!(lines[0].contains("mm/s, Flow: "));
        assert!(lines[0].ends_with("m³/h"));
        assert!(lines[1].contains("Processed: 3, Triggers: 1, Notifications: 1"));

        harness.verify_expectations().unwrap();
        let body = harness.last_body().unwrap();
        process_devkit::validate_batch(&body).unwrap();
        assert_eq!(parameter_ids(&body), vec!["TI-101-01", "VI-100-01", "FI-100-01"]);
        harness.assert_field_equals("data.0.quality", &json!("GOOD")).unwrap();
        harness.assert_field_equals("data.2.source", &json!("DCS")).unwrap();

        let posted: Batch = serde_json::from_value(body).unwrap();
        assert_eq!(posted.data.len(), 3);
        assert!(posted.data.iter().all(|r| r.quality == Quality::Good && r.source == Source::Dcs));
        assert_eq!(posted.data[0].timestamp, posted.data[2].timestamp);
    }

    #[tokio::test]
    async fn test_missing_counters_print_zero() {
        let harness = TestHarness::new().await.unwrap();
        harness.endpoint.respond_with_json(json!({"status": "accepted"}));

        let mut sim = simulator(harness.endpoint.url(), Duration::from_secs(30));
        sim.run_cycle().await.unwrap();

        assert!(output(&sim).contains("  → Processed: 0, Triggers: 0, Notifications: 0"));
    }

    #[tokio::test]
    async fn test_printed_values_match_posted_values() {
        let harness = TestHarness::new().await.unwrap();
        harness.endpoint.respond_with_json(monitor_response(3, 0, 0));

        let mut sim = simulator(harness.endpoint.url(), Duration::from_secs(30));
        let outcome = sim.run_cycle().await.unwrap();
        let CycleOutcome::Reported(sample, _) = outcome else {
            panic!("cycle should have been reported");
        };

        let body = harness.last_body().unwrap();
        assert_eq!(body["data"][0]["value"], json!(sample.temperature));
        assert_eq!(body["data"][1]["value"], json!(sample.vibration));
        assert_eq!(body["data"][2]["value"], json!(sample.flow));
        assert!(output(&sim).contains(&format!("Temp: {:.1}°C", sample.temperature)));
    }

    #[tokio::test]
    async fn test_connection_refused_prints_error_line() {
        let url = process_devkit::unreachable_url().await.unwrap();

        let mut sim = simulator(url, Duration::from_secs(30));
        let outcome = sim.run_cycle().await.unwrap();
        assert!(matches!(outcome, CycleOutcome::Failed(_)));

        let text = output(&sim);
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("Error: "));
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_survives_failures_until_shutdown() {
        let url = process_devkit::unreachable_url().await.unwrap();

        // 30s interval on a paused clock: ~3 cycles before the 95s shutdown
        let mut sim = simulator(url, Duration::from_secs(30));
        sim.run(sleep(Duration::from_secs(95))).await.unwrap();

        let text = output(&sim);
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(report::START_BANNER));
        assert_eq!(lines.next(), Some(report::STOP_HINT));

        let errors = lines.filter(|l| l.starts_with("Error: ")).count();
        assert!(errors >= 2, "expected several failed cycles, got {}", errors);
    }

    #[tokio::test]
    async fn test_loop_posts_every_interval() {
        let harness = TestHarness::new().await.unwrap();
        harness.endpoint.respond_with_json(monitor_response(3, 0, 0));

        let mut sim = simulator(harness.endpoint.url(), Duration::from_millis(20));
        sim.run(async {
            harness.endpoint.wait_for_requests(3, 10_000).await;
        })
        .await
        .unwrap();

        let count = harness.endpoint.request_count();
        assert!(count >= 3, "expected repeated posts, got {}", count);

        let reported = output(&sim).lines().filter(|l| l.contains("Processed: 3")).count();
        assert!(reported >= 2);
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_sleep() {
        let harness = TestHarness::new().await.unwrap();
        harness.endpoint.respond_with_json(monitor_response(3, 0, 0));

        let mut sim = simulator(harness.endpoint.url(), Duration::from_secs(3600));
        let started = std::time::Instant::now();
        sim.run(async {
            harness.endpoint.wait_for_requests(1, 10_000).await;
            sleep(Duration::from_millis(50)).await;
        })
        .await
        .unwrap();

        assert!(started.elapsed() < Duration::from_secs(20));
        assert_eq!(harness.endpoint.request_count(), 1);
    }
}
