//! Post-run statistics
//!
//! Two passes over a finished simulator: means first, then dispersions
//! around those means. Nothing here mutates the simulator.
//!
//! # Zero counts
//!
//! - A source with no succeeded requests reports 0.0 for every mean and
//!   dispersion; with exactly one it reports 0.0 dispersion.
//! - A source that generated nothing has reject probability 0.0.
//! - Utilization is 0.0 when the simulation end time is 0.0.

use crate::error::SimulationError;
use crate::models::Request;
use crate::simulator::Simulator;
use serde::{Deserialize, Serialize};

/// Per-source result row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceStats {
    pub index: usize,
    pub generated_count: usize,
    pub rejected_count: usize,
    pub succeeded_count: usize,
    pub reject_probability: f64,
    pub mean_life_time: f64,
    pub mean_buffer_time: f64,
    pub mean_service_time: f64,
    pub buffer_time_dispersion: f64,
    pub service_time_dispersion: f64,
}

/// Per-processor result row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorStats {
    pub index: usize,
    pub busy_time: f64,
    pub utilization: f64,
}

/// Both result tables of a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub sources: Vec<SourceStats>,
    pub processors: Vec<ProcessorStats>,

    /// Completion time of the last served request
    pub end_time: f64,
}

impl AnalysisReport {
    /// Source rows: index, generated, reject probability, mean life time,
    /// mean buffer time, mean service time, buffer dispersion, service dispersion
    pub fn source_table(&self) -> Vec<Vec<String>> {
        self.sources
            .iter()
            .map(|s| {
                vec![
                    s.index.to_string(),
                    s.generated_count.to_string(),
                    format!("{:.3}", s.reject_probability),
                    format!("{:.3}", s.mean_life_time),
                    format!("{:.3}", s.mean_buffer_time),
                    format!("{:.3}", s.mean_service_time),
                    format!("{:.3}", s.buffer_time_dispersion),
                    format!("{:.3}", s.service_time_dispersion),
                ]
            })
            .collect()
    }

    /// Processor rows: index, utilization
    pub fn processor_table(&self) -> Vec<Vec<String>> {
        self.processors
            .iter()
            .map(|p| vec![p.index.to_string(), format!("{:.3}", p.utilization)])
            .collect()
    }

    /// Rejected over generated, across all sources
    pub fn overall_reject_probability(&self) -> f64 {
        let generated: usize = self.sources.iter().map(|s| s.generated_count).sum();
        let rejected: usize = self.sources.iter().map(|s| s.rejected_count).sum();
        ratio(rejected as f64, generated as f64)
    }
}

/// Compute both result tables
///
/// # Errors
/// `NotFinished` until the simulator has emitted WORK_END.
pub fn analyze(simulator: &Simulator) -> Result<AnalysisReport, SimulationError> {
    if !simulator.is_work_complete() {
        return Err(SimulationError::NotFinished);
    }

    let production = simulator.production();
    let succeeded = simulator.selection().succeeded();

    let sources = production
        .sources()
        .iter()
        .map(|source| {
            let index = source.index();
            let served = &succeeded[index];
            let generated_count = source.generated_count();
            let rejected_count = production.rejected()[index].len();

            let mean_buffer_time = mean(served, Request::time_in_buffer);
            let mean_service_time = mean(served, Request::time_in_processor);

            SourceStats {
                index,
                generated_count,
                rejected_count,
                succeeded_count: served.len(),
                reject_probability: ratio(rejected_count as f64, generated_count as f64),
                mean_life_time: mean(served, Request::life_time),
                mean_buffer_time,
                mean_service_time,
                buffer_time_dispersion: dispersion(served, Request::time_in_buffer, mean_buffer_time),
                service_time_dispersion: dispersion(
                    served,
                    Request::time_in_processor,
                    mean_service_time,
                ),
            }
        })
        .collect();

    let end_time = simulator.end_time();
    let processors = simulator
        .selection()
        .processors()
        .iter()
        .map(|processor| ProcessorStats {
            index: processor.index(),
            busy_time: processor.accumulated_busy_time(),
            utilization: ratio(processor.accumulated_busy_time(), end_time),
        })
        .collect();

    Ok(AnalysisReport {
        sources,
        processors,
        end_time,
    })
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

fn mean(requests: &[Request], value: fn(&Request) -> f64) -> f64 {
    let total: f64 = requests.iter().map(value).sum();
    ratio(total, requests.len() as f64)
}

/// Sum of `(x - mean)^2 / (n - 1)`, divided per term
fn dispersion(requests: &[Request], value: fn(&Request) -> f64, mean: f64) -> f64 {
    let n = requests.len();
    if n < 2 {
        return 0.0;
    }
    let denominator = (n - 1) as f64;
    requests
        .iter()
        .map(|r| (value(r) - mean).powi(2) / denominator)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;

    fn served(buffer_times: &[f64]) -> Vec<Request> {
        buffer_times
            .iter()
            .enumerate()
            .map(|(i, &t)| {
                let mut request = Request::new(0, i, i as f64);
                request.set_time_in_buffer(t);
                request.set_time_in_processor(1.0);
                request
            })
            .collect()
    }

    fn create_config(budget: usize) -> SimulationConfig {
        SimulationConfig {
            sources: vec![1.2, 0.6],
            processors: vec![0.9, 1.1],
            buffer_capacity: 2,
            requests_count: budget,
            seed: 99,
        }
    }

    #[test]
    fn test_dispersion_matches_sample_variance() {
        let requests = served(&[1.0, 2.0, 3.0, 4.0]);
        let m = mean(&requests, Request::time_in_buffer);
        assert_eq!(m, 2.5);
        let d = dispersion(&requests, Request::time_in_buffer, m);
        assert!((d - 5.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_and_single_sample_conventions() {
        assert_eq!(mean(&[], Request::life_time), 0.0);
        assert_eq!(dispersion(&[], Request::life_time, 0.0), 0.0);

        let one = served(&[2.0]);
        assert_eq!(dispersion(&one, Request::time_in_buffer, 2.0), 0.0);
    }

    #[test]
    fn test_analyze_requires_finished_run() {
        let mut simulator = create_config(10).build_simulator().unwrap();
        assert_eq!(analyze(&simulator), Err(SimulationError::NotFinished));

        simulator.step();
        assert_eq!(analyze(&simulator), Err(SimulationError::NotFinished));

        simulator.run_to_completion();
        assert!(analyze(&simulator).is_ok());
    }

    #[test]
    fn test_report_counts_match_simulator() {
        let mut simulator = create_config(200).build_simulator().unwrap();
        simulator.run_to_completion();
        let report = analyze(&simulator).unwrap();

        let generated: usize = report.sources.iter().map(|s| s.generated_count).sum();
        let rejected: usize = report.sources.iter().map(|s| s.rejected_count).sum();
        let succeeded: usize = report.sources.iter().map(|s| s.succeeded_count).sum();
        assert_eq!(generated, 200);
        assert_eq!(rejected, simulator.rejected_count());
        assert_eq!(generated, rejected + succeeded);

        for stats in &report.sources {
            assert!((0.0..=1.0).contains(&stats.reject_probability));
            assert!(stats.mean_service_time >= 0.0);
        }
        for stats in &report.processors {
            assert!(stats.utilization >= 0.0);
            assert_eq!(stats.utilization, stats.busy_time / report.end_time);
        }
        assert!(report.processors.iter().any(|p| p.utilization > 0.0));
    }

    #[test]
    fn test_tables_are_formatted() {
        let mut simulator = create_config(30).build_simulator().unwrap();
        simulator.run_to_completion();
        let report = analyze(&simulator).unwrap();

        let sources = report.source_table();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].len(), 8);
        assert_eq!(sources[0][0], "0");
        assert!(sources[0][2].split('.').nth(1).map_or(false, |d| d.len() == 3));

        let processors = report.processor_table();
        assert_eq!(processors.len(), 2);
        assert_eq!(processors[1][0], "1");
    }
}
