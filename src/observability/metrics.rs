//! Prometheus rendering of import counters.
//!
//! The recorder is installed on demand (`--metrics`); without it the
//! `metrics` macros are no-ops. Counters recorded during a run:
//!
//! | Metric | Labels |
//! |--------|--------|
//! | `import_lines_total` | |
//! | `import_records_written_total` | |
//! | `import_format_errors_total` | |
//! | `import_validation_errors_total` | |
//! | `store_commits_total` | `backend`, `status` |
//! | `store_commit_duration_ms` (histogram) | `backend` |

use crate::{Error, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Handle for rendering recorded metrics.
#[derive(Debug, Clone)]
pub struct MetricsHandle {
    prometheus: PrometheusHandle,
}

impl MetricsHandle {
    /// Renders all recorded metrics in the Prometheus text exposition format.
    #[must_use]
    pub fn render(&self) -> String {
        self.prometheus.render()
    }
}

/// Installs a Prometheus recorder as the global `metrics` recorder.
///
/// # Errors
///
/// Returns an error if a global recorder is already installed.
pub fn install_recorder() -> Result<MetricsHandle> {
    let recorder = PrometheusBuilder::new().build_recorder();
    let prometheus = recorder.handle();
    metrics::set_global_recorder(recorder).map_err(|e| Error::OperationFailed {
        operation: "metrics_recorder_install".to_string(),
        cause: e.to_string(),
    })?;
    Ok(MetricsHandle { prometheus })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_recorded_counter() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = MetricsHandle {
            prometheus: recorder.handle(),
        };

        metrics::with_local_recorder(&recorder, || {
            metrics::counter!("import_lines_total").increment(3);
        });

        let rendered = handle.render();
        assert!(rendered.contains("import_lines_total 3"));
    }
}
