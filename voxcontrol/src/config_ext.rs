//! Extension of voxconfig for the orchestrator.

use std::time::Duration;

use crate::orchestrator::OrchestratorSettings;

/// Extension trait for `voxconfig::Config`.
pub trait OrchestratorSettingsExt {
    /// Orchestrator settings from the `playback` configuration section,
    /// falling back to defaults for missing or mistyped values.
    fn orchestrator_settings(&self) -> OrchestratorSettings;
}

impl OrchestratorSettingsExt for voxconfig::Config {
    fn orchestrator_settings(&self) -> OrchestratorSettings {
        let defaults = OrchestratorSettings::default();
        OrchestratorSettings {
            ticker_interval: self
                .get_ticker_interval_secs()
                .map(Duration::from_secs)
                .unwrap_or(defaults.ticker_interval),
            watcher_grace: self
                .get_watcher_grace_secs()
                .map(Duration::from_secs)
                .unwrap_or(defaults.watcher_grace),
            queue_preview_limit: self
                .get_queue_preview_limit()
                .unwrap_or(defaults.queue_preview_limit),
        }
    }
}
