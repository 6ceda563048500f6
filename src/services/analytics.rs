use serde::Serialize;

use super::Analytics;

/// Which path a download took
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadMode {
    Share,
    Download,
}

/// Events reported to the analytics sink
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AnalyticsEvent {
    InpaintProcessed {
        duration_secs: f64,
        width: u32,
        height: u32,
    },
    InpaintFailed {
        error: String,
    },
    Download {
        mode: DownloadMode,
    },
}

impl AnalyticsEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::InpaintProcessed { .. } => "inpaint_processed",
            Self::InpaintFailed { .. } => "inpaint_failed",
            Self::Download { .. } => "download",
        }
    }
}

/// Writes every event to the log as a JSON line
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAnalytics;

impl Analytics for LogAnalytics {
    fn log_event(&self, event: AnalyticsEvent) {
        match serde_json::to_string(&event) {
            Ok(json) => log::info!("analytics: {json}"),
            Err(err) => log::warn!("analytics: could not serialize {}: {err}", event.name()),
        }
    }
}
