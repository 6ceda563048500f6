//! Collaborators the editor talks to but does not own: the inpainting
//! backend, its token provider, analytics, the subscription tier, the
//! share/download helpers and the user-facing alert box.
//!
//! Everything is reached through trait objects so hosts can plug in a
//! remote backend while the app and tests use the local implementations.

use futures::future::BoxFuture;
use std::sync::Arc;

use crate::error::ServiceError;

mod analytics;
mod local;

pub use analytics::{AnalyticsEvent, DownloadMode, LogAnalytics};
pub use local::{FixedTier, FsExporter, LocalInpainter, LogAlerts, StaticToken};

/// An image file as picked by the user: original name and encoded bytes
#[derive(Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Arc<[u8]>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

impl std::fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFile")
            .field("name", &self.name)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Everything the inpainting backend needs for one render
#[derive(Debug, Clone)]
pub struct InpaintRequest {
    pub file: SourceFile,
    /// PNG data URL, white where pixels should be replaced
    pub mask: String,
    pub token: String,
}

/// A finished image ready to leave the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

pub trait InpaintService: Send + Sync {
    /// Returns the encoded result image
    fn inpaint(&self, request: InpaintRequest) -> BoxFuture<'_, Result<Vec<u8>, ServiceError>>;
}

pub trait TokenProvider: Send + Sync {
    fn token(&self) -> BoxFuture<'_, Result<String, ServiceError>>;
}

pub trait Analytics: Send + Sync {
    fn log_event(&self, event: AnalyticsEvent);
}

pub trait UserService: Send + Sync {
    /// Pro users default to HD editing
    fn is_pro(&self) -> bool;
}

pub trait Exporter: Send + Sync {
    /// Whether a native share sheet is available
    fn can_share(&self) -> bool {
        false
    }

    fn share(&self, file: ExportFile) -> std::io::Result<()>;

    fn download(&self, file: ExportFile) -> std::io::Result<()>;
}

/// Blocking, user-visible error reporting
pub trait Alerts: Send + Sync {
    fn alert(&self, message: &str);
}

/// The set of collaborators an editor is wired to. Cheap to clone.
#[derive(Clone)]
pub struct Services {
    pub inpaint: Arc<dyn InpaintService>,
    pub token: Arc<dyn TokenProvider>,
    pub analytics: Arc<dyn Analytics>,
    pub user: Arc<dyn UserService>,
    pub exporter: Arc<dyn Exporter>,
    pub alerts: Arc<dyn Alerts>,
}

impl Services {
    /// Fully in-process wiring: local inpainting, downloads into `download_dir`
    pub fn local(download_dir: impl Into<std::path::PathBuf>) -> Self {
        Self {
            inpaint: Arc::new(LocalInpainter::default()),
            token: Arc::new(StaticToken::new("local")),
            analytics: Arc::new(LogAnalytics),
            user: Arc::new(FixedTier(false)),
            exporter: Arc::new(FsExporter::new(download_dir)),
            alerts: Arc::new(LogAlerts),
        }
    }

    pub fn with_alerts(mut self, alerts: Arc<dyn Alerts>) -> Self {
        self.alerts = alerts;
        self
    }
}
