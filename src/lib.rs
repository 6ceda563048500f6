#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod canvas;
pub mod config;
pub mod download;
pub mod editor;
pub mod error;
pub mod file_handler;
pub mod history;
pub mod input;
pub mod panels;
pub mod render;
pub mod services;
pub mod stroke;
pub mod util;

pub use app::InpaintApp;
pub use canvas::Canvas;
pub use config::EditorConfig;
pub use editor::Editor;
pub use error::{EditorError, EditorResult, ServiceError};
pub use history::{EditBatch, EditHistory};
pub use render::{RenderJob, RenderOutcome};
pub use services::{Services, SourceFile};
pub use stroke::Line;
