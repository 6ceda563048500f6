use image::RgbaImage;

use crate::error::{EditorResult, ServiceError};
use crate::services::{InpaintRequest, Services, SourceFile};
use crate::util::time;

/// The asynchronous half of a render: token fetch, inpainting call and
/// decode of the returned image.
///
/// Owns everything it needs, so a front-end can move it onto whatever
/// executor it has and hand the outcome back to
/// [`Editor::finish_render`](crate::Editor::finish_render).
pub struct RenderJob {
    services: Services,
    file: SourceFile,
    mask: String,
    generation: u64,
    started_at: f64,
}

/// What a [`RenderJob`] produced
#[derive(Debug)]
pub struct RenderOutcome {
    pub(crate) result: EditorResult<RgbaImage>,
    pub(crate) generation: u64,
    pub(crate) started_at: f64,
}

impl RenderOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

impl RenderJob {
    pub(crate) fn new(services: Services, file: SourceFile, mask: String, generation: u64) -> Self {
        Self {
            services,
            file,
            mask,
            generation,
            started_at: time::now_secs(),
        }
    }

    pub async fn run(self) -> RenderOutcome {
        let result = self.request().await;
        RenderOutcome {
            result,
            generation: self.generation,
            started_at: self.started_at,
        }
    }

    async fn request(&self) -> EditorResult<RgbaImage> {
        let token = self.services.token.token().await?;
        let bytes = self
            .services
            .inpaint
            .inpaint(InpaintRequest {
                file: self.file.clone(),
                mask: self.mask.clone(),
                token,
            })
            .await?;
        if bytes.is_empty() {
            return Err(ServiceError::EmptyResponse.into());
        }
        Ok(image::load_from_memory(&bytes)?.to_rgba8())
    }
}
