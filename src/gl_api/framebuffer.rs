use gl::types::*;
use log::{debug, error};
use thiserror::Error;

use crate::gl_api::context::{FramebufferId, Gl};
use crate::gl_api::state::StateGuard;
use crate::gl_api::texture::{Texture, TextureParams};

// Only exposed by GLES and EXT_framebuffer_object; desktop GL folds it into
// INCOMPLETE_ATTACHMENT, so the generated bindings don't carry it.
const FRAMEBUFFER_INCOMPLETE_DIMENSIONS: GLenum = 0x8CD9;

/// Why `glCheckFramebufferStatus` refused a framebuffer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Error)]
pub enum IncompleteReason {
    #[error("Framebuffer unsupported")]
    Unsupported,
    #[error("Framebuffer incomplete attachment")]
    IncompleteAttachment,
    #[error("Framebuffer incomplete dimensions")]
    IncompleteDimensions,
    #[error("Framebuffer incomplete missing attachment")]
    MissingAttachment,
    #[error("Failed to create framebuffer: {0:#x}")]
    Other(GLenum),
}

impl IncompleteReason {
    /// `None` means complete.
    pub fn from_status(status: GLenum) -> Option<Self> {
        match status {
            gl::FRAMEBUFFER_COMPLETE => None,
            gl::FRAMEBUFFER_UNSUPPORTED => Some(IncompleteReason::Unsupported),
            gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => Some(IncompleteReason::IncompleteAttachment),
            FRAMEBUFFER_INCOMPLETE_DIMENSIONS => Some(IncompleteReason::IncompleteDimensions),
            gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => {
                Some(IncompleteReason::MissingAttachment)
            }
            other => Some(IncompleteReason::Other(other)),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Error)]
pub enum TargetError {
    #[error("Can't resize framebuffer to {width}x{height}. Invalid dimensions (max {max})")]
    InvalidResizeDimensions {
        width: GLsizei,
        height: GLsizei,
        max: GLint,
    },

    #[error("{reason}")]
    Incomplete { reason: IncompleteReason },
}

/// An off-screen framebuffer with one or more color textures attached.
///
/// All attachments always share the target's dimensions. Internal rebinding
/// (construction, resizing, status checks) is wrapped in a state guard, so
/// only [`RenderTarget::bind`] ever changes what the caller sees bound.
#[derive(Debug)]
pub struct RenderTarget {
    gl: Gl,
    id: FramebufferId,
    color: Vec<Texture>,
    width: GLsizei,
    height: GLsizei,
    complete: bool,
}

impl RenderTarget {
    pub fn new(gl: &Gl, color_attachments: usize) -> Self {
        Self::with_params(gl, color_attachments, TextureParams::default())
    }

    pub fn with_params(gl: &Gl, color_attachments: usize, params: TextureParams) -> Self {
        let guard = StateGuard::acquire(&**gl);

        let id = gl.gen_framebuffer();
        gl.bind_framebuffer(id);

        let color = (0..color_attachments)
            .map(|index| {
                let mut texture = Texture::new(gl, params);
                texture.set_shape(0, 0);
                gl.framebuffer_color_texture(index as GLuint, texture.id());
                texture
            })
            .collect();

        drop(guard);
        debug!("created framebuffer {} with {} color attachments", id.raw(), color_attachments);

        RenderTarget { gl: gl.clone(), id, color, width: 0, height: 0, complete: false }
    }

    pub fn id(&self) -> FramebufferId {
        self.id
    }

    /// Color attachments, in attachment order.
    pub fn color(&self) -> &[Texture] {
        &self.color
    }

    pub fn width(&self) -> GLsizei {
        self.width
    }

    pub fn height(&self) -> GLsizei {
        self.height
    }

    /// Whether the last completeness check passed. `false` until the first
    /// resize or explicit [`RenderTarget::check_status`].
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Resizes every attachment to `width`x`height`.
    ///
    /// Asking for the current size does nothing at all. Dimensions outside
    /// `0..=GL_MAX_RENDERBUFFER_SIZE` are logged and rejected without touching
    /// the target. An incomplete framebuffer after a resize is logged and
    /// reported through [`RenderTarget::is_complete`], but the resize stands.
    pub fn set_shape(&mut self, width: GLsizei, height: GLsizei) -> Result<(), TargetError> {
        if width == self.width && height == self.height {
            return Ok(());
        }

        let max = self.gl.max_renderbuffer_size();
        if width < 0 || width > max || height < 0 || height > max {
            let err = TargetError::InvalidResizeDimensions { width, height, max };
            error!("framebuffer {}: {}", self.id.raw(), err);
            return Err(err);
        }

        self.width = width;
        self.height = height;

        let gl = self.gl.clone();
        let _guard = StateGuard::acquire(&*gl);
        for texture in &mut self.color {
            texture.set_shape(width, height);
        }
        gl.bind_framebuffer(self.id);
        // Completeness is advisory here; it has already been logged.
        let _ = self.check_bound_status();
        Ok(())
    }

    /// Checks completeness of this framebuffer, logging any problem.
    pub fn check_status(&mut self) -> Result<(), TargetError> {
        let gl = self.gl.clone();
        let _guard = StateGuard::acquire(&*gl);
        gl.bind_framebuffer(self.id);
        self.check_bound_status()
    }

    fn check_bound_status(&mut self) -> Result<(), TargetError> {
        let status = self.gl.check_framebuffer_status();
        match IncompleteReason::from_status(status) {
            None => {
                self.complete = true;
                Ok(())
            }
            Some(reason) => {
                error!("framebuffer {}: {}", self.id.raw(), reason);
                self.complete = false;
                Err(TargetError::Incomplete { reason })
            }
        }
    }

    /// Binds the framebuffer and covers it with the viewport.
    pub fn bind(&self) {
        self.gl.bind_framebuffer(self.id);
        self.gl.viewport(0, 0, self.width, self.height);
    }
}

impl Drop for RenderTarget {
    fn drop(&mut self) {
        // Attachments release their own textures once this returns.
        self.gl.delete_framebuffer(self.id);
    }
}
