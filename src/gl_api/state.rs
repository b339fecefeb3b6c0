use crate::gl_api::context::{FramebufferId, GlContext, RenderbufferId, TextureId};

/// Snapshot of the framebuffer, renderbuffer and 2D texture bindings. Each is
/// put back on its own target when the guard goes out of scope, so whatever
/// gets rebound in between never leaks out to the caller's render loop.
#[must_use]
pub(crate) struct StateGuard<'gl> {
    gl: &'gl dyn GlContext,
    framebuffer: FramebufferId,
    renderbuffer: RenderbufferId,
    texture: TextureId,
}

impl<'gl> StateGuard<'gl> {
    pub(crate) fn acquire(gl: &'gl dyn GlContext) -> Self {
        StateGuard {
            gl,
            framebuffer: gl.framebuffer_binding(),
            renderbuffer: gl.renderbuffer_binding(),
            texture: gl.texture_binding_2d(),
        }
    }
}

impl<'gl> Drop for StateGuard<'gl> {
    fn drop(&mut self) {
        self.gl.bind_framebuffer(self.framebuffer);
        self.gl.bind_renderbuffer(self.renderbuffer);
        self.gl.bind_texture_2d(self.texture);
    }
}
