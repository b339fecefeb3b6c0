//! Off-screen render targets and full-screen-quad shader programs for a host
//! that drives its own GL render loop.
//!
//! Everything here runs on the thread that owns the GL context. Resources hold
//! a shared [`Gl`] handle and release their GL objects when dropped; none of
//! them leave the caller's framebuffer, renderbuffer or texture bindings
//! changed except through an explicit `bind`.
//!
//! ```no_run
//! use std::rc::Rc;
//! use quadpass::{Gl, NativeGl, RenderTarget, ShaderProgram};
//!
//! # fn loader(_: &'static str) -> *const std::ffi::c_void { std::ptr::null() }
//! let gl: Gl = Rc::new(unsafe { NativeGl::load_with(loader) });
//!
//! let mut target = RenderTarget::new(&gl, 1);
//! target.set_shape(512, 512).ok();
//!
//! let mut blur = ShaderProgram::new(&gl, "blur", "...", "...");
//! if blur.ensure_compile() {
//!     target.bind();
//!     blur.bind();
//!     blur.set_uniform("u_radius", 4.0f32);
//!     blur.draw();
//! }
//! ```

#[macro_use]
pub mod gl_api;

pub use crate::gl_api::buffer::UsageType;
pub use crate::gl_api::context::{
    ActiveUniform, BufferId, FramebufferId, Gl, GlContext, ProgramId, RenderbufferId, ShaderId,
    TextureId,
};
pub use crate::gl_api::error::{GlError, GlResult};
pub use crate::gl_api::framebuffer::{IncompleteReason, RenderTarget, TargetError};
pub use crate::gl_api::native::NativeGl;
pub use crate::gl_api::shader::program::{ShaderProgram, QUAD_VERTEX_COUNT};
pub use crate::gl_api::shader::shader::ShaderType;
pub use crate::gl_api::shader::ShaderError;
pub use crate::gl_api::texture::{Filter, Texture, TextureParams, Wrap};
pub use crate::gl_api::uniform::{
    UniformError, UniformInfo, UniformLocation, UniformType, UniformValue,
};
