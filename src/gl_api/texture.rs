use gl::types::*;
use log::debug;

use crate::gl_api::context::{Gl, TextureId};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u32)]
pub enum Filter {
    Nearest = gl::NEAREST,
    Linear = gl::LINEAR,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u32)]
pub enum Wrap {
    ClampToEdge = gl::CLAMP_TO_EDGE,
    Repeat = gl::REPEAT,
    MirroredRepeat = gl::MIRRORED_REPEAT,
}

/// Sampling state applied once when a texture is created.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TextureParams {
    pub min_filter: Filter,
    pub mag_filter: Filter,
    pub wrap: Wrap,
}

impl Default for TextureParams {
    fn default() -> Self {
        TextureParams {
            min_filter: Filter::Linear,
            mag_filter: Filter::Linear,
            wrap: Wrap::ClampToEdge,
        }
    }
}

/// A 2D RGBA8 texture. Has no storage until the first `set_shape`.
#[derive(Debug)]
pub struct Texture {
    gl: Gl,
    id: TextureId,
    width: GLsizei,
    height: GLsizei,
}

impl Texture {
    /// Creates the texture and applies `params`. The new texture is left
    /// bound to `GL_TEXTURE_2D`.
    pub fn new(gl: &Gl, params: TextureParams) -> Self {
        let id = gl.gen_texture();
        gl.bind_texture_2d(id);
        gl.tex_parameter_2d(gl::TEXTURE_MIN_FILTER, params.min_filter as GLint);
        gl.tex_parameter_2d(gl::TEXTURE_MAG_FILTER, params.mag_filter as GLint);
        gl.tex_parameter_2d(gl::TEXTURE_WRAP_S, params.wrap as GLint);
        gl.tex_parameter_2d(gl::TEXTURE_WRAP_T, params.wrap as GLint);
        Texture { gl: gl.clone(), id, width: 0, height: 0 }
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn width(&self) -> GLsizei {
        self.width
    }

    pub fn height(&self) -> GLsizei {
        self.height
    }

    pub fn bind(&self) {
        self.gl.bind_texture_2d(self.id);
    }

    /// Binds the texture on texture unit `unit` and hands the unit back, ready
    /// to be given to a sampler uniform.
    pub fn bind_to_unit(&self, unit: GLuint) -> GLint {
        self.gl.active_texture(unit);
        self.bind();
        unit as GLint
    }

    /// (Re)allocates storage, discarding the previous contents. Leaves the
    /// texture bound.
    pub fn set_shape(&mut self, width: GLsizei, height: GLsizei) {
        debug!("allocating {}x{} storage for texture {}", width, height, self.id.raw());
        self.width = width;
        self.height = height;
        self.bind();
        self.gl.tex_storage_rgba_2d(width, height);
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.gl.delete_texture(self.id);
    }
}
