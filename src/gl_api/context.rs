use gl::types::*;
use std::fmt;
use std::rc::Rc;

use crate::gl_api::shader::shader::ShaderType;
use crate::gl_api::uniform::UniformLocation;

macro_rules! gl_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
        pub struct $name(GLuint);

        impl $name {
            /// The GL "zero" name: nothing bound, or the default object.
            pub const NONE: $name = $name(0);

            pub fn from_raw(raw: GLuint) -> Self {
                $name(raw)
            }

            pub fn raw(self) -> GLuint {
                self.0
            }

            pub fn is_none(self) -> bool {
                self.0 == 0
            }
        }
    };
}

gl_handle!(ProgramId);
gl_handle!(ShaderId);
gl_handle!(BufferId);
gl_handle!(
    /// `FramebufferId::NONE` is the window system's default framebuffer.
    FramebufferId
);
gl_handle!(RenderbufferId);
gl_handle!(TextureId);

/// One entry of `glGetActiveUniform`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ActiveUniform {
    pub name: String,
    pub type_code: GLenum,
    pub size: GLint,
}

/// The slice of GL this crate talks to.
///
/// Every method takes `&self`: a GL context is a single piece of mutable
/// state owned by one thread, and the objects built on top of it hold shared
/// handles to it. Implementations are not expected to be thread safe.
pub trait GlContext: fmt::Debug {
    // Binding queries
    fn framebuffer_binding(&self) -> FramebufferId;
    fn renderbuffer_binding(&self) -> RenderbufferId;
    fn texture_binding_2d(&self) -> TextureId;
    fn max_renderbuffer_size(&self) -> GLint;

    // Framebuffers
    fn gen_framebuffer(&self) -> FramebufferId;
    fn delete_framebuffer(&self, id: FramebufferId);
    fn bind_framebuffer(&self, id: FramebufferId);
    /// Attaches `texture` at `GL_COLOR_ATTACHMENT0 + index` of the bound
    /// framebuffer.
    fn framebuffer_color_texture(&self, index: GLuint, texture: TextureId);
    fn check_framebuffer_status(&self) -> GLenum;
    fn bind_renderbuffer(&self, id: RenderbufferId);
    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei);

    // Textures
    fn gen_texture(&self) -> TextureId;
    fn delete_texture(&self, id: TextureId);
    fn active_texture(&self, unit: GLuint);
    fn bind_texture_2d(&self, id: TextureId);
    fn tex_parameter_2d(&self, pname: GLenum, param: GLint);
    /// Allocates uninitialized RGBA8 storage for the bound 2D texture.
    fn tex_storage_rgba_2d(&self, width: GLsizei, height: GLsizei);

    // Buffers
    fn gen_buffer(&self) -> BufferId;
    fn delete_buffer(&self, id: BufferId);
    fn bind_buffer(&self, target: GLenum, id: BufferId);
    fn buffer_data(&self, target: GLenum, data: &[u8], usage: GLenum);

    // Shader stages
    fn create_shader(&self, ty: ShaderType) -> ShaderId;
    fn delete_shader(&self, id: ShaderId);
    fn shader_source(&self, id: ShaderId, source: &str);
    fn compile_shader(&self, id: ShaderId);
    fn shader_compile_status(&self, id: ShaderId) -> bool;
    fn shader_info_log(&self, id: ShaderId) -> String;

    // Programs
    fn create_program(&self) -> ProgramId;
    fn delete_program(&self, id: ProgramId);
    fn is_program(&self, id: ProgramId) -> bool;
    fn attach_shader(&self, program: ProgramId, shader: ShaderId);
    fn link_program(&self, id: ProgramId);
    fn program_link_status(&self, id: ProgramId) -> bool;
    fn validate_program(&self, id: ProgramId);
    fn program_validate_status(&self, id: ProgramId) -> bool;
    fn program_info_log(&self, id: ProgramId) -> String;
    fn use_program(&self, id: ProgramId);
    fn active_uniform_count(&self, id: ProgramId) -> GLuint;
    fn active_uniform(&self, id: ProgramId, index: GLuint) -> ActiveUniform;
    fn uniform_location(&self, id: ProgramId, name: &str) -> Option<UniformLocation>;
    fn attrib_location(&self, id: ProgramId, name: &str) -> Option<GLuint>;

    // Vertex input
    fn enable_vertex_attrib_array(&self, location: GLuint);
    /// Describes a tightly packed, non-normalized float attribute.
    fn vertex_attrib_pointer_f32(
        &self,
        location: GLuint,
        components: GLint,
        stride: GLsizei,
        offset: usize,
    );
    fn draw_arrays(&self, mode: GLenum, first: GLint, count: GLsizei);

    // Uniform uploads, always a single element and never transposed.
    fn uniform_1i(&self, location: UniformLocation, value: GLint);
    fn uniform_1f(&self, location: UniformLocation, value: GLfloat);
    fn uniform_2fv(&self, location: UniformLocation, value: &[GLfloat; 2]);
    fn uniform_3fv(&self, location: UniformLocation, value: &[GLfloat; 3]);
    fn uniform_4fv(&self, location: UniformLocation, value: &[GLfloat; 4]);
    fn uniform_2iv(&self, location: UniformLocation, value: &[GLint; 2]);
    fn uniform_3iv(&self, location: UniformLocation, value: &[GLint; 3]);
    fn uniform_4iv(&self, location: UniformLocation, value: &[GLint; 4]);
    fn uniform_matrix_2fv(&self, location: UniformLocation, value: &[GLfloat; 4]);
    fn uniform_matrix_3fv(&self, location: UniformLocation, value: &[GLfloat; 9]);
    fn uniform_matrix_4fv(&self, location: UniformLocation, value: &[GLfloat; 16]);
}

/// Shared handle to the context every resource was created on.
pub type Gl = Rc<dyn GlContext>;
