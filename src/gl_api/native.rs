use gl::types::*;
use std::ffi::{c_void, CString};
use std::marker::PhantomData;
use std::ptr;

use crate::gl_api::context::*;
use crate::gl_api::shader::shader::ShaderType;
use crate::gl_api::uniform::UniformLocation;

/// The real thing: function pointers loaded into the `gl` crate's globals.
#[derive(Debug)]
pub struct NativeGl {
    // GL contexts are current on exactly one thread.
    _marker: PhantomData<*mut ()>,
}

impl NativeGl {
    /// Loads every GL entry point through `loader`.
    ///
    /// # Safety
    ///
    /// A GL context must be current on the calling thread, and must stay
    /// current for as long as the returned value (or anything created from
    /// it) is used.
    pub unsafe fn load_with<F>(loader: F) -> Self
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(loader);
        NativeGl { _marker: PhantomData }
    }
}

fn get_integer(pname: GLenum) -> GLint {
    let mut value = 0;
    unsafe {
        gl_call!(GetIntegerv(pname, &mut value));
    }
    value
}

fn info_log(length: GLint, fill: impl FnOnce(GLsizei, *mut GLsizei, *mut GLchar)) -> String {
    if length <= 0 {
        return String::new();
    }
    let mut buffer = vec![0u8; length as usize];
    let mut written = 0;
    fill(length, &mut written, buffer.as_mut_ptr() as *mut GLchar);
    buffer.truncate(written.max(0) as usize);
    String::from_utf8_lossy(&buffer).into_owned()
}

impl GlContext for NativeGl {
    fn framebuffer_binding(&self) -> FramebufferId {
        FramebufferId::from_raw(get_integer(gl::FRAMEBUFFER_BINDING) as GLuint)
    }

    fn renderbuffer_binding(&self) -> RenderbufferId {
        RenderbufferId::from_raw(get_integer(gl::RENDERBUFFER_BINDING) as GLuint)
    }

    fn texture_binding_2d(&self) -> TextureId {
        TextureId::from_raw(get_integer(gl::TEXTURE_BINDING_2D) as GLuint)
    }

    fn max_renderbuffer_size(&self) -> GLint {
        get_integer(gl::MAX_RENDERBUFFER_SIZE)
    }

    fn gen_framebuffer(&self) -> FramebufferId {
        let mut id = 0;
        unsafe {
            gl_call!(GenFramebuffers(1, &mut id));
        }
        FramebufferId::from_raw(id)
    }

    fn delete_framebuffer(&self, id: FramebufferId) {
        unsafe {
            gl_call!(DeleteFramebuffers(1, &id.raw()));
        }
    }

    fn bind_framebuffer(&self, id: FramebufferId) {
        unsafe {
            gl_call!(BindFramebuffer(gl::FRAMEBUFFER, id.raw()));
        }
    }

    fn framebuffer_color_texture(&self, index: GLuint, texture: TextureId) {
        unsafe {
            gl_call!(FramebufferTexture2D(
                gl::FRAMEBUFFER,
                gl::COLOR_ATTACHMENT0 + index,
                gl::TEXTURE_2D,
                texture.raw(),
                0
            ));
        }
    }

    fn check_framebuffer_status(&self) -> GLenum {
        unsafe { gl_call!(CheckFramebufferStatus(gl::FRAMEBUFFER)) }
    }

    fn bind_renderbuffer(&self, id: RenderbufferId) {
        unsafe {
            gl_call!(BindRenderbuffer(gl::RENDERBUFFER, id.raw()));
        }
    }

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        unsafe {
            gl_call!(Viewport(x, y, width, height));
        }
    }

    fn gen_texture(&self) -> TextureId {
        let mut id = 0;
        unsafe {
            gl_call!(GenTextures(1, &mut id));
        }
        TextureId::from_raw(id)
    }

    fn delete_texture(&self, id: TextureId) {
        unsafe {
            gl_call!(DeleteTextures(1, &id.raw()));
        }
    }

    fn active_texture(&self, unit: GLuint) {
        unsafe {
            gl_call!(ActiveTexture(gl::TEXTURE0 + unit));
        }
    }

    fn bind_texture_2d(&self, id: TextureId) {
        unsafe {
            gl_call!(BindTexture(gl::TEXTURE_2D, id.raw()));
        }
    }

    fn tex_parameter_2d(&self, pname: GLenum, param: GLint) {
        unsafe {
            gl_call!(TexParameteri(gl::TEXTURE_2D, pname, param));
        }
    }

    fn tex_storage_rgba_2d(&self, width: GLsizei, height: GLsizei) {
        unsafe {
            gl_call!(TexImage2D(
                gl::TEXTURE_2D,
                0,
                gl::RGBA as GLint,
                width,
                height,
                0,
                gl::RGBA,
                gl::UNSIGNED_BYTE,
                ptr::null()
            ));
        }
    }

    fn gen_buffer(&self) -> BufferId {
        let mut id = 0;
        unsafe {
            gl_call!(GenBuffers(1, &mut id));
        }
        BufferId::from_raw(id)
    }

    fn delete_buffer(&self, id: BufferId) {
        unsafe {
            gl_call!(DeleteBuffers(1, &id.raw()));
        }
    }

    fn bind_buffer(&self, target: GLenum, id: BufferId) {
        unsafe {
            gl_call!(BindBuffer(target, id.raw()));
        }
    }

    fn buffer_data(&self, target: GLenum, data: &[u8], usage: GLenum) {
        unsafe {
            gl_call!(BufferData(
                target,
                data.len() as GLsizeiptr,
                data.as_ptr() as *const _,
                usage
            ));
        }
    }

    fn create_shader(&self, ty: ShaderType) -> ShaderId {
        ShaderId::from_raw(unsafe { gl_call!(CreateShader(ty as GLenum)) })
    }

    fn delete_shader(&self, id: ShaderId) {
        unsafe {
            gl_call!(DeleteShader(id.raw()));
        }
    }

    fn shader_source(&self, id: ShaderId, source: &str) {
        // Passing an explicit length means the source needs no terminator.
        let ptr = source.as_ptr() as *const GLchar;
        let len = source.len() as GLint;
        unsafe {
            gl_call!(ShaderSource(id.raw(), 1, &ptr, &len));
        }
    }

    fn compile_shader(&self, id: ShaderId) {
        unsafe {
            gl_call!(CompileShader(id.raw()));
        }
    }

    fn shader_compile_status(&self, id: ShaderId) -> bool {
        let mut status = gl::FALSE as GLint;
        unsafe {
            gl_call!(GetShaderiv(id.raw(), gl::COMPILE_STATUS, &mut status));
        }
        status != gl::FALSE as GLint
    }

    fn shader_info_log(&self, id: ShaderId) -> String {
        let mut length = 0;
        unsafe {
            gl_call!(GetShaderiv(id.raw(), gl::INFO_LOG_LENGTH, &mut length));
        }
        info_log(length, |len, written, buf| unsafe {
            gl_call!(GetShaderInfoLog(id.raw(), len, written, buf));
        })
    }

    fn create_program(&self) -> ProgramId {
        ProgramId::from_raw(unsafe { gl_call!(CreateProgram()) })
    }

    fn delete_program(&self, id: ProgramId) {
        unsafe {
            gl_call!(DeleteProgram(id.raw()));
        }
    }

    fn is_program(&self, id: ProgramId) -> bool {
        unsafe { gl_call!(IsProgram(id.raw())) == gl::TRUE }
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        unsafe {
            gl_call!(AttachShader(program.raw(), shader.raw()));
        }
    }

    fn link_program(&self, id: ProgramId) {
        unsafe {
            gl_call!(LinkProgram(id.raw()));
        }
    }

    fn program_link_status(&self, id: ProgramId) -> bool {
        let mut status = gl::FALSE as GLint;
        unsafe {
            gl_call!(GetProgramiv(id.raw(), gl::LINK_STATUS, &mut status));
        }
        status != gl::FALSE as GLint
    }

    fn validate_program(&self, id: ProgramId) {
        unsafe {
            gl_call!(ValidateProgram(id.raw()));
        }
    }

    fn program_validate_status(&self, id: ProgramId) -> bool {
        let mut status = gl::FALSE as GLint;
        unsafe {
            gl_call!(GetProgramiv(id.raw(), gl::VALIDATE_STATUS, &mut status));
        }
        status != gl::FALSE as GLint
    }

    fn program_info_log(&self, id: ProgramId) -> String {
        let mut length = 0;
        unsafe {
            gl_call!(GetProgramiv(id.raw(), gl::INFO_LOG_LENGTH, &mut length));
        }
        info_log(length, |len, written, buf| unsafe {
            gl_call!(GetProgramInfoLog(id.raw(), len, written, buf));
        })
    }

    fn use_program(&self, id: ProgramId) {
        unsafe {
            gl_call!(UseProgram(id.raw()));
        }
    }

    fn active_uniform_count(&self, id: ProgramId) -> GLuint {
        let mut count = 0;
        unsafe {
            gl_call!(GetProgramiv(id.raw(), gl::ACTIVE_UNIFORMS, &mut count));
        }
        count.max(0) as GLuint
    }

    fn active_uniform(&self, id: ProgramId, index: GLuint) -> ActiveUniform {
        let mut max_length = 0;
        unsafe {
            gl_call!(GetProgramiv(id.raw(), gl::ACTIVE_UNIFORM_MAX_LENGTH, &mut max_length));
        }
        let mut size = 0;
        let mut type_code = 0;
        let name = info_log(max_length, |len, written, buf| unsafe {
            gl_call!(GetActiveUniform(
                id.raw(),
                index,
                len,
                written,
                &mut size,
                &mut type_code,
                buf
            ));
        });
        ActiveUniform { name, type_code, size }
    }

    fn uniform_location(&self, id: ProgramId, name: &str) -> Option<UniformLocation> {
        let c_string = CString::new(name).ok()?;
        match unsafe { gl_call!(GetUniformLocation(id.raw(), c_string.as_ptr())) } {
            -1 => None,
            location => Some(location),
        }
    }

    fn attrib_location(&self, id: ProgramId, name: &str) -> Option<GLuint> {
        let c_string = CString::new(name).ok()?;
        match unsafe { gl_call!(GetAttribLocation(id.raw(), c_string.as_ptr())) } {
            location if location < 0 => None,
            location => Some(location as GLuint),
        }
    }

    fn enable_vertex_attrib_array(&self, location: GLuint) {
        unsafe {
            gl_call!(EnableVertexAttribArray(location));
        }
    }

    fn vertex_attrib_pointer_f32(
        &self,
        location: GLuint,
        components: GLint,
        stride: GLsizei,
        offset: usize,
    ) {
        unsafe {
            gl_call!(VertexAttribPointer(
                location,
                components,
                gl::FLOAT,
                gl::FALSE,
                stride,
                offset as *const _
            ));
        }
    }

    fn draw_arrays(&self, mode: GLenum, first: GLint, count: GLsizei) {
        unsafe {
            gl_call!(DrawArrays(mode, first, count));
        }
    }

    fn uniform_1i(&self, location: UniformLocation, value: GLint) {
        unsafe {
            gl_call!(Uniform1i(location, value));
        }
    }

    fn uniform_1f(&self, location: UniformLocation, value: GLfloat) {
        unsafe {
            gl_call!(Uniform1f(location, value));
        }
    }

    fn uniform_2fv(&self, location: UniformLocation, value: &[GLfloat; 2]) {
        unsafe {
            gl_call!(Uniform2fv(location, 1, value.as_ptr()));
        }
    }

    fn uniform_3fv(&self, location: UniformLocation, value: &[GLfloat; 3]) {
        unsafe {
            gl_call!(Uniform3fv(location, 1, value.as_ptr()));
        }
    }

    fn uniform_4fv(&self, location: UniformLocation, value: &[GLfloat; 4]) {
        unsafe {
            gl_call!(Uniform4fv(location, 1, value.as_ptr()));
        }
    }

    fn uniform_2iv(&self, location: UniformLocation, value: &[GLint; 2]) {
        unsafe {
            gl_call!(Uniform2iv(location, 1, value.as_ptr()));
        }
    }

    fn uniform_3iv(&self, location: UniformLocation, value: &[GLint; 3]) {
        unsafe {
            gl_call!(Uniform3iv(location, 1, value.as_ptr()));
        }
    }

    fn uniform_4iv(&self, location: UniformLocation, value: &[GLint; 4]) {
        unsafe {
            gl_call!(Uniform4iv(location, 1, value.as_ptr()));
        }
    }

    fn uniform_matrix_2fv(&self, location: UniformLocation, value: &[GLfloat; 4]) {
        unsafe {
            gl_call!(UniformMatrix2fv(location, 1, gl::FALSE, value.as_ptr()));
        }
    }

    fn uniform_matrix_3fv(&self, location: UniformLocation, value: &[GLfloat; 9]) {
        unsafe {
            gl_call!(UniformMatrix3fv(location, 1, gl::FALSE, value.as_ptr()));
        }
    }

    fn uniform_matrix_4fv(&self, location: UniformLocation, value: &[GLfloat; 16]) {
        unsafe {
            gl_call!(UniformMatrix4fv(location, 1, gl::FALSE, value.as_ptr()));
        }
    }
}
