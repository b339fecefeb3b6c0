//! In-memory stand-in for a GL context. Tracks just enough object and binding
//! state to exercise the wrappers, plus a log of every entry point hit.
//!
//! Also home to the test logger, which keeps every record emitted on the
//! current thread so tests can check what was reported.

use gl::types::*;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::cell::{RefCell, RefMut};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::sync::{Once, OnceLock};

use crate::gl_api::context::*;
use crate::gl_api::shader::shader::ShaderType;
use crate::gl_api::uniform::UniformLocation;

thread_local! {
    static CAPTURED: RefCell<Vec<(Level, String)>> = RefCell::new(Vec::new());
}

/// Records into `CAPTURED`, and prints through `env_logger` as usual.
struct CaptureLogger {
    inner: env_logger::Logger,
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        CAPTURED.with(|captured| {
            captured.borrow_mut().push((record.level(), record.args().to_string()));
        });
        self.inner.log(record);
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

static LOGGER: OnceLock<CaptureLogger> = OnceLock::new();

/// Installs the test logger (once per process) and forgets whatever this
/// thread logged so far.
pub fn capture_logs() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let logger = LOGGER.get_or_init(|| CaptureLogger {
            inner: env_logger::Builder::from_default_env().is_test(true).build(),
        });
        if log::set_logger(logger).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
    });
    CAPTURED.with(|captured| captured.borrow_mut().clear());
}

/// Messages this thread logged at exactly `level` since the last
/// [`capture_logs`].
pub fn logged(level: Level) -> Vec<String> {
    CAPTURED.with(|captured| {
        captured
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message.clone())
            .collect()
    })
}

/// A uniform upload, as GL would have seen it.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Uniform1i(GLint),
    Uniform1f(GLfloat),
    Uniform2f(Vec<GLfloat>),
    Uniform3f(Vec<GLfloat>),
    Uniform4f(Vec<GLfloat>),
    Uniform2i(Vec<GLint>),
    Uniform3i(Vec<GLint>),
    Uniform4i(Vec<GLint>),
    UniformMatrix2(Vec<GLfloat>),
    UniformMatrix3(Vec<GLfloat>),
    UniformMatrix4(Vec<GLfloat>),
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Bindings {
    pub framebuffer: FramebufferId,
    pub renderbuffer: RenderbufferId,
    pub texture: TextureId,
}

#[derive(Debug, Default)]
struct TextureState {
    size: (GLsizei, GLsizei),
    params: HashMap<GLenum, GLint>,
}

#[derive(Debug)]
struct ShaderState {
    source: String,
    compiled: bool,
}

#[derive(Debug, Default)]
struct ProgramState {
    attached: Vec<ShaderId>,
    linked: bool,
    info_log: String,
    uniforms: Vec<(String, GLenum)>,
    attributes: Vec<String>,
}

#[derive(Debug, Default)]
struct State {
    next_name: GLuint,
    calls: Vec<&'static str>,
    uploads: Vec<(UniformLocation, Call)>,
    bindings: Bindings,
    active_unit: GLuint,
    viewport: (GLint, GLint, GLsizei, GLsizei),
    array_buffer: BufferId,
    current_program: ProgramId,
    framebuffers: HashMap<FramebufferId, BTreeMap<GLuint, TextureId>>,
    textures: HashMap<TextureId, TextureState>,
    buffers: HashMap<BufferId, (Vec<u8>, Option<GLenum>)>,
    shaders: HashMap<ShaderId, ShaderState>,
    programs: HashMap<ProgramId, ProgramState>,
    attrib_pointers: HashMap<GLuint, (GLint, GLsizei, usize)>,
    enabled_attribs: Vec<GLuint>,
    validation_failure: Option<String>,
}

impl State {
    fn name(&mut self) -> GLuint {
        self.next_name += 1;
        self.next_name
    }
}

#[derive(Debug, Default)]
pub struct FakeGl {
    state: RefCell<State>,
}

/// Statements of a GLSL source, with `{`/`}` treated as separators too.
fn statements(source: &str) -> impl Iterator<Item = &str> {
    source.split(|c: char| c == ';' || c == '{' || c == '}').map(str::trim)
}

/// `(type, name)` of every declaration starting with `qualifier`.
fn declarations<'s>(
    source: &'s str,
    qualifier: &'s str,
) -> impl Iterator<Item = (&'s str, &'s str)> {
    statements(source).filter_map(move |statement| {
        let words: Vec<_> = statement.split_whitespace().collect();
        if words.len() >= 3 && words[0] == qualifier {
            Some((words[words.len() - 2], words[words.len() - 1]))
        } else {
            None
        }
    })
}

fn type_code(glsl: &str) -> Option<GLenum> {
    Some(match glsl {
        "float" => gl::FLOAT,
        "int" => gl::INT,
        "bool" => gl::BOOL,
        "vec2" => gl::FLOAT_VEC2,
        "vec3" => gl::FLOAT_VEC3,
        "vec4" => gl::FLOAT_VEC4,
        "ivec2" => gl::INT_VEC2,
        "ivec3" => gl::INT_VEC3,
        "ivec4" => gl::INT_VEC4,
        "bvec2" => gl::BOOL_VEC2,
        "bvec3" => gl::BOOL_VEC3,
        "bvec4" => gl::BOOL_VEC4,
        "mat2" => gl::FLOAT_MAT2,
        "mat3" => gl::FLOAT_MAT3,
        "mat4" => gl::FLOAT_MAT4,
        "double" => gl::DOUBLE,
        "sampler2D" => gl::SAMPLER_2D,
        "samplerCube" => gl::SAMPLER_CUBE,
        _ => return None,
    })
}

impl FakeGl {
    pub const MAX_SIZE: GLint = 4096;
    pub const COMPILE_ERROR_LOG: &'static str = "ERROR: 0:1: '#error' : user-defined error";

    pub fn new() -> Self {
        FakeGl::default()
    }

    /// The fake plus the same context as the crate sees it.
    pub fn shared() -> (Rc<FakeGl>, Gl) {
        let fake = Rc::new(FakeGl::new());
        let gl: Gl = fake.clone();
        (fake, gl)
    }

    fn record(&self, call: &'static str) -> RefMut<'_, State> {
        let mut state = self.state.borrow_mut();
        state.calls.push(call);
        state
    }

    fn upload(&self, call: &'static str, location: UniformLocation, upload: Call) {
        self.record(call).uploads.push((location, upload));
    }

    pub fn count(&self, call: &str) -> usize {
        self.state.borrow().calls.iter().filter(|&&c| c == call).count()
    }

    pub fn total_calls(&self) -> usize {
        self.state.borrow().calls.len()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn uploads(&self) -> Vec<(UniformLocation, Call)> {
        self.state.borrow().uploads.clone()
    }

    pub fn bindings(&self) -> Bindings {
        self.state.borrow().bindings
    }

    pub fn active_texture_unit(&self) -> GLuint {
        self.state.borrow().active_unit
    }

    pub fn viewport_rect(&self) -> (GLint, GLint, GLsizei, GLsizei) {
        self.state.borrow().viewport
    }

    pub fn array_buffer_binding(&self) -> BufferId {
        self.state.borrow().array_buffer
    }

    pub fn current_program(&self) -> ProgramId {
        self.state.borrow().current_program
    }

    pub fn texture_size(&self, id: TextureId) -> Option<(GLsizei, GLsizei)> {
        self.state.borrow().textures.get(&id).map(|t| t.size)
    }

    pub fn tex_parameter(&self, id: TextureId, pname: GLenum) -> Option<GLint> {
        self.state.borrow().textures.get(&id)?.params.get(&pname).copied()
    }

    pub fn attachments(&self, id: FramebufferId) -> Vec<(GLuint, TextureId)> {
        self.state
            .borrow()
            .framebuffers
            .get(&id)
            .map(|attached| attached.iter().map(|(&i, &t)| (i, t)).collect())
            .unwrap_or_default()
    }

    pub fn framebuffer_exists(&self, id: FramebufferId) -> bool {
        self.state.borrow().framebuffers.contains_key(&id)
    }

    pub fn buffer_exists(&self, id: BufferId) -> bool {
        self.state.borrow().buffers.contains_key(&id)
    }

    pub fn buffer_floats(&self, id: BufferId) -> Vec<f32> {
        let state = self.state.borrow();
        let bytes = state.buffers.get(&id).map(|b| b.0.as_slice()).unwrap_or(&[]);
        bytes
            .chunks_exact(4)
            .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    pub fn buffer_usage(&self, id: BufferId) -> Option<GLenum> {
        self.state.borrow().buffers.get(&id)?.1
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn program_exists(&self, id: ProgramId) -> bool {
        self.state.borrow().programs.contains_key(&id)
    }

    /// `(components, stride, offset)` of an enabled attribute.
    pub fn attrib_pointer(&self, location: GLuint) -> Option<(GLint, GLsizei, usize)> {
        let state = self.state.borrow();
        if state.enabled_attribs.contains(&location) {
            state.attrib_pointers.get(&location).copied()
        } else {
            None
        }
    }

    /// Makes every later `glValidateProgram` fail with `log`.
    pub fn fail_validation(&self, log: &str) {
        self.state.borrow_mut().validation_failure = Some(log.to_owned());
    }

    fn bound_framebuffer_status(state: &State) -> GLenum {
        let framebuffer = state.bindings.framebuffer;
        if framebuffer.is_none() {
            return gl::FRAMEBUFFER_COMPLETE;
        }
        let attached = match state.framebuffers.get(&framebuffer) {
            Some(attached) if !attached.is_empty() => attached,
            _ => return gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT,
        };
        let mut sizes = Vec::new();
        for texture in attached.values() {
            match state.textures.get(texture) {
                Some(t) if t.size.0 > 0 && t.size.1 > 0 => sizes.push(t.size),
                _ => return gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT,
            }
        }
        if sizes.windows(2).any(|pair| pair[0] != pair[1]) {
            return 0x8CD9;
        }
        gl::FRAMEBUFFER_COMPLETE
    }
}

impl GlContext for FakeGl {
    fn framebuffer_binding(&self) -> FramebufferId {
        self.record("framebuffer_binding").bindings.framebuffer
    }

    fn renderbuffer_binding(&self) -> RenderbufferId {
        self.record("renderbuffer_binding").bindings.renderbuffer
    }

    fn texture_binding_2d(&self) -> TextureId {
        self.record("texture_binding_2d").bindings.texture
    }

    fn max_renderbuffer_size(&self) -> GLint {
        self.record("max_renderbuffer_size");
        FakeGl::MAX_SIZE
    }

    fn gen_framebuffer(&self) -> FramebufferId {
        let mut state = self.record("gen_framebuffer");
        let id = FramebufferId::from_raw(state.name());
        state.framebuffers.insert(id, BTreeMap::new());
        id
    }

    fn delete_framebuffer(&self, id: FramebufferId) {
        let mut state = self.record("delete_framebuffer");
        state.framebuffers.remove(&id);
        if state.bindings.framebuffer == id {
            state.bindings.framebuffer = FramebufferId::NONE;
        }
    }

    fn bind_framebuffer(&self, id: FramebufferId) {
        self.record("bind_framebuffer").bindings.framebuffer = id;
    }

    fn framebuffer_color_texture(&self, index: GLuint, texture: TextureId) {
        let mut state = self.record("framebuffer_color_texture");
        let bound = state.bindings.framebuffer;
        if let Some(attached) = state.framebuffers.get_mut(&bound) {
            attached.insert(index, texture);
        }
    }

    fn check_framebuffer_status(&self) -> GLenum {
        let state = self.record("check_framebuffer_status");
        FakeGl::bound_framebuffer_status(&state)
    }

    fn bind_renderbuffer(&self, id: RenderbufferId) {
        self.record("bind_renderbuffer").bindings.renderbuffer = id;
    }

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        self.record("viewport").viewport = (x, y, width, height);
    }

    fn gen_texture(&self) -> TextureId {
        let mut state = self.record("gen_texture");
        let id = TextureId::from_raw(state.name());
        state.textures.insert(id, TextureState::default());
        id
    }

    fn delete_texture(&self, id: TextureId) {
        let mut state = self.record("delete_texture");
        state.textures.remove(&id);
        if state.bindings.texture == id {
            state.bindings.texture = TextureId::NONE;
        }
    }

    fn active_texture(&self, unit: GLuint) {
        self.record("active_texture").active_unit = unit;
    }

    fn bind_texture_2d(&self, id: TextureId) {
        self.record("bind_texture_2d").bindings.texture = id;
    }

    fn tex_parameter_2d(&self, pname: GLenum, param: GLint) {
        let mut state = self.record("tex_parameter_2d");
        let bound = state.bindings.texture;
        if let Some(texture) = state.textures.get_mut(&bound) {
            texture.params.insert(pname, param);
        }
    }

    fn tex_storage_rgba_2d(&self, width: GLsizei, height: GLsizei) {
        let mut state = self.record("tex_storage_rgba_2d");
        let bound = state.bindings.texture;
        if let Some(texture) = state.textures.get_mut(&bound) {
            texture.size = (width, height);
        }
    }

    fn gen_buffer(&self) -> BufferId {
        let mut state = self.record("gen_buffer");
        let id = BufferId::from_raw(state.name());
        state.buffers.insert(id, (Vec::new(), None));
        id
    }

    fn delete_buffer(&self, id: BufferId) {
        let mut state = self.record("delete_buffer");
        state.buffers.remove(&id);
        if state.array_buffer == id {
            state.array_buffer = BufferId::NONE;
        }
    }

    fn bind_buffer(&self, target: GLenum, id: BufferId) {
        let mut state = self.record("bind_buffer");
        if target == gl::ARRAY_BUFFER {
            state.array_buffer = id;
        }
    }

    fn buffer_data(&self, target: GLenum, data: &[u8], usage: GLenum) {
        let mut state = self.record("buffer_data");
        let bound = if target == gl::ARRAY_BUFFER { state.array_buffer } else { BufferId::NONE };
        if let Some(buffer) = state.buffers.get_mut(&bound) {
            *buffer = (data.to_vec(), Some(usage));
        }
    }

    fn create_shader(&self, _ty: ShaderType) -> ShaderId {
        let mut state = self.record("create_shader");
        let id = ShaderId::from_raw(state.name());
        state.shaders.insert(id, ShaderState { source: String::new(), compiled: false });
        id
    }

    fn delete_shader(&self, id: ShaderId) {
        self.record("delete_shader").shaders.remove(&id);
    }

    fn shader_source(&self, id: ShaderId, source: &str) {
        if let Some(shader) = self.record("shader_source").shaders.get_mut(&id) {
            shader.source = source.to_owned();
        }
    }

    fn compile_shader(&self, id: ShaderId) {
        if let Some(shader) = self.record("compile_shader").shaders.get_mut(&id) {
            shader.compiled = !shader.source.contains("#error");
        }
    }

    fn shader_compile_status(&self, id: ShaderId) -> bool {
        self.record("shader_compile_status").shaders.get(&id).map_or(false, |s| s.compiled)
    }

    fn shader_info_log(&self, id: ShaderId) -> String {
        match self.record("shader_info_log").shaders.get(&id) {
            Some(shader) if !shader.compiled => FakeGl::COMPILE_ERROR_LOG.to_owned(),
            _ => String::new(),
        }
    }

    fn create_program(&self) -> ProgramId {
        let mut state = self.record("create_program");
        let id = ProgramId::from_raw(state.name());
        state.programs.insert(id, ProgramState::default());
        id
    }

    fn delete_program(&self, id: ProgramId) {
        let mut state = self.record("delete_program");
        state.programs.remove(&id);
        if state.current_program == id {
            state.current_program = ProgramId::NONE;
        }
    }

    fn is_program(&self, id: ProgramId) -> bool {
        self.record("is_program").programs.contains_key(&id)
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        if let Some(program) = self.record("attach_shader").programs.get_mut(&program) {
            program.attached.push(shader);
        }
    }

    /// Links like a GLES2 driver would, as far as the fake can tell: every
    /// varying the fragment stage reads must be declared by the vertex stage.
    fn link_program(&self, id: ProgramId) {
        let mut state = self.record("link_program");
        let state = &mut *state;
        let program = match state.programs.get_mut(&id) {
            Some(program) => program,
            None => return,
        };

        let sources: Vec<&str> = program
            .attached
            .iter()
            .filter_map(|shader| state.shaders.get(shader))
            .filter(|shader| shader.compiled)
            .map(|shader| shader.source.as_str())
            .collect();
        let (vertex, fragment) = match sources.as_slice() {
            [vertex, fragment] => (*vertex, *fragment),
            _ => {
                program.linked = false;
                program.info_log =
                    "error: program needs a compiled vertex and fragment stage".to_owned();
                return;
            }
        };

        let written: Vec<_> = declarations(vertex, "varying").map(|(_, name)| name).collect();
        let unwritten = declarations(fragment, "varying").find(|(_, name)| !written.contains(name));
        if let Some((_, missing)) = unwritten {
            program.linked = false;
            program.info_log =
                format!("error: varying `{}` is not written by the vertex shader", missing);
            return;
        }

        let mut uniforms: Vec<(String, GLenum)> = Vec::new();
        for (ty, name) in declarations(vertex, "uniform").chain(declarations(fragment, "uniform")) {
            if let Some(code) = type_code(ty) {
                if !uniforms.iter().any(|(seen, _)| seen == name) {
                    uniforms.push((name.to_owned(), code));
                }
            }
        }

        program.attributes = declarations(vertex, "attribute")
            .map(|(_, name)| name.to_owned())
            .collect();
        program.uniforms = uniforms;
        program.linked = true;
        program.info_log.clear();
    }

    fn program_link_status(&self, id: ProgramId) -> bool {
        self.record("program_link_status").programs.get(&id).map_or(false, |p| p.linked)
    }

    fn validate_program(&self, id: ProgramId) {
        let mut state = self.record("validate_program");
        let failure = state.validation_failure.clone();
        if let Some(program) = state.programs.get_mut(&id) {
            program.info_log = failure.unwrap_or_default();
        }
    }

    fn program_validate_status(&self, id: ProgramId) -> bool {
        let state = self.record("program_validate_status");
        state.validation_failure.is_none() && state.programs.get(&id).map_or(false, |p| p.linked)
    }

    fn program_info_log(&self, id: ProgramId) -> String {
        self.record("program_info_log")
            .programs
            .get(&id)
            .map(|p| p.info_log.clone())
            .unwrap_or_default()
    }

    fn use_program(&self, id: ProgramId) {
        self.record("use_program").current_program = id;
    }

    fn active_uniform_count(&self, id: ProgramId) -> GLuint {
        self.record("active_uniform_count")
            .programs
            .get(&id)
            .map_or(0, |p| p.uniforms.len() as GLuint)
    }

    fn active_uniform(&self, id: ProgramId, index: GLuint) -> ActiveUniform {
        let state = self.record("active_uniform");
        let (name, type_code) = state.programs[&id].uniforms[index as usize].clone();
        ActiveUniform { name, type_code, size: 1 }
    }

    fn uniform_location(&self, id: ProgramId, name: &str) -> Option<UniformLocation> {
        let state = self.record("uniform_location");
        let program = state.programs.get(&id).filter(|p| p.linked)?;
        program.uniforms.iter().position(|(n, _)| n == name).map(|i| i as UniformLocation)
    }

    fn attrib_location(&self, id: ProgramId, name: &str) -> Option<GLuint> {
        let state = self.record("attrib_location");
        let program = state.programs.get(&id).filter(|p| p.linked)?;
        program.attributes.iter().position(|n| n == name).map(|i| i as GLuint)
    }

    fn enable_vertex_attrib_array(&self, location: GLuint) {
        self.record("enable_vertex_attrib_array").enabled_attribs.push(location);
    }

    fn vertex_attrib_pointer_f32(
        &self,
        location: GLuint,
        components: GLint,
        stride: GLsizei,
        offset: usize,
    ) {
        self.record("vertex_attrib_pointer_f32")
            .attrib_pointers
            .insert(location, (components, stride, offset));
    }

    fn draw_arrays(&self, _mode: GLenum, _first: GLint, _count: GLsizei) {
        self.record("draw_arrays");
    }

    fn uniform_1i(&self, location: UniformLocation, value: GLint) {
        self.upload("uniform_1i", location, Call::Uniform1i(value));
    }

    fn uniform_1f(&self, location: UniformLocation, value: GLfloat) {
        self.upload("uniform_1f", location, Call::Uniform1f(value));
    }

    fn uniform_2fv(&self, location: UniformLocation, value: &[GLfloat; 2]) {
        self.upload("uniform_2fv", location, Call::Uniform2f(value.to_vec()));
    }

    fn uniform_3fv(&self, location: UniformLocation, value: &[GLfloat; 3]) {
        self.upload("uniform_3fv", location, Call::Uniform3f(value.to_vec()));
    }

    fn uniform_4fv(&self, location: UniformLocation, value: &[GLfloat; 4]) {
        self.upload("uniform_4fv", location, Call::Uniform4f(value.to_vec()));
    }

    fn uniform_2iv(&self, location: UniformLocation, value: &[GLint; 2]) {
        self.upload("uniform_2iv", location, Call::Uniform2i(value.to_vec()));
    }

    fn uniform_3iv(&self, location: UniformLocation, value: &[GLint; 3]) {
        self.upload("uniform_3iv", location, Call::Uniform3i(value.to_vec()));
    }

    fn uniform_4iv(&self, location: UniformLocation, value: &[GLint; 4]) {
        self.upload("uniform_4iv", location, Call::Uniform4i(value.to_vec()));
    }

    fn uniform_matrix_2fv(&self, location: UniformLocation, value: &[GLfloat; 4]) {
        self.upload("uniform_matrix_2fv", location, Call::UniformMatrix2(value.to_vec()));
    }

    fn uniform_matrix_3fv(&self, location: UniformLocation, value: &[GLfloat; 9]) {
        self.upload("uniform_matrix_3fv", location, Call::UniformMatrix3(value.to_vec()));
    }

    fn uniform_matrix_4fv(&self, location: UniformLocation, value: &[GLfloat; 16]) {
        self.upload("uniform_matrix_4fv", location, Call::UniformMatrix4(value.to_vec()));
    }
}
