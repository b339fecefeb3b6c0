use std::fmt;

use crate::gl_api::context::{Gl, ShaderId};
use crate::gl_api::shader::ShaderError;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u32)]
pub enum ShaderType {
    Vertex = gl::VERTEX_SHADER,
    Fragment = gl::FRAGMENT_SHADER,
}

impl fmt::Display for ShaderType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ShaderType::Vertex => write!(f, "vertex"),
            ShaderType::Fragment => write!(f, "fragment"),
        }
    }
}

/// A single shader stage object. The GL object is deleted on drop; GL keeps
/// it alive internally for as long as a program still has it attached.
#[derive(Debug)]
pub struct Shader {
    gl: Gl,
    id: ShaderId,
    pub shader_type: ShaderType,
}

impl Shader {
    pub fn new(gl: &Gl, shader_type: ShaderType) -> Option<Self> {
        let id = gl.create_shader(shader_type);
        if id.is_none() {
            None
        } else {
            Some(Shader { gl: gl.clone(), id, shader_type })
        }
    }

    pub fn id(&self) -> ShaderId {
        self.id
    }

    pub fn source_from_str(&self, source: &str) {
        self.gl.shader_source(self.id, source);
    }

    /// Compiles the stage. `name` only labels the error.
    pub fn compile(self, name: &str) -> Result<CompiledShader, ShaderError> {
        self.gl.compile_shader(self.id);
        if self.gl.shader_compile_status(self.id) {
            Ok(CompiledShader { shader: self })
        } else {
            Err(ShaderError::Compile {
                stage: self.shader_type,
                name: name.to_owned(),
                log: self.gl.shader_info_log(self.id),
            })
        }
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        self.gl.delete_shader(self.id);
    }
}

/// Proof that a stage compiled successfully.
#[derive(Debug)]
pub struct CompiledShader {
    pub(crate) shader: Shader,
}

impl CompiledShader {
    pub fn id(&self) -> ShaderId {
        self.shader.id()
    }
}
