use gl::types::*;
use log::{error, warn};
use std::collections::HashMap;

use crate::gl_api::buffer::{UsageType, VertexBuffer};
use crate::gl_api::context::{Gl, ProgramId};
use crate::gl_api::shader::shader::{CompiledShader, Shader, ShaderType};
use crate::gl_api::shader::ShaderError;
use crate::gl_api::uniform::{self, UniformError, UniformInfo, UniformType, UniformValue};

/// The only vertex attribute a quad program reads.
pub const POSITION_ATTRIBUTE: &str = "position";

/// Two clip-space triangles covering the whole viewport.
pub const QUAD_VERTICES: [[f32; 2]; 6] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [-1.0, 1.0],
    [-1.0, 1.0],
    [1.0, -1.0],
    [1.0, 1.0],
];

pub const QUAD_VERTEX_COUNT: GLsizei = QUAD_VERTICES.len() as GLsizei;

#[derive(Debug)]
struct RawProgram {
    gl: Gl,
    id: ProgramId,
}

impl RawProgram {
    fn new(gl: &Gl) -> Option<Self> {
        let id = gl.create_program();
        if id.is_none() {
            None
        } else {
            Some(RawProgram { gl: gl.clone(), id })
        }
    }

    fn attach_shader(&self, shader: &CompiledShader) {
        self.gl.attach_shader(self.id, shader.id());
    }

    fn link(&self, name: &str) -> Result<(), ShaderError> {
        self.gl.link_program(self.id);
        if self.gl.program_link_status(self.id) {
            Ok(())
        } else {
            Err(ShaderError::Link {
                name: name.to_owned(),
                log: self.gl.program_info_log(self.id),
            })
        }
    }
}

impl Drop for RawProgram {
    fn drop(&mut self) {
        self.gl.delete_program(self.id);
    }
}

/// Everything introspection produced. Only exists once a build succeeded.
#[derive(Debug)]
struct Linked {
    quad: VertexBuffer<[f32; 2]>,
    position: GLuint,
    uniforms: HashMap<String, UniformInfo>,
}

/// A vertex/fragment pair drawn over a full-screen quad.
///
/// Nothing touches GL until [`ShaderProgram::ensure_compile`]. A failed build
/// is logged and leaves the program unusable until a later `ensure_compile`
/// gets through.
#[derive(Debug)]
pub struct ShaderProgram {
    gl: Gl,
    name: String,
    vertex_source: String,
    fragment_source: String,
    program: Option<RawProgram>,
    linked: Option<Linked>,
}

impl ShaderProgram {
    pub fn new<N, V, F>(gl: &Gl, name: N, vertex_source: V, fragment_source: F) -> Self
    where
        N: Into<String>,
        V: Into<String>,
        F: Into<String>,
    {
        ShaderProgram {
            gl: gl.clone(),
            name: name.into(),
            vertex_source: vertex_source.into(),
            fragment_source: fragment_source.into(),
            program: None,
            linked: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True once the quad buffer and the uniform table both exist.
    pub fn is_ready(&self) -> bool {
        self.linked.is_some()
    }

    /// Builds the program unless it is already ready; returns whether it is
    /// usable. Once ready, this does no GL work at all.
    ///
    /// A vertex stage without a `position` attribute fails the build like a
    /// compile or link error would: the quad has nowhere to go, so the
    /// program never becomes ready.
    pub fn ensure_compile(&mut self) -> bool {
        if !self.is_ready() {
            if let Err(err) = self.make_program() {
                error!("{}", err);
            }
        }
        self.is_ready()
    }

    /// A single build attempt: compile both stages, link, introspect, upload
    /// the quad. The program only becomes ready if every step succeeds.
    fn make_program(&mut self) -> Result<(), ShaderError> {
        let vertex = self.compile_stage(ShaderType::Vertex, &self.vertex_source)?;
        let fragment = self.compile_stage(ShaderType::Fragment, &self.fragment_source)?;

        let program = RawProgram::new(&self.gl).ok_or_else(|| ShaderError::ObjectCreation {
            name: self.name.clone(),
        })?;
        program.attach_shader(&vertex);
        program.attach_shader(&fragment);
        // Kept even if linking fails so its info log stays queryable; it is
        // deleted with `self` or replaced by the next attempt.
        let program = &*self.program.insert(program);
        program.link(&self.name)?;

        let gl = &self.gl;
        gl.use_program(program.id);

        let uniforms = (0..gl.active_uniform_count(program.id))
            .map(|index| gl.active_uniform(program.id, index))
            .filter_map(|active| {
                let location = gl.uniform_location(program.id, &active.name)?;
                let ty = UniformType::from_gl(active.type_code);
                Some((active.name, UniformInfo { ty, location }))
            })
            .collect();

        let position = gl.attrib_location(program.id, POSITION_ATTRIBUTE).ok_or_else(|| {
            ShaderError::MissingAttribute {
                name: self.name.clone(),
                attribute: POSITION_ATTRIBUTE.to_owned(),
            }
        })?;

        let mut quad = VertexBuffer::new(gl);
        quad.upload(&QUAD_VERTICES, UsageType::StaticDraw);

        self.linked = Some(Linked { quad, position, uniforms });
        Ok(())
    }

    fn compile_stage(&self, ty: ShaderType, source: &str) -> Result<CompiledShader, ShaderError> {
        let shader = Shader::new(&self.gl, ty).ok_or_else(|| ShaderError::ObjectCreation {
            name: self.name.clone(),
        })?;
        shader.source_from_str(source);
        shader.compile(&self.name)
    }

    /// Makes the program current and points the `position` attribute at the
    /// quad. Logs and does nothing if the program never built.
    pub fn bind(&self) {
        let (program, linked) = match (&self.program, &self.linked) {
            (Some(program), Some(linked)) if self.gl.is_program(program.id) => (program, linked),
            _ => {
                error!("Shader '{}': not a program!", self.name);
                return;
            }
        };
        self.gl.use_program(program.id);
        linked.quad.bind();
        self.gl.enable_vertex_attrib_array(linked.position);
        self.gl.vertex_attrib_pointer_f32(linked.position, 2, 0, 0);
    }

    /// Draws the quad. Call after [`ShaderProgram::bind`].
    pub fn draw(&self) {
        if !self.is_ready() {
            error!("Shader '{}': nothing to draw, program never built", self.name);
            return;
        }
        self.gl.draw_arrays(gl::TRIANGLES, 0, QUAD_VERTEX_COUNT);
    }

    /// Runs `glValidateProgram` against the current GL state. Failures are
    /// logged with the full info log; they never change readiness.
    pub fn validate(&self) -> Result<(), ShaderError> {
        let program = match self.program {
            Some(ref program) => program,
            None => {
                let err = ShaderError::Validation {
                    name: self.name.clone(),
                    log: "not a program".to_owned(),
                };
                error!("{}", err);
                return Err(err);
            }
        };
        self.gl.validate_program(program.id);
        if self.gl.program_validate_status(program.id) {
            Ok(())
        } else {
            let err = ShaderError::Validation {
                name: self.name.clone(),
                log: self.gl.program_info_log(program.id),
            };
            error!("{}", err);
            Err(err)
        }
    }

    pub fn uniform_type(&self, name: &str) -> Option<UniformType> {
        self.uniform_info(name).map(|info| info.ty)
    }

    pub fn uniform_info(&self, name: &str) -> Option<UniformInfo> {
        self.linked.as_ref()?.uniforms.get(name).copied()
    }

    /// Every active uniform with its declared type.
    pub fn uniform_types(&self) -> impl Iterator<Item = (&str, UniformType)> + '_ {
        self.linked
            .iter()
            .flat_map(|linked| linked.uniforms.iter())
            .map(|(name, info)| (name.as_str(), info.ty))
    }

    /// Uploads `value` to the uniform `name`, checking it against the type
    /// the program declared. The program must be bound.
    pub fn try_set_uniform<V>(&self, name: &str, value: V) -> Result<(), UniformError>
    where
        V: Into<UniformValue>,
    {
        let info = self
            .uniform_info(name)
            .ok_or_else(|| UniformError::UnknownUniform { name: name.to_owned() })?;
        uniform::upload(&*self.gl, name, info, value.into())
    }

    /// Like [`ShaderProgram::try_set_uniform`], but a value that doesn't fit
    /// the declared type is a bug in the caller and panics. Uniforms the
    /// program doesn't have (e.g. optimized out by the driver) are skipped.
    ///
    /// # Panics
    ///
    /// On a type/value combination that has no upload path.
    pub fn set_uniform<V: Into<UniformValue>>(&self, name: &str, value: V) {
        match self.try_set_uniform(name, value) {
            Ok(()) => {}
            Err(UniformError::UnknownUniform { .. }) => {
                warn!("Shader '{}': no active uniform named '{}'", self.name, name);
            }
            Err(err) => panic!("Shader '{}': {}", self.name, err),
        }
    }
}
