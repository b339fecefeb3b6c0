use cgmath::{Matrix2, Matrix3, Matrix4, Vector2, Vector3, Vector4};
use gl::types::*;
use thiserror::Error;

use crate::gl_api::context::GlContext;

pub type UniformLocation = GLint;

/// The declared type of an active uniform, as reported by
/// `glGetActiveUniform`. Only the types that can be uploaded get a name.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum UniformType {
    Int,
    Float,
    Bool,
    FloatVec2,
    FloatVec3,
    FloatVec4,
    FloatMat2,
    FloatMat3,
    FloatMat4,
    IntVec2,
    IntVec3,
    IntVec4,
    BoolVec2,
    BoolVec3,
    BoolVec4,
    Sampler2D,
    SamplerCube,
    Other(GLenum),
}

impl UniformType {
    pub fn from_gl(code: GLenum) -> Self {
        match code {
            gl::INT => UniformType::Int,
            gl::FLOAT => UniformType::Float,
            gl::BOOL => UniformType::Bool,
            gl::FLOAT_VEC2 => UniformType::FloatVec2,
            gl::FLOAT_VEC3 => UniformType::FloatVec3,
            gl::FLOAT_VEC4 => UniformType::FloatVec4,
            gl::FLOAT_MAT2 => UniformType::FloatMat2,
            gl::FLOAT_MAT3 => UniformType::FloatMat3,
            gl::FLOAT_MAT4 => UniformType::FloatMat4,
            gl::INT_VEC2 => UniformType::IntVec2,
            gl::INT_VEC3 => UniformType::IntVec3,
            gl::INT_VEC4 => UniformType::IntVec4,
            gl::BOOL_VEC2 => UniformType::BoolVec2,
            gl::BOOL_VEC3 => UniformType::BoolVec3,
            gl::BOOL_VEC4 => UniformType::BoolVec4,
            gl::SAMPLER_2D => UniformType::Sampler2D,
            gl::SAMPLER_CUBE => UniformType::SamplerCube,
            other => UniformType::Other(other),
        }
    }

    pub fn to_gl(self) -> GLenum {
        match self {
            UniformType::Int => gl::INT,
            UniformType::Float => gl::FLOAT,
            UniformType::Bool => gl::BOOL,
            UniformType::FloatVec2 => gl::FLOAT_VEC2,
            UniformType::FloatVec3 => gl::FLOAT_VEC3,
            UniformType::FloatVec4 => gl::FLOAT_VEC4,
            UniformType::FloatMat2 => gl::FLOAT_MAT2,
            UniformType::FloatMat3 => gl::FLOAT_MAT3,
            UniformType::FloatMat4 => gl::FLOAT_MAT4,
            UniformType::IntVec2 => gl::INT_VEC2,
            UniformType::IntVec3 => gl::INT_VEC3,
            UniformType::IntVec4 => gl::INT_VEC4,
            UniformType::BoolVec2 => gl::BOOL_VEC2,
            UniformType::BoolVec3 => gl::BOOL_VEC3,
            UniformType::BoolVec4 => gl::BOOL_VEC4,
            UniformType::Sampler2D => gl::SAMPLER_2D,
            UniformType::SamplerCube => gl::SAMPLER_CUBE,
            UniformType::Other(code) => code,
        }
    }
}

/// What introspection found out about one uniform.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct UniformInfo {
    pub ty: UniformType,
    pub location: UniformLocation,
}

/// A value headed for a uniform. The variant says what the caller thinks the
/// uniform is; the program checks that against the declared type before
/// anything reaches GL.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec2(Vector2<f32>),
    Vec3(Vector3<f32>),
    Vec4(Vector4<f32>),
    Mat2(Matrix2<f32>),
    Mat3(Matrix3<f32>),
    Mat4(Matrix4<f32>),
    IVec2(Vector2<i32>),
    IVec3(Vector3<i32>),
    IVec4(Vector4<i32>),
    BVec2(Vector2<bool>),
    BVec3(Vector3<bool>),
    BVec4(Vector4<bool>),
}

impl UniformValue {
    pub fn kind(&self) -> &'static str {
        match *self {
            UniformValue::Int(_) => "int",
            UniformValue::Float(_) => "float",
            UniformValue::Vec2(_) => "vec2",
            UniformValue::Vec3(_) => "vec3",
            UniformValue::Vec4(_) => "vec4",
            UniformValue::Mat2(_) => "mat2",
            UniformValue::Mat3(_) => "mat3",
            UniformValue::Mat4(_) => "mat4",
            UniformValue::IVec2(_) => "ivec2",
            UniformValue::IVec3(_) => "ivec3",
            UniformValue::IVec4(_) => "ivec4",
            UniformValue::BVec2(_) => "bvec2",
            UniformValue::BVec3(_) => "bvec3",
            UniformValue::BVec4(_) => "bvec4",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum UniformError {
    #[error("Unsupported case: uniform '{name}' type: {type_code:#x} (got a {value} value)")]
    UnsupportedUniformType {
        name: String,
        type_code: GLenum,
        value: &'static str,
    },

    #[error("no active uniform named '{name}'")]
    UnknownUniform { name: String },
}

fn bools<const N: usize>(value: [bool; N]) -> [GLint; N] {
    let mut out = [0; N];
    for (slot, &b) in out.iter_mut().zip(value.iter()) {
        *slot = b as GLint;
    }
    out
}

/// Uploads `value` to the uniform described by `info`, dispatching on the
/// declared type. The program owning `info.location` must be current.
pub(crate) fn upload(
    gl: &dyn GlContext,
    name: &str,
    info: UniformInfo,
    value: UniformValue,
) -> Result<(), UniformError> {
    use self::UniformType as T;
    use self::UniformValue as V;

    let location = info.location;
    match (info.ty, value) {
        (T::Int, V::Int(v))
        | (T::Bool, V::Int(v))
        | (T::Sampler2D, V::Int(v))
        | (T::SamplerCube, V::Int(v)) => gl.uniform_1i(location, v),
        (T::Float, V::Float(v)) => gl.uniform_1f(location, v),

        (T::FloatVec2, V::Vec2(v)) => gl.uniform_2fv(location, &[v.x, v.y]),
        (T::FloatVec3, V::Vec3(v)) => gl.uniform_3fv(location, &[v.x, v.y, v.z]),
        (T::FloatVec4, V::Vec4(v)) => gl.uniform_4fv(location, &[v.x, v.y, v.z, v.w]),

        // cgmath matrices are column major, same as GL expects without a transpose.
        (T::FloatMat2, V::Mat2(m)) => gl.uniform_matrix_2fv(location, m.as_ref()),
        (T::FloatMat3, V::Mat3(m)) => gl.uniform_matrix_3fv(location, m.as_ref()),
        (T::FloatMat4, V::Mat4(m)) => gl.uniform_matrix_4fv(location, m.as_ref()),

        (T::IntVec2, V::IVec2(v)) | (T::BoolVec2, V::IVec2(v)) => {
            gl.uniform_2iv(location, &[v.x, v.y])
        }
        (T::IntVec3, V::IVec3(v)) | (T::BoolVec3, V::IVec3(v)) => {
            gl.uniform_3iv(location, &[v.x, v.y, v.z])
        }
        (T::IntVec4, V::IVec4(v)) | (T::BoolVec4, V::IVec4(v)) => {
            gl.uniform_4iv(location, &[v.x, v.y, v.z, v.w])
        }
        (T::BoolVec2, V::BVec2(v)) => gl.uniform_2iv(location, &bools([v.x, v.y])),
        (T::BoolVec3, V::BVec3(v)) => gl.uniform_3iv(location, &bools([v.x, v.y, v.z])),
        (T::BoolVec4, V::BVec4(v)) => gl.uniform_4iv(location, &bools([v.x, v.y, v.z, v.w])),

        (ty, value) => {
            return Err(UniformError::UnsupportedUniformType {
                name: name.to_owned(),
                type_code: ty.to_gl(),
                value: value.kind(),
            })
        }
    }
    Ok(())
}

// Macro cleanliness means that we can't use the binding in the macro invocation
// scope without first introducing it into scope there (slightly unfortunate)
macro_rules! uniform {
    ($v:ident, $type:ty => $variant:ident($expr:expr)) => (
        impl From<$type> for UniformValue {
            #[inline(always)]
            fn from($v: $type) -> Self {
                UniformValue::$variant($expr)
            }
        }
    )
}

uniform!(v, i32 => Int(v));
uniform!(v, f32 => Float(v));

uniform!(v, [f32; 2] => Vec2(Vector2::new(v[0], v[1])));
uniform!(v, [f32; 3] => Vec3(Vector3::new(v[0], v[1], v[2])));
uniform!(v, [f32; 4] => Vec4(Vector4::new(v[0], v[1], v[2], v[3])));
uniform!(v, (f32, f32) => Vec2(Vector2::new(v.0, v.1)));
uniform!(v, (f32, f32, f32) => Vec3(Vector3::new(v.0, v.1, v.2)));
uniform!(v, (f32, f32, f32, f32) => Vec4(Vector4::new(v.0, v.1, v.2, v.3)));
uniform!(v, Vector2<f32> => Vec2(v));
uniform!(v, Vector3<f32> => Vec3(v));
uniform!(v, Vector4<f32> => Vec4(v));

uniform!(v, [i32; 2] => IVec2(Vector2::new(v[0], v[1])));
uniform!(v, [i32; 3] => IVec3(Vector3::new(v[0], v[1], v[2])));
uniform!(v, [i32; 4] => IVec4(Vector4::new(v[0], v[1], v[2], v[3])));
uniform!(v, (i32, i32) => IVec2(Vector2::new(v.0, v.1)));
uniform!(v, (i32, i32, i32) => IVec3(Vector3::new(v.0, v.1, v.2)));
uniform!(v, (i32, i32, i32, i32) => IVec4(Vector4::new(v.0, v.1, v.2, v.3)));
uniform!(v, Vector2<i32> => IVec2(v));
uniform!(v, Vector3<i32> => IVec3(v));
uniform!(v, Vector4<i32> => IVec4(v));

uniform!(v, [bool; 2] => BVec2(Vector2 { x: v[0], y: v[1] }));
uniform!(v, [bool; 3] => BVec3(Vector3 { x: v[0], y: v[1], z: v[2] }));
uniform!(v, [bool; 4] => BVec4(Vector4 { x: v[0], y: v[1], z: v[2], w: v[3] }));
uniform!(v, Vector2<bool> => BVec2(v));
uniform!(v, Vector3<bool> => BVec3(v));
uniform!(v, Vector4<bool> => BVec4(v));

uniform!(v, Matrix2<f32> => Mat2(v));
uniform!(v, Matrix3<f32> => Mat3(v));
uniform!(v, Matrix4<f32> => Mat4(v));
uniform!(v, [[f32; 2]; 2] => Mat2(Matrix2::from(v)));
uniform!(v, [[f32; 3]; 3] => Mat3(Matrix3::from(v)));
uniform!(v, [[f32; 4]; 4] => Mat4(Matrix4::from(v)));
