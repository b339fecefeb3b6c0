use gl::types::GLenum;
use thiserror::Error;

pub type GlResult<T> = Result<T, GlError>;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Error)]
#[error("GL error {code:#06x}")]
pub struct GlError {
    code: GLenum,
}

impl GlError {
    fn get_raw() -> GLenum { unsafe { gl::GetError() } }

    pub fn code(&self) -> GLenum {
        self.code
    }

    /// Pulls the pending error flag off the current context.
    pub fn check() -> GlResult<()> {
        match Self::get_raw() {
            gl::NO_ERROR => Ok(()),
            // Every GL call after OUT_OF_MEMORY is undefined behavior.
            gl::OUT_OF_MEMORY => ::std::process::abort(),
            code => Err(GlError { code }),
        }
    }
}

/// Issues a raw GL call and reports any error it raised. Native calls never
/// interrupt control flow; the value the driver handed back is returned as-is.
macro_rules! gl_call {
    ($name:ident($($args:expr),*)) => {{
        let value = ::gl::$name($($args),*);
        if let Err(err) = $crate::gl_api::error::GlError::check() {
            ::log::error!("gl{} failed: {}", stringify!($name), err);
        }
        value
    }}
}
