use thiserror::Error;

pub mod program;
pub mod shader;

use self::shader::ShaderType;

/// Everything that can go wrong while building or checking a program. None of
/// these are fatal: they are logged, and the program stays unusable until a
/// later build attempt gets through.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ShaderError {
    #[error("Shader '{name}' failed to compile {stage} stage: {log}")]
    Compile {
        stage: ShaderType,
        name: String,
        log: String,
    },

    #[error("Shader '{name}': Linking failed {log}")]
    Link { name: String, log: String },

    #[error("Shader '{name}': Validation failed {log}")]
    Validation { name: String, log: String },

    #[error("Shader '{name}': no active vertex attribute named '{attribute}'")]
    MissingAttribute { name: String, attribute: String },

    #[error("Shader '{name}': could not create a GL object")]
    ObjectCreation { name: String },
}
