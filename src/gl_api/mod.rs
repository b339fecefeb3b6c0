#[macro_use]
pub mod error;

pub mod buffer;
pub mod context;
pub mod framebuffer;
pub mod native;
pub mod shader;
pub mod texture;
pub mod uniform;

mod state;

#[cfg(test)]
mod fake;
