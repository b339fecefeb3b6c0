use bytemuck::Pod;
use gl::types::*;
use std::marker::PhantomData;

use crate::gl_api::context::{BufferId, Gl};

mod sealed {
    pub trait Sealed {}
}

pub trait BufferTarget: sealed::Sealed {
    const TARGET: GLenum;
}

macro_rules! buffer_target {
    ($name:ident : $enum:expr) => {
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
        pub struct $name;
        impl sealed::Sealed for $name {}
        impl BufferTarget for $name {
            const TARGET: GLenum = $enum;
        }
    };
}

buffer_target!(Array: gl::ARRAY_BUFFER);

/// How often a buffer's contents are expected to change. Only a hint to the
/// driver; any usage works with any access pattern.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u32)]
pub enum UsageType {
    /// Written once, drawn a handful of times.
    StreamDraw = gl::STREAM_DRAW,
    /// Written once, drawn every frame. The quad lives here.
    StaticDraw = gl::STATIC_DRAW,
    /// Rewritten often, drawn often.
    DynamicDraw = gl::DYNAMIC_DRAW,
}

#[derive(Debug)]
pub struct Buffer<T, B: BufferTarget> {
    gl: Gl,
    id: BufferId,
    length: usize,
    _phantom: PhantomData<(*mut T, B)>,
}

impl<T: Pod, B: BufferTarget> Buffer<T, B> {
    pub fn new(gl: &Gl) -> Self {
        Buffer {
            gl: gl.clone(),
            id: gl.gen_buffer(),
            length: 0,
            _phantom: PhantomData,
        }
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn bind(&self) {
        self.gl.bind_buffer(B::TARGET, self.id);
    }

    /// Copies data from `data` to the gpu's memory. Leaves the buffer bound.
    pub fn upload(&mut self, data: &[T], usage_type: UsageType) {
        self.bind();
        self.length = data.len();
        self.gl.buffer_data(B::TARGET, bytemuck::cast_slice(data), usage_type as GLenum);
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

impl<T, B: BufferTarget> Drop for Buffer<T, B> {
    fn drop(&mut self) {
        self.gl.delete_buffer(self.id);
    }
}

pub type VertexBuffer<T> = Buffer<T, Array>;
