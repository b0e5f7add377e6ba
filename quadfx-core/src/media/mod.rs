pub(crate) mod container;
pub(crate) mod ffmpeg;
pub(crate) mod memory;
pub(crate) mod store;
