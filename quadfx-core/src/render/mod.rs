pub(crate) mod cancel;
pub(crate) mod coordinator;
pub(crate) mod renderer;
