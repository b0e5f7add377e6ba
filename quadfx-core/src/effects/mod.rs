pub(crate) mod kernels;
pub(crate) mod noise;
pub(crate) mod ops;
pub(crate) mod variants;
pub(crate) mod work;
