mod distribution;
pub(crate) mod num_ext;

pub(crate) use distribution::*;
