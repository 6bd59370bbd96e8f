//! Internal implementation details

pub(crate) mod plugin_impl;
pub(crate) mod utils;
