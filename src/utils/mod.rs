//! Small helpers shared by the configurator and the build.

pub mod date;
pub mod minify;
