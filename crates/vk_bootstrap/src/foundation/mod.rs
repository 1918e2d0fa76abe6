//! Foundation utilities shared by the bootstrap modules

pub mod logging;
