//! Filesystem locations used by distbump.

pub mod paths;
