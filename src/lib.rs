pub mod cli;
pub mod error;
pub mod formatter;
pub mod languages;
pub mod vcs;
