//! Command-line front end for the HardenedBSD PaX feature attributes.

pub mod args;
pub mod commands;
pub mod report;
pub mod settings;
