//! caselinkctl - terminal control panel for the CaseLinker scan service

pub mod actions;
pub mod cli;
pub mod commands;
pub mod errors;
pub mod logging;
pub mod poller;
pub mod tui;
