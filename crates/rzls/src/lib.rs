//! The `rzls` command line and the long-lived service object behind it.

mod args;
pub mod catalog;
pub mod cli;
mod commands;
mod exit;
pub mod logging;
mod services;

pub use exit::Exit;
pub use services::LanguageServices;
