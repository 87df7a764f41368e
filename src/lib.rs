pub mod ai;
pub mod checks;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod github;
pub mod handlers;
pub mod server;
pub mod spam;
pub mod template;
pub mod util;

#[cfg(test)]
pub(crate) mod testing;
