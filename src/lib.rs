//! Ice hockey scoresheet: event logging, clock conversion, game summaries and storage backends.

pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod services;
pub mod state;
