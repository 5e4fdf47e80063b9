//! A program that holds SOL or SPL tokens until a unix timestamp, then
//! releases them to a single designated recipient
#![deny(missing_docs)]
#![forbid(unsafe_code)]

pub mod constants;
pub mod custody;
pub mod entrypoint;
pub mod error;
pub mod events;
pub mod instruction;
mod pack_utils;
pub mod pda;
pub mod processor;
pub mod state;
mod validation_utils;

solana_program::declare_id!("TLock4t3Dv8sYJqWmkF7nZbEwQ5cGxP2hRaVuN9LsHe");
