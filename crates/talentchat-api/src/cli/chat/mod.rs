//! Interactive terminal chat for Talentchat.
//!
//! Collects the visitor's name and email, then runs the question loop with
//! a thinking spinner, markdown-rendered replies and slash commands.
//! Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod intake;
pub mod loop_runner;
pub mod renderer;
