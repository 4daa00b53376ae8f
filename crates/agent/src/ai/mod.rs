//! Claude-powered conversational layer over the clinical data tools

pub mod chatbot;
pub mod client;

pub use client::{AgentError, ClaudeClient};
