/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures (data.rs)
/// - Instruction templates sent to the model (instruction.rs)
/// - The editing session state machine (session.rs)

pub mod data;
pub mod instruction;
pub mod session;
