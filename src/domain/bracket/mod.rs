//! Bracket generation and progression.
//!
//! A bracket is a binary tree stored in heap layout (index 0 is the final).
//! Generation sizes the tree to the next power of two, places seeds so the
//! top seeds meet as late as possible, and grants byes to the lowest seed
//! numbers. Progression propagates winners toward the root as matches reach
//! a decided state.

mod engine;
mod errors;
pub mod events;
mod node;
mod seeding;

pub use engine::{AdvanceOutcome, BracketEngine};
pub use errors::BracketError;
pub use node::{Bracket, BracketNode, NodeIndex};
pub use seeding::{seed_order, SeedEntry, SeedingPolicy};
