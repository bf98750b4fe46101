//! Chain following
//!
//! Polls a node for new blocks and hands them to the application over a
//! bounded channel. Each follower owns its cursor and lifecycle; there is
//! no process-wide follower state.

pub mod follower;

pub use follower::{BlockFollower, BlockSource, FollowerHandle};
