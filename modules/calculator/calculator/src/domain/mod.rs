//! Domain layer for calculator module
//!
//! Contains the arithmetic behind every RPC shape and the per-call
//! aggregation state.

pub mod aggregate;
pub mod last_replies;
pub mod reply_set;
pub mod service;

pub use aggregate::RunningAggregate;
pub use last_replies::LastReplies;
pub use reply_set::ReplySet;
pub use service::Service;
