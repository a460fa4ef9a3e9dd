//! Core session models shared by the store, the synchronizer and the view layer.

pub mod action;
pub mod session;

pub use action::*;
pub use session::*;
