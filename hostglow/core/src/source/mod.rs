//! Status Sources
//!
//! Where host health comes from. The poller only sees the
//! [`StatusSource`] trait; the CheckMK REST client is the production
//! implementation.

mod checkmk;
mod traits;

pub use checkmk::{CheckmkConfig, CheckmkSource};
pub use traits::StatusSource;
