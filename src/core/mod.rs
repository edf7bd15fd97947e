//! Pure building blocks shared by every platform: protocol constants,
//! unit formatting, network names, user notices.

pub mod chains;
pub mod notice;
pub mod rpc;
pub mod units;
pub mod widget;
