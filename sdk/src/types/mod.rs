//! Core types for the Drip SDK.
//!
//! # Components
//!
//! - [`primitives`]: Address, TxHash, TokenKind wrappers
//! - [`payment`]: ScheduledPaymentSnapshot, ExecuteCall, Receipt
//! - [`event`]: RawEvent, RawEventKind

pub mod event;
pub mod payment;
pub mod primitives;

pub use event::{RawEvent, RawEventKind};
pub use payment::{ExecuteCall, Receipt, ScheduledPaymentSnapshot};
pub use primitives::{Address, TokenKind, TxHash};
