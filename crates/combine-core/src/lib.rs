//! Core ledger record types for the combine-entities plugin.
//!
//! This crate provides the records the plugin reads and rewrites:
//!
//! - [`Amount`] - A decimal number with a currency
//! - [`Posting`] - One leg of a transaction
//! - [`Directive`] - All directive kinds (Transaction, Balance, Open, etc.)
//! - [`Metadata`] / [`MetaValue`] - Key-value metadata on records
//! - [`SourceLocation`] - The `filename`/`lineno` provenance of a record
//!
//! # Example
//!
//! ```
//! use combine_core::{Amount, Posting, SourceLocation, Transaction};
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//!
//! let txn = Transaction::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), "Advance")
//!     .with_source(&SourceLocation::new("agent.bean", 10))
//!     .with_posting(
//!         Posting::new("Liabilities:Principal", Amount::new(dec!(500), "EUR"))
//!             .with_meta("sub", "sales"),
//!     )
//!     .with_posting(Posting::new("Assets:Bank", Amount::new(dec!(-500), "EUR")));
//!
//! assert_eq!(txn.source().unwrap().lineno, 10);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod amount;
pub mod directive;
pub mod meta;

pub use amount::Amount;
pub use directive::{
    Balance, Close, Commodity, Directive, Document, Event, Note, Open, Pad, Posting, Price,
    PriceAnnotation, Transaction,
};
pub use meta::{MetaValue, Metadata, SourceLocation, FILENAME_KEY, LINENO_KEY};

// Re-export commonly used external types
pub use chrono::NaiveDate;
pub use rust_decimal::Decimal;
