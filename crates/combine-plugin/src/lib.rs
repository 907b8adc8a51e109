//! Beancount plugin that combines the ledgers of a principal and its agent.
//!
//! When an agent pays or collects on behalf of a principal, both keep books:
//! the agent books the movement against a liability to the principal, and
//! the principal against its claim on the agent. Loading both ledgers
//! together would count the movement twice. The `combine_entities` plugin
//! keeps the principal's own entries, rewrites the agent's postings against
//! the principal into the principal's point of view, and drops the rest of
//! the agent's ledger.
//!
//! # Modules
//!
//! - [`config`]: configuration lexer, parser and schema validation
//! - [`rules`]: the rewrite rule table and super-meta matching
//! - [`combine`]: transaction classification and rewriting
//! - [`native`]: the plugin trait and registry
//! - [`types`]: plugin input/output records
//!
//! # Example
//!
//! ```
//! use combine_core::{Amount, Posting, SourceLocation, Transaction};
//! use combine_core::NaiveDate;
//! use combine_plugin::{combine_entities, PluginInput, PluginOptions};
//! use rust_decimal_macros::dec;
//!
//! let config = "{
//!     'filter_account': 'Liabilities:Principal',
//!     'our_tag': 'oi-master',
//!     'filter_amount': 'dt',
//!     'our_account': 'Assets:Agent',
//!     'super_meta': 'sub',
//!     'sm_sales': 'Expenses:Agency;sub:sales expenses',
//! }";
//!
//! let txn = Transaction::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), "Advance")
//!     .with_source(&SourceLocation::new("agent.bean", 10))
//!     .with_posting(
//!         Posting::new("Liabilities:Principal", Amount::new(dec!(500), "EUR"))
//!             .with_meta("sub", "sales"),
//!     )
//!     .with_posting(Posting::new("Assets:Bank", Amount::new(dec!(-500), "EUR")));
//!
//! let output = combine_entities(PluginInput {
//!     directives: vec![txn.into()],
//!     options: PluginOptions::default(),
//!     config: Some(config.to_string()),
//! })
//! .unwrap();
//!
//! let rewritten = output.directives[0].as_transaction().unwrap();
//! assert_eq!(rewritten.postings[0].account, "Assets:Agent");
//! assert_eq!(rewritten.postings[1].account, "Expenses:Agency");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod combine;
pub mod config;
pub mod error;
pub mod native;
pub mod rules;
pub mod types;

pub use combine::{combine_entities, CombineEntitiesPlugin, Combiner};
pub use config::{AmountFilter, CombineConfig, TagMatcher};
pub use error::ConfigError;
pub use native::{NativePlugin, NativePluginRegistry};
pub use rules::{ExpandedRule, RewriteRule, RuleSyntax, RuleTable, RuleTemplate};
pub use types::{
    PluginError, PluginErrorKind, PluginErrorSeverity, PluginInput, PluginOptions, PluginOutput,
};
