//! Merge the ledgers of two entities into one consistent set of books.
//!
//! A principal and its agent keep separate ledgers. When both are included
//! into a third file, the agent's transactions that touch the principal
//! (postings to `filter_account`) are re-expressed from the principal's
//! point of view: the posting moves to `our_account` and a balancing
//! posting is added to the account picked by the posting's super-meta
//! value. Everything else from the agent's side is dropped, so nothing is
//! recorded twice.
//!
//! Classification of each directive:
//!
//! - transactions tagged with `our_tag` pass through unchanged and mark
//!   their source file as ours;
//! - other transactions are rewritten, and kept only if at least one
//!   posting was rewritten;
//! - other directives are kept only if their source file is ours (Price
//!   directives always, unless `keep_prices` is off).

use std::collections::HashSet;

use combine_core::{Amount, Directive, Posting, SourceLocation, Transaction};

use crate::config::CombineConfig;
use crate::error::ConfigError;
use crate::native::NativePlugin;
use crate::types::{PluginError, PluginErrorKind, PluginInput, PluginOutput};

/// Run the plugin on a set of directives.
///
/// Returns the rewritten directives, in input order, with per-posting
/// warnings. A bad configuration is returned as `Err` before any directive
/// is processed.
pub fn combine_entities(input: PluginInput) -> Result<PluginOutput, ConfigError> {
    let config = CombineConfig::from_option(input.config.as_deref())?;
    Ok(Combiner::new(&config).run(input.directives))
}

/// The `combine_entities` plugin.
pub struct CombineEntitiesPlugin;

impl NativePlugin for CombineEntitiesPlugin {
    fn name(&self) -> &'static str {
        "combine_entities"
    }

    fn process(&self, input: PluginInput) -> PluginOutput {
        match CombineConfig::from_option(input.config.as_deref()) {
            Ok(config) => Combiner::new(&config).run(input.directives),
            Err(err) => {
                tracing::error!("combine_entities: {}", err);
                PluginOutput {
                    directives: input.directives,
                    errors: vec![err.into()],
                }
            }
        }
    }
}

/// Source files that produced at least one of our transactions.
///
/// Directives without a recorded file share one anonymous bucket.
#[derive(Debug, Default)]
struct OurFiles {
    named: HashSet<String>,
    unnamed: bool,
}

impl OurFiles {
    fn insert(&mut self, filename: Option<&str>) {
        match filename {
            Some(name) => {
                self.named.insert(name.to_string());
            }
            None => self.unnamed = true,
        }
    }

    fn contains(&self, filename: Option<&str>) -> bool {
        filename.map_or(self.unnamed, |name| self.named.contains(name))
    }
}

/// A single pass over one directive list.
pub struct Combiner<'a> {
    config: &'a CombineConfig,
    errors: Vec<PluginError>,
}

impl<'a> Combiner<'a> {
    /// Create a combiner for a validated configuration.
    pub const fn new(config: &'a CombineConfig) -> Self {
        Self {
            config,
            errors: Vec::new(),
        }
    }

    /// Classify and rewrite all directives.
    pub fn run(mut self, directives: Vec<Directive>) -> PluginOutput {
        let mut our_files = OurFiles::default();
        for directive in &directives {
            if let Directive::Transaction(txn) = directive {
                if self.is_ours(txn) {
                    our_files.insert(directive.filename());
                }
            }
        }

        let total = directives.len();
        let mut rewritten = 0usize;
        let mut output = Vec::with_capacity(total);

        for directive in directives {
            match directive {
                Directive::Transaction(txn) if self.is_ours(&txn) => {
                    output.push(Directive::Transaction(txn));
                }
                Directive::Transaction(txn) => {
                    if let Some(txn) = self.rewrite_transaction(txn) {
                        rewritten += 1;
                        output.push(Directive::Transaction(txn));
                    }
                }
                price @ Directive::Price(_) if self.config.keep_prices => output.push(price),
                other if our_files.contains(other.filename()) => output.push(other),
                other => {
                    tracing::trace!(
                        "combine_entities: dropping {} from {}",
                        other.type_name(),
                        other.filename().unwrap_or("<unknown>")
                    );
                }
            }
        }

        tracing::debug!(
            "combine_entities: {} directives in, {} out, {} transactions rewritten, {} warnings",
            total,
            output.len(),
            rewritten,
            self.errors.len()
        );

        PluginOutput {
            directives: output,
            errors: self.errors,
        }
    }

    fn is_ours(&self, txn: &Transaction) -> bool {
        self.config.our_tag.matches(&txn.tags)
    }

    /// Units of a posting selected for rewriting; `None` if not selected.
    ///
    /// Postings without units are never selected.
    fn selected_units(&self, posting: &Posting) -> Option<Amount> {
        if posting.account != self.config.filter_account {
            return None;
        }
        posting
            .amount()
            .filter(|units| self.config.filter_amount.accepts(units))
            .cloned()
    }

    /// Rewrite a foreign transaction; `None` if no posting was rewritten.
    fn rewrite_transaction(&mut self, mut txn: Transaction) -> Option<Transaction> {
        let txn_source = txn.source();
        let source_postings = std::mem::take(&mut txn.postings);
        let mut postings = Vec::with_capacity(source_postings.len() + 1);
        let mut rewritten = false;

        for posting in source_postings {
            let Some(units) = self.selected_units(&posting) else {
                if self.config.keep_unmatched_postings {
                    postings.push(posting);
                }
                continue;
            };

            match self.rewrite_posting(posting, units, txn_source.as_ref()) {
                Ok([moved, balancing]) => {
                    postings.push(moved);
                    postings.push(balancing);
                    rewritten = true;
                }
                Err(warning) => {
                    tracing::warn!("combine_entities: {}", warning);
                    self.errors.push(warning);
                }
            }
        }

        rewritten.then(|| txn.with_postings(postings))
    }

    /// Turn one selected posting into the moved posting and its balance.
    fn rewrite_posting(
        &self,
        posting: Posting,
        units: Amount,
        txn_source: Option<&SourceLocation>,
    ) -> Result<[Posting; 2], PluginError> {
        let location = posting.source().or_else(|| txn_source.cloned());
        let super_meta = &self.config.super_meta;

        let value = match posting.meta.get(super_meta) {
            None => {
                return Err(PluginError::warning(
                    PluginErrorKind::MissingMetadata,
                    format!(
                        "key '{super_meta}' is not defined for posting to {}",
                        posting.account
                    ),
                )
                .at(location.as_ref()))
            }
            Some(meta_value) => match meta_value.as_str() {
                Some(value) => value,
                None => {
                    return Err(PluginError::warning(
                        PluginErrorKind::MissingMetadata,
                        format!(
                            "key '{super_meta}' on posting to {} holds {meta_value}, not a string",
                            posting.account
                        ),
                    )
                    .at(location.as_ref()))
                }
            },
        };

        let Some(rule) = self.config.rules.find(value) else {
            return Err(PluginError::warning(
                PluginErrorKind::UnmatchedRule,
                format!("no rewrite rule configured for {super_meta} '{value}'"),
            )
            .at(location.as_ref()));
        };
        let expanded = rule.expand(value);

        let (moved_units, balancing_units) = if self.config.invert_amount {
            (-&units, units)
        } else {
            (units.clone(), -units)
        };

        let mut balancing_meta = posting.meta.clone();
        balancing_meta.extend(expanded.meta);
        let balancing =
            Posting::new(expanded.account, balancing_units).with_metadata(balancing_meta);

        let moved = posting
            .with_account(self.config.our_account.clone())
            .with_units(moved_units);

        Ok([moved, balancing])
    }
}
