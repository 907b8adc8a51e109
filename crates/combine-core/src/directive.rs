//! Directive types representing parsed ledger records.
//!
//! The combine-entities plugin receives an ordered list of these records
//! from the host and only ever rewrites [`Transaction`]s. All other kinds
//! pass through or are dropped whole:
//!
//! - [`Transaction`] - Transfers between accounts, the only rewritten kind
//! - [`Balance`] - Assert that an account has a specific balance
//! - [`Open`] / [`Close`] - Account lifecycle
//! - [`Commodity`] - Declare a commodity/currency
//! - [`Pad`] - Pad an account to match a balance assertion
//! - [`Event`] - Record a named event value
//! - [`Note`] - Add a note to an account
//! - [`Document`] - Link a document to an account
//! - [`Price`] - Record a price for a commodity
//!
//! Records are treated as immutable values. Every type offers `with_*`
//! methods that consume the record and return a modified copy.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Amount, MetaValue, Metadata, SourceLocation};

/// A posting within a transaction.
///
/// Postings are the individual legs of a transaction. When `units` is
/// `None` the host interpolates the amount; such postings have no sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// The account for this posting
    pub account: String,
    /// The units (None for auto-calculated postings)
    pub units: Option<Amount>,
    /// Price annotation (@ or @@)
    pub price: Option<PriceAnnotation>,
    /// Posting flag, if any
    pub flag: Option<char>,
    /// Posting metadata
    pub meta: Metadata,
}

impl Posting {
    /// Create a new posting with the given account and units.
    #[must_use]
    pub fn new(account: impl Into<String>, units: Amount) -> Self {
        Self {
            account: account.into(),
            units: Some(units),
            price: None,
            flag: None,
            meta: Metadata::new(),
        }
    }

    /// Create a posting without any amount (to be interpolated).
    #[must_use]
    pub fn auto(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            units: None,
            price: None,
            flag: None,
            meta: Metadata::new(),
        }
    }

    /// Get the units if present.
    #[must_use]
    pub const fn amount(&self) -> Option<&Amount> {
        self.units.as_ref()
    }

    /// Replace the account.
    #[must_use]
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = account.into();
        self
    }

    /// Replace the units.
    #[must_use]
    pub fn with_units(mut self, units: Amount) -> Self {
        self.units = Some(units);
        self
    }

    /// Add a price annotation.
    #[must_use]
    pub fn with_price(mut self, price: PriceAnnotation) -> Self {
        self.price = Some(price);
        self
    }

    /// Add a flag.
    #[must_use]
    pub const fn with_flag(mut self, flag: char) -> Self {
        self.flag = Some(flag);
        self
    }

    /// Add a metadata entry.
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Replace the whole metadata map.
    #[must_use]
    pub fn with_metadata(mut self, meta: Metadata) -> Self {
        self.meta = meta;
        self
    }

    /// Record the source location in the posting metadata.
    #[must_use]
    pub fn with_source(mut self, source: &SourceLocation) -> Self {
        source.write_meta(&mut self.meta);
        self
    }

    /// Where this posting was read from.
    #[must_use]
    pub fn source(&self) -> Option<SourceLocation> {
        SourceLocation::from_meta(&self.meta)
    }
}

impl fmt::Display for Posting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  ")?;
        if let Some(flag) = self.flag {
            write!(f, "{flag} ")?;
        }
        write!(f, "{}", self.account)?;
        if let Some(units) = &self.units {
            write!(f, "  {units}")?;
        }
        if let Some(price) = &self.price {
            write!(f, " {price}")?;
        }
        Ok(())
    }
}

/// Price annotation for a posting (@ or @@).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceAnnotation {
    /// Per-unit price (@)
    Unit(Amount),
    /// Total price (@@)
    Total(Amount),
}

impl PriceAnnotation {
    /// Get the annotated amount.
    #[must_use]
    pub const fn amount(&self) -> &Amount {
        match self {
            Self::Unit(a) | Self::Total(a) => a,
        }
    }
}

impl fmt::Display for PriceAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit(a) => write!(f, "@ {a}"),
            Self::Total(a) => write!(f, "@@ {a}"),
        }
    }
}

/// All directive kinds the plugin handles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Directive {
    /// Transaction directive - records transfers between accounts
    Transaction(Transaction),
    /// Balance assertion - asserts an account balance at a point in time
    Balance(Balance),
    /// Open account - opens an account for use
    Open(Open),
    /// Close account - closes an account
    Close(Close),
    /// Commodity declaration - declares a currency/commodity
    Commodity(Commodity),
    /// Pad directive - auto-pad an account to match a balance
    Pad(Pad),
    /// Event directive - records a named event value
    Event(Event),
    /// Note directive - adds a note to an account
    Note(Note),
    /// Document directive - links a document to an account
    Document(Document),
    /// Price directive - records a commodity price
    Price(Price),
}

impl Directive {
    /// Get the date of this directive.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        match self {
            Self::Transaction(t) => t.date,
            Self::Balance(b) => b.date,
            Self::Open(o) => o.date,
            Self::Close(c) => c.date,
            Self::Commodity(c) => c.date,
            Self::Pad(p) => p.date,
            Self::Event(e) => e.date,
            Self::Note(n) => n.date,
            Self::Document(d) => d.date,
            Self::Price(p) => p.date,
        }
    }

    /// Get the metadata of this directive.
    #[must_use]
    pub const fn meta(&self) -> &Metadata {
        match self {
            Self::Transaction(t) => &t.meta,
            Self::Balance(b) => &b.meta,
            Self::Open(o) => &o.meta,
            Self::Close(c) => &c.meta,
            Self::Commodity(c) => &c.meta,
            Self::Pad(p) => &p.meta,
            Self::Event(e) => &e.meta,
            Self::Note(n) => &n.meta,
            Self::Document(d) => &d.meta,
            Self::Price(p) => &p.meta,
        }
    }

    /// Get mutable access to the metadata of this directive.
    pub fn meta_mut(&mut self) -> &mut Metadata {
        match self {
            Self::Transaction(t) => &mut t.meta,
            Self::Balance(b) => &mut b.meta,
            Self::Open(o) => &mut o.meta,
            Self::Close(c) => &mut c.meta,
            Self::Commodity(c) => &mut c.meta,
            Self::Pad(p) => &mut p.meta,
            Self::Event(e) => &mut e.meta,
            Self::Note(n) => &mut n.meta,
            Self::Document(d) => &mut d.meta,
            Self::Price(p) => &mut p.meta,
        }
    }

    /// Record the source location in the directive metadata.
    #[must_use]
    pub fn with_source(mut self, source: &SourceLocation) -> Self {
        source.write_meta(self.meta_mut());
        self
    }

    /// Where this directive was read from.
    #[must_use]
    pub fn source(&self) -> Option<SourceLocation> {
        SourceLocation::from_meta(self.meta())
    }

    /// The source file name, if recorded.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.meta()
            .get(crate::meta::FILENAME_KEY)
            .and_then(MetaValue::as_str)
    }

    /// Check if this is a transaction.
    #[must_use]
    pub const fn is_transaction(&self) -> bool {
        matches!(self, Self::Transaction(_))
    }

    /// Get as a transaction, if this is one.
    #[must_use]
    pub const fn as_transaction(&self) -> Option<&Transaction> {
        match self {
            Self::Transaction(t) => Some(t),
            _ => None,
        }
    }

    /// Get the directive type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Transaction(_) => "transaction",
            Self::Balance(_) => "balance",
            Self::Open(_) => "open",
            Self::Close(_) => "close",
            Self::Commodity(_) => "commodity",
            Self::Pad(_) => "pad",
            Self::Event(_) => "event",
            Self::Note(_) => "note",
            Self::Document(_) => "document",
            Self::Price(_) => "price",
        }
    }
}

impl From<Transaction> for Directive {
    fn from(txn: Transaction) -> Self {
        Self::Transaction(txn)
    }
}

/// A transaction directive.
///
/// Transactions record transfers between accounts and must balance (the
/// sum of all postings per currency equals zero). The host enforces that
/// invariant; the plugin only preserves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction date
    pub date: NaiveDate,
    /// Transaction flag (* or !)
    pub flag: char,
    /// Payee (optional)
    pub payee: Option<String>,
    /// Narration (description)
    pub narration: String,
    /// Tags attached to this transaction
    pub tags: Vec<String>,
    /// Links attached to this transaction
    pub links: Vec<String>,
    /// Transaction metadata
    pub meta: Metadata,
    /// Postings (account entries)
    pub postings: Vec<Posting>,
}

impl Transaction {
    /// Create a new transaction.
    #[must_use]
    pub fn new(date: NaiveDate, narration: impl Into<String>) -> Self {
        Self {
            date,
            flag: '*',
            payee: None,
            narration: narration.into(),
            tags: Vec::new(),
            links: Vec::new(),
            meta: Metadata::new(),
            postings: Vec::new(),
        }
    }

    /// Set the flag.
    #[must_use]
    pub const fn with_flag(mut self, flag: char) -> Self {
        self.flag = flag;
        self
    }

    /// Set the payee.
    #[must_use]
    pub fn with_payee(mut self, payee: impl Into<String>) -> Self {
        self.payee = Some(payee.into());
        self
    }

    /// Add a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Add a link.
    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.links.push(link.into());
        self
    }

    /// Add a posting.
    #[must_use]
    pub fn with_posting(mut self, posting: Posting) -> Self {
        self.postings.push(posting);
        self
    }

    /// Replace all postings.
    #[must_use]
    pub fn with_postings(mut self, postings: Vec<Posting>) -> Self {
        self.postings = postings;
        self
    }

    /// Record the source location in the transaction metadata.
    #[must_use]
    pub fn with_source(mut self, source: &SourceLocation) -> Self {
        source.write_meta(&mut self.meta);
        self
    }

    /// Check whether the transaction carries the given tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Where this transaction was read from.
    #[must_use]
    pub fn source(&self) -> Option<SourceLocation> {
        SourceLocation::from_meta(&self.meta)
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ", self.date, self.flag)?;
        if let Some(payee) = &self.payee {
            write!(f, "\"{payee}\" ")?;
        }
        write!(f, "\"{}\"", self.narration)?;
        for tag in &self.tags {
            write!(f, " #{tag}")?;
        }
        for link in &self.links {
            write!(f, " ^{link}")?;
        }
        for posting in &self.postings {
            write!(f, "\n{posting}")?;
        }
        Ok(())
    }
}

/// A balance assertion directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Assertion date
    pub date: NaiveDate,
    /// Account to check
    pub account: String,
    /// Expected amount
    pub amount: Amount,
    /// Metadata
    pub meta: Metadata,
}

impl Balance {
    /// Create a new balance assertion.
    #[must_use]
    pub fn new(date: NaiveDate, account: impl Into<String>, amount: Amount) -> Self {
        Self {
            date,
            account: account.into(),
            amount,
            meta: Metadata::new(),
        }
    }
}

/// An open account directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Open {
    /// Date account was opened
    pub date: NaiveDate,
    /// Account name (e.g., "Assets:Agent")
    pub account: String,
    /// Allowed currencies (empty = any currency allowed)
    pub currencies: Vec<String>,
    /// Metadata
    pub meta: Metadata,
}

impl Open {
    /// Create a new open directive.
    #[must_use]
    pub fn new(date: NaiveDate, account: impl Into<String>) -> Self {
        Self {
            date,
            account: account.into(),
            currencies: Vec::new(),
            meta: Metadata::new(),
        }
    }
}

/// A close account directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Close {
    /// Date account was closed
    pub date: NaiveDate,
    /// Account name
    pub account: String,
    /// Metadata
    pub meta: Metadata,
}

impl Close {
    /// Create a new close directive.
    #[must_use]
    pub fn new(date: NaiveDate, account: impl Into<String>) -> Self {
        Self {
            date,
            account: account.into(),
            meta: Metadata::new(),
        }
    }
}

/// A commodity declaration directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commodity {
    /// Declaration date
    pub date: NaiveDate,
    /// Currency/commodity code
    pub currency: String,
    /// Metadata
    pub meta: Metadata,
}

impl Commodity {
    /// Create a new commodity declaration.
    #[must_use]
    pub fn new(date: NaiveDate, currency: impl Into<String>) -> Self {
        Self {
            date,
            currency: currency.into(),
            meta: Metadata::new(),
        }
    }
}

/// A pad directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pad {
    /// Pad date
    pub date: NaiveDate,
    /// Account to pad
    pub account: String,
    /// Source account for padding
    pub source_account: String,
    /// Metadata
    pub meta: Metadata,
}

impl Pad {
    /// Create a new pad directive.
    #[must_use]
    pub fn new(
        date: NaiveDate,
        account: impl Into<String>,
        source_account: impl Into<String>,
    ) -> Self {
        Self {
            date,
            account: account.into(),
            source_account: source_account.into(),
            meta: Metadata::new(),
        }
    }
}

/// An event directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event date
    pub date: NaiveDate,
    /// Event type (e.g., "location")
    pub event_type: String,
    /// Event value
    pub value: String,
    /// Metadata
    pub meta: Metadata,
}

impl Event {
    /// Create a new event directive.
    #[must_use]
    pub fn new(date: NaiveDate, event_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            date,
            event_type: event_type.into(),
            value: value.into(),
            meta: Metadata::new(),
        }
    }
}

/// A note directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Note date
    pub date: NaiveDate,
    /// Account
    pub account: String,
    /// Note text
    pub comment: String,
    /// Metadata
    pub meta: Metadata,
}

impl Note {
    /// Create a new note directive.
    #[must_use]
    pub fn new(date: NaiveDate, account: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            date,
            account: account.into(),
            comment: comment.into(),
            meta: Metadata::new(),
        }
    }
}

/// A document directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Document date
    pub date: NaiveDate,
    /// Account
    pub account: String,
    /// File path to the document
    pub path: String,
    /// Metadata
    pub meta: Metadata,
}

impl Document {
    /// Create a new document directive.
    #[must_use]
    pub fn new(date: NaiveDate, account: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            date,
            account: account.into(),
            path: path.into(),
            meta: Metadata::new(),
        }
    }
}

/// A price directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Price date
    pub date: NaiveDate,
    /// Currency being priced
    pub currency: String,
    /// Price amount (in another currency)
    pub amount: Amount,
    /// Metadata
    pub meta: Metadata,
}

impl Price {
    /// Create a new price directive.
    #[must_use]
    pub fn new(date: NaiveDate, currency: impl Into<String>, amount: Amount) -> Self {
        Self {
            date,
            currency: currency.into(),
            amount,
            meta: Metadata::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_transaction_builder() {
        let txn = Transaction::new(date(2024, 1, 15), "Advance to agent")
            .with_payee("Agent Ltd")
            .with_tag("oi-master")
            .with_posting(Posting::new(
                "Liabilities:Principal",
                Amount::new(dec!(500.00), "EUR"),
            ))
            .with_posting(Posting::auto("Assets:Bank"));

        assert_eq!(txn.flag, '*');
        assert_eq!(txn.payee, Some("Agent Ltd".to_string()));
        assert!(txn.has_tag("oi-master"));
        assert!(!txn.has_tag("oi"));
        assert_eq!(txn.postings.len(), 2);
        assert!(txn.postings[1].amount().is_none());
    }

    #[test]
    fn test_posting_copy_with_replacement_keeps_original() {
        let original = Posting::new("Liabilities:Principal", Amount::new(dec!(10), "USD"))
            .with_meta("sub", "sales")
            .with_flag('!');

        let moved = original
            .clone()
            .with_account("Assets:Agent")
            .with_units(Amount::new(dec!(-10), "USD"));

        assert_eq!(original.account, "Liabilities:Principal");
        assert_eq!(moved.account, "Assets:Agent");
        assert_eq!(moved.amount().unwrap().number, dec!(-10));
        assert_eq!(moved.meta, original.meta);
        assert_eq!(moved.flag, Some('!'));
    }

    #[test]
    fn test_directive_source() {
        let loc = SourceLocation::new("principal.bean", 12);
        let dir = Directive::Balance(Balance::new(
            date(2024, 1, 1),
            "Assets:Bank",
            Amount::new(dec!(0), "EUR"),
        ))
        .with_source(&loc);

        assert_eq!(dir.filename(), Some("principal.bean"));
        assert_eq!(dir.source(), Some(loc));
        assert_eq!(dir.type_name(), "balance");
        assert!(!dir.is_transaction());
    }

    #[test]
    fn test_directive_date_and_kind() {
        let dir: Directive = Transaction::new(date(2024, 1, 15), "Test").into();

        assert_eq!(dir.date(), date(2024, 1, 15));
        assert!(dir.is_transaction());
        assert!(dir.as_transaction().is_some());
        assert_eq!(dir.type_name(), "transaction");
        assert!(dir.filename().is_none());
    }

    #[test]
    fn test_posting_display() {
        let posting = Posting::new("Assets:Agent", Amount::new(dec!(-500.00), "EUR"))
            .with_price(PriceAnnotation::Unit(Amount::new(dec!(1.10), "USD")));
        let s = format!("{posting}");
        assert!(s.contains("Assets:Agent"));
        assert!(s.contains("-500.00 EUR"));
        assert!(s.contains("@ 1.10 USD"));
    }

    #[test]
    fn test_transaction_display() {
        let txn = Transaction::new(date(2024, 1, 15), "Sales expenses")
            .with_tag("agent")
            .with_posting(Posting::new(
                "Expenses:Agency",
                Amount::new(dec!(50.00), "EUR"),
            ))
            .with_posting(Posting::auto("Assets:Agent"));

        let s = format!("{txn}");
        assert!(s.contains("2024-01-15 *"));
        assert!(s.contains("#agent"));
        assert!(s.contains("Expenses:Agency  50.00 EUR"));
    }
}
