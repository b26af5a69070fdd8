use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::rates::RateTable;
use crate::schemas::{Category, Expense, ExpenseId, MemberId, Trip};

/// Image payload handed to the parser: base64 data plus its mime type.
#[derive(Clone, Debug)]
pub struct ReceiptImage {
    pub data: String,
    pub mime_type: String,
}

/// Whatever subset of fields the parser could extract. Absent fields leave
/// the corresponding draft field untouched.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ParsedReceipt {
    pub title: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    /// `YYYY-MM-DD`; anything else is ignored on merge.
    pub date: Option<String>,
}

/// Receipt-image-to-fields collaborator. Implementations wrap some vision
/// model; a failed call is `None`, never an error. The worst outcome of a
/// scan is an unfilled form.
#[async_trait]
pub trait ReceiptParser: Send + Sync {
    async fn parse_receipt(&self, image: ReceiptImage) -> Option<ParsedReceipt>;
}

/// Form state for a not-yet-saved expense, seeded with the trip defaults:
/// base currency, the owner pays, everyone splits.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpenseDraft {
    pub title: String,
    pub amount: Option<f64>,
    pub currency: String,
    pub category: Category,
    pub date: NaiveDate,
    pub location: String,
    pub payer_id: MemberId,
    pub participants: Vec<MemberId>,
}

impl ExpenseDraft {
    pub fn for_trip(trip: &Trip, date: NaiveDate) -> Self {
        Self {
            title: String::new(),
            amount: None,
            currency: trip.base_currency.clone(),
            category: Category::Food,
            date,
            location: String::new(),
            payer_id: trip.owner().map(|m| m.id.clone()).unwrap_or_default(),
            participants: trip.members.iter().map(|m| m.id.clone()).collect(),
        }
    }

    /// Merges parsed fields into the draft, one by one. The currency only
    /// applies when the rate table knows the uppercased code; category
    /// labels go through the fuzzy match; malformed dates are dropped.
    pub fn apply(&mut self, parsed: &ParsedReceipt, rates: &RateTable) {
        if let Some(title) = &parsed.title {
            self.title = title.clone();
        }
        if let Some(amount) = parsed.amount {
            self.amount = Some(amount);
        }
        if let Some(currency) = &parsed.currency {
            let code = currency.to_ascii_uppercase();
            if rates.contains(&code) {
                self.currency = code;
            }
        }
        if let Some(label) = &parsed.category {
            if let Some(category) = Category::match_label(label) {
                self.category = category;
            }
        }
        if let Some(location) = &parsed.location {
            self.location = location.clone();
        }
        if let Some(date) = &parsed.date {
            if let Ok(date) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
                self.date = date;
            }
        }
    }

    /// A draft only becomes an expense once it has a title and an amount,
    /// the same gate the form puts on its save button.
    pub fn into_expense(self, id: impl Into<ExpenseId>) -> Option<Expense> {
        if self.title.trim().is_empty() {
            return None;
        }
        let amount = self.amount?;
        Some(Expense {
            id: id.into(),
            title: self.title,
            amount,
            currency: self.currency,
            category: self.category,
            date: self.date,
            location: (!self.location.is_empty()).then_some(self.location),
            payer_id: self.payer_id,
            participants: self.participants,
        })
    }
}

/// One receipt scan in flight. The task runs detached from any trip state;
/// cancelling it, a parser failure, or a panic all collapse to `None`, so a
/// scan can never corrupt or block an expense save.
pub struct ReceiptScan {
    handle: JoinHandle<Option<ParsedReceipt>>,
}

impl ReceiptScan {
    pub fn spawn(parser: Arc<dyn ReceiptParser>, image: ReceiptImage) -> Self {
        let handle = tokio::spawn(async move { parser.parse_receipt(image).await });
        Self { handle }
    }

    /// Aborts the scan, e.g. because the draft was discarded.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub async fn finish(self) -> Option<ParsedReceipt> {
        match self.handle.await {
            Ok(parsed) => parsed,
            Err(err) => {
                debug!(%err, "receipt scan did not complete");
                None
            }
        }
    }
}
