use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub type TripId = String;
pub type MemberId = String;
pub type ExpenseId = String;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    #[serde(default)]
    pub avatar: String,
}

impl Member {
    /// Builds a member with the default avatar derived from the name.
    pub fn new(id: impl Into<MemberId>, name: impl Into<String>) -> Self {
        let name = name.into();
        let avatar = default_avatar(&name);
        Self {
            id: id.into(),
            name,
            avatar,
        }
    }
}

fn default_avatar(name: &str) -> String {
    format!(
        "https://api.dicebear.com/7.x/avataaars/svg?seed={}",
        name.replace(' ', "-")
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Transport,
    Accommodation,
    Shopping,
    Entertainment,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Food,
        Category::Transport,
        Category::Accommodation,
        Category::Shopping,
        Category::Entertainment,
        Category::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Accommodation => "accommodation",
            Category::Shopping => "shopping",
            Category::Entertainment => "entertainment",
            Category::Other => "other",
        }
    }

    /// Matches a free-form label (e.g. from a parsed receipt) against the
    /// known categories. Containment in either direction counts, so both
    /// "Transport" and "local transportation" resolve to `Transport`.
    pub fn match_label(label: &str) -> Option<Category> {
        let needle = label.trim().to_ascii_lowercase();
        if needle.is_empty() {
            return None;
        }
        Category::ALL
            .into_iter()
            .find(|c| needle.contains(c.label()) || c.label().contains(needle.as_str()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: ExpenseId,
    pub title: String,
    pub amount: f64,
    pub currency: String,
    pub category: Category,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub payer_id: MemberId,
    /// Member ids the expense is split between; order irrelevant.
    pub participants: Vec<MemberId>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: TripId,
    pub name: String,
    pub base_currency: String,
    /// Ordered; the first member is the owner and cannot be removed.
    pub members: Vec<Member>,
    pub expenses: Vec<Expense>,
    /// Keys of settlements already confirmed as paid. Absent in older
    /// snapshots, so it must default on deserialization.
    #[serde(default)]
    pub completed_settlement_keys: BTreeSet<String>,
    /// Cached result of the fully-settled evaluation, refreshed on every
    /// mutation. Also defaulted for older snapshots.
    #[serde(default)]
    pub is_fully_settled: bool,
    pub created_at: DateTime<Utc>,
}

impl Trip {
    pub fn new(
        id: impl Into<TripId>,
        name: impl Into<String>,
        base_currency: impl Into<String>,
        owner: Member,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            base_currency: base_currency.into(),
            members: vec![owner],
            expenses: Vec::new(),
            completed_settlement_keys: BTreeSet::new(),
            is_fully_settled: false,
            created_at: Utc::now(),
        }
    }

    pub fn member(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn owner(&self) -> Option<&Member> {
        self.members.first()
    }
}
