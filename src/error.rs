use thiserror::Error;

#[derive(Error, Debug)]
pub enum SplitError {
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("no trip with id {0}")]
    UnknownTrip(String),
    #[error("no member with id {0} in this trip")]
    UnknownMember(String),
    #[error("expense amount cannot be negative")]
    NegativeAmount,
    #[error("{name} still appears in {expenses} expense(s) and cannot be removed")]
    MemberInUse { name: String, expenses: usize },
    #[error("the trip owner cannot be removed")]
    OwnerRemoval,
    #[error("a workspace needs at least one trip")]
    LastTrip,
}

pub type Result<T> = std::result::Result<T, SplitError>;
