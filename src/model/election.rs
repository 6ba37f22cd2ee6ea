use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{date, Candidate, Id};

/// Where an election is in its lifecycle, as far as voting is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectionStatus {
    /// Accepting votes.
    Active,
    /// Finished; results only.
    Closed,
    /// Any state this client doesn't know about. Treated like `Closed`.
    #[serde(other)]
    Other,
}

impl Display for ElectionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => f.write_str("ACTIVE"),
            Self::Closed => f.write_str("CLOSED"),
            Self::Other => f.write_str("UNAVAILABLE"),
        }
    }
}

/// A time-bounded voting event and the candidates standing in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Election {
    pub id: Id,
    pub title: String,
    #[serde(with = "date")]
    pub start_date: NaiveDate,
    #[serde(with = "date")]
    pub end_date: NaiveDate,
    #[serde(default, with = "date::option", skip_serializing_if = "Option::is_none")]
    pub election_date: Option<NaiveDate>,
    pub status: ElectionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl Election {
    pub fn is_active(&self) -> bool {
        self.status == ElectionStatus::Active
    }

    /// The election shown when the election list can't be fetched.
    pub fn fallback() -> Self {
        Self {
            id: Id::Num(1),
            title: "Presidential Election 2025".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2025, 10, 10).unwrap_or_default(),
            election_date: NaiveDate::from_ymd_opt(2025, 10, 5),
            status: ElectionStatus::Active,
            description: Some("Vote wisely for your preferred candidate.".to_string()),
            image: None,
            candidates: vec![
                Candidate::new(1, "Peter Obi"),
                Candidate::new(2, "Atiku Abubakar"),
                Candidate::new(3, "Bola Ahmed Tinubu"),
            ],
        }
    }
}
