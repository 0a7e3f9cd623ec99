use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use super::{reference::SkillId, UnknownVariant};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "Low",
            Urgency::Medium => "Medium",
            Urgency::High => "High",
        }
    }

    /// Sort rank used by the volunteer listing: most urgent first.
    pub fn rank(&self) -> u8 {
        match self {
            Urgency::High => 1,
            Urgency::Medium => 2,
            Urgency::Low => 3,
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Urgency::Low),
            "medium" => Ok(Urgency::Medium),
            "high" => Ok(Urgency::High),
            _ => Err(UnknownVariant { kind: "urgency", value: s.to_string() }),
        }
    }
}

impl TryFrom<String> for Urgency {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq, Eq)]
pub struct Location {
    pub city: String,
    pub state: String,
    pub zipcode: String,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct EventRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    #[sqlx(flatten)]
    pub location: Location,
    #[sqlx(skip)]
    pub required_skills: BTreeSet<SkillId>,
    #[sqlx(try_from = "String")]
    pub urgency: Urgency,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

pub struct NewEventParams {
    pub name: String,
    pub description: String,
    pub location: Location,
    pub required_skills: BTreeSet<SkillId>,
    pub urgency: Urgency,
    pub date: NaiveDate,
}

impl EventRecord {
    pub fn new(params: NewEventParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: params.name,
            description: params.description,
            location: params.location,
            required_skills: params.required_skills,
            urgency: params.urgency,
            date: params.date,
            created_at: Utc::now(),
        }
    }

    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.date >= today
    }

    pub fn is_past(&self, today: NaiveDate) -> bool {
        self.date < today
    }
}
