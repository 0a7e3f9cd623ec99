use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub type SkillId = i64;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq, Eq)]
pub struct Skill {
    pub id: SkillId,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq, Eq)]
pub struct UsState {
    pub code: String,
    pub name: String,
}
