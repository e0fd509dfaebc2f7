use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}
