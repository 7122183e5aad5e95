use crate::domain::Role;
use crate::schema::users;
use chrono::offset::Utc;
use chrono::DateTime;

#[derive(Queryable, serde::Serialize, Debug, Clone)]
pub struct User {
    #[serde(rename = "id")]
    pub user_id: uuid::Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Unknown roles never grant more than a regular user gets.
    pub fn role(&self) -> Role {
        Role::parse(&self.role).unwrap_or_default()
    }
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRecord<'a> {
    pub user_id: &'a uuid::Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub created_at: &'a DateTime<Utc>,
}
