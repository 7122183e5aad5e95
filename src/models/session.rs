use crate::schema::sessions;
use chrono::offset::Utc;
use chrono::DateTime;

#[derive(Queryable)]
pub struct Session {
    pub token: String,
    pub user_id: uuid::Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

#[derive(Insertable)]
#[diesel(table_name = sessions)]
pub struct NewSession<'a> {
    pub token: &'a str,
    pub user_id: &'a uuid::Uuid,
    pub created_at: &'a DateTime<Utc>,
    pub expires_at: &'a DateTime<Utc>,
}
