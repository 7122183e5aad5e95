use crate::domain::{Password, UserEmail, UserName};

#[derive(Debug)]
pub struct NewUser {
    pub name: UserName,
    pub email: UserEmail,
    pub password: Password,
}
