use secrecy::{ExposeSecret, Secret};

const MIN_PASSWORD_LENGTH: usize = 6;

pub struct Password(Secret<String>);

impl Password {
    pub fn parse(s: Secret<String>) -> Result<Password, String> {
        if s.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
            Err(format!(
                "Password must be at least {} characters long.",
                MIN_PASSWORD_LENGTH
            ))
        } else {
            Ok(Self(s))
        }
    }

    pub fn into_secret(self) -> Secret<String> {
        self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}
