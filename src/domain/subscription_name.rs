use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone)]
pub struct SubscriptionName(String);

impl SubscriptionName {
    pub fn parse(s: String) -> Result<SubscriptionName, String> {
        let s = s.trim().to_string();
        let length = s.graphemes(true).count();
        if (2..=50).contains(&length) {
            Ok(Self(s))
        } else {
            Err(format!(
                "Subscription name must be between 2 and 50 characters, got {}.",
                length
            ))
        }
    }
}

impl AsRef<str> for SubscriptionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
