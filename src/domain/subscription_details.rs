use crate::domain::{
    Category, Currency, Frequency, PaymentMethod, Price, SubscriptionName, SubscriptionStatus,
};
use chrono::NaiveDate;

/// Unvalidated input for a new subscription.
#[derive(Debug, Clone)]
pub struct SubscriptionDraft {
    pub name: String,
    pub price: f64,
    pub currency: Option<String>,
    pub frequency: String,
    pub category: String,
    pub payment_method: String,
    pub status: Option<String>,
    pub start_date: NaiveDate,
    pub renewal_date: Option<NaiveDate>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionPatch {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub frequency: Option<String>,
    pub category: Option<String>,
    pub payment_method: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub renewal_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct SubscriptionDetails {
    pub name: SubscriptionName,
    pub price: Price,
    pub currency: Currency,
    pub frequency: Frequency,
    pub category: Category,
    pub payment_method: PaymentMethod,
    pub status: SubscriptionStatus,
    pub start_date: NaiveDate,
    pub renewal_date: NaiveDate,
}

impl SubscriptionDetails {
    /// Validates a draft submitted on `today`.
    ///
    /// A missing renewal date is derived from the billing frequency, and a
    /// renewal date already in the past marks the subscription as expired.
    pub fn create(draft: SubscriptionDraft, today: NaiveDate) -> Result<Self, String> {
        if draft.start_date < today {
            return Err("Payment start date cannot be in the past.".into());
        }
        let frequency = Frequency::parse(&draft.frequency)?;
        let renewal_date = match draft.renewal_date {
            Some(renewal_date) if renewal_date <= draft.start_date => {
                return Err("Payment renewal date must be after start date.".into())
            }
            Some(renewal_date) => renewal_date,
            None => draft
                .start_date
                .checked_add_signed(frequency.period())
                .ok_or_else(|| "Payment renewal date is out of range.".to_string())?,
        };
        let details = Self {
            name: SubscriptionName::parse(draft.name)?,
            price: Price::parse(draft.price)?,
            currency: match draft.currency {
                Some(currency) => Currency::parse(&currency)?,
                None => Currency::default(),
            },
            frequency,
            category: Category::parse(&draft.category)?,
            payment_method: PaymentMethod::parse(&draft.payment_method)?,
            status: match draft.status {
                Some(status) => SubscriptionStatus::parse(&status)?,
                None => SubscriptionStatus::default(),
            },
            start_date: draft.start_date,
            renewal_date,
        };
        Ok(details.expire_if_lapsed(today))
    }

    pub fn apply(self, patch: SubscriptionPatch, today: NaiveDate) -> Result<Self, String> {
        let details = Self {
            name: match patch.name {
                Some(name) => SubscriptionName::parse(name)?,
                None => self.name,
            },
            price: match patch.price {
                Some(price) => Price::parse(price)?,
                None => self.price,
            },
            currency: match patch.currency {
                Some(currency) => Currency::parse(&currency)?,
                None => self.currency,
            },
            frequency: match patch.frequency {
                Some(frequency) => Frequency::parse(&frequency)?,
                None => self.frequency,
            },
            category: match patch.category {
                Some(category) => Category::parse(&category)?,
                None => self.category,
            },
            payment_method: match patch.payment_method {
                Some(method) => PaymentMethod::parse(&method)?,
                None => self.payment_method,
            },
            status: match patch.status {
                Some(status) => SubscriptionStatus::parse(&status)?,
                None => self.status,
            },
            start_date: patch.start_date.unwrap_or(self.start_date),
            renewal_date: patch.renewal_date.unwrap_or(self.renewal_date),
        };
        if details.renewal_date < details.start_date {
            return Err("Payment renewal date must not precede start date.".into());
        }
        Ok(details.expire_if_lapsed(today))
    }

    fn expire_if_lapsed(mut self, today: NaiveDate) -> Self {
        if self.renewal_date < today {
            self.status = SubscriptionStatus::Expired;
        }
        self
    }
}
