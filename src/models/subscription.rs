use crate::domain::{
    Category, Currency, Frequency, PaymentMethod, Price, SubscriptionDetails, SubscriptionName,
    SubscriptionStatus,
};
use crate::schema::subscriptions;
use chrono::offset::Utc;
use chrono::{DateTime, NaiveDate};

#[derive(Queryable, serde::Serialize, Debug, Clone)]
pub struct Subscription {
    pub id: uuid::Uuid,
    pub user_id: uuid::Uuid,
    pub name: String,
    pub price: f64,
    pub currency: String,
    pub frequency: String,
    pub category: String,
    pub payment_method: String,
    pub status: String,
    pub start_date: NaiveDate,
    pub renewal_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Re-validates a stored row so it can be patched.
    pub fn details(&self) -> Result<SubscriptionDetails, String> {
        Ok(SubscriptionDetails {
            name: SubscriptionName::parse(self.name.clone())?,
            price: Price::parse(self.price)?,
            currency: Currency::parse(&self.currency)?,
            frequency: Frequency::parse(&self.frequency)?,
            category: Category::parse(&self.category)?,
            payment_method: PaymentMethod::parse(&self.payment_method)?,
            status: SubscriptionStatus::parse(&self.status)?,
            start_date: self.start_date,
            renewal_date: self.renewal_date,
        })
    }
}

#[derive(Insertable)]
#[diesel(table_name = subscriptions)]
pub struct NewSubscription<'a> {
    pub id: &'a uuid::Uuid,
    pub user_id: &'a uuid::Uuid,
    pub name: &'a str,
    pub price: f64,
    pub currency: &'a str,
    pub frequency: &'a str,
    pub category: &'a str,
    pub payment_method: &'a str,
    pub status: &'a str,
    pub start_date: &'a NaiveDate,
    pub renewal_date: &'a NaiveDate,
    pub created_at: &'a DateTime<Utc>,
    pub updated_at: &'a DateTime<Utc>,
}

#[derive(AsChangeset)]
#[diesel(table_name = subscriptions)]
pub struct SubscriptionChanges<'a> {
    pub name: &'a str,
    pub price: f64,
    pub currency: &'a str,
    pub frequency: &'a str,
    pub category: &'a str,
    pub payment_method: &'a str,
    pub status: &'a str,
    pub start_date: &'a NaiveDate,
    pub renewal_date: &'a NaiveDate,
    pub updated_at: &'a DateTime<Utc>,
}

impl<'a> SubscriptionChanges<'a> {
    pub fn from_details(details: &'a SubscriptionDetails, updated_at: &'a DateTime<Utc>) -> Self {
        Self {
            name: details.name.as_ref(),
            price: details.price.value(),
            currency: details.currency.as_str(),
            frequency: details.frequency.as_str(),
            category: details.category.as_str(),
            payment_method: details.payment_method.as_str(),
            status: details.status.as_str(),
            start_date: &details.start_date,
            renewal_date: &details.renewal_date,
            updated_at,
        }
    }
}
