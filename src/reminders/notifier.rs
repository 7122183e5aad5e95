use crate::domain::UserEmail;
use crate::email::Email;
use crate::reminders::{DueSubscription, ReminderLabel, ReminderNotifier};
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ReminderLinks {
    pub account_settings: String,
    pub support: String,
}

impl ReminderLinks {
    pub fn from_base_url(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        Self {
            account_settings: format!("{}/settings", base_url),
            support: format!("{}/support", base_url),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReminderEmail {
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

impl ReminderEmail {
    pub fn render(
        label: ReminderLabel,
        subscription: &DueSubscription,
        links: &ReminderLinks,
    ) -> ReminderEmail {
        let days = label.days_before();
        let user_name = subscription.owner_name.as_deref().unwrap_or("there");
        let renewal_date = subscription.renewal_date.format("%b %-d, %Y").to_string();
        let price = format!(
            "{} {:.2} ({})",
            subscription.currency, subscription.price, subscription.frequency
        );
        let when = match days {
            1 => "tomorrow".to_string(),
            days => format!("in {} days", days),
        };

        let subject = match days {
            1 => format!("⚡ Final Reminder: {} Renews Tomorrow!", subscription.name),
            2 => format!("⏰ {} Renews in 2 Days", subscription.name),
            days => format!(
                "📅 Reminder: Your {} Subscription Renews in {} Days!",
                subscription.name, days
            ),
        };

        let html_body = format!(
            "<p>Hello <strong>{user_name}</strong>,</p>\
            <p>Your <strong>{name}</strong> subscription is set to renew on \
            <strong>{renewal_date}</strong> ({when}).</p>\
            <table>\
            <tr><td>Plan</td><td>{name}</td></tr>\
            <tr><td>Price</td><td>{price}</td></tr>\
            <tr><td>Payment Method</td><td>{payment_method}</td></tr>\
            </table>\
            <p>If you'd like to make changes or cancel your subscription, please visit your \
            <a href=\"{settings}\">account settings</a> before the renewal date.</p>\
            <p>Need help? <a href=\"{support}\">Contact our support team</a>.</p>",
            user_name = escape_html(user_name),
            name = escape_html(&subscription.name),
            renewal_date = renewal_date,
            when = when,
            price = escape_html(&price),
            payment_method = escape_html(&subscription.payment_method),
            settings = links.account_settings,
            support = links.support,
        );

        let text_body = format!(
            "Hello {user_name},\n\n\
            Your {name} subscription is set to renew on {renewal_date} ({when}).\n\n\
            Plan: {name}\n\
            Price: {price}\n\
            Payment Method: {payment_method}\n\n\
            To make changes or cancel, visit {settings} before the renewal date.\n\
            Need help? {support}",
            user_name = user_name,
            name = subscription.name,
            renewal_date = renewal_date,
            when = when,
            price = price,
            payment_method = subscription.payment_method,
            settings = links.account_settings,
            support = links.support,
        );

        ReminderEmail {
            subject,
            html_body,
            text_body,
        }
    }
}

fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

pub struct EmailReminderNotifier {
    email_client: Arc<dyn Email>,
    links: ReminderLinks,
}

impl EmailReminderNotifier {
    pub fn new(email_client: Arc<dyn Email>, links: ReminderLinks) -> Self {
        Self {
            email_client,
            links,
        }
    }
}

#[async_trait]
impl ReminderNotifier for EmailReminderNotifier {
    #[tracing::instrument(
        name = "Send a renewal reminder email",
        skip(self, recipient, subscription),
        fields(subscription_id = %subscription.id, reminder = %label)
    )]
    async fn send_reminder(
        &self,
        recipient: &UserEmail,
        label: ReminderLabel,
        subscription: &DueSubscription,
    ) -> Result<(), anyhow::Error> {
        let email = ReminderEmail::render(label, subscription, &self.links);
        self.email_client
            .send_email(
                recipient.clone(),
                &email.subject,
                &email.html_body,
                &email.text_body,
            )
            .await
    }
}
