mod new_user;
mod password;
mod price;
mod role;
mod subscription_details;
mod subscription_fields;
mod subscription_name;
mod user_email;
mod user_name;

pub use new_user::NewUser;
pub use password::Password;
pub use price::Price;
pub use role::Role;
pub use subscription_details::{SubscriptionDetails, SubscriptionDraft, SubscriptionPatch};
pub use subscription_fields::{Category, Currency, Frequency, PaymentMethod, SubscriptionStatus};
pub use subscription_name::SubscriptionName;
pub use user_email::UserEmail;
pub use user_name::UserName;
