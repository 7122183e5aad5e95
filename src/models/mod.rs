mod session;
mod subscription;
mod user;

pub use session::*;
pub use subscription::*;
pub use user::*;
