pub mod account;
pub mod events;
pub mod user;

pub use account::*;
pub use events::*;
pub use user::*;
