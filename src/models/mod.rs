pub mod diagnostics;
pub mod error;
pub mod health;
pub mod poi;
pub mod rating;
pub mod user;

pub use diagnostics::*;
pub use error::*;
pub use health::*;
pub use poi::*;
pub use rating::*;
pub use user::*;
