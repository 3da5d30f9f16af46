mod session;
mod todo;
mod token;
mod user;

pub use session::*;
pub use todo::*;
pub use token::*;
pub use user::*;
