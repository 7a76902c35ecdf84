pub mod clothes;
pub mod food;
pub mod user;

pub use clothes::Clothes;
pub use food::Food;
pub use user::User;
