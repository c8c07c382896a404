//! SeaORM entities for the directory: users, categories, businesses and the
//! engagement, billing and messaging rows hanging off them.
pub mod errors;
pub mod db;
pub mod user;
pub mod category;
pub mod business;
pub mod business_like;
pub mod business_comment;
pub mod subscription;
pub mod message;
pub mod notification;

pub use business::BusinessStatus;
pub use subscription::SubscriptionStatus;
