pub mod item;
pub mod market;
pub mod product;
pub mod role;
pub mod user;
pub mod user_email;
pub mod user_roles;
