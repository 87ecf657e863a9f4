pub mod admin;
pub mod championships;
pub mod likes;
pub mod players;
pub mod votes;
