pub mod health;
pub mod sgf;
