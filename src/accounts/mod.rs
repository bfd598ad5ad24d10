pub mod admin;
pub mod approval;
pub mod login;
pub mod signup;
