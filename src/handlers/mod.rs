// handlers - route handlers grouped by the gate that protects them
//
// Public:   auth, register, health
// Login:    profile
// Approved: users (directory, profiles, employers)
// Admin:    admin::*

pub mod admin;
pub mod auth;
pub mod forms;
pub mod health;
pub mod profile;
pub mod register;
pub mod users;
