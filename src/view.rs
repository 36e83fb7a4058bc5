pub mod components;
pub mod screens;
