#[macro_use]
pub mod logger;
#[macro_use]
pub mod i18n;

pub mod app;
pub mod canvas;
pub mod cli;
pub mod colour;
pub mod components;
pub mod input;
pub mod layout;
pub mod present;
pub mod settings;
