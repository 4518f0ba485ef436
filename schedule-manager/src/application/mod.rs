pub mod calendar_surface;
pub mod commands;
pub mod dto;
