pub mod app;
pub mod event_loop;
pub mod lifecycle;
pub mod renderer;
