pub mod config;
pub mod display;
pub mod link_check;
pub mod renderer;
pub mod session;
pub mod sse;
pub mod topic;
pub mod topic_stream;
pub mod transport;
