pub mod api_key;
pub mod app;
pub mod apply;
pub mod config;
pub mod debounce;
pub mod engine;
pub mod llm;
pub mod matcher;
pub mod paths;
pub mod score;
pub mod semantic;
pub mod session;
pub mod strategy;
pub mod terms;
pub mod text;
