pub mod api; // HTTP surface: router, server lifecycle, endpoints
pub mod config;
pub mod llm; // Generative model abstraction + Gemini client
pub mod models;
pub mod pipeline; // Four-stage processing pipeline + worker pool
pub mod render;
pub mod store;
