pub mod badge_renderer;
pub mod grade_parser;
pub mod llm_service;
pub mod mock_model;

pub use badge_renderer::BadgeRenderer;
pub use grade_parser::parse_grade_response;
pub use llm_service::{LlmService, VisionModel};
pub use mock_model::MockVisionModel;
