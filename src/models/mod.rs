pub mod grading;

pub use grading::{GradeResult, GradedPaper, GradingRequest, PaperImage};
