pub mod errors;
pub mod model;
pub mod prediction;
pub mod tensor;
pub mod ui;
pub mod upload;
