pub mod dto;
pub mod heuristic;
pub mod mock_model;
pub mod model_service;
pub mod ports;
pub mod predictor;
pub mod preprocess;
pub mod services;

#[cfg(test)]
pub mod test_support;
