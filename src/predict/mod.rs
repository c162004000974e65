//! Rule application and edge prediction

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod rules;
pub mod runner;


pub use aggregate::{Prediction, PredictionTable};
pub use config::PredictorConfig;
pub use engine::{PredictStats, Predictor, ProgressFn};
pub use rules::GraphRule;
pub use runner::{spawn, PredictHandle};
