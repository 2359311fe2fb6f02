//! REST API
//!
//! - `POST /predict`: classify one email
//! - `POST /train`: retrain from labelled emails and swap the live model
//! - `GET /health`: liveness and model status

pub mod handlers;
pub mod server;

pub use handlers::ApiError;
pub use server::{router, ApiServer};
