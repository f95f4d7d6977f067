use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::scrape::FetchError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("analysis not found")]
    NotFound,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidUrl(_) | AppError::Fetch(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::InvalidUrl(_) => json!({
                "message": "Please enter a valid URL starting with http:// or https://"
            }),
            AppError::Fetch(e) => json!({
                "message": "Unable to access the website. Please check the URL and try again.",
                "details": e.to_string()
            }),
            AppError::NotFound => json!({ "message": "Analysis not found" }),
            AppError::Internal(_) => json!({
                "message": "An error occurred while analyzing the website. Please try again later."
            }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
