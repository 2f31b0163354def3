use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use courier_core::access::AccessError;
use courier_order::WorkflowError;
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    Workflow(WorkflowError),
    Anyhow(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Workflow(err) => (status_for(&err), err.to_string()),
            ApiError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

fn status_for(err: &WorkflowError) -> StatusCode {
    match err {
        WorkflowError::Unauthorized => StatusCode::UNAUTHORIZED,
        WorkflowError::Forbidden => StatusCode::FORBIDDEN,
        WorkflowError::InvalidState { .. } => StatusCode::CONFLICT,
        WorkflowError::NoValidOrder(_) => StatusCode::NOT_FOUND,
        WorkflowError::NoActiveClaim => StatusCode::CONFLICT,
        WorkflowError::InsufficientPayment { .. } => StatusCode::PAYMENT_REQUIRED,
        WorkflowError::EmptyOrder => StatusCode::BAD_REQUEST,
        WorkflowError::InvalidVerificationCode => StatusCode::BAD_REQUEST,
        WorkflowError::Store(_) => StatusCode::NOT_FOUND,
        WorkflowError::Access(AccessError::Unauthorized) => StatusCode::FORBIDDEN,
        WorkflowError::Access(AccessError::AlreadyRegistered(_)) => StatusCode::CONFLICT,
        WorkflowError::Catalog(_) => StatusCode::BAD_REQUEST,
        WorkflowError::Escrow(err) => {
            // The workflow's state checks make these unreachable; reaching
            // one means the ledger and the store disagree
            tracing::error!("escrow inconsistency: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        Self::Workflow(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Anyhow(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&WorkflowError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(&WorkflowError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            status_for(&WorkflowError::NoValidOrder("No valid order found in client queue")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&WorkflowError::InsufficientPayment { required: 100, provided: 1 }),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            status_for(&WorkflowError::Access(AccessError::AlreadyRegistered("alice".into()))),
            StatusCode::CONFLICT
        );
    }
}
