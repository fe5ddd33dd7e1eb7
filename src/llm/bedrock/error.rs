use aws_sdk_bedrockruntime::config::http::HttpResponse;
use aws_sdk_bedrockruntime::error::{DisplayErrorContext, SdkError};
use aws_sdk_bedrockruntime::operation::converse::ConverseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BedrockError {
    #[error("Bedrock API error: Authentication error - {0}")]
    AuthenticationError(String),

    #[error("Bedrock API error: Network error - {0}")]
    NetworkError(String),

    #[error("Bedrock API error: Model not found - {0}")]
    ModelNotFoundError(String),

    #[error("Bedrock API error: Model Unavailable - {0}")]
    ModelUnavailableError(String),

    #[error("Bedrock API error: Model error - {0}")]
    ModelError(String),

    #[error("Bedrock API error: Timeout - {0}")]
    TimeoutError(String),

    #[error("Bedrock API error: Internal error - {0}")]
    InternalError(String),

    #[error("Bedrock API error: System error - {0}")]
    SystemError(String),

    #[error("Bedrock API error: Throttling - {0}")]
    ThrottlingError(String),

    #[error("Bedrock API error: Validation error - {0}")]
    ValidationError(String),

    #[error("Bedrock request could not be built - {0}")]
    RequestBuildError(String),
}

impl BedrockError {
    fn from_service_error(error: ConverseError) -> Self {
        fn message(message: Option<&str>, fallback: &str) -> String {
            message.unwrap_or(fallback).to_string()
        }

        match error {
            ConverseError::AccessDeniedException(e) => Self::AuthenticationError(message(
                e.message(),
                "You do not have sufficient permissions to invoke this model.",
            )),
            ConverseError::ResourceNotFoundException(e) => Self::ModelNotFoundError(message(
                e.message(),
                "The specified model was not found.",
            )),
            ConverseError::ModelNotReadyException(e) => Self::ModelUnavailableError(message(
                e.message(),
                "The model is not ready to serve inference requests.",
            )),
            ConverseError::ServiceUnavailableException(e) => Self::ModelUnavailableError(
                message(e.message(), "The service isn't currently available."),
            ),
            ConverseError::ModelErrorException(e) => Self::ModelError(message(
                e.message(),
                "The request failed due to an error while processing the model.",
            )),
            ConverseError::ModelTimeoutException(e) => Self::TimeoutError(message(
                e.message(),
                "Processing time exceeded the model timeout length.",
            )),
            ConverseError::ThrottlingException(e) => Self::ThrottlingError(message(
                e.message(),
                "The request exceeded the account quotas for Amazon Bedrock.",
            )),
            ConverseError::ValidationException(e) => Self::ValidationError(message(
                e.message(),
                "The input fails to satisfy the constraints specified by Amazon Bedrock.",
            )),
            ConverseError::InternalServerException(e) => Self::InternalError(message(
                e.message(),
                "An internal server error occurred.",
            )),
            other => Self::SystemError(other.to_string()),
        }
    }
}

impl From<SdkError<ConverseError, HttpResponse>> for BedrockError {
    fn from(error: SdkError<ConverseError, HttpResponse>) -> Self {
        match error {
            SdkError::ServiceError(context) => Self::from_service_error(context.into_err()),
            SdkError::TimeoutError(_) => {
                Self::TimeoutError("The request did not complete in time.".to_string())
            }
            other => Self::NetworkError(DisplayErrorContext(&other).to_string()),
        }
    }
}
