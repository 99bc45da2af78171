use actix_web::{
  error::ResponseError,
  http::StatusCode,
  HttpResponse
};
use derive_more::Display;
use log::{error, warn};
use crate::db::entities::ValidationError;

// The full message of the server-side variants is never
// shown to clients (could be SQL, file paths...), it only
// goes to the logs. Client errors can show theirs.
#[derive(Debug, Display)]
pub enum Error {
  #[display(fmt = "Internal Server Error")]
  InternalServerError(String),
  #[display(fmt = "Database Error")]
  DatabaseError(String),
  #[display(fmt = "Template Error")]
  TemplateError(String),
  #[display(fmt = "Unauthorized: {}", _0)]
  Unauthorized(String),
  #[display(fmt = "Not Found: {}", _0)]
  NotFound(String),
  #[display(fmt = "Bad Request: {}", _0)]
  BadRequest(String)
}

// Plain text for error responses, htmx shows nothing
// for error statuses anyway.
impl ResponseError for Error {
  fn status_code(&self) -> StatusCode {
    match self {
      Error::InternalServerError(_)
        | Error::DatabaseError(_)
        | Error::TemplateError(_) => StatusCode::INTERNAL_SERVER_ERROR,
      Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      Error::NotFound(_) => StatusCode::NOT_FOUND,
      Error::BadRequest(_) => StatusCode::BAD_REQUEST
    }
  }

  fn error_response(&self) -> HttpResponse {
    HttpResponse::build(self.status_code())
      .content_type("text/plain; charset=utf-8")
      .body(self.to_string())
  }
}

// Database functions return eyre reports. Validation
// problems are the client's fault, anything else is ours.
pub fn map_db_error(e: eyre::Report) -> Error {
  match e.downcast_ref::<ValidationError>() {
    Some(validation_error) => {
      warn!("Rejected article data - {}", validation_error);
      Error::BadRequest(validation_error.to_string())
    },
    None => {
      error!("Database error - {:?}", e);
      Error::DatabaseError(e.to_string())
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use eyre::eyre;

  #[test]
  fn validation_errors_are_bad_requests() {
    let err = map_db_error(eyre::Report::new(ValidationError::EmptyField("title")));
    assert_eq!(StatusCode::BAD_REQUEST, err.status_code());
    assert!(err.to_string().contains("title"));
  }

  #[test]
  fn other_errors_hide_their_cause() {
    let err = map_db_error(eyre!("no such column: slugg in SELECT slugg FROM articles"));
    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, err.status_code());
    assert_eq!("Database Error", err.to_string());
  }
}
