use actix_web::{
  body::{EitherBody, MessageBody},
  dev::{ServiceRequest, ServiceResponse},
  middleware::Next,
  web,
  ResponseError
};
use log::{error, warn};
use super::error::Error;
use super::AppState;

// An actix guard would only make the route not match
// (and 404), admin routes need a real 401 so this is a
// middleware. Wrapped handlers never run without a valid
// admin cookie.
pub async fn require_admin<B: MessageBody>(
  req: ServiceRequest,
  next: Next<B>
) -> Result<ServiceResponse<EitherBody<B>>, actix_web::Error> {
  let status = match req.app_data::<web::Data<AppState>>() {
    Some(app_state) => app_state.authenticator.authorize(req.request()),
    None => {
      error!("AppState missing from the app data, SHOULD NEVER HAPPEN");
      let response = Error::InternalServerError("Missing app state".to_string())
        .error_response();
      return Ok(req.into_response(response).map_into_right_body());
    }
  };

  if !status.is_authorized() {
    warn!("Rejected {:?} admin credential for {} {}", status, req.method(), req.path());
    let response = Error::Unauthorized("failed to authenticate".to_string())
      .error_response();
    return Ok(req.into_response(response).map_into_right_body());
  }

  next.call(req)
    .await
    .map(ServiceResponse::map_into_left_body)
}
