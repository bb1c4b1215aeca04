use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use log::{error, info};
use serde::Serialize;
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::{Filter, Rejection, Reply};

use super::routes;
use super::types::ApiError;
use crate::error_handling::types::{AuthError, NotifyError, PortalError, WebError, WorkflowError};
use crate::notify::EmailDispatcher;
use crate::workflow::PortalService;

/// JSON overhead allowed on top of the base64-encoded files of one request.
const BODY_OVERHEAD: u64 = 256 * 1024;
/// Submissions carry up to three files; base64 grows them by a third.
const FILES_PER_BODY: u64 = 4;

/// Web server for the portal HTTP API and its static pages
pub struct WebServer {
    portal: Arc<PortalService>,
    email: Arc<EmailDispatcher>,
    body_limit: u64,
}

impl WebServer {
    pub fn new(portal: Arc<PortalService>, email: Arc<EmailDispatcher>) -> Self {
        let body_limit = portal.limits.max_upload_bytes as u64 * FILES_PER_BODY + BODY_OVERHEAD;
        Self { portal, email, body_limit }
    }

    /// Every route, with rejections turned into JSON errors.
    pub fn routes(&self) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
        routes::static_routes()
            .or(routes::auth_routes(self.portal.clone()))
            .unify()
            .or(routes::student_routes(self.portal.clone(), self.body_limit))
            .unify()
            .or(routes::faculty_routes(self.portal.clone()))
            .unify()
            .or(routes::tracking_route(self.portal.clone()))
            .unify()
            .or(routes::notification_routes(self.portal.clone()))
            .unify()
            .or(routes::email_route(self.email.clone()))
            .unify()
            .or(routes::files_route(self.portal.clone()))
            .unify()
            .recover(handle_rejection)
    }

    /// Start the web server on the given address
    pub async fn start(&self, addr: SocketAddr) -> Result<(), WebError> {
        // warp panics when it cannot bind, so check the address first.
        std::net::TcpListener::bind(addr).map_err(|e| {
            error!("Cannot bind web server to {}: {}", addr, e);
            WebError::BindFailed(format!("{}: {}", addr, e))
        })?;

        info!("Web interface listening on http://{}", addr);
        warp::serve(self.routes()).run(addr).await;
        Ok(())
    }
}

/// HTTP status for a failed portal operation.
pub fn status_for(err: &PortalError) -> StatusCode {
    match err {
        PortalError::Validation(_) => StatusCode::BAD_REQUEST,
        PortalError::NotFound(_) => StatusCode::NOT_FOUND,
        PortalError::Auth(
            AuthError::MissingSession | AuthError::SessionExpired | AuthError::InvalidCredentials,
        ) => StatusCode::UNAUTHORIZED,
        PortalError::Auth(AuthError::EmailTaken) => StatusCode::CONFLICT,
        PortalError::Auth(_) => StatusCode::FORBIDDEN,
        PortalError::Workflow(WorkflowError::Conflict(_)) => StatusCode::CONFLICT,
        PortalError::Workflow(_) => StatusCode::FORBIDDEN,
        PortalError::Notify(NotifyError::InvalidMessage(_)) => StatusCode::BAD_REQUEST,
        PortalError::Notify(_) => StatusCode::BAD_GATEWAY,
        PortalError::Storage(_)
        | PortalError::ObjectStore(_)
        | PortalError::Letter(_)
        | PortalError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_response(err: &PortalError) -> Response {
    let status = status_for(err);
    if status.is_server_error() {
        error!("Request failed: {}", err);
    }
    reply::with_status(
        reply::json(&ApiError {
            message: err.to_string(),
        }),
        status,
    )
    .into_response()
}

pub fn json_response<T: Serialize>(result: Result<T, PortalError>, status: StatusCode) -> Response {
    match result {
        Ok(value) => reply::with_status(reply::json(&value), status).into_response(),
        Err(e) => error_response(&e),
    }
}

pub fn empty_response(result: Result<(), PortalError>) -> Response {
    match result {
        Ok(()) => reply::with_status(reply::reply(), StatusCode::NO_CONTENT).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Turns warp rejections into the same `{ "message" }` payload as handler errors.
pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, format!("Invalid request body: {}", e))
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        (StatusCode::BAD_REQUEST, "Invalid query string".to_string())
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Request body is too large".to_string())
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, "Content-Length header is required".to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else {
        error!("Unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
    };
    Ok(reply::with_status(reply::json(&ApiError { message }), status).into_response())
}
