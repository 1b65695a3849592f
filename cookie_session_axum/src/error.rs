use cookie_session::SessionError;
use http::StatusCode;

/// Helper trait for converting errors to a standard response error format
pub trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)>;
}

/// Missing sessions are unauthorized, unverifiable cookies are bad requests,
/// everything else is a server-side problem.
impl<T> IntoResponseError<T> for Result<T, SessionError> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| {
            let status = match e {
                SessionError::NotFound(_) => StatusCode::UNAUTHORIZED,
                SessionError::Decode(_) => StatusCode::BAD_REQUEST,
                SessionError::Encode(_) | SessionError::Cookie(_) | SessionError::Config(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            (status, e.to_string())
        })
    }
}
