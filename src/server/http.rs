//! Minimal HTTP/1.1 request parsing and response encoding.
//!
//! One request per connection; the server always answers with
//! `Connection: close`.

use super::error::ApiError;
use crate::constants::MAX_REQUEST_BYTES;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    /// Path without the query string.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Request {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The body as JSON. An empty body reads as `{}`.
    pub fn json_body(&self) -> Result<Value, ApiError> {
        if self.body.is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        serde_json::from_slice(&self.body)
            .map_err(|_| ApiError::BadRequest("invalid JSON body".to_string()))
    }
}

/// Outcome of trying to parse a (possibly partial) request buffer.
#[derive(Debug, PartialEq, Eq)]
pub enum ParseStatus {
    Complete(Request),
    /// More bytes are needed.
    Incomplete,
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Parse a request from the bytes read so far.
pub fn parse_request(buf: &[u8]) -> Result<ParseStatus, ApiError> {
    let Some(header_end) = find_header_end(buf) else {
        if buf.len() > MAX_REQUEST_BYTES {
            return Err(ApiError::PayloadTooLarge);
        }
        return Ok(ParseStatus::Incomplete);
    };

    let head = std::str::from_utf8(&buf[..header_end])
        .map_err(|_| ApiError::BadRequest("malformed request".to_string()))?;
    let mut lines = head.split("\r\n");

    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(target), Some(version)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(ApiError::BadRequest("malformed request line".to_string()));
    };
    if !version.starts_with("HTTP/1.") {
        return Err(ApiError::BadRequest("unsupported HTTP version".to_string()));
    }

    let mut headers = Vec::new();
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            return Err(ApiError::BadRequest("malformed header".to_string()));
        };
        headers.push((name.trim().to_string(), value.trim().to_string()));
    }

    let content_length = match headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
    {
        Some((_, value)) => value
            .parse::<usize>()
            .map_err(|_| ApiError::BadRequest("invalid content-length".to_string()))?,
        None => 0,
    };
    if content_length > MAX_REQUEST_BYTES {
        return Err(ApiError::PayloadTooLarge);
    }

    let body_start = header_end + 4;
    if buf.len() < body_start + content_length {
        return Ok(ParseStatus::Incomplete);
    }

    let path = target.split('?').next().unwrap_or(target).to_string();
    Ok(ParseStatus::Complete(Request {
        method: method.to_ascii_uppercase(),
        path,
        headers,
        body: buf[body_start..body_start + content_length].to_vec(),
    }))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Response {
    pub fn json(status: u16, value: &Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: value.to_string().into_bytes(),
        }
    }

    pub fn html(body: &str) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn from_error(error: &ApiError) -> Self {
        Self::json(
            error.status(),
            &serde_json::json!({ "error": error.public_message() }),
        )
    }

    /// Body parsed back as JSON (used by tests and the client).
    pub fn json_body(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.status,
            reason_phrase(self.status),
            self.content_type,
            self.body.len()
        )
        .into_bytes();
        out.extend_from_slice(&self.body);
        out
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(buf: &[u8]) -> Request {
        match parse_request(buf).expect("parse should succeed") {
            ParseStatus::Complete(req) => req,
            ParseStatus::Incomplete => panic!("request should be complete"),
        }
    }

    #[test]
    fn test_parse_get() {
        let req = complete(b"GET /api/highscore?x=1 HTTP/1.1\r\nHost: localhost\r\n\r\n");
        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/api/highscore");
        assert_eq!(req.header("host"), Some("localhost"));
        assert!(req.body.is_empty());
    }

    #[test]
    fn test_parse_post_with_body() {
        let raw = b"POST /api/highscore HTTP/1.1\r\n\
            Content-Type: application/json\r\n\
            Content-Length: 12\r\n\
            Authorization: Bearer t0k\r\n\r\n\
            {\"score\":42}";
        let req = complete(raw);
        assert_eq!(req.method, "POST");
        assert_eq!(req.header("AUTHORIZATION"), Some("Bearer t0k"));
        assert_eq!(req.json_body().unwrap()["score"], 42);
    }

    #[test]
    fn test_partial_requests_are_incomplete() {
        assert_eq!(
            parse_request(b"GET / HTTP/1.1\r\nHost: x").unwrap(),
            ParseStatus::Incomplete
        );
        assert_eq!(
            parse_request(b"POST /api/posts HTTP/1.1\r\nContent-Length: 10\r\n\r\n{\"te").unwrap(),
            ParseStatus::Incomplete
        );
    }

    #[test]
    fn test_malformed_requests() {
        assert_eq!(
            parse_request(b"NONSENSE\r\n\r\n").unwrap_err().status(),
            400
        );
        assert_eq!(
            parse_request(b"GET / HTTP/1.1\r\nbadheader\r\n\r\n")
                .unwrap_err()
                .status(),
            400
        );
        assert_eq!(
            parse_request(b"POST / HTTP/1.1\r\nContent-Length: lots\r\n\r\n")
                .unwrap_err()
                .status(),
            400
        );
    }

    #[test]
    fn test_oversized_request_rejected() {
        let raw = format!(
            "POST / HTTP/1.1\r\nContent-Length: {}\r\n\r\n",
            MAX_REQUEST_BYTES + 1
        );
        assert_eq!(
            parse_request(raw.as_bytes()).unwrap_err().status(),
            413
        );
    }

    #[test]
    fn test_empty_body_reads_as_empty_object() {
        let req = complete(b"POST /api/logout HTTP/1.1\r\n\r\n");
        let body = req.json_body().unwrap();
        assert!(body.as_object().is_some_and(|o| o.is_empty()));
    }

    #[test]
    fn test_invalid_json_body_rejected() {
        let req = complete(b"POST /api/register HTTP/1.1\r\nContent-Length: 3\r\n\r\nabc");
        let err = req.json_body().unwrap_err();
        assert_eq!(err.status(), 400);
        assert_eq!(err.public_message(), "invalid JSON body");
    }

    #[test]
    fn test_response_encoding() {
        let resp = Response::json(404, &serde_json::json!({ "error": "not found" }));
        let text = String::from_utf8(resp.to_bytes()).unwrap();
        assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(text.contains("Content-Type: application/json\r\n"));
        assert!(text.contains("Content-Length: 21\r\n"));
        assert!(text.ends_with("\r\n\r\n{\"error\":\"not found\"}"));
    }
}
