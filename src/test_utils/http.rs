use axum::{
    body::Body,
    http::{StatusCode, header::CONTENT_TYPE},
    response::Response,
};

#[track_caller]
pub(crate) fn assert_status_ok(response: &Response<Body>) {
    let status = response.status();

    assert_eq!(status, StatusCode::OK, "want 200 OK, got {status}");
}

#[track_caller]
pub(crate) fn assert_content_type(response: &Response<Body>, content_type: &str) {
    assert_eq!(get_header(response, CONTENT_TYPE.as_str()), content_type);
}

#[track_caller]
pub(crate) fn get_header(response: &Response<Body>, header_name: &str) -> String {
    match response.headers().get(header_name) {
        Some(value) => value
            .to_str()
            .expect("Header value is not visible ASCII")
            .to_owned(),
        None => panic!("Headers missing {header_name}, got {:?}", response.headers()),
    }
}

/// Check for the header htmx uses to navigate after a form post.
#[track_caller]
pub(crate) fn assert_hx_redirect(response: &Response<Body>, endpoint: &str) {
    assert_eq!(get_header(response, "hx-redirect"), endpoint);
}
