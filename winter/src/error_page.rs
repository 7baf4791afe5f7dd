use askama::Template;

use crate::{Result, StatusCode};

#[derive(Debug, Template)]
#[template(path = "error.html")]
struct ErrorPageTemplate<'a> {
    status: u16,
    title: String,
    message: &'a str,
    details: Option<&'static str>,
}

/// Renders the HTML page sent with an error response.
pub(crate) fn render_error_page(status: StatusCode, message: &str) -> Result<String> {
    Ok(ErrorPageTemplate {
        status: status.as_u16(),
        title: error_title(status),
        message,
        details: error_details(status),
    }
    .render()?)
}

fn error_title(status: StatusCode) -> String {
    match status {
        StatusCode::NOT_FOUND => "404 - Page Not Found".to_owned(),
        StatusCode::METHOD_NOT_ALLOWED => "405 - Method Not Allowed".to_owned(),
        StatusCode::FORBIDDEN => "403 - Forbidden".to_owned(),
        StatusCode::INTERNAL_SERVER_ERROR => "500 - Internal Server Error".to_owned(),
        _ => format!("{} - Error", status.as_u16()),
    }
}

fn error_details(status: StatusCode) -> Option<&'static str> {
    match status {
        StatusCode::NOT_FOUND => Some(
            "The page you're looking for might have been removed or is temporarily unavailable.",
        ),
        StatusCode::METHOD_NOT_ALLOWED => {
            Some("The requested method is not allowed for this resource.")
        }
        StatusCode::FORBIDDEN => Some("You don't have permission to access this resource."),
        StatusCode::INTERNAL_SERVER_ERROR => {
            Some("An unexpected error occurred on our server. We're working on it!")
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_page() {
        let html =
            render_error_page(StatusCode::NOT_FOUND, "Resource not found for URL: /x").unwrap();

        assert!(html.contains("<title>Error 404</title>"));
        assert!(html.contains("404 - Page Not Found"));
        assert!(html.contains("Resource not found for URL: /x"));
        assert!(html.contains("might have been removed"));
    }

    #[test]
    fn message_is_escaped() {
        let html = render_error_page(StatusCode::FORBIDDEN, "<script>").unwrap();

        assert!(html.contains("403 - Forbidden"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn other_status_has_generic_title() {
        let html = render_error_page(StatusCode::BAD_GATEWAY, "upstream").unwrap();

        assert!(html.contains("502 - Error"));
        assert!(!html.contains("class=\"details\""));
    }
}
