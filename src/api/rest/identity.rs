//! Caller identity from gateway headers.

use crate::domain::value_objects::{Identity, OrganizationId, SubjectId};
use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use std::convert::Infallible;

/// Header carrying the authenticated subject.
pub const SUBJECT_HEADER: &str = "x-subject-id";

/// Header carrying the organization the subject acts for.
pub const ORGANIZATION_HEADER: &str = "x-organization-id";

/// Extracted caller identity. Missing or blank headers yield a guest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestIdentity(pub Identity);

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl RequestIdentity {
    /// Reads the identity headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let subject = header(headers, SUBJECT_HEADER).map(SubjectId::new);
        // An organization without a subject is ignored.
        let organization = subject
            .as_ref()
            .and(header(headers, ORGANIZATION_HEADER))
            .map(OrganizationId::new);
        Self(Identity { subject, organization })
    }
}

impl<S> FromRequestParts<S> for RequestIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_subject_and_organization() {
        let mut headers = HeaderMap::new();
        headers.insert(SUBJECT_HEADER, HeaderValue::from_static("user-1"));
        headers.insert(ORGANIZATION_HEADER, HeaderValue::from_static("org-1"));
        let RequestIdentity(identity) = RequestIdentity::from_headers(&headers);
        assert_eq!(identity, Identity::user("user-1").with_organization("org-1"));
    }

    #[test]
    fn blank_or_missing_is_guest() {
        let mut headers = HeaderMap::new();
        headers.insert(SUBJECT_HEADER, HeaderValue::from_static("  "));
        headers.insert(ORGANIZATION_HEADER, HeaderValue::from_static("org-1"));
        let RequestIdentity(identity) = RequestIdentity::from_headers(&headers);
        assert!(identity.is_guest());
        assert!(identity.organization.is_none());
    }
}
