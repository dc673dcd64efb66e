use serde::{Deserialize, Serialize};

/// A request for the host to change the slice in effect.
///
/// `slice: None` means "no slicing"; any other value is an expression that validated against the
/// session's shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SliceRequest {
    pub slice: Option<String>,
}

impl SliceRequest {
    pub fn slice(expression: impl Into<String>) -> Self {
        Self {
            slice: Some(expression.into()),
        }
    }

    /// Request that slicing be removed.
    pub const fn clear() -> Self {
        Self { slice: None }
    }

    #[inline]
    pub fn is_clear(&self) -> bool {
        self.slice.is_none()
    }
}

/// Receives slice requests from a [`SliceControl`](crate::SliceControl).
///
/// Implemented for any `FnMut(SliceRequest)` closure.
pub trait SliceRequestHandler {
    fn handle_slice_request(&mut self, request: SliceRequest);
}

impl<F> SliceRequestHandler for F
where
    F: FnMut(SliceRequest),
{
    fn handle_slice_request(&mut self, request: SliceRequest) {
        self(request)
    }
}

/// A handler that records every request it receives, in order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestLog {
    requests: Vec<SliceRequest>,
}

impl RequestLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> &[SliceRequest] {
        &self.requests
    }

    pub fn last(&self) -> Option<&SliceRequest> {
        self.requests.last()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Remove and return everything recorded so far.
    pub fn take(&mut self) -> Vec<SliceRequest> {
        std::mem::take(&mut self.requests)
    }
}

impl SliceRequestHandler for RequestLog {
    fn handle_slice_request(&mut self, request: SliceRequest) {
        self.requests.push(request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_serialize_with_null_for_clear() {
        assert_eq!(
            serde_json::to_string(&SliceRequest::slice("[0, :]")).unwrap(),
            r#"{"slice":"[0, :]"}"#
        );
        assert_eq!(
            serde_json::to_string(&SliceRequest::clear()).unwrap(),
            r#"{"slice":null}"#
        );
    }

    #[test]
    fn closures_are_handlers() {
        let mut seen = Vec::new();
        {
            let mut handler = |request: SliceRequest| seen.push(request);
            handler.handle_slice_request(SliceRequest::clear());
        }
        assert_eq!(seen, vec![SliceRequest::clear()]);
    }
}
