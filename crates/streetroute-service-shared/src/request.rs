//! Request types and validation for HTTP endpoints.

use serde::{Deserialize, Serialize};
use streetroute_lib::Coordinate;

use crate::ProblemDetails;

/// Validation trait for request types.
///
/// Implementations should validate all fields and return a `ProblemDetails`
/// error for invalid input.
pub trait Validate {
    /// Validate the request, returning an error if invalid.
    ///
    /// The `request_id` is used to populate the `instance` field of any
    /// returned `ProblemDetails`.
    ///
    /// Returns a boxed `ProblemDetails` to avoid large `Result::Err` variants.
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

/// Query parameters of `GET /api/route`.
///
/// Fields are optional so that a missing parameter surfaces as a problem
/// document from [`Validate`] rather than a bare extractor rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteQuery {
    pub start_lat: Option<f64>,
    pub start_lon: Option<f64>,
    pub end_lat: Option<f64>,
    pub end_lon: Option<f64>,
}

impl RouteQuery {
    pub fn new(start_lat: f64, start_lon: f64, end_lat: f64, end_lon: f64) -> Self {
        Self {
            start_lat: Some(start_lat),
            start_lon: Some(start_lon),
            end_lat: Some(end_lat),
            end_lon: Some(end_lon),
        }
    }

    fn fields(&self) -> [(&'static str, Option<f64>); 4] {
        [
            ("start_lat", self.start_lat),
            ("start_lon", self.start_lon),
            ("end_lat", self.end_lat),
            ("end_lon", self.end_lon),
        ]
    }

    /// Start coordinate, if both components are present.
    pub fn start(&self) -> Option<Coordinate> {
        Some(Coordinate::new(self.start_lat?, self.start_lon?))
    }

    /// End coordinate, if both components are present.
    pub fn end(&self) -> Option<Coordinate> {
        Some(Coordinate::new(self.end_lat?, self.end_lon?))
    }
}

impl Validate for RouteQuery {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        for (name, value) in self.fields() {
            match value {
                None => {
                    return Err(Box::new(ProblemDetails::bad_request(
                        format!("The '{}' query parameter is required", name),
                        request_id,
                    )));
                }
                Some(v) if !v.is_finite() => {
                    return Err(Box::new(ProblemDetails::bad_request(
                        format!("The '{}' query parameter must be a finite number", name),
                        request_id,
                    )));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}
