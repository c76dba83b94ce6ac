//! Success envelope.
//!
//! Every successful JSON response is `{ "data": ... }`; errors use the
//! `{ "error", "code" }` shape from [`crate::error`].

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
