#[derive(thiserror::Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(String),

    #[error("{backend} returned HTTP {status}: {body}")]
    BackendStatus {
        backend: String,
        status: u16,
        body: String,
    },

    #[error("Failed to parse {backend} response: {reason}")]
    InvalidResponse { backend: String, reason: String },

    #[error("{0} returned no completions")]
    EmptyResponse(String),
}
