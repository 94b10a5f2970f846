use async_trait::async_trait;
use reqwest::{Request, Response};

/// Minimal HTTP execution seam.
///
/// The CO-OPS client is generic over this trait so tests can substitute a
/// canned-response implementation without touching the network.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
