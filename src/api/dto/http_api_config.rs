#[derive(Clone, Debug)]
pub struct HttpApiConfig {
    /// Backend base URL without a trailing slash, e.g. `https://api.shop.example/api/v1`
    pub base_url: String,
    /// Opaque bearer token forwarded on every call
    pub token: String,
}
