#[derive(Clone, Debug)]
pub struct TabBroadcasterConfig {
    /// Same-origin channel name shared by every tab of the storefront
    pub channel: String,
}
