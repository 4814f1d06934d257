use reqwest::Client;
use tracing::warn;

const DISABLE_SYSTEM_PROXY_ENV: &str = "GEMCHAT_DISABLE_SYSTEM_PROXY";

pub(crate) fn build_http_client() -> Client {
    if !should_disable_system_proxy() {
        return Client::new();
    }

    match Client::builder().no_proxy().build() {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "Failed to build proxy-less HTTP client, using defaults");
            Client::new()
        }
    }
}

fn should_disable_system_proxy() -> bool {
    if std::env::var_os(DISABLE_SYSTEM_PROXY_ENV).is_some() {
        return true;
    }

    cfg!(test)
}
