use crate::config::Config;

const USER_AGENT_DEFAULT: &str = concat!("moviematch/", env!("CARGO_PKG_VERSION"));

/// Shared async client for the outbound services.
pub fn build_client(config: &Config) -> anyhow::Result<reqwest::Client> {
    let mut client = reqwest::Client::builder()
        .user_agent(USER_AGENT_DEFAULT)
        .timeout(config.request_timeout())
        .pool_idle_timeout(config.request_timeout());

    if let Some(proxy) = config.proxy.as_deref().filter(|p| !p.is_empty()) {
        log::debug!("using proxy {proxy:?}");
        client = client.proxy(reqwest::Proxy::all(proxy)?);
    }

    Ok(client.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_client_default() {
        assert!(build_client(&Config::default()).is_ok());
    }

    #[test]
    fn test_build_client_rejects_bad_proxy() {
        let config = Config {
            proxy: Some("::not a proxy::".to_string()),
            ..Default::default()
        };
        assert!(build_client(&config).is_err());
    }
}
