use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

use super::ProviderError;

const TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) fn client() -> Result<Client, ProviderError> {
    let client = Client::builder()
        .timeout(TIMEOUT)
        .user_agent(concat!("miqat/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

pub(crate) fn trim_base(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// GET `url` and decode the JSON body. Any non-2xx status is an error.
pub(crate) fn get_json<T: DeserializeOwned>(
    client: &Client,
    service: &'static str,
    url: &str,
    query: &[(&str, String)],
) -> Result<T, ProviderError> {
    debug!("{} GET {}", service, url);
    let response = client.get(url).query(query).send()?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Status {
            service,
            status: status.as_u16(),
        });
    }

    let text = response.text()?;
    serde_json::from_str(&text).map_err(|e| ProviderError::Decode {
        service,
        message: e.to_string(),
    })
}
