use secrecy::ExposeSecret;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use url::Url;

use crate::client::config::Config;
use crate::error::Result;

pub fn endpoint(config: &Config) -> String {
    format!(
        "{}/ws/google.ai.generativelanguage.{}.GenerativeService.BidiGenerateContent",
        config.base_url(),
        config.api_version()
    )
}

pub fn build_request(config: &Config) -> Result<Request> {
    let mut url = Url::parse(&endpoint(config))?;
    url.query_pairs_mut()
        .append_pair("key", config.api_key().expose_secret());
    Ok(url.as_str().into_client_request()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_request_targets_versioned_bidi_endpoint() {
        let config = Config::builder()
            .with_base_url("wss://example.test/")
            .with_api_key("secret-key")
            .build();

        let request = build_request(&config).unwrap();
        assert_eq!(
            request.uri().to_string(),
            "wss://example.test/ws/google.ai.generativelanguage.v1alpha.GenerativeService.BidiGenerateContent?key=secret-key"
        );
    }

    #[test]
    fn test_api_key_is_percent_encoded() {
        let config = Config::builder()
            .with_base_url("wss://example.test")
            .with_api_key("a+b/c=d&e f")
            .build();

        let request = build_request(&config).unwrap();
        assert_eq!(request.uri().query(), Some("key=a%2Bb%2Fc%3Dd%26e+f"));
    }

    #[test]
    fn test_malformed_base_url_is_rejected() {
        let config = Config::builder()
            .with_base_url("not a url")
            .with_api_key("secret-key")
            .build();

        assert!(matches!(build_request(&config), Err(Error::Url(_))));
    }
}
