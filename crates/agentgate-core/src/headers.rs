use agentgate_protocol::{AuthType, ProviderConfig};

pub type Headers = Vec<(String, String)>;

pub fn header_set(headers: &mut Headers, name: impl Into<String>, value: impl Into<String>) {
    let name = name.into();
    let value = value.into();
    let key = name.to_ascii_lowercase();
    if let Some((_, v)) = headers
        .iter_mut()
        .find(|(k, _)| k.to_ascii_lowercase() == key)
    {
        *v = value;
        return;
    }
    headers.push((name, value));
}

pub fn header_get<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    let key = name.to_ascii_lowercase();
    headers
        .iter()
        .find(|(k, _)| k.to_ascii_lowercase() == key)
        .map(|(_, v)| v.as_str())
}

/// Apply the provider's authentication convention, then its static extra
/// headers. Extra headers come last and may override the auth header
/// (last-write-wins).
pub fn set_provider_headers(headers: &mut Headers, config: Option<&ProviderConfig>, api_key: &str) {
    let Some(config) = config else {
        header_set(headers, "Authorization", format!("Bearer {api_key}"));
        return;
    };

    match config.auth_type {
        // An api-key config without a header name cannot be honored as
        // written; treat it like the bearer default instead of emitting
        // an unsendable empty-named header.
        AuthType::ApiKey if !config.auth_header.is_empty() => {
            header_set(headers, config.auth_header.clone(), api_key);
        }
        AuthType::ApiKey => {
            header_set(headers, "Authorization", format!("Bearer {api_key}"));
        }
        AuthType::Bearer | AuthType::Other => {
            if config.auth_header.is_empty() {
                header_set(headers, "Authorization", format!("Bearer {api_key}"));
            } else {
                header_set(headers, config.auth_header.clone(), format!("Bearer {api_key}"));
            }
        }
    }

    for (name, value) in &config.extra_headers {
        header_set(headers, name.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn no_config_defaults_to_bearer() {
        let mut headers = Headers::new();
        set_provider_headers(&mut headers, None, "sk-1");
        assert_eq!(header_get(&headers, "authorization"), Some("Bearer sk-1"));
    }

    #[test]
    fn api_key_header_carries_raw_key() {
        let config = ProviderConfig {
            auth_type: AuthType::ApiKey,
            auth_header: "x-api-key".to_string(),
            ..ProviderConfig::default()
        };
        let mut headers = Headers::new();
        set_provider_headers(&mut headers, Some(&config), "sk-1");
        assert_eq!(header_get(&headers, "x-api-key"), Some("sk-1"));
        assert_eq!(header_get(&headers, "authorization"), None);
    }

    #[test]
    fn api_key_without_header_name_falls_back_to_bearer() {
        let config = ProviderConfig {
            auth_type: AuthType::ApiKey,
            auth_header: String::new(),
            ..ProviderConfig::default()
        };
        let mut headers = Headers::new();
        set_provider_headers(&mut headers, Some(&config), "sk-1");
        assert_eq!(header_get(&headers, "authorization"), Some("Bearer sk-1"));
        assert!(!headers.iter().any(|(name, _)| name.is_empty()));
    }

    #[test]
    fn bearer_with_custom_header_name() {
        let config = ProviderConfig {
            auth_type: AuthType::Bearer,
            auth_header: "x-auth".to_string(),
            ..ProviderConfig::default()
        };
        let mut headers = Headers::new();
        set_provider_headers(&mut headers, Some(&config), "sk-1");
        assert_eq!(header_get(&headers, "x-auth"), Some("Bearer sk-1"));
    }

    #[test]
    fn unrecognized_auth_type_falls_back_to_bearer() {
        let config: ProviderConfig =
            serde_json::from_str(r#"{"auth_type": "hmac_v9"}"#).unwrap();
        let mut headers = Headers::new();
        set_provider_headers(&mut headers, Some(&config), "sk-1");
        assert_eq!(header_get(&headers, "authorization"), Some("Bearer sk-1"));
    }

    #[test]
    fn extra_headers_apply_last() {
        let config = ProviderConfig {
            auth_type: AuthType::Bearer,
            extra_headers: BTreeMap::from([
                ("Authorization".to_string(), "Bearer override".to_string()),
                ("anthropic-version".to_string(), "2023-06-01".to_string()),
            ]),
            ..ProviderConfig::default()
        };
        let mut headers = Headers::new();
        set_provider_headers(&mut headers, Some(&config), "sk-1");
        assert_eq!(
            header_get(&headers, "authorization"),
            Some("Bearer override")
        );
        assert_eq!(
            header_get(&headers, "anthropic-version"),
            Some("2023-06-01")
        );
    }
}
