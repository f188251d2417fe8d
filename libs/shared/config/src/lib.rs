use std::env;
use tracing::warn;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_key: Option<String>,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_service_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                .ok()
                .filter(|key| !key.is_empty()),
            bind_addr: env::var("CLINIC_BIND_ADDR")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_BIND_ADDR not set, using default");
                    DEFAULT_BIND_ADDR.to_string()
                }),
        };

        if !config.is_configured() {
            warn!("Record store not configured - clinic data will be kept in memory only");
        }

        config
    }

    /// True when a PostgREST endpoint is available for the record store.
    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
    }

    /// Bearer token for store requests; the service key wins over the anon key.
    pub fn store_token(&self) -> &str {
        self.supabase_service_key
            .as_deref()
            .unwrap_or(&self.supabase_anon_key)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            supabase_service_key: None,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_not_configured() {
        let config = AppConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
    }

    #[test]
    fn test_store_token_prefers_service_key() {
        let mut config = AppConfig {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "anon".to_string(),
            ..AppConfig::default()
        };
        assert!(config.is_configured());
        assert_eq!(config.store_token(), "anon");

        config.supabase_service_key = Some("service".to_string());
        assert_eq!(config.store_token(), "service");
    }
}
