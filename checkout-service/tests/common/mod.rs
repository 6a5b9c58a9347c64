use checkout_service::config::{
    Config, CorsConfig, ObservabilityConfig, RazorpayConfig, ResendConfig, ServerConfig,
    ShiprocketConfig,
};
use checkout_service::services::{init_metrics, pricing::PricingRules};
use checkout_service::Application;
use secrecy::Secret;
use wiremock::MockServer;

pub const TEST_KEY_SECRET: &str = "test_key_secret";
pub const TEST_WEBHOOK_SECRET: &str = "test_webhook_secret";

pub struct TestApp {
    pub address: String,
    pub port: u16,
    /// Stands in for Razorpay, Shiprocket and Resend.
    pub upstream: MockServer,
    pub client: reqwest::Client,
}

pub fn test_config(upstream_uri: &str) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Random port
        },
        razorpay: RazorpayConfig {
            key_id: "rzp_test_key".to_string(),
            key_secret: Secret::new(TEST_KEY_SECRET.to_string()),
            webhook_secret: Secret::new(TEST_WEBHOOK_SECRET.to_string()),
            api_base_url: upstream_uri.to_string(),
        },
        shiprocket: ShiprocketConfig {
            email: "ops@example.com".to_string(),
            password: Secret::new("shiprocket-password".to_string()),
            api_base_url: upstream_uri.to_string(),
            token_ttl_secs: 3600,
        },
        resend: ResendConfig {
            api_key: Secret::new("re_test_key".to_string()),
            api_base_url: upstream_uri.to_string(),
            from_email: "Storefront <newsletter@example.com>".to_string(),
        },
        pricing: PricingRules::default(),
        cors: CorsConfig::default(),
        observability: ObservabilityConfig {
            log_level: "debug".to_string(),
            otlp_endpoint: None,
        },
        service_name: "checkout-service-test".to_string(),
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        let upstream = MockServer::start().await;
        Self::spawn_with_config(test_config(&upstream.uri()), upstream).await
    }

    pub async fn spawn_with_config(config: Config, upstream: MockServer) -> Self {
        init_metrics();

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            upstream,
            client,
        }
    }

    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request")
    }
}
