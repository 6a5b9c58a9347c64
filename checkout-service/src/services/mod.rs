pub mod metrics;
pub mod orders;
pub mod pricing;
pub mod razorpay;
pub mod resend;
pub mod shiprocket;
pub mod verification;

pub use metrics::{get_metrics, init_metrics};
pub use razorpay::RazorpayClient;
pub use resend::ResendClient;
pub use shiprocket::ShiprocketClient;
pub use verification::PaymentVerifier;
