//! Mock SMS Gateway Implementation
//!
//! A mock implementation of the delivery gateway for development and testing.
//! Messages are logged and recorded instead of sent.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

use otp_core::{DeliveryReport, SmsGatewayTrait};
use otp_shared::phone::mask_phone_number;

/// Reason code reported while failure simulation is on
pub const SIMULATED_FAILURE_CODE: &str = "SMS_SEND_ERROR";

/// A message accepted by the mock gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub phone: String,
    pub message: String,
    pub message_id: String,
}

/// Mock SMS gateway for development and testing
///
/// This implementation:
/// - Logs messages (optionally printing the full text to the console)
/// - Generates `mock_{uuid}` message IDs
/// - Records accepted messages for inspection
/// - Can simulate rejected deliveries
#[derive(Clone)]
pub struct MockSmsGateway {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    simulate_failure: Arc<AtomicBool>,
    console_output: bool,
}

impl MockSmsGateway {
    /// Create a new mock gateway that prints messages to the console
    pub fn new() -> Self {
        Self::with_options(true, false)
    }

    /// Create a mock gateway with configurable options
    pub fn with_options(console_output: bool, simulate_failure: bool) -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            simulate_failure: Arc::new(AtomicBool::new(simulate_failure)),
            console_output,
        }
    }

    /// Enable or disable failure simulation
    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.store(simulate, Ordering::SeqCst);
    }

    /// All messages accepted so far
    pub fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    /// The most recent message accepted for a phone number
    pub fn last_message_to(&self, phone: &str) -> Option<SentMessage> {
        self.sent_messages()
            .into_iter()
            .rev()
            .find(|sent| sent.phone == phone)
    }

    /// Number of messages accepted so far
    pub fn message_count(&self) -> usize {
        self.sent.lock().map(|sent| sent.len()).unwrap_or_default()
    }
}

impl Default for MockSmsGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SmsGatewayTrait for MockSmsGateway {
    async fn send(&self, phone: &str, message: &str) -> Result<DeliveryReport, String> {
        let masked_phone = mask_phone_number(phone);

        if self.simulate_failure.load(Ordering::SeqCst) {
            warn!(
                provider = "mock",
                phone = %masked_phone,
                "Mock SMS gateway simulating failure"
            );
            return Ok(DeliveryReport::failed(SIMULATED_FAILURE_CODE));
        }

        let message_id = format!("mock_{}", Uuid::new_v4());

        if self.console_output {
            println!("\n{}", "=".repeat(60));
            println!("MOCK SMS GATEWAY");
            println!("{}", "=".repeat(60));
            println!("To: {}", phone);
            println!("Message ID: {}", message_id);
            println!("Content: {}", message);
            println!("{}\n", "=".repeat(60));
        }

        info!(
            target: "sms_gateway",
            provider = "mock",
            phone = %masked_phone,
            message_id = %message_id,
            "Mock SMS accepted"
        );

        if let Ok(mut sent) = self.sent.lock() {
            sent.push(SentMessage {
                phone: phone.to_string(),
                message: message.to_string(),
                message_id: message_id.clone(),
            });
        }

        Ok(DeliveryReport::delivered(message_id))
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}
