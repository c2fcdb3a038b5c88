use crate::channel::{ChannelError, ChannelSender};
use crate::contact::AlertContact;
use crate::formatter::MessageFormatter;
use crate::message::DeviceMessage;
use async_trait::async_trait;
use tracing::info;

/// Characters of the SMS text shown in the log
const SMS_PREVIEW_CHARS: usize = 50;

/// Formats SMS text and logs it instead of calling a gateway
#[derive(Debug, Clone, Copy, Default)]
pub struct SmsOutbox;

#[async_trait]
impl ChannelSender for SmsOutbox {
    async fn send(
        &self,
        message: &DeviceMessage,
        contact: &AlertContact,
    ) -> Result<(), ChannelError> {
        if contact.phone.is_empty() {
            return Err(ChannelError::MissingRecipient {
                contact: contact.name.clone(),
                field: "phone",
            });
        }

        let text = MessageFormatter::sms(message);
        let preview: String = text.chars().take(SMS_PREVIEW_CHARS).collect();
        info!("SMS to {} ({}): {}...", contact.name, contact.phone, preview);
        Ok(())
    }
}

/// Formats e-mail content and logs the subject instead of sending
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailOutbox;

#[async_trait]
impl ChannelSender for EmailOutbox {
    async fn send(
        &self,
        message: &DeviceMessage,
        contact: &AlertContact,
    ) -> Result<(), ChannelError> {
        if contact.email.is_empty() {
            return Err(ChannelError::MissingRecipient {
                contact: contact.name.clone(),
                field: "email",
            });
        }

        let content = MessageFormatter::email(message)?;
        info!("Email to {} ({}): {}", contact.name, contact.email, content.subject);
        Ok(())
    }
}
