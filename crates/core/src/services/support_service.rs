use chrono::NaiveDateTime;
use tracing::info;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::support::{SupportTicket, TicketForm, TicketStatus};

/// The support form: validation and the stored ticket list.
pub struct SupportService;

impl SupportService {
    pub fn new() -> Self {
        Self
    }

    pub fn submit(
        &self,
        tickets: &mut Vec<SupportTicket>,
        form: TicketForm,
        now: NaiveDateTime,
    ) -> Result<Uuid, CoreError> {
        let mut missing = Vec::new();
        for (field, value) in [
            ("name", &form.name),
            ("email", &form.email),
            ("subject", &form.subject),
            ("message", &form.message),
        ] {
            if value.trim().is_empty() {
                missing.push(field);
            }
        }
        if !missing.is_empty() {
            return Err(CoreError::Validation(format!(
                "Please fill in: {}",
                missing.join(", ")
            )));
        }
        let email = form.email.trim();
        if !email.contains('@') {
            return Err(CoreError::Validation(format!("Invalid email address '{email}'")));
        }

        let ticket = SupportTicket {
            id: Uuid::new_v4(),
            name: form.name.trim().to_string(),
            email: email.to_string(),
            subject: form.subject.trim().to_string(),
            message: form.message.trim().to_string(),
            priority: form.priority,
            status: TicketStatus::Open,
            created_at: now,
        };
        info!(id = %ticket.id, priority = ?ticket.priority, "support ticket submitted");
        let id = ticket.id;
        tickets.push(ticket);
        Ok(id)
    }

    pub fn resolve(&self, tickets: &mut [SupportTicket], id: Uuid) -> Result<(), CoreError> {
        let ticket = tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::TicketNotFound(id.to_string()))?;
        ticket.status = TicketStatus::Resolved;
        Ok(())
    }

    #[must_use]
    pub fn open_tickets<'a>(&self, tickets: &'a [SupportTicket]) -> Vec<&'a SupportTicket> {
        tickets
            .iter()
            .filter(|t| t.status == TicketStatus::Open)
            .collect()
    }
}

impl Default for SupportService {
    fn default() -> Self {
        Self::new()
    }
}
