use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quotedesk_core::{Aggregate, AggregateId, AggregateRoot, DomainError, TenantId};
use quotedesk_events::Event;

/// Customer identifier (tenant-scoped via `tenant_id` fields in events/commands).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub AggregateId);

impl CustomerId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Customer status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    Active,
    Suspended,
}

/// Contact information for a customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Aggregate root: Customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    id: CustomerId,
    tenant_id: Option<TenantId>,
    name: String,
    contact: ContactInfo,
    status: CustomerStatus,
    version: u64,
    created: bool,
}

impl Customer {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: CustomerId) -> Self {
        Self {
            id,
            tenant_id: None,
            name: String::new(),
            contact: ContactInfo::default(),
            status: CustomerStatus::Active,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> CustomerId {
        self.id
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    pub fn status(&self) -> CustomerStatus {
        self.status
    }

    /// Invariant helper: suspended customers cannot transact.
    pub fn can_transact(&self) -> bool {
        self.status == CustomerStatus::Active
    }
}

impl AggregateRoot for Customer {
    type Id = CustomerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RegisterCustomer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterCustomer {
    pub tenant_id: TenantId,
    pub customer_id: CustomerId,
    pub name: String,
    pub contact: Option<ContactInfo>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateContact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateContact {
    pub tenant_id: TenantId,
    pub customer_id: CustomerId,
    /// Optional new name (if None, keep existing).
    pub name: Option<String>,
    /// Optional new contact info (if None, keep existing).
    pub contact: Option<ContactInfo>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SuspendCustomer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspendCustomer {
    pub tenant_id: TenantId,
    pub customer_id: CustomerId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ReactivateCustomer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactivateCustomer {
    pub tenant_id: TenantId,
    pub customer_id: CustomerId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerCommand {
    RegisterCustomer(RegisterCustomer),
    UpdateContact(UpdateContact),
    SuspendCustomer(SuspendCustomer),
    ReactivateCustomer(ReactivateCustomer),
}

/// Event: CustomerRegistered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRegistered {
    pub tenant_id: TenantId,
    pub customer_id: CustomerId,
    pub name: String,
    pub contact: ContactInfo,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ContactUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactUpdated {
    pub tenant_id: TenantId,
    pub customer_id: CustomerId,
    pub name: Option<String>,
    pub contact: Option<ContactInfo>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CustomerSuspended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSuspended {
    pub tenant_id: TenantId,
    pub customer_id: CustomerId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CustomerReactivated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerReactivated {
    pub tenant_id: TenantId,
    pub customer_id: CustomerId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerEvent {
    CustomerRegistered(CustomerRegistered),
    ContactUpdated(ContactUpdated),
    CustomerSuspended(CustomerSuspended),
    CustomerReactivated(CustomerReactivated),
}

impl Event for CustomerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CustomerEvent::CustomerRegistered(_) => "parties.customer.registered",
            CustomerEvent::ContactUpdated(_) => "parties.customer.contact_updated",
            CustomerEvent::CustomerSuspended(_) => "parties.customer.suspended",
            CustomerEvent::CustomerReactivated(_) => "parties.customer.reactivated",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CustomerEvent::CustomerRegistered(e) => e.occurred_at,
            CustomerEvent::ContactUpdated(e) => e.occurred_at,
            CustomerEvent::CustomerSuspended(e) => e.occurred_at,
            CustomerEvent::CustomerReactivated(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Customer {
    type Command = CustomerCommand;
    type Event = CustomerEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CustomerEvent::CustomerRegistered(e) => {
                self.id = e.customer_id;
                self.tenant_id = Some(e.tenant_id);
                self.name = e.name.clone();
                self.contact = e.contact.clone();
                self.status = CustomerStatus::Active;
                self.created = true;
            }
            CustomerEvent::ContactUpdated(e) => {
                if let Some(name) = &e.name {
                    self.name = name.clone();
                }
                if let Some(contact) = &e.contact {
                    self.contact = contact.clone();
                }
            }
            CustomerEvent::CustomerSuspended(_) => {
                self.status = CustomerStatus::Suspended;
            }
            CustomerEvent::CustomerReactivated(_) => {
                self.status = CustomerStatus::Active;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            CustomerCommand::RegisterCustomer(cmd) => self.handle_register(cmd),
            CustomerCommand::UpdateContact(cmd) => self.handle_update_contact(cmd),
            CustomerCommand::SuspendCustomer(cmd) => self.handle_suspend(cmd),
            CustomerCommand::ReactivateCustomer(cmd) => self.handle_reactivate(cmd),
        }
    }
}

impl Customer {
    fn ensure_tenant(&self, tenant_id: TenantId) -> Result<(), DomainError> {
        if !self.created {
            return Ok(());
        }
        if self.tenant_id != Some(tenant_id) {
            return Err(DomainError::invariant("tenant mismatch"));
        }
        Ok(())
    }

    fn ensure_customer_id(&self, customer_id: CustomerId) -> Result<(), DomainError> {
        if self.id != customer_id {
            return Err(DomainError::invariant("customer_id mismatch"));
        }
        Ok(())
    }

    fn handle_register(&self, cmd: &RegisterCustomer) -> Result<Vec<CustomerEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("customer already exists"));
        }

        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("customer name must not be empty"));
        }

        Ok(vec![CustomerEvent::CustomerRegistered(CustomerRegistered {
            tenant_id: cmd.tenant_id,
            customer_id: cmd.customer_id,
            name: cmd.name.clone(),
            contact: cmd.contact.clone().unwrap_or_default(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update_contact(
        &self,
        cmd: &UpdateContact,
    ) -> Result<Vec<CustomerEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_tenant(cmd.tenant_id)?;
        self.ensure_customer_id(cmd.customer_id)?;

        if let Some(name) = &cmd.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("customer name must not be empty"));
            }
        }

        if cmd.name.is_none() && cmd.contact.is_none() {
            return Err(DomainError::validation("nothing to update"));
        }

        Ok(vec![CustomerEvent::ContactUpdated(ContactUpdated {
            tenant_id: cmd.tenant_id,
            customer_id: cmd.customer_id,
            name: cmd.name.clone(),
            contact: cmd.contact.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_suspend(&self, cmd: &SuspendCustomer) -> Result<Vec<CustomerEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_tenant(cmd.tenant_id)?;
        self.ensure_customer_id(cmd.customer_id)?;

        if self.status == CustomerStatus::Suspended {
            return Err(DomainError::conflict("customer is already suspended"));
        }

        Ok(vec![CustomerEvent::CustomerSuspended(CustomerSuspended {
            tenant_id: cmd.tenant_id,
            customer_id: cmd.customer_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_reactivate(
        &self,
        cmd: &ReactivateCustomer,
    ) -> Result<Vec<CustomerEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_tenant(cmd.tenant_id)?;
        self.ensure_customer_id(cmd.customer_id)?;

        if self.status == CustomerStatus::Active {
            return Err(DomainError::conflict("customer is already active"));
        }

        Ok(vec![CustomerEvent::CustomerReactivated(CustomerReactivated {
            tenant_id: cmd.tenant_id,
            customer_id: cmd.customer_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotedesk_core::AggregateId;

    fn test_tenant_id() -> TenantId {
        TenantId::new()
    }

    fn test_customer_id() -> CustomerId {
        CustomerId::new(AggregateId::new())
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn registered_customer(tenant_id: TenantId, customer_id: CustomerId) -> Customer {
        let mut customer = Customer::empty(customer_id);
        let cmd = RegisterCustomer {
            tenant_id,
            customer_id,
            name: "Acme Corp".to_string(),
            contact: None,
            occurred_at: test_time(),
        };
        let events = customer
            .handle(&CustomerCommand::RegisterCustomer(cmd))
            .unwrap();
        customer.apply(&events[0]);
        customer
    }

    #[test]
    fn register_customer_emits_customer_registered_event() {
        let customer = Customer::empty(test_customer_id());
        let tenant_id = test_tenant_id();
        let customer_id = test_customer_id();
        let cmd = RegisterCustomer {
            tenant_id,
            customer_id,
            name: "Acme Corp".to_string(),
            contact: Some(ContactInfo {
                email: Some("sales@acme.example".to_string()),
                phone: None,
                address: None,
            }),
            occurred_at: test_time(),
        };

        let events = customer
            .handle(&CustomerCommand::RegisterCustomer(cmd))
            .unwrap();
        assert_eq!(events.len(), 1);

        match &events[0] {
            CustomerEvent::CustomerRegistered(e) => {
                assert_eq!(e.tenant_id, tenant_id);
                assert_eq!(e.customer_id, customer_id);
                assert_eq!(e.name, "Acme Corp");
                assert_eq!(e.contact.email.as_deref(), Some("sales@acme.example"));
            }
            _ => panic!("Expected CustomerRegistered event"),
        }
    }

    #[test]
    fn cannot_register_with_empty_name() {
        let customer = Customer::empty(test_customer_id());
        let cmd = RegisterCustomer {
            tenant_id: test_tenant_id(),
            customer_id: test_customer_id(),
            name: "   ".to_string(),
            contact: None,
            occurred_at: test_time(),
        };

        let err = customer
            .handle(&CustomerCommand::RegisterCustomer(cmd))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn suspended_customer_cannot_transact() {
        let tenant_id = test_tenant_id();
        let customer_id = test_customer_id();
        let mut customer = registered_customer(tenant_id, customer_id);
        assert!(customer.can_transact());

        let cmd = SuspendCustomer {
            tenant_id,
            customer_id,
            occurred_at: test_time(),
        };
        let events = customer
            .handle(&CustomerCommand::SuspendCustomer(cmd))
            .unwrap();
        customer.apply(&events[0]);

        assert_eq!(customer.status(), CustomerStatus::Suspended);
        assert!(!customer.can_transact());
    }

    #[test]
    fn suspend_is_not_idempotent() {
        let tenant_id = test_tenant_id();
        let customer_id = test_customer_id();
        let mut customer = registered_customer(tenant_id, customer_id);

        let cmd = SuspendCustomer {
            tenant_id,
            customer_id,
            occurred_at: test_time(),
        };
        let events = customer
            .handle(&CustomerCommand::SuspendCustomer(cmd.clone()))
            .unwrap();
        customer.apply(&events[0]);

        let err = customer
            .handle(&CustomerCommand::SuspendCustomer(cmd))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn update_contact_replaces_only_provided_fields() {
        let tenant_id = test_tenant_id();
        let customer_id = test_customer_id();
        let mut customer = registered_customer(tenant_id, customer_id);

        let cmd = UpdateContact {
            tenant_id,
            customer_id,
            name: None,
            contact: Some(ContactInfo {
                email: Some("billing@acme.example".to_string()),
                phone: Some("+1 555 0100".to_string()),
                address: None,
            }),
            occurred_at: test_time(),
        };
        let events = customer
            .handle(&CustomerCommand::UpdateContact(cmd))
            .unwrap();
        customer.apply(&events[0]);

        assert_eq!(customer.name(), "Acme Corp");
        assert_eq!(
            customer.contact().email.as_deref(),
            Some("billing@acme.example")
        );
    }

    #[test]
    fn tenant_mismatch_is_rejected() {
        let tenant_id = test_tenant_id();
        let customer_id = test_customer_id();
        let customer = registered_customer(tenant_id, customer_id);

        let cmd = SuspendCustomer {
            tenant_id: test_tenant_id(),
            customer_id,
            occurred_at: test_time(),
        };
        let err = customer
            .handle(&CustomerCommand::SuspendCustomer(cmd))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }
}
