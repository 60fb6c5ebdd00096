//! Test doubles shared by unit and integration tests across the workspace.

use std::sync::Mutex;

use crate::profile::Profile;
use crate::provisioning::{
    DecommissionedEnvironment, ProvisionedEnvironment, ProvisioningError, ProvisioningGateway,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Create {
        name: String,
        image_uri: String,
        profile: String,
    },
    Delete {
        name: String,
        profile: String,
    },
}

/// Gateway that records every call and answers with `{name}.{domain}`
/// endpoints, or with a configured failure.
#[derive(Debug)]
pub struct RecordingGateway {
    domain: String,
    calls: Mutex<Vec<GatewayCall>>,
    failure: Mutex<Option<String>>,
}

impl RecordingGateway {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            calls: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
        }
    }

    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock().expect("poisoned mutex") = Some(message.into());
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().expect("poisoned mutex").clone()
    }

    fn outcome(&self) -> Result<(), ProvisioningError> {
        match self.failure.lock().expect("poisoned mutex").as_ref() {
            Some(message) => Err(ProvisioningError::new(message.clone())),
            None => Ok(()),
        }
    }
}

impl ProvisioningGateway for RecordingGateway {
    fn create(
        &self,
        name: &str,
        image_uri: &str,
        profile: &Profile,
    ) -> Result<ProvisionedEnvironment, ProvisioningError> {
        self.calls
            .lock()
            .expect("poisoned mutex")
            .push(GatewayCall::Create {
                name: name.to_string(),
                image_uri: image_uri.to_string(),
                profile: profile.name.clone(),
            });
        self.outcome()?;
        Ok(ProvisionedEnvironment {
            name: name.to_string(),
            endpoint: format!("{name}.{}", self.domain),
        })
    }

    fn delete(
        &self,
        name: &str,
        profile: &Profile,
    ) -> Result<DecommissionedEnvironment, ProvisioningError> {
        self.calls
            .lock()
            .expect("poisoned mutex")
            .push(GatewayCall::Delete {
                name: name.to_string(),
                profile: profile.name.clone(),
            });
        self.outcome()?;
        Ok(DecommissionedEnvironment {
            name: name.to_string(),
        })
    }
}
