//! Environment lifecycle state machine.
//!
//! Every operation resolves its profile first. Create and delete then make one
//! provisioning attempt and only touch the registry once that attempt has
//! succeeded, so a registry record never outlives or precedes a confirmed
//! provisioning result. A registry write that fails after provisioning
//! succeeded is reported as a failure and left for operators to reconcile.

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};

use crate::contract::{parse_request, EnvironmentRequest, QueryParameters};
use crate::envelope::{normalize, Envelope};
use crate::error::LifecycleError;
use crate::profile::resolve_profile;
use crate::provisioning::ProvisioningGateway;
use crate::registry::{EnvironmentKey, EnvironmentRecord, RegistryStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedEnvironment {
    pub name: String,
    pub endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletedEnvironment {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentListing {
    pub profile: String,
    pub environments: Vec<EnvironmentRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    Created(CreatedEnvironment),
    Deleted(DeletedEnvironment),
    Listed(EnvironmentListing),
}

/// Owns the registry store and provisioning gateway for the life of the
/// process; both are injected at startup.
pub struct LifecycleManager<S, G> {
    store: S,
    gateway: G,
}

impl<S, G> LifecycleManager<S, G>
where
    S: RegistryStore,
    G: ProvisioningGateway,
{
    pub fn new(store: S, gateway: G) -> Self {
        Self { store, gateway }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Single entry point for every transport: validate, execute, normalize.
    pub fn handle(&self, resource: &str, parameters: Option<&QueryParameters>) -> Envelope {
        normalize(parse_request(resource, parameters).and_then(|request| self.execute(&request)))
    }

    pub fn execute(&self, request: &EnvironmentRequest) -> Result<OperationOutcome, LifecycleError> {
        match request {
            EnvironmentRequest::Create {
                profile,
                name,
                image_uri,
            } => self
                .create(name, image_uri, profile)
                .map(OperationOutcome::Created),
            EnvironmentRequest::Delete { profile, name } => {
                self.delete(name, profile).map(OperationOutcome::Deleted)
            }
            EnvironmentRequest::List { profile } => self.list(profile).map(OperationOutcome::Listed),
        }
    }

    pub fn create(
        &self,
        name: &str,
        image_uri: &str,
        profile_name: &str,
    ) -> Result<CreatedEnvironment, LifecycleError> {
        let profile = resolve_profile(&self.store, profile_name)?;

        let provisioned = self
            .gateway
            .create(name, image_uri, &profile)
            .map_err(|provisioning_error| {
                error!(
                    profile = profile_name,
                    environment = name,
                    error = %provisioning_error,
                    "environment provisioning failed"
                );
                LifecycleError::Provisioning(provisioning_error.to_string())
            })?;

        let record = EnvironmentRecord {
            profile: profile_name.to_string(),
            name: name.to_string(),
            endpoint: provisioned.endpoint.clone(),
            last_updated_time: Utc::now(),
        };
        self.store.put_environment(&record).map_err(|store_error| {
            error!(
                profile = profile_name,
                environment = name,
                endpoint = %provisioned.endpoint,
                error = %store_error,
                "environment provisioned but registry write failed"
            );
            LifecycleError::RegistryWrite(store_error.to_string())
        })?;

        info!(
            profile = profile_name,
            environment = name,
            endpoint = %provisioned.endpoint,
            "environment created"
        );
        Ok(CreatedEnvironment {
            name: name.to_string(),
            endpoint: provisioned.endpoint,
        })
    }

    pub fn delete(&self, name: &str, profile_name: &str) -> Result<DeletedEnvironment, LifecycleError> {
        let profile = resolve_profile(&self.store, profile_name)?;

        self.gateway.delete(name, &profile).map_err(|provisioning_error| {
            error!(
                profile = profile_name,
                environment = name,
                error = %provisioning_error,
                "environment teardown failed"
            );
            LifecycleError::Provisioning(provisioning_error.to_string())
        })?;

        self.store
            .delete_environment(&EnvironmentKey::new(profile_name, name))
            .map_err(|store_error| {
                error!(
                    profile = profile_name,
                    environment = name,
                    error = %store_error,
                    "environment torn down but registry delete failed"
                );
                LifecycleError::RegistryWrite(store_error.to_string())
            })?;

        info!(profile = profile_name, environment = name, "environment deleted");
        Ok(DeletedEnvironment {
            name: name.to_string(),
        })
    }

    pub fn list(&self, profile_name: &str) -> Result<EnvironmentListing, LifecycleError> {
        resolve_profile(&self.store, profile_name)?;

        let environments = self
            .store
            .list_environments(profile_name)
            .map_err(|store_error| LifecycleError::RegistryRead(store_error.to_string()))?;

        Ok(EnvironmentListing {
            profile: profile_name.to_string(),
            environments,
        })
    }
}
