//! Wire-level response envelope shared by every transport.
//!
//! Status codes below 400 render as `"ok"`, everything else as `"error"`.
//! Transports must hand the envelope back without reshaping it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FailureKind, LifecycleError};
use crate::lifecycle::OperationOutcome;

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_NOT_IMPLEMENTED: u16 = 501;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeBody {
    pub status: EnvelopeStatus,
    pub message: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub status_code: u16,
    pub body: EnvelopeBody,
}

impl Envelope {
    pub fn new(status_code: u16, message: impl Into<String>, fields: Map<String, Value>) -> Self {
        let status = if status_code >= 400 {
            EnvelopeStatus::Error
        } else {
            EnvelopeStatus::Ok
        };
        Self {
            status_code,
            body: EnvelopeBody {
                status,
                message: message.into(),
                fields,
            },
        }
    }

    pub fn from_error(error: &LifecycleError) -> Self {
        Self::new(status_code_for(error.kind()), error.to_string(), Map::new())
    }

    pub fn body_json(&self) -> String {
        serde_json::to_string(&self.body).expect("envelope body should serialize")
    }
}

pub fn status_code_for(kind: FailureKind) -> u16 {
    match kind {
        FailureKind::InputValidation => STATUS_BAD_REQUEST,
        FailureKind::ProfileMissing => STATUS_NOT_FOUND,
        FailureKind::ProfileMalformed
        | FailureKind::InvalidEncoding
        | FailureKind::TableNotReady
        | FailureKind::RegistryReadFailure
        | FailureKind::ProvisioningFailure
        | FailureKind::RegistryWriteFailure => STATUS_NOT_IMPLEMENTED,
    }
}

pub fn normalize(outcome: Result<OperationOutcome, LifecycleError>) -> Envelope {
    match outcome {
        Ok(OperationOutcome::Created(created)) => {
            Envelope::new(STATUS_OK, "successfully created", object_fields(&created))
        }
        Ok(OperationOutcome::Deleted(deleted)) => {
            Envelope::new(STATUS_OK, "successfully deleted", object_fields(&deleted))
        }
        Ok(OperationOutcome::Listed(listing)) => {
            Envelope::new(STATUS_OK, "successfully listed", object_fields(&listing))
        }
        Err(error) => Envelope::from_error(&error),
    }
}

fn object_fields(value: &impl Serialize) -> Map<String, Value> {
    match serde_json::to_value(value) {
        Ok(Value::Object(fields)) => fields,
        _ => Map::new(),
    }
}
