use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::LifecycleError;
use crate::registry::PROFILE_NAMESPACE;

pub const CREATE_RESOURCE: &str = "/api/v1/create";
pub const DELETE_RESOURCE: &str = "/api/v1/delete";
pub const LIST_RESOURCE: &str = "/api/v1/list";
pub const DEFAULT_PROFILE: &str = "default";

pub const PROFILE_PARAM: &str = "profile";
pub const NAME_PARAM: &str = "name";
pub const IMAGE_URI_PARAM: &str = "image_uri";

/// Query parameters as delivered by either transport. Event payloads may carry
/// explicit `null` values, hence the inner `Option`.
pub type QueryParameters = BTreeMap<String, Option<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Delete,
    List,
}

impl Operation {
    pub fn from_resource(resource: &str) -> Option<Self> {
        match resource {
            CREATE_RESOURCE => Some(Self::Create),
            DELETE_RESOURCE => Some(Self::Delete),
            LIST_RESOURCE => Some(Self::List),
            _ => None,
        }
    }

    pub fn resource(self) -> &'static str {
        match self {
            Self::Create => CREATE_RESOURCE,
            Self::Delete => DELETE_RESOURCE,
            Self::List => LIST_RESOURCE,
        }
    }

    pub fn required_parameters(self) -> &'static [&'static str] {
        match self {
            Self::Create => &[NAME_PARAM, IMAGE_URI_PARAM],
            Self::Delete => &[NAME_PARAM],
            Self::List => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentRequest {
    Create {
        profile: String,
        name: String,
        image_uri: String,
    },
    Delete {
        profile: String,
        name: String,
    },
    List {
        profile: String,
    },
}

impl EnvironmentRequest {
    pub fn profile(&self) -> &str {
        match self {
            Self::Create { profile, .. } | Self::Delete { profile, .. } | Self::List { profile } => {
                profile
            }
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Self::Create { .. } => Operation::Create,
            Self::Delete { .. } => Operation::Delete,
            Self::List { .. } => Operation::List,
        }
    }
}

/// Turns a resource path plus raw query parameters into a validated request.
///
/// Required parameters are checked before anything touches the registry, so a
/// caller mistake is always reported as input validation. Blank values count as
/// missing, and an empty parameter map is treated like an absent one. The
/// reserved profile partition can never be addressed as a profile.
pub fn parse_request(
    resource: &str,
    parameters: Option<&QueryParameters>,
) -> Result<EnvironmentRequest, LifecycleError> {
    let operation = Operation::from_resource(resource)
        .ok_or_else(|| LifecycleError::UnsupportedResource(resource.to_string()))?;

    let required = operation.required_parameters();
    let Some(parameters) = parameters.filter(|parameters| !parameters.is_empty()) else {
        if required.is_empty() {
            return Ok(EnvironmentRequest::List {
                profile: DEFAULT_PROFILE.to_string(),
            });
        }
        return Err(LifecycleError::MissingParameters(required.join(" ")));
    };

    if let Some(missing) = required
        .iter()
        .find(|key| parameter(parameters, key).is_none())
    {
        return Err(LifecycleError::MissingParameters((*missing).to_string()));
    }

    let profile = parameter(parameters, PROFILE_PARAM)
        .unwrap_or(DEFAULT_PROFILE)
        .to_string();
    if profile == PROFILE_NAMESPACE {
        return Err(LifecycleError::ReservedProfile(profile));
    }
    let required_value = |key: &str| {
        parameter(parameters, key)
            .map(str::to_string)
            .ok_or_else(|| LifecycleError::MissingParameters(key.to_string()))
    };

    match operation {
        Operation::Create => Ok(EnvironmentRequest::Create {
            profile,
            name: required_value(NAME_PARAM)?,
            image_uri: required_value(IMAGE_URI_PARAM)?,
        }),
        Operation::Delete => Ok(EnvironmentRequest::Delete {
            profile,
            name: required_value(NAME_PARAM)?,
        }),
        Operation::List => Ok(EnvironmentRequest::List { profile }),
    }
}

fn parameter<'a>(parameters: &'a QueryParameters, key: &str) -> Option<&'a str> {
    parameters
        .get(key)
        .and_then(Option::as_deref)
        .filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, Option<&str>)]) -> QueryParameters {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.map(str::to_string)))
            .collect()
    }

    #[test]
    fn create_defaults_profile_when_absent() {
        let query = params(&[("name", Some("web1")), ("image_uri", Some("registry/img:tag"))]);

        let request = parse_request(CREATE_RESOURCE, Some(&query)).expect("request should parse");
        assert_eq!(
            request,
            EnvironmentRequest::Create {
                profile: "default".to_string(),
                name: "web1".to_string(),
                image_uri: "registry/img:tag".to_string(),
            }
        );
    }

    #[test]
    fn absent_parameter_map_lists_every_required_name() {
        let error = parse_request(CREATE_RESOURCE, None).expect_err("request should fail");
        assert_eq!(
            error.to_string(),
            "Necessary query string parameters not specified: name image_uri"
        );
    }

    #[test]
    fn null_and_blank_values_count_as_missing() {
        let null_name = params(&[("name", None), ("image_uri", Some("img"))]);
        let blank_image = params(&[("name", Some("web1")), ("image_uri", Some("  "))]);

        let error = parse_request(CREATE_RESOURCE, Some(&null_name)).expect_err("null name");
        assert_eq!(error, LifecycleError::MissingParameters("name".to_string()));

        let error = parse_request(CREATE_RESOURCE, Some(&blank_image)).expect_err("blank image");
        assert_eq!(
            error,
            LifecycleError::MissingParameters("image_uri".to_string())
        );
    }

    #[test]
    fn empty_parameter_map_matches_absent_map() {
        let error = parse_request(CREATE_RESOURCE, Some(&QueryParameters::new()))
            .expect_err("request should fail");
        assert_eq!(
            error,
            LifecycleError::MissingParameters("name image_uri".to_string())
        );
    }

    #[test]
    fn values_are_passed_through_untrimmed() {
        let query = params(&[("name", Some(" web1")), ("image_uri", Some("img "))]);

        let request = parse_request(CREATE_RESOURCE, Some(&query)).expect("request should parse");
        assert_eq!(
            request,
            EnvironmentRequest::Create {
                profile: DEFAULT_PROFILE.to_string(),
                name: " web1".to_string(),
                image_uri: "img ".to_string(),
            }
        );
    }

    #[test]
    fn reserved_profile_partition_is_rejected() {
        let create = params(&[
            ("name", Some("default")),
            ("image_uri", Some("img")),
            ("profile", Some("_profile")),
        ]);
        let list = params(&[("profile", Some("_profile"))]);

        let error = parse_request(CREATE_RESOURCE, Some(&create)).expect_err("create should fail");
        assert_eq!(error, LifecycleError::ReservedProfile("_profile".to_string()));
        assert_eq!(error.kind(), crate::error::FailureKind::InputValidation);

        let error = parse_request(LIST_RESOURCE, Some(&list)).expect_err("list should fail");
        assert_eq!(error, LifecycleError::ReservedProfile("_profile".to_string()));
    }

    #[test]
    fn delete_does_not_require_image_uri() {
        let query = params(&[("name", Some("web1")), ("profile", Some("staging"))]);

        let request = parse_request(DELETE_RESOURCE, Some(&query)).expect("request should parse");
        assert_eq!(request.profile(), "staging");
        assert_eq!(request.operation(), Operation::Delete);
    }

    #[test]
    fn list_accepts_missing_parameter_map() {
        let request = parse_request(LIST_RESOURCE, None).expect("request should parse");
        assert_eq!(
            request,
            EnvironmentRequest::List {
                profile: DEFAULT_PROFILE.to_string()
            }
        );
    }

    #[test]
    fn unknown_resource_is_rejected() {
        let error = parse_request("/api/v1/scale", None).expect_err("request should fail");
        assert_eq!(
            error,
            LifecycleError::UnsupportedResource("/api/v1/scale".to_string())
        );
    }
}
