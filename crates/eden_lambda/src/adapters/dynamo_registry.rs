//! DynamoDB-backed registry table.
//!
//! Key schema: partition key `type`, sort key `name`. Both are DynamoDB
//! reserved words, so every expression goes through attribute-name
//! placeholders.

use std::collections::HashMap;

use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{AttributeValue, TableStatus};
use chrono::{DateTime, Utc};
use eden_core::registry::{
    select_profile_row, EnvironmentKey, EnvironmentRecord, RegistryStore, StoreError,
    StoredProfile, TableReadiness, PROFILE_NAMESPACE,
};

use super::block_on_sdk;

pub const TYPE_ATTRIBUTE: &str = "type";
pub const NAME_ATTRIBUTE: &str = "name";
pub const TYPE_NAME_ATTRIBUTE: &str = "type_name";
pub const ENDPOINT_ATTRIBUTE: &str = "endpoint";
pub const LAST_UPDATED_ATTRIBUTE: &str = "last_updated_time";
pub const PROFILE_ATTRIBUTE: &str = "profile";

pub type Item = HashMap<String, AttributeValue>;

#[derive(Debug, Clone)]
pub struct DynamoRegistryStore {
    client: aws_sdk_dynamodb::Client,
    table_name: String,
}

impl DynamoRegistryStore {
    pub fn new(client: aws_sdk_dynamodb::Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

impl RegistryStore for DynamoRegistryStore {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    fn check_ready(&self) -> TableReadiness {
        let result = block_on_sdk(
            self.client
                .describe_table()
                .table_name(self.table_name.clone())
                .send(),
        );

        match result {
            Ok(output) => readiness_from_status(output.table().and_then(|table| table.table_status())),
            Err(error) => {
                let not_found = error
                    .as_service_error()
                    .is_some_and(|service_error| service_error.is_resource_not_found_exception());
                if not_found {
                    TableReadiness::Missing
                } else {
                    TableReadiness::Unknown {
                        message: format!(
                            "Unknown exception raised on DescribeTable: {}",
                            DisplayErrorContext(&error)
                        ),
                    }
                }
            }
        }
    }

    fn get_profile(&self, name: &str) -> Result<StoredProfile, StoreError> {
        let output = block_on_sdk(
            self.client
                .query()
                .table_name(self.table_name.clone())
                .key_condition_expression("#type = :type AND #name = :name")
                .expression_attribute_names("#type", TYPE_ATTRIBUTE)
                .expression_attribute_names("#name", NAME_ATTRIBUTE)
                .expression_attribute_values(":type", string_value(PROFILE_NAMESPACE))
                .expression_attribute_values(":name", string_value(name))
                .send(),
        )
        .map_err(|error| StoreError::Backend(DisplayErrorContext(&error).to_string()))?;

        let rows = output.items().iter().map(profile_document).collect();
        select_profile_row(name, rows)
    }

    fn put_environment(&self, record: &EnvironmentRecord) -> Result<(), StoreError> {
        block_on_sdk(
            self.client
                .put_item()
                .table_name(self.table_name.clone())
                .set_item(Some(environment_item(record)))
                .send(),
        )
        .map(|_| ())
        .map_err(|error| StoreError::Backend(DisplayErrorContext(&error).to_string()))
    }

    fn delete_environment(&self, key: &EnvironmentKey) -> Result<(), StoreError> {
        block_on_sdk(
            self.client
                .delete_item()
                .table_name(self.table_name.clone())
                .key(TYPE_ATTRIBUTE, string_value(&key.profile))
                .key(NAME_ATTRIBUTE, string_value(&key.name))
                .send(),
        )
        .map(|_| ())
        .map_err(|error| StoreError::Backend(DisplayErrorContext(&error).to_string()))
    }

    fn list_environments(&self, profile: &str) -> Result<Vec<EnvironmentRecord>, StoreError> {
        let mut records = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let output = block_on_sdk(
                self.client
                    .query()
                    .table_name(self.table_name.clone())
                    .key_condition_expression("#type = :type")
                    .expression_attribute_names("#type", TYPE_ATTRIBUTE)
                    .expression_attribute_values(":type", string_value(profile))
                    .set_exclusive_start_key(start_key.take())
                    .send(),
            )
            .map_err(|error| StoreError::Backend(DisplayErrorContext(&error).to_string()))?;

            for item in output.items() {
                records.push(environment_from_item(item)?);
            }

            match output.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        records.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(records)
    }
}

pub fn readiness_from_status(status: Option<&TableStatus>) -> TableReadiness {
    match status {
        Some(TableStatus::Active) => TableReadiness::Ready,
        Some(other) => TableReadiness::Transitioning {
            status: other.as_str().to_string(),
        },
        None => TableReadiness::Unknown {
            message: "DescribeTable returned no table status".to_string(),
        },
    }
}

pub fn environment_item(record: &EnvironmentRecord) -> Item {
    HashMap::from([
        (TYPE_ATTRIBUTE.to_string(), string_value(&record.profile)),
        (NAME_ATTRIBUTE.to_string(), string_value(&record.name)),
        (
            TYPE_NAME_ATTRIBUTE.to_string(),
            string_value(&record.key().type_name()),
        ),
        (ENDPOINT_ATTRIBUTE.to_string(), string_value(&record.endpoint)),
        (
            LAST_UPDATED_ATTRIBUTE.to_string(),
            string_value(&format_epoch_seconds(&record.last_updated_time)),
        ),
    ])
}

pub fn environment_from_item(item: &Item) -> Result<EnvironmentRecord, StoreError> {
    let profile = required_string(item, TYPE_ATTRIBUTE)?;
    let name = required_string(item, NAME_ATTRIBUTE)?;
    let endpoint = required_string(item, ENDPOINT_ATTRIBUTE)?;
    let raw_time = required_string(item, LAST_UPDATED_ATTRIBUTE)?;
    let last_updated_time = parse_epoch_seconds(&raw_time).ok_or_else(|| {
        StoreError::Backend(format!(
            "environment {profile}/{name} has unreadable {LAST_UPDATED_ATTRIBUTE} \"{raw_time}\""
        ))
    })?;

    Ok(EnvironmentRecord {
        profile,
        name,
        endpoint,
        last_updated_time,
    })
}

fn profile_document(item: &Item) -> Option<String> {
    item.get(PROFILE_ATTRIBUTE)
        .and_then(|value| value.as_s().ok())
        .cloned()
}

fn required_string(item: &Item, attribute: &str) -> Result<String, StoreError> {
    item.get(attribute)
        .and_then(|value| value.as_s().ok())
        .cloned()
        .ok_or_else(|| StoreError::Backend(format!("registry row is missing string attribute {attribute}")))
}

fn string_value(value: &str) -> AttributeValue {
    AttributeValue::S(value.to_string())
}

/// Epoch seconds with microsecond fraction, e.g. `1712345678.123456`. The value
/// reads as a signed decimal, so times before 1970 render as `-1.500000`.
pub fn format_epoch_seconds(time: &DateTime<Utc>) -> String {
    let micros = time.timestamp_micros();
    let sign = if micros < 0 { "-" } else { "" };
    let magnitude = micros.unsigned_abs();
    format!("{sign}{}.{:06}", magnitude / 1_000_000, magnitude % 1_000_000)
}

pub fn parse_epoch_seconds(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    let (negative, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let seconds: i128 = whole.parse().ok()?;

    let digits: String = fraction.chars().take(9).collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let nanos: i128 = if digits.is_empty() {
        0
    } else {
        format!("{digits:0<9}").parse().ok()?
    };

    let magnitude = seconds.checked_mul(NANOS_PER_SECOND)? + nanos;
    let total = if negative { -magnitude } else { magnitude };
    let seconds = i64::try_from(total.div_euclid(NANOS_PER_SECOND)).ok()?;
    let nanos = u32::try_from(total.rem_euclid(NANOS_PER_SECOND)).ok()?;
    DateTime::from_timestamp(seconds, nanos)
}

const NANOS_PER_SECOND: i128 = 1_000_000_000;

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> EnvironmentRecord {
        EnvironmentRecord {
            profile: "default".to_string(),
            name: "web1".to_string(),
            endpoint: "web1.dev.example.com".to_string(),
            last_updated_time: DateTime::from_timestamp(1_700_000_000, 123_456_000)
                .expect("valid timestamp"),
        }
    }

    #[test]
    fn active_table_is_ready_and_others_transition() {
        assert_eq!(
            readiness_from_status(Some(&TableStatus::Active)),
            TableReadiness::Ready
        );
        assert_eq!(
            readiness_from_status(Some(&TableStatus::Creating)),
            TableReadiness::Transitioning {
                status: "CREATING".to_string()
            }
        );
    }

    #[test]
    fn environment_item_carries_denormalized_type_name() {
        let item = environment_item(&record());

        assert_eq!(
            item.get(TYPE_NAME_ATTRIBUTE),
            Some(&AttributeValue::S("default_web1".to_string()))
        );
        assert_eq!(
            item.get(LAST_UPDATED_ATTRIBUTE),
            Some(&AttributeValue::S("1700000000.123456".to_string()))
        );
        assert_eq!(environment_from_item(&item).expect("item should decode"), record());
    }

    #[test]
    fn item_without_endpoint_is_rejected() {
        let mut item = environment_item(&record());
        item.remove(ENDPOINT_ATTRIBUTE);

        let error = environment_from_item(&item).expect_err("item should fail");
        assert!(error.to_string().contains(ENDPOINT_ATTRIBUTE));
    }

    #[test]
    fn parses_float_style_timestamps() {
        let parsed = parse_epoch_seconds("1712345678.5").expect("timestamp should parse");
        assert_eq!(parsed.timestamp(), 1_712_345_678);
        assert_eq!(parsed.timestamp_subsec_millis(), 500);

        assert!(parse_epoch_seconds("yesterday").is_none());
        assert!(parse_epoch_seconds("12.3e4").is_none());
        assert!(parse_epoch_seconds("-").is_none());
    }

    #[test]
    fn pre_epoch_timestamps_keep_their_sign() {
        let before_epoch = DateTime::from_timestamp(-2, 500_000_000).expect("valid timestamp");

        let formatted = format_epoch_seconds(&before_epoch);
        assert_eq!(formatted, "-1.500000");
        assert_eq!(parse_epoch_seconds(&formatted), Some(before_epoch));

        let fraction_only = parse_epoch_seconds("-0.25").expect("timestamp should parse");
        assert_eq!(fraction_only.timestamp(), -1);
        assert_eq!(fraction_only.timestamp_subsec_millis(), 750);
    }

    #[test]
    fn profile_row_without_string_document_has_none() {
        let item = HashMap::from([(
            PROFILE_ATTRIBUTE.to_string(),
            AttributeValue::N("1".to_string()),
        )]);
        assert!(profile_document(&item).is_none());
    }
}
