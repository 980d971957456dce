//! JSON Lines records printed on stdout.

use std::io::Write;

use launcher_client::{ChannelAddress, DomainDescriptor};
use serde::Serialize;

use crate::errors::AppError;

/// One discovered channel. Names that do not decode carry `error` instead
/// of an identity.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub(crate) struct ChannelRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ChannelRecord {
    pub(crate) fn from_address(address: &ChannelAddress) -> Self {
        match address.identity() {
            Ok(identity) => Self {
                namespace: Some(identity.namespace().to_owned()),
                name: Some(identity.name().to_owned()),
                address: address.to_string(),
                error: None,
            },
            Err(error) => Self {
                namespace: None,
                name: None,
                address: address.to_string(),
                error: Some(error.to_string()),
            },
        }
    }
}

/// Domain snapshot answered by `state`.
#[derive(Debug, Serialize)]
pub(crate) struct StateRecord<'a> {
    pub(crate) exists: bool,
    pub(crate) domain: &'a DomainDescriptor,
}

pub(crate) fn write_record<W, T>(stdout: &mut W, record: &T) -> Result<(), AppError>
where
    W: Write,
    T: Serialize,
{
    let line = serde_json::to_string(record).map_err(AppError::SerialiseOutput)?;
    writeln!(stdout, "{line}")?;
    Ok(())
}
