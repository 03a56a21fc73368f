//! NDJSON bulk encoder

use contracts::{ContractError, Encoder, Fragment, Item, VersionType};
use serde::Serialize;

/// Addressing object written under the action key
#[derive(Serialize)]
struct Metadata<'a> {
    #[serde(rename = "_index", skip_serializing_if = "Option::is_none")]
    index: Option<&'a str>,
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    routing: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version_type: Option<VersionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    if_seq_no: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    if_primary_term: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_on_conflict: Option<u32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    require_alias: bool,
}

impl<'a> Metadata<'a> {
    fn from_item(item: &'a Item) -> Self {
        Self {
            index: item.index.as_deref(),
            id: item.document_id.as_deref(),
            routing: item.routing.as_deref(),
            version: item.version,
            version_type: item.version_type,
            if_seq_no: item.if_seq_no,
            if_primary_term: item.if_primary_term,
            retry_on_conflict: item.retry_on_conflict,
            require_alias: item.require_alias,
        }
    }
}

/// Default encoder
///
/// ```text
/// {"index":{"_index":"books","_id":"1"}}
/// {"title":"..."}
/// ```
///
/// The source line is copied byte for byte; `delete` never emits one.
#[derive(Debug, Clone, Copy, Default)]
pub struct NdjsonEncoder;

impl NdjsonEncoder {
    fn write_metadata(&self, item: &Item, out: &mut Vec<u8>) -> Result<(), ContractError> {
        out.extend_from_slice(b"{\"");
        out.extend_from_slice(item.action.as_str().as_bytes());
        out.extend_from_slice(b"\":");
        serde_json::to_writer(&mut *out, &Metadata::from_item(item))
            .map_err(|e| ContractError::encode(item.action.as_str(), e.to_string()))?;
        out.extend_from_slice(b"}\n");
        Ok(())
    }
}

impl Encoder for NdjsonEncoder {
    fn encode(&self, item: &Item) -> Result<Fragment, ContractError> {
        let body = match (item.action.requires_source(), &item.body) {
            (true, Some(body)) => Some(body),
            (true, None) => {
                return Err(ContractError::encode(
                    item.action.as_str(),
                    "source payload is required",
                ))
            }
            (false, _) => None,
        };

        let capacity = 64 + body.map_or(0, |b| b.len() + 1);
        let mut out = Vec::with_capacity(capacity);
        self.write_metadata(item, &mut out)?;
        if let Some(body) = body {
            out.extend_from_slice(body);
            out.push(b'\n');
        }
        Ok(Fragment::new(out))
    }
}
