//! Bulk response decoder

use std::collections::HashMap;

use contracts::{Action, ContractError, ErrorDetail, ResponseDecoder, ResultRecord};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RawResponse {
    #[serde(default)]
    items: Vec<HashMap<String, RawRecord>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawRecord {
    #[serde(rename = "_index", default)]
    index: Option<String>,
    #[serde(rename = "_id", default)]
    id: Option<String>,
    #[serde(rename = "_version", default)]
    version: Option<i64>,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    status: Option<u16>,
    #[serde(rename = "_seq_no", default)]
    seq_no: Option<i64>,
    #[serde(rename = "_primary_term", default)]
    primary_term: Option<i64>,
    #[serde(default)]
    error: Option<ErrorDetail>,
}

impl RawRecord {
    fn into_record(self, action: Action) -> ResultRecord {
        ResultRecord {
            action,
            index: self.index,
            document_id: self.id,
            version: self.version,
            result: self.result,
            status: self.status.unwrap_or(0),
            seq_no: self.seq_no,
            primary_term: self.primary_term,
            error: self.error,
        }
    }
}

/// Default decoder: one eager `serde_json` parse of the whole body
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonResponseDecoder;

impl ResponseDecoder for JsonResponseDecoder {
    fn decode(&self, body: &[u8]) -> Result<Vec<ResultRecord>, ContractError> {
        let response: RawResponse = serde_json::from_slice(body)
            .map_err(|e| ContractError::decode(format!("invalid bulk response: {e}")))?;

        response
            .items
            .into_iter()
            .enumerate()
            .map(|(position, entry)| {
                if entry.len() != 1 {
                    return Err(ContractError::decode(format!(
                        "item {position} has {} action keys, expected 1",
                        entry.len()
                    )));
                }
                let (key, raw) = entry
                    .into_iter()
                    .next()
                    .ok_or_else(|| ContractError::decode("empty response item"))?;
                let action = key.parse::<Action>()?;
                Ok(raw.into_record(action))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_preserves_order() {
        let body = br#"{
            "took": 30,
            "errors": true,
            "items": [
                {"index": {"_index": "test", "_id": "1", "_version": 1, "result": "created", "status": 201, "_seq_no": 0, "_primary_term": 1}},
                {"create": {"_index": "test", "_id": "1", "status": 409,
                    "error": {"type": "version_conflict_engine_exception", "reason": "[1]: version conflict, document already exists"}}},
                {"delete": {"_index": "test", "_id": "2", "result": "not_found", "status": 404}},
                {"update": {"_index": "test", "_id": "3", "result": "updated", "status": 200}}
            ]
        }"#;

        let records = JsonResponseDecoder.decode(body).unwrap();
        let actions: Vec<Action> = records.iter().map(|r| r.action).collect();
        assert_eq!(
            actions,
            vec![Action::Index, Action::Create, Action::Delete, Action::Update]
        );

        assert!(records[0].is_created());
        assert_eq!(records[0].seq_no, Some(0));
        assert_eq!(records[1].status, 409);
        assert_eq!(
            records[1].error.as_ref().map(|e| e.kind.as_str()),
            Some("version_conflict_engine_exception")
        );
        assert_eq!(records[2].result.as_deref(), Some("not_found"));
        assert!(!records[2].is_success());
        assert!(records[3].is_success());
    }

    #[test]
    fn test_missing_status_is_zero() {
        let records = JsonResponseDecoder
            .decode(br#"{"items":[{"index": {}}]}"#)
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, 0);
        assert!(records[0].is_success());
    }

    #[test]
    fn test_empty_object_has_no_items() {
        let records = JsonResponseDecoder.decode(b"{}").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_nested_cause() {
        let body = br#"{"items":[{"index":{"status":400,"error":{"type":"mapper_parsing_exception","reason":"failed","caused_by":{"type":"json_parse_exception","reason":"bad token"}}}}]}"#;
        let records = JsonResponseDecoder.decode(body).unwrap();
        let cause = records[0].error.as_ref().and_then(|e| e.caused_by.as_ref());
        assert_eq!(cause.map(|c| c.kind.as_str()), Some("json_parse_exception"));
    }

    #[test]
    fn test_unknown_action_key() {
        let err = JsonResponseDecoder
            .decode(br#"{"items":[{"upsert":{"status":200}}]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("unknown bulk action"));
    }

    #[test]
    fn test_multiple_action_keys() {
        let err = JsonResponseDecoder
            .decode(br#"{"items":[{"index":{},"delete":{}}]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("expected 1"));
    }

    #[test]
    fn test_malformed_body() {
        assert!(JsonResponseDecoder.decode(b"<html>bad gateway</html>").is_err());
    }
}
