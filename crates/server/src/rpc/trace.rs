use std::future::Future;

use serde_json::Value;
use uuid::Uuid;

tokio::task_local! {
    static TRACE_ID: String;
}

pub async fn with_trace_id_scope<F>(trace_id: String, future: F) -> F::Output
where
    F: Future,
{
    TRACE_ID.scope(trace_id, future).await
}

pub fn current_trace_id() -> Option<String> {
    TRACE_ID.try_with(Clone::clone).ok()
}

/// Trace id for one incoming line: `trace_id` at the top level, in
/// `params`, or in `params._meta`; otherwise a fresh UUID.
pub fn trace_id_from_raw_request(raw: &[u8]) -> String {
    serde_json::from_slice::<Value>(raw)
        .ok()
        .and_then(|value| trace_id_from_value(&value))
        .unwrap_or_else(generate_trace_id)
}

fn trace_id_from_value(value: &Value) -> Option<String> {
    let params = value.get("params");
    extract_trace_id(value)
        .or_else(|| params.and_then(extract_trace_id))
        .or_else(|| params.and_then(|params| params.get("_meta")).and_then(extract_trace_id))
        .filter(|trace_id| !trace_id.trim().is_empty())
        .map(ToOwned::to_owned)
}

fn extract_trace_id(value: &Value) -> Option<&str> {
    value.as_object()?.get("trace_id")?.as_str()
}

fn generate_trace_id() -> String {
    Uuid::new_v4().to_string()
}
