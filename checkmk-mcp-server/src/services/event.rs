//! Event service (spec §4.10): empty event lists are successes with
//! `count: 0`, never errors (spec §7, §8 seed scenario 6).

use std::sync::Arc;

use serde::Serialize;

use crate::rest::CheckmkClient;
use crate::rest::models::Event;
use crate::services::ServiceResult;

#[derive(Debug, Clone, Serialize)]
pub struct EventListResult {
    pub count: usize,
    pub events: Vec<Event>,
    pub message: String,
}

fn list_result(events: Vec<Event>) -> EventListResult {
    let count = events.len();
    let message = if count == 0 { "no events".to_string() } else { format!("{count} event(s)") };
    EventListResult { count, events, message }
}

pub struct EventService {
    client: Arc<CheckmkClient>,
}

impl EventService {
    pub fn new(client: Arc<CheckmkClient>) -> Self {
        Self { client }
    }

    pub async fn list_service_events(&self, host: &str, service: &str) -> ServiceResult<EventListResult> {
        match self.client.list_events(Some(host), Some(service), None).await {
            Ok(events) => ServiceResult::ok(list_result(events)),
            Err(err) => ServiceResult::err(&crate::services::classify_error(&err).kind, err.sanitized_message()),
        }
    }

    pub async fn list_host_events(&self, host: &str) -> ServiceResult<EventListResult> {
        match self.client.list_events(Some(host), None, None).await {
            Ok(events) => ServiceResult::ok(list_result(events)),
            Err(err) => ServiceResult::err(&crate::services::classify_error(&err).kind, err.sanitized_message()),
        }
    }

    pub async fn recent_critical(&self) -> ServiceResult<EventListResult> {
        match self.client.list_events(None, None, None).await {
            Ok(events) => {
                let critical: Vec<Event> = events.into_iter().filter(|e| e.state >= 2).collect();
                ServiceResult::ok(list_result(critical))
            }
            Err(err) => ServiceResult::err(&crate::services::classify_error(&err).kind, err.sanitized_message()),
        }
    }

    pub async fn search_events(&self, search: &str) -> ServiceResult<EventListResult> {
        match self.client.list_events(None, None, Some(search)).await {
            Ok(events) => ServiceResult::ok(list_result(events)),
            Err(err) => ServiceResult::err(&crate::services::classify_error(&err).kind, err.sanitized_message()),
        }
    }

    pub async fn acknowledge_event(&self, event_id: &str) -> ServiceResult<()> {
        match self.client.acknowledge_event(event_id).await {
            Ok(()) => ServiceResult::ok(()),
            Err(err) => ServiceResult::err(&crate::services::classify_error(&err).kind, err.sanitized_message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_event_list_is_a_success_shaped_result() {
        let result = list_result(Vec::new());
        assert_eq!(result.count, 0);
        assert_eq!(result.message, "no events");
    }
}
