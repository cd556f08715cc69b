//! Zendesk Support API service
//!
//! Builds the URL for a page, fetches it through a [`RestClient`], and
//! parses the body. The client is created on first use.

use log::debug;
use once_cell::unsync::OnceCell;
use serde_json::{Map, Value};

use crate::client::{RestClient, ZendeskRestClient};
use crate::error::{ZendeskError, ZendeskResult};
use crate::response::parse_json_object;
use crate::target::Target;
use crate::task::PluginTask;
use crate::url::{build_path, subresource_path};

pub struct ZendeskSupportApiService {
    task: PluginTask,
    client: OnceCell<Box<dyn RestClient>>,
}

impl ZendeskSupportApiService {
    pub fn new(task: PluginTask) -> Self {
        Self {
            task,
            client: OnceCell::new(),
        }
    }

    /// Use `client` instead of constructing the default one
    pub fn with_client(task: PluginTask, client: Box<dyn RestClient>) -> Self {
        Self {
            task,
            client: OnceCell::with_value(client),
        }
    }

    pub fn task(&self) -> &PluginTask {
        &self.task
    }

    pub fn set_task(&mut self, task: PluginTask) {
        self.task = task;
    }

    /// Fetch one page. An empty `path` builds the URL from the task;
    /// otherwise `path` is requested as given (e.g. a `next_page` link).
    pub fn get_data(&self, path: &str, page: u32, is_preview: bool) -> ZendeskResult<Map<String, Value>> {
        let url = if path.is_empty() {
            build_path(&self.task, page, is_preview)
        } else {
            path.to_string()
        };
        debug!("get_data target={} page={} preview={} url={}", self.task.target, page, is_preview, url);

        let response = self.rest_client().do_get(&url, &self.task)?;
        parse_json_object(&response)
    }

    /// Records of one record's subresource (ticket comments, user identities, ...).
    /// A missing record or an absent array yields no records.
    pub fn get_subresource(&self, base: Target, id: u64, name: &str) -> ZendeskResult<Vec<Value>> {
        let url = subresource_path(&self.task.login_url, base, id, name)?;
        let Some(body) = self.rest_client().do_get_optional(&url, &self.task)? else {
            debug!("{} not found, no {} records", url, name);
            return Ok(Vec::new());
        };

        let mut document = parse_json_object(&body)?;
        match document.remove(name) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(records)) => Ok(records),
            Some(_) => Err(ZendeskError::Data(format!("Expected '{}' to be an array: {}", name, body))),
        }
    }

    pub fn validate_credential(&self, path: &str) -> ZendeskResult<()> {
        self.rest_client().check_user_credentials(path, &self.task)
    }

    fn rest_client(&self) -> &dyn RestClient {
        self.client
            .get_or_init(|| -> Box<dyn RestClient> {
                Box::new(ZendeskRestClient::new(self.task.connection_timeout))
            })
            .as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Credentials;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Returns a canned body (404 when `None`) and records requested URLs
    struct FakeClient {
        body: Option<String>,
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl RestClient for FakeClient {
        fn do_get(&self, url: &str, _task: &PluginTask) -> ZendeskResult<String> {
            self.calls.borrow_mut().push(url.to_string());
            self.body.clone().ok_or_else(|| ZendeskError::Http {
                status: 404,
                body: "Not Found".to_string(),
            })
        }

        fn check_user_credentials(&self, url: &str, _task: &PluginTask) -> ZendeskResult<()> {
            self.calls.borrow_mut().push(url.to_string());
            Err(ZendeskError::Config("[401] Couldn't authenticate you".to_string()))
        }
    }

    fn task(target: Target) -> PluginTask {
        let creds = Credentials::Token {
            username: "agent@example.com".to_string(),
            token: "abc".to_string(),
        };
        PluginTask::new("https://acme.zendesk.com", target, creds).unwrap()
    }

    fn service(target: Target, body: &str) -> (ZendeskSupportApiService, Rc<RefCell<Vec<String>>>) {
        service_with(target, Some(body))
    }

    fn service_with(target: Target, body: Option<&str>) -> (ZendeskSupportApiService, Rc<RefCell<Vec<String>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let client = FakeClient {
            body: body.map(str::to_string),
            calls: Rc::clone(&calls),
        };
        (ZendeskSupportApiService::with_client(task(target), Box::new(client)), calls)
    }

    #[test]
    fn test_get_data_builds_path_when_empty() {
        let (service, calls) = service(Target::TicketFields, r#"{"ticket_fields": []}"#);
        let doc = service.get_data("", 2, false).unwrap();
        assert!(doc.contains_key("ticket_fields"));
        assert_eq!(
            calls.borrow().as_slice(),
            ["https://acme.zendesk.com/api/v2/ticket_fields.json?sort_by=id&per_page=100&page=2"]
        );
    }

    #[test]
    fn test_get_data_uses_given_path() {
        let (service, calls) = service(Target::Tickets, r#"{"tickets": []}"#);
        let next = "https://acme.zendesk.com/api/v2/incremental/tickets.json?start_time=1546300900";
        service.get_data(next, 1, false).unwrap();
        assert_eq!(calls.borrow().as_slice(), [next]);
    }

    #[test]
    fn test_get_data_rejects_non_object() {
        let (service, _) = service(Target::Tickets, "[1,2]");
        let err = service.get_data("", 1, true).unwrap_err();
        assert!(err.is_data());
    }

    #[test]
    fn test_validate_credential_propagates_error() {
        let (service, calls) = service(Target::Tickets, "{}");
        let err = service
            .validate_credential("https://acme.zendesk.com/api/v2/users/me.json")
            .unwrap_err();
        assert!(err.is_config());
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_set_task_changes_built_path() {
        let (mut service, calls) = service(Target::Tickets, "{}");
        service.set_task(task(Target::Users));
        service.get_data("", 1, true).unwrap();
        assert_eq!(
            calls.borrow().as_slice(),
            ["https://acme.zendesk.com/api/v2/incremental/users.json?start_time=0"]
        );
    }

    #[test]
    fn test_get_subresource_returns_records() {
        let (service, calls) = service(Target::Tickets, r#"{"comments": [{"id": 1}, {"id": 2}], "count": 2}"#);
        let records = service.get_subresource(Target::Tickets, 42, "comments").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["id"], 2);
        assert_eq!(
            calls.borrow().as_slice(),
            ["https://acme.zendesk.com/api/v2/tickets/42/comments.json"]
        );
    }

    #[test]
    fn test_get_subresource_not_found_is_empty() {
        let (service, calls) = service_with(Target::Users, None);
        let records = service.get_subresource(Target::Users, 7, "identities").unwrap();
        assert!(records.is_empty());
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_get_subresource_missing_key_is_empty() {
        let (service, _) = service(Target::Tickets, r#"{"next_page": null}"#);
        assert!(service.get_subresource(Target::Tickets, 1, "comments").unwrap().is_empty());
    }

    #[test]
    fn test_get_subresource_non_array_is_data_error() {
        let (service, _) = service(Target::Tickets, r#"{"comments": {"id": 1}}"#);
        let err = service.get_subresource(Target::Tickets, 1, "comments").unwrap_err();
        assert!(err.is_data());
    }

    #[test]
    fn test_get_data_not_found_propagates() {
        let (service, _) = service_with(Target::Tickets, None);
        assert!(matches!(
            service.get_data("", 1, false).unwrap_err(),
            ZendeskError::Http { status: 404, .. }
        ));
    }
}
