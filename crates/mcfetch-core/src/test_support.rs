//! In-memory [`RancherApi`] for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

use crate::api::{ConfigArchive, Host, RancherApi, RegistrationToken};
use crate::error::{ProvisionError, Result};

/// One scripted answer for the newest token in a list call.
#[derive(Debug, Clone)]
pub(crate) enum ListStep {
    /// Newest token absent from the list.
    Missing,
    /// Newest token listed with this state and token value.
    Listed(&'static str, &'static str),
}

/// Fake API recording every call.
///
/// Creation echoes the requested name in state `registering` unless
/// `create_reply` overrides it. List calls consume `list_script`; once it is
/// empty every created token is reported `active` with value `tok-{project}`.
#[derive(Default)]
pub(crate) struct FakeApi {
    pub create_reply: Option<(String, String)>,
    pub list_script: RefCell<VecDeque<ListStep>>,
    pub hosts: Vec<Host>,
    pub dispositions: HashMap<String, String>,
    pub failing_host: Option<String>,

    pub creates: RefCell<Vec<(String, String)>>,
    pub lists: Cell<usize>,
    pub fetches: RefCell<Vec<(String, String, String)>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(steps: Vec<ListStep>) -> Self {
        let api = Self::new();
        *api.list_script.borrow_mut() = steps.into();
        api
    }

    pub fn create_count(&self) -> usize {
        self.creates.borrow().len()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.borrow().len()
    }
}

pub(crate) fn host(id: &str, project_id: &str, state: &str) -> Host {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "accountId": project_id,
        "hostname": format!("{id}.local"),
        "state": state,
    }))
    .expect("valid host fixture")
}

fn token(name: &str, state: &str, value: &str) -> RegistrationToken {
    RegistrationToken {
        id: None,
        name: name.to_string(),
        state: state.to_string(),
        token: Some(value.to_string()),
        account_id: None,
    }
}

impl RancherApi for FakeApi {
    fn create_registration_token(
        &self,
        project_id: &str,
        name: &str,
    ) -> Result<RegistrationToken> {
        self.creates
            .borrow_mut()
            .push((project_id.to_string(), name.to_string()));
        let (reply_name, reply_state) = self
            .create_reply
            .clone()
            .unwrap_or_else(|| (name.to_string(), "registering".to_string()));
        let mut t = token(&reply_name, &reply_state, "");
        t.token = None;
        Ok(t)
    }

    fn list_registration_tokens(&self) -> Result<Vec<RegistrationToken>> {
        self.lists.set(self.lists.get() + 1);
        let creates = self.creates.borrow();
        let step = self.list_script.borrow_mut().pop_front();
        let mut out = Vec::new();
        for (i, (project, name)) in creates.iter().enumerate() {
            let newest = i + 1 == creates.len();
            match (&step, newest) {
                (Some(ListStep::Missing), true) => {}
                (Some(ListStep::Listed(state, value)), true) => out.push(token(name, state, value)),
                _ => out.push(token(name, "active", &format!("tok-{project}"))),
            }
        }
        out.push(token("unrelated", "registering", ""));
        Ok(out)
    }

    fn list_hosts(&self) -> Result<Vec<Host>> {
        Ok(self.hosts.clone())
    }

    fn fetch_machine_config(
        &self,
        project_id: &str,
        host_id: &str,
        token: &str,
    ) -> Result<ConfigArchive> {
        self.fetches.borrow_mut().push((
            project_id.to_string(),
            host_id.to_string(),
            token.to_string(),
        ));
        if self.failing_host.as_deref() == Some(host_id) {
            return Err(ProvisionError::Http {
                status: 500,
                url: format!("fake://projects/{project_id}/machines/{host_id}/config"),
            });
        }
        Ok(ConfigArchive {
            content_disposition: self.dispositions.get(host_id).cloned(),
            body: format!("config for {host_id}").into_bytes(),
        })
    }
}
