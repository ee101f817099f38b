//! In-memory backend for exercising the reconciler without a network.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::error::{Result, SyncError, TfcError};

use super::backend::RemoteBackend;
use super::types::{NewVariable, RemoteVariable, Workspace};

/// Backend holding workspaces and variables in process memory.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    /// Workspaces keyed by (organization, name).
    workspaces: BTreeMap<(String, String), Workspace>,
    /// Variables keyed by workspace id, in creation order.
    variables: BTreeMap<String, Vec<RemoteVariable>>,
    /// Every mutating call, as `"<verb> <subject>"`.
    calls: Vec<String>,
    /// Keys whose create call fails.
    failing_creates: Vec<String>,
    next_id: u64,
}

impl Inner {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn workspace_id(&self, organization: &str, name: &str) -> Option<String> {
        self.workspaces
            .get(&(organization.to_string(), name.to_string()))
            .map(|w| w.id.clone())
    }
}

impl InMemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Adds a workspace and returns its id.
    pub fn add_workspace(&self, organization: &str, name: &str) -> String {
        let mut inner = self.lock();
        let id = inner.next_id("ws");
        inner.workspaces.insert(
            (organization.to_string(), name.to_string()),
            Workspace {
                id: id.clone(),
                name: name.to_string(),
                auto_apply: true,
            },
        );
        inner.variables.insert(id.clone(), Vec::new());
        id
    }

    /// Adds a variable directly, bypassing the call log.
    pub fn add_variable(&self, workspace_id: &str, key: &str, value: &str, sensitive: bool) {
        let mut inner = self.lock();
        let id = inner.next_id("var");
        inner
            .variables
            .entry(workspace_id.to_string())
            .or_default()
            .push(RemoteVariable {
                id,
                key: key.to_string(),
                value: if sensitive { String::new() } else { value.to_string() },
                sensitive,
                category: super::VariableCategory::Terraform,
            });
    }

    /// Makes every create of `key` fail with a validation error.
    pub fn fail_create_of(&self, key: &str) {
        self.lock().failing_creates.push(key.to_string());
    }

    /// Removes every injected create failure.
    pub fn clear_failures(&self) {
        self.lock().failing_creates.clear();
    }

    /// Returns the variables of a workspace.
    pub fn variables(&self, workspace_id: &str) -> Vec<RemoteVariable> {
        self.lock()
            .variables
            .get(workspace_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the workspace with the given name, if any.
    pub fn workspace(&self, organization: &str, name: &str) -> Option<Workspace> {
        self.lock()
            .workspaces
            .get(&(organization.to_string(), name.to_string()))
            .cloned()
    }

    /// Returns the mutating calls made so far.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }
}

#[async_trait]
impl RemoteBackend for InMemoryBackend {
    async fn read_workspace(&self, organization: &str, name: &str) -> Result<Workspace> {
        self.workspace(organization, name)
            .ok_or_else(|| SyncError::Tfc(TfcError::not_found("workspace", name)))
    }

    async fn create_workspace(&self, organization: &str, name: &str) -> Result<Workspace> {
        self.lock().calls.push(format!("create_workspace {name}"));
        self.add_workspace(organization, name);
        self.read_workspace(organization, name).await
    }

    async fn delete_workspace(&self, organization: &str, name: &str) -> Result<()> {
        let mut inner = self.lock();
        inner.calls.push(format!("delete_workspace {name}"));
        let workspace = inner
            .workspaces
            .remove(&(organization.to_string(), name.to_string()))
            .ok_or_else(|| SyncError::Tfc(TfcError::not_found("workspace", name)))?;
        inner.variables.remove(&workspace.id);
        Ok(())
    }

    async fn list_variables(
        &self,
        organization: &str,
        workspace: &str,
        _page_size: u32,
    ) -> Result<Vec<RemoteVariable>> {
        let inner = self.lock();
        let id = inner
            .workspace_id(organization, workspace)
            .ok_or_else(|| SyncError::Tfc(TfcError::not_found("workspace", workspace)))?;
        Ok(inner.variables.get(&id).cloned().unwrap_or_default())
    }

    async fn create_variable(
        &self,
        workspace_id: &str,
        variable: &NewVariable,
    ) -> Result<RemoteVariable> {
        let mut inner = self.lock();
        inner.calls.push(format!("create {}", variable.key));

        if inner.failing_creates.contains(&variable.key) {
            return Err(SyncError::Tfc(TfcError::api_error(422, "rejected")));
        }

        let id = inner.next_id("var");
        let created = RemoteVariable {
            id,
            key: variable.key.clone(),
            value: if variable.sensitive {
                String::new()
            } else {
                variable.value.clone()
            },
            sensitive: variable.sensitive,
            category: variable.category,
        };

        inner
            .variables
            .get_mut(workspace_id)
            .ok_or_else(|| SyncError::Tfc(TfcError::not_found("workspace", workspace_id)))?
            .push(created.clone());

        Ok(created)
    }

    async fn update_variable(&self, id: &str, key: &str, value: &str) -> Result<RemoteVariable> {
        let mut inner = self.lock();
        inner.calls.push(format!("update {key}"));

        let variable = inner
            .variables
            .values_mut()
            .flatten()
            .find(|v| v.id == id)
            .ok_or_else(|| SyncError::Tfc(TfcError::not_found("variable", id)))?;

        variable.key = key.to_string();
        if !variable.sensitive {
            variable.value = value.to_string();
        }
        Ok(variable.clone())
    }

    async fn delete_variable(&self, id: &str) -> Result<()> {
        let mut inner = self.lock();

        let key = inner
            .variables
            .values()
            .flatten()
            .find(|v| v.id == id)
            .map(|v| v.key.clone())
            .ok_or_else(|| SyncError::Tfc(TfcError::not_found("variable", id)))?;
        inner.calls.push(format!("delete {key}"));

        for variables in inner.variables.values_mut() {
            variables.retain(|v| v.id != id);
        }
        Ok(())
    }
}
