//! Project and membership operations.

use super::{Client, types::*};
use crate::{Result, cache::QueryKey, http::ApiRequest};

/// Cache key for the project list.
pub fn projects_key() -> QueryKey {
    QueryKey::new(["projects"])
}

/// Cache key for one project's detail record.
pub fn project_key(project_id: &str) -> QueryKey {
    QueryKey::new(["projects", project_id])
}

/// Cache key for one project's member list.
pub fn project_members_key(project_id: &str) -> QueryKey {
    QueryKey::new(["projectMembers", project_id])
}

/// Project operations, obtained via [`Client::projects`].
pub struct ProjectsApi<'a> {
    client: &'a Client,
}

impl<'a> ProjectsApi<'a> {
    pub(super) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// List the caller's projects with their role in each.
    pub async fn list(&self) -> Result<Vec<ProjectListItem>> {
        self.client.read(projects_key(), "/projects").await
    }

    /// Fetch one project.
    pub async fn get(&self, project_id: &str) -> Result<Project> {
        self.client
            .read(project_key(project_id), format!("/projects/{project_id}"))
            .await
    }

    /// Create a project.
    pub async fn create(&self, request: CreateProjectRequest) -> Result<()> {
        self.client
            .write_ack(
                &[projects_key()],
                ApiRequest::post("/projects").json(&request)?,
            )
            .await
    }

    /// Update a project's name/description.
    pub async fn update(&self, project_id: &str, request: UpdateProjectRequest) -> Result<()> {
        self.client
            .write_ack(
                &[project_key(project_id)],
                ApiRequest::put(format!("/projects/{project_id}")).json(&request)?,
            )
            .await
    }

    /// Delete a project. Invalidates the deleted project's own family and
    /// the list entry exactly; other projects' cached details stay fresh.
    pub async fn delete(&self, project_id: &str) -> Result<()> {
        self.client
            .write_ack(
                &[project_key(project_id)],
                ApiRequest::delete(format!("/projects/{project_id}")),
            )
            .await?;
        self.client.cache().invalidate_exact(&projects_key());
        Ok(())
    }

    /// List a project's members with their profiles.
    pub async fn members(&self, project_id: &str) -> Result<Vec<ProjectMemberDetails>> {
        self.client
            .read(
                project_members_key(project_id),
                format!("/projects/{project_id}/members"),
            )
            .await
    }

    /// Add a member by email.
    pub async fn add_member(&self, project_id: &str, request: AddMemberRequest) -> Result<()> {
        self.client
            .write_ack(
                &[project_members_key(project_id), project_key(project_id)],
                ApiRequest::post(format!("/projects/{project_id}/members")).json(&request)?,
            )
            .await?;
        self.client.notifier().info("Member added successfully!");
        Ok(())
    }

    /// Change a member's role.
    pub async fn set_member_role(
        &self,
        project_id: &str,
        member_id: &str,
        role: MemberRole,
    ) -> Result<()> {
        let body = serde_json::json!({ "role": role });
        self.client
            .write_ack(
                &[project_members_key(project_id), project_key(project_id)],
                ApiRequest::put(format!("/projects/{project_id}/members/{member_id}"))
                    .json(&body)?,
            )
            .await?;
        self.client
            .notifier()
            .info("Role has been changed successfully!");
        Ok(())
    }

    /// Remove a member from the project.
    pub async fn remove_member(&self, project_id: &str, member_id: &str) -> Result<()> {
        self.client
            .write_ack(
                &[project_members_key(project_id), project_key(project_id)],
                ApiRequest::delete(format!("/projects/{project_id}/members/{member_id}")),
            )
            .await?;
        self.client.notifier().info("Member removed successfully!");
        Ok(())
    }

    /// Leave a project you are a member of.
    pub async fn leave(&self, project_id: &str) -> Result<()> {
        self.client
            .write_ack(
                &[project_key(project_id)],
                ApiRequest::delete(format!("/projects/{project_id}/leave")),
            )
            .await
    }
}
