//! Task, subtask, and attachment operations.
//!
//! Tasks live under their project (`/tasks/{project_id}/...`). The cache
//! keys mirror that: the list under `["tasks", project_id]`, a task's detail
//! under `["task", task_id]`, and subtask state under
//! `["subtasks", task_id]`. Every mutation invalidates exactly the families
//! whose contents it may have changed; toggling a subtask also touches the
//! parent task's detail and the project list because the server derives the
//! task status from its subtasks.

use super::{Client, types::*};
use crate::{
    Result,
    cache::QueryKey,
    http::{ApiRequest, FileUpload, MultipartSpec},
};

/// Cache key for a project's task list.
pub fn tasks_key(project_id: &str) -> QueryKey {
    QueryKey::new(["tasks", project_id])
}

/// Cache key for one task's detail record (includes subtasks).
pub fn task_key(task_id: &str) -> QueryKey {
    QueryKey::new(["task", task_id])
}

/// Cache key for one task's subtask state.
pub fn subtasks_key(task_id: &str) -> QueryKey {
    QueryKey::new(["subtasks", task_id])
}

/// Task operations, obtained via [`Client::tasks`].
pub struct TasksApi<'a> {
    client: &'a Client,
}

impl<'a> TasksApi<'a> {
    pub(super) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// List a project's tasks.
    pub async fn list(&self, project_id: &str) -> Result<Vec<Task>> {
        self.client
            .read(tasks_key(project_id), format!("/tasks/{project_id}"))
            .await
    }

    /// Fetch one task with its subtasks.
    pub async fn get(&self, project_id: &str, task_id: &str) -> Result<Task> {
        self.client
            .read(task_key(task_id), format!("/tasks/{project_id}/{task_id}"))
            .await
    }

    /// Create a task, optionally with file attachments.
    ///
    /// With attachments the request goes out as multipart (subtasks ride
    /// along as a JSON-encoded field); without, as plain JSON.
    pub async fn create(
        &self,
        project_id: &str,
        request: CreateTaskRequest,
        attachments: Vec<FileUpload>,
    ) -> Result<Task> {
        let api_request = if attachments.is_empty() {
            ApiRequest::post(format!("/tasks/{project_id}")).json(&request)?
        } else {
            let mut spec = MultipartSpec::new()
                .text("title", request.title.clone())
                .text(
                    "assignedTo",
                    request.assigned_to.clone(),
                )
                .text("status", status_field(request.status));
            if let Some(description) = &request.description {
                spec = spec.text("description", description.clone());
            }
            if let Some(subtasks) = &request.subtasks
                && !subtasks.is_empty()
            {
                spec = spec.text("subtasks", serde_json::to_string(subtasks)?);
            }
            for upload in attachments {
                spec = spec.file("attachments", upload);
            }
            ApiRequest::post(format!("/tasks/{project_id}")).multipart(spec)
        };

        let task: Task = self.client.write(&[tasks_key(project_id)], api_request).await?;
        self.client.notifier().info("Task created successfully");
        Ok(task)
    }

    /// Update a task.
    pub async fn update(
        &self,
        project_id: &str,
        task_id: &str,
        request: UpdateTaskRequest,
    ) -> Result<Task> {
        let task: Task = self
            .client
            .write(
                &[tasks_key(project_id), task_key(task_id)],
                ApiRequest::put(format!("/tasks/{project_id}/{task_id}")).json(&request)?,
            )
            .await?;
        self.client.notifier().info("Task updated successfully");
        Ok(task)
    }

    /// Delete a task.
    pub async fn delete(&self, project_id: &str, task_id: &str) -> Result<()> {
        self.client
            .write_ack(
                &[tasks_key(project_id)],
                ApiRequest::delete(format!("/tasks/{project_id}/{task_id}")),
            )
            .await?;
        self.client.notifier().info("Task deleted successfully");
        Ok(())
    }

    // -------- Subtasks --------

    /// Add a subtask to a task.
    pub async fn add_subtask(
        &self,
        project_id: &str,
        task_id: &str,
        title: impl Into<String>,
    ) -> Result<SubTask> {
        let body = CreateSubtaskRequest {
            title: title.into(),
        };
        let subtask: SubTask = self
            .client
            .write(
                &[task_key(task_id), tasks_key(project_id)],
                ApiRequest::post(format!("/tasks/{project_id}/{task_id}/subtasks")).json(&body)?,
            )
            .await?;
        self.client.notifier().info("Subtask created successfully");
        Ok(subtask)
    }

    /// Update a subtask's title or completion flag.
    pub async fn update_subtask(
        &self,
        project_id: &str,
        task_id: &str,
        subtask_id: &str,
        request: UpdateSubtaskRequest,
    ) -> Result<SubTask> {
        self.client
            .write(
                &[task_key(task_id), tasks_key(project_id)],
                ApiRequest::put(format!(
                    "/tasks/{project_id}/{task_id}/subtasks/{subtask_id}"
                ))
                .json(&request)?,
            )
            .await
    }

    /// Remove a subtask.
    pub async fn remove_subtask(
        &self,
        project_id: &str,
        task_id: &str,
        subtask_id: &str,
    ) -> Result<()> {
        self.client
            .write_ack(
                &[task_key(task_id), tasks_key(project_id)],
                ApiRequest::delete(format!(
                    "/tasks/{project_id}/{task_id}/subtasks/{subtask_id}"
                )),
            )
            .await?;
        self.client.notifier().info("Subtask deleted successfully");
        Ok(())
    }

    /// Toggle a subtask's completion.
    ///
    /// The server recomputes the parent task's status, so this invalidates
    /// the project's task list, the task detail, and the subtask family.
    pub async fn toggle_subtask(
        &self,
        project_id: &str,
        task_id: &str,
        subtask_id: &str,
        is_completed: bool,
    ) -> Result<SubtaskToggle> {
        let body = serde_json::json!({ "isCompleted": is_completed });
        self.client
            .write(
                &[
                    tasks_key(project_id),
                    task_key(task_id),
                    subtasks_key(task_id),
                ],
                ApiRequest::patch(format!(
                    "/tasks/{project_id}/{task_id}/subtasks/{subtask_id}/status"
                ))
                .json(&body)?,
            )
            .await
    }

    // -------- Attachments --------

    /// Upload a file attachment to a task.
    pub async fn add_attachment(
        &self,
        project_id: &str,
        task_id: &str,
        upload: FileUpload,
    ) -> Result<TaskAttachment> {
        let spec = MultipartSpec::new().file("file", upload);
        let attachment: TaskAttachment = self
            .client
            .write(
                &[tasks_key(project_id), task_key(task_id)],
                ApiRequest::post(format!("/tasks/{project_id}/{task_id}/attachments"))
                    .multipart(spec),
            )
            .await?;
        self.client.notifier().info("Attachment uploaded");
        Ok(attachment)
    }

    /// Download an attachment's bytes from its storage URL.
    ///
    /// Not cached: attachment contents are immutable per `file_id`, and a
    /// download is a one-off the caller writes to disk anyway.
    pub async fn download_attachment(&self, attachment: &TaskAttachment) -> Result<Vec<u8>> {
        let result = self.client.http.fetch_bytes(&attachment.url).await;
        if let Err(err) = &result {
            self.client.notifier().report_failure(err);
        }
        result
    }

    /// Remove a file attachment from a task.
    pub async fn remove_attachment(
        &self,
        project_id: &str,
        task_id: &str,
        file_id: &str,
    ) -> Result<()> {
        let body = serde_json::json!({ "fileId": file_id });
        self.client
            .write_ack(
                &[tasks_key(project_id), task_key(task_id)],
                ApiRequest::delete(format!("/tasks/{project_id}/{task_id}/attachments"))
                    .json(&body)?,
            )
            .await?;
        self.client.notifier().info("Attachment deleted");
        Ok(())
    }
}

/// Wire value of a task status for multipart text fields.
fn status_field(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "todo",
        TaskStatus::InProgress => "in_progress",
        TaskStatus::Done => "done",
    }
}
