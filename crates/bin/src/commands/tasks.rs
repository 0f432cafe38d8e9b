//! Task commands.

use taskcamp::{Client, api::types::CreateTaskRequest};

use crate::{cli::TaskCommands, output};

pub async fn run(client: &Client, command: TaskCommands) -> taskcamp::Result<()> {
    match command {
        TaskCommands::List { project_id } => list(client, &project_id).await,
        TaskCommands::Show {
            project_id,
            task_id,
        } => show(client, &project_id, &task_id).await,
        TaskCommands::Create {
            project_id,
            title,
            description,
            assigned_to,
            status,
        } => {
            let request = CreateTaskRequest {
                title,
                description,
                assigned_to,
                status: status.into(),
                subtasks: None,
            };
            let task = client.tasks().create(&project_id, request, Vec::new()).await?;
            println!("Task created: {}", task.id);
            Ok(())
        }
        TaskCommands::Delete {
            project_id,
            task_id,
        } => {
            client.tasks().delete(&project_id, &task_id).await?;
            println!("Task deleted");
            Ok(())
        }
        TaskCommands::Toggle {
            project_id,
            task_id,
            subtask_id,
            done,
        } => {
            let toggled = client
                .tasks()
                .toggle_subtask(&project_id, &task_id, &subtask_id, done)
                .await?;
            println!(
                "Subtask '{}' is now {}",
                toggled.subtask.title,
                if toggled.subtask.is_completed {
                    "completed"
                } else {
                    "open"
                }
            );
            if toggled.task_status {
                println!("All subtasks done; task marked complete");
            }
            Ok(())
        }
    }
}

async fn list(client: &Client, project_id: &str) -> taskcamp::Result<()> {
    let tasks = client.tasks().list(project_id).await?;
    let rows: Vec<Vec<String>> = tasks
        .iter()
        .map(|task| {
            vec![
                task.id.clone(),
                task.title.clone(),
                format!("{:?}", task.status),
                task.created_by.username.clone(),
            ]
        })
        .collect();
    output::print_table(&["ID", "TITLE", "STATUS", "CREATED BY"], &rows);
    Ok(())
}

async fn show(client: &Client, project_id: &str, task_id: &str) -> taskcamp::Result<()> {
    let task = client.tasks().get(project_id, task_id).await?;
    println!("{} ({:?})", task.title, task.status);
    if let Some(description) = &task.description {
        println!("  {description}");
    }
    for subtask in task.subtasks.as_deref().unwrap_or_default() {
        let mark = if subtask.is_completed { "x" } else { " " };
        println!("  [{mark}] {} ({})", subtask.title, subtask.id);
    }
    if !task.attachments.is_empty() {
        println!("  attachments:");
        for attachment in &task.attachments {
            println!("    {} ({})", attachment.url, attachment.file_id);
        }
    }
    Ok(())
}
