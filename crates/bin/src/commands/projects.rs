//! Project commands.

use taskcamp::{Client, api::types::CreateProjectRequest};

use crate::{cli::ProjectCommands, output};

pub async fn run(client: &Client, command: ProjectCommands) -> taskcamp::Result<()> {
    match command {
        ProjectCommands::List => list(client).await,
        ProjectCommands::Show { project_id } => show(client, &project_id).await,
        ProjectCommands::Create { name, description } => {
            client
                .projects()
                .create(CreateProjectRequest { name, description })
                .await?;
            println!("Project created");
            Ok(())
        }
        ProjectCommands::Delete { project_id } => {
            client.projects().delete(&project_id).await?;
            println!("Project deleted");
            Ok(())
        }
        ProjectCommands::Members { project_id } => members(client, &project_id).await,
    }
}

async fn list(client: &Client) -> taskcamp::Result<()> {
    let items = client.projects().list().await?;
    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|item| {
            vec![
                item.project.id.clone(),
                item.project.name.clone(),
                format!("{:?}", item.role).to_lowercase(),
                item.project.members.to_string(),
            ]
        })
        .collect();
    output::print_table(&["ID", "NAME", "ROLE", "MEMBERS"], &rows);
    Ok(())
}

async fn show(client: &Client, project_id: &str) -> taskcamp::Result<()> {
    let project = client.projects().get(project_id).await?;
    println!("{} ({})", project.name, project.id);
    if let Some(description) = &project.description {
        println!("  {description}");
    }
    println!("  created by {} at {}", project.created_by, project.created_at);
    Ok(())
}

async fn members(client: &Client, project_id: &str) -> taskcamp::Result<()> {
    let members = client.projects().members(project_id).await?;
    let rows: Vec<Vec<String>> = members
        .iter()
        .map(|member| {
            vec![
                member.user.id.clone(),
                member.user.username.clone(),
                member.user.email.clone(),
                format!("{:?}", member.role).to_lowercase(),
            ]
        })
        .collect();
    output::print_table(&["ID", "USERNAME", "EMAIL", "ROLE"], &rows);
    Ok(())
}
