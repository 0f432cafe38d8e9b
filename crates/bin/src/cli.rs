//! CLI argument definitions for the Taskcamp binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use taskcamp::api::types::TaskStatus;

/// Taskcamp: project & task management from the terminal
#[derive(Parser, Debug)]
#[command(name = "taskcamp")]
#[command(about = "Taskcamp: project & task management from the terminal")]
#[command(version)]
pub struct Cli {
    /// API base URL, e.g. https://api.taskcamp.example/api/v1
    #[arg(long, env = "TASKCAMP_API_URL")]
    pub api_url: String,

    /// Durable session file; keeps you logged in between invocations
    #[arg(long, env = "TASKCAMP_SESSION_FILE", default_value = "taskcamp-session.json")]
    pub session_file: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in with email and password
    Login(LoginArgs),
    /// Log out and clear the local session
    Logout,
    /// Show the currently logged-in user
    Whoami,
    /// Check health of the API server
    Health,
    /// Project operations
    #[command(subcommand)]
    Project(ProjectCommands),
    /// Task operations
    #[command(subcommand)]
    Task(TaskCommands),
}

/// Arguments for the login command
#[derive(clap::Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(short, long)]
    pub email: String,

    /// Account password
    #[arg(short, long, env = "TASKCAMP_PASSWORD")]
    pub password: String,
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// List your projects
    List,
    /// Show one project
    Show { project_id: String },
    /// Create a project
    Create {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a project
    Delete { project_id: String },
    /// List a project's members
    Members { project_id: String },
}

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// List a project's tasks
    List { project_id: String },
    /// Show one task with its subtasks
    Show {
        project_id: String,
        task_id: String,
    },
    /// Create a task
    Create {
        project_id: String,
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        description: Option<String>,
        /// User id the task is assigned to
        #[arg(short, long)]
        assigned_to: String,
        #[arg(short, long, default_value = "todo")]
        status: StatusArg,
    },
    /// Delete a task
    Delete {
        project_id: String,
        task_id: String,
    },
    /// Toggle a subtask's completion
    Toggle {
        project_id: String,
        task_id: String,
        subtask_id: String,
        /// Mark completed (omit to mark incomplete)
        #[arg(long)]
        done: bool,
    },
}

/// Task status as a CLI value
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusArg {
    /// Not started
    Todo,
    /// In progress
    InProgress,
    /// Done
    Done,
}

impl From<StatusArg> for TaskStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Todo => TaskStatus::Todo,
            StatusArg::InProgress => TaskStatus::InProgress,
            StatusArg::Done => TaskStatus::Done,
        }
    }
}
