use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use skillforge::cli::{
    Cli, Commands, ConfigAction, GroupAction, TagAction, TemplateAction, WorkspaceAction,
};
use skillforge::commands::{self, App};
use skillforge::config::Config;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so command output stays clean. `RUST_LOG` wins over
/// the `-v` default.
fn init_logging(verbose: bool) {
    let default = if verbose { "skillforge=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if let Some(dir) = cli.skills_dir {
        config.storage.skills_dir = Some(dir);
    }
    let app = App::new(config);

    match cli.command {
        Commands::Init => commands::manage::init(&app, std::io::stdin().is_terminal()),
        Commands::Add {
            name,
            desc,
            rules,
            tags,
            group,
            manual,
        } => commands::manage::add(
            &app,
            commands::manage::NewSkill {
                name,
                description: desc,
                rules,
                tags,
                group,
                manual,
            },
        ),
        Commands::List { tag, group, long } => {
            commands::manage::list(&app, tag.as_deref(), group.as_deref(), long)
        }
        Commands::Show { name, raw } => commands::manage::show(&app, &name, raw),
        Commands::Edit {
            name,
            new_name,
            desc,
            rules,
            group,
        } => commands::manage::edit(
            &app,
            &name,
            commands::manage::SkillEdit {
                name: new_name,
                description: desc,
                rules,
                group,
            },
        ),
        Commands::Remove { name } => commands::manage::remove(&app, &name),
        Commands::Validate { name } => commands::manage::validate(&app, &name),
        Commands::History { name } => commands::history::history(&app, &name),
        Commands::Rollback { name, version } => commands::history::rollback(&app, &name, &version),
        Commands::Diff { name, v1, v2 } => commands::history::diff(&app, &name, v1, v2),
        Commands::Template { action } => match action {
            TemplateAction::List => commands::template::list(),
            TemplateAction::Show { name } => commands::template::show(&name),
            TemplateAction::Use { template, name } => {
                commands::template::use_template(&app, &template, name.as_deref())
            }
        },
        Commands::Export {
            name,
            format,
            output,
        } => commands::transfer::export(&app, &name, &format, output.as_deref()),
        Commands::Import {
            source,
            format,
            name,
            improve,
            all,
        } => commands::transfer::import(
            &app,
            &source,
            commands::transfer::ImportOptions {
                format,
                name,
                improve,
                overwrite: all,
            },
        ),
        Commands::Tag { action } => match action {
            TagAction::List => commands::organize::tag_list(&app),
            TagAction::Show { tag } => commands::organize::tag_show(&app, &tag),
            TagAction::Add { skill, tags } => commands::organize::tag_add(&app, &skill, &tags),
            TagAction::Remove { skill, tags } => {
                commands::organize::tag_remove(&app, &skill, &tags)
            }
        },
        Commands::Group { action } => match action {
            GroupAction::List => commands::organize::group_list(&app),
            GroupAction::Show { group } => commands::organize::group_show(&app, &group),
            GroupAction::Set { skill, group } => {
                commands::organize::group_set(&app, &skill, &group)
            }
            GroupAction::Unset { skill } => commands::organize::group_unset(&app, &skill),
        },
        Commands::Workspace { action } => match action {
            WorkspaceAction::Init { name } => commands::workspace::init(&app, name.as_deref()),
            WorkspaceAction::Show => commands::workspace::show(&app),
            WorkspaceAction::Add { skill } => commands::workspace::add(&app, &skill),
            WorkspaceAction::Remove { skill } => commands::workspace::remove(&app, &skill),
            WorkspaceAction::AddGroup { group } => commands::workspace::add_group(&app, &group),
            WorkspaceAction::Set {
                skill,
                variable,
                value,
            } => commands::workspace::set(&app, &skill, &variable, &value),
        },
        Commands::Improve { name, apply } => commands::ai::improve(&app, &name, apply),
        Commands::Explain { name, detailed } => commands::ai::explain(&app, &name, detailed),
        Commands::Test { name, prompt, mock } => {
            commands::ai::test(&app, &name, prompt.as_deref(), mock)
        }
        Commands::Config { action } => match action {
            ConfigAction::Set { key, value } => {
                commands::config::set(&app, &key, value.as_deref())
            }
            ConfigAction::Get { key } => commands::config::get(&app, &key),
            ConfigAction::List => commands::config::list(&app),
            ConfigAction::Path => commands::config::path(),
        },
        Commands::Sync { remote, push, pull } => {
            commands::sync::sync(&app, remote.as_deref(), push, pull)
        }
    }
}
