use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use wpilib_prefs::ide::console::ConsoleHost;
use wpilib_prefs::ide::HostBridge;
use wpilib_prefs::preferences::Preferences;
use wpilib_prefs::settings::bridge::JsonSettingsBridge;
use wpilib_prefs::settings::{SettingsOverlay, SettingsScope};
use wpilib_prefs::ExtensionContext;

#[derive(Parser)]
#[command(
    name = "wpilib-prefs",
    about = "Workspace preferences store for FRC robot projects",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Workspace root (defaults to the current directory)
    #[arg(long, env = "WPILIB_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Extension root holding package.json (defaults to the workspace root)
    #[arg(long, env = "WPILIB_EXTENSION_ROOT")]
    extension_root: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error)
    #[arg(long, env = "WPILIB_LOG", default_value = "info")]
    log: String,
}

#[derive(Subcommand)]
enum Command {
    /// Show the mirrored preferences and the overlay toggles.
    Info,
    /// Resolve the team number, prompting if none is saved.
    Team,
    /// Save the team number.
    SetTeam {
        number: i32,
    },
    /// Save the project language (e.g. java, cpp).
    SetLanguage {
        language: String,
    },
    /// Save the project year.
    SetYear {
        year: String,
    },
    /// Enable or disable C++ IntelliSense configuration.
    SetIntellisense {
        #[arg(value_parser = clap::value_parser!(bool))]
        enabled: bool,
    },
    /// Review every declared boolean setting in a multi-select and write
    /// back the changes.
    Settings {
        /// Write to user-level settings instead of the workspace
        #[arg(long)]
        global: bool,
    },
    /// Watch the workspace for external preferences changes until Ctrl-C.
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_new(&args.log).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .init();

    let workspace = match args.workspace {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    let extension_root = args.extension_root.unwrap_or_else(|| workspace.clone());
    let ctx = ExtensionContext::new(extension_root);

    let overlay: Arc<dyn SettingsOverlay> = Arc::new(JsonSettingsBridge::new(&workspace));
    let host: Arc<dyn HostBridge> = Arc::new(ConsoleHost::new());
    let prefs = Preferences::create(&workspace, &ctx, overlay, host).await?;

    match args.command {
        Command::Info => {
            let document = prefs.document().await;
            println!(
                "workspace:            {}{}",
                workspace.display(),
                if prefs.is_wpilib_project().await {
                    ""
                } else {
                    "  (not a recognized project)"
                }
            );
            println!("language:             {}", document.current_language);
            println!("team number:          {}", document.team_number);
            println!("project year:         {}", document.project_year);
            println!("cpp intellisense:     {}", document.enable_cpp_intellisense);
            println!("auto-start RioLog:    {}", prefs.auto_start_rio_log().await);
            println!("online deploy:        {}", prefs.online().await);
            println!("skip tests:           {}", prefs.skip_tests().await);
            println!("auto-save on deploy:  {}", prefs.auto_save_on_deploy().await);
            println!(
                "stop sim on entry:    {}",
                prefs.stop_simulation_on_entry().await
            );
            let extra = prefs.additional_gradle_arguments().await;
            if !extra.is_empty() {
                println!("gradle arguments:     {extra}");
            }
        }
        Command::Team => {
            let number = prefs.team_number().await?;
            if number < 0 {
                println!("no team number set");
            } else {
                println!("{number}");
            }
        }
        Command::SetTeam { number } => {
            prefs.set_team_number(number).await?;
            println!("team number saved: {number}");
        }
        Command::SetLanguage { language } => {
            prefs.set_current_language(&language).await?;
            println!("language saved: {language}");
        }
        Command::SetYear { year } => {
            prefs.set_project_year(&year).await?;
            println!("project year saved: {year}");
        }
        Command::SetIntellisense { enabled } => {
            prefs.set_enable_cpp_intellisense(enabled).await?;
            println!("cpp intellisense: {enabled}");
        }
        Command::Settings { global } => {
            let scope = if global {
                SettingsScope::Global
            } else {
                SettingsScope::WorkspaceFolder
            };
            prefs.update_bulk_settings(scope).await?;
        }
        Command::Watch => {
            info!(workspace = %workspace.display(), "watching for preferences changes (Ctrl-C to stop)");
            tokio::signal::ctrl_c().await?;
            let document = prefs.document().await;
            println!(
                "final state: language={} team={} year={} project={}",
                document.current_language,
                document.team_number,
                document.project_year,
                prefs.is_wpilib_project().await
            );
        }
    }

    Ok(())
}
