use std::process::ExitCode;
use std::sync::Arc;

use attendance_session::{
    activity::{ActivityEvent, ActivityMonitor},
    api::{AuthClient, LoginForm},
    cache::{LoginOutcome, SessionManager},
    config::Config,
    navigation::{UserDisplay, is_active, menu_for_role},
    open_store, session_manager,
    timing::{SystemClock, TokioScheduler},
};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 未通过页面守卫时的退出码
const DENIED: u8 = 2;

#[derive(Parser)]
#[command(name = "attendance-session", about = "Attendance portal session cache")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and cache the session locally
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        remember: bool,
    },
    /// Show the cached identity and its navigation menu
    Whoami {
        #[arg(long, default_value = "/dashboard")]
        path: String,
    },
    /// Check whether a protected page may be shown
    Guard {
        #[arg(long)]
        role: Option<String>,
    },
    /// Extend the cached session
    Refresh,
    /// Clear the cached session and sign out on the server
    Logout,
    /// Treat every stdin line as user activity and keep the session alive
    Watch,
}

#[tokio::main]
async fn main() -> ExitCode {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // 加载配置
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let store = match open_store(&config) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open session store: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let session = Arc::new(session_manager(&config, store, Arc::new(SystemClock)));
    let client = AuthClient::new(config.api_base_url.clone());

    match cli.command {
        Command::Login {
            email,
            password,
            remember,
        } => login(&session, &client, LoginForm::new(email, password, remember)).await,
        Command::Whoami { path } => whoami(&session, &path),
        Command::Guard { role } => {
            let access = session.protect_page(role.as_deref());
            match access.redirect_path(&config) {
                None => {
                    println!("granted");
                    ExitCode::SUCCESS
                }
                Some(target) => {
                    println!("redirect {}", target);
                    ExitCode::from(DENIED)
                }
            }
        }
        Command::Refresh => {
            if session.refresh_session() {
                println!("Session refreshed");
                ExitCode::SUCCESS
            } else {
                println!("No valid session to refresh");
                ExitCode::from(DENIED)
            }
        }
        Command::Logout => {
            let outcome = session.logout(&client).await;
            println!("Logged out, continue at {}", outcome.redirect);
            ExitCode::SUCCESS
        }
        Command::Watch => watch(&config, session).await,
    }
}

async fn login(session: &SessionManager, client: &AuthClient, form: LoginForm) -> ExitCode {
    match session.login(client, &form).await {
        Ok(LoginOutcome::Success {
            user,
            redirect,
            persisted,
        }) => {
            if !persisted {
                tracing::warn!("Signed in but the session could not be cached locally");
            }
            println!("Welcome {} ({}), continue at {}", user.name, user.role, redirect);
            ExitCode::SUCCESS
        }
        Ok(LoginOutcome::Rejected { message }) => {
            println!("{}", message);
            ExitCode::from(DENIED)
        }
        Ok(LoginOutcome::Invalid(issue)) => {
            println!("{}", issue);
            ExitCode::from(DENIED)
        }
        Err(e) => {
            tracing::error!("Login error: {}", e);
            println!("An error occurred. Please try again.");
            ExitCode::FAILURE
        }
    }
}

fn whoami(session: &SessionManager, path: &str) -> ExitCode {
    let Some(record) = session.get_session() else {
        println!("Not logged in");
        return ExitCode::from(DENIED);
    };
    let display = UserDisplay::from(&record);

    println!("{} <{}> {}", display.name, display.email, display.role_label);
    println!("Session expires at {}", record.expires_at.to_rfc3339());
    for item in menu_for_role(&record.role) {
        let marker = if is_active(item.href, path) { "*" } else { " " };
        println!("{} {:<16} {}", marker, item.label, item.href);
    }
    ExitCode::SUCCESS
}

// 长驻进程：每行标准输入视为一次用户活动，退出前显式取消定时器
async fn watch(config: &Config, session: Arc<SessionManager>) -> ExitCode {
    if !session.is_logged_in() {
        println!("Not logged in");
        return ExitCode::from(DENIED);
    }

    let Some(scheduler) = TokioScheduler::current() else {
        tracing::error!("Watch mode requires a tokio runtime");
        return ExitCode::FAILURE;
    };
    let scheduler = Arc::new(scheduler);
    let monitor = ActivityMonitor::new(Arc::clone(&session), scheduler.clone())
        .with_debounce(config.activity_debounce());
    tracing::info!("Session auto-refresh initialized");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    let event = line.parse().unwrap_or(ActivityEvent::KeyDown);
                    if !monitor.record_activity(event) {
                        println!("Session ended");
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("Failed to read activity from stdin: {}", e);
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    monitor.shutdown();
    scheduler.shutdown();
    ExitCode::SUCCESS
}
