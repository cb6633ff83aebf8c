use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use board_client::navigator::{Navigator, ToastKind};
use board_client::net::types::{ApiResponse, Cursor};
use board_client::services::transform_posts_response;
use board_client::util::error_message::contextual_error_message;
use board_client::util::router::ROUTES;
use board_client::util::validators::{
    Validation, validate_comment, validate_email, validate_nickname, validate_password, validate_password_confirm,
    validate_post_content, validate_post_title,
};
use board_client::{BoardApp, ClientConfig, ClientError};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),
    /// Input rejected before any request was sent.
    #[error("{0}")]
    Invalid(String),
    /// The backend refused the request; the message is already user-facing.
    #[error("{0}")]
    Api(String),
    #[error("not logged in; run `board login` first")]
    NotLoggedIn,
    #[error("refusing to delete the account without --yes")]
    Unconfirmed,
    #[error("output encode failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "board", about = "Community board command-line client")]
struct Cli {
    /// API base URL including `/api/v1`; derived from `BOARD_ENV` when unset.
    #[arg(long, env = "BOARD_API_BASE_URL")]
    base_url: Option<String>,

    /// Directory holding the durable session file.
    #[arg(long, env = "BOARD_DATA_DIR", default_value = ".board")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "BOARD_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        password_confirm: String,
        #[arg(long)]
        nickname: String,
    },
    Logout,
    /// Show the stored session; `--remote` re-reads the profile from the backend.
    Whoami {
        #[arg(long, default_value_t = false)]
        remote: bool,
    },
    Posts(PostsCommand),
    Comments(CommentsCommand),
    Profile(ProfileCommand),
    Check(CheckCommand),
}

#[derive(Args, Debug)]
struct PageArgs {
    #[arg(long, default_value_t = 10)]
    size: u32,
    #[arg(long, requires = "cursor_created_at")]
    cursor_id: Option<i64>,
    #[arg(long, requires = "cursor_id")]
    cursor_created_at: Option<String>,
}

impl PageArgs {
    fn cursor(&self) -> Option<Cursor> {
        match (self.cursor_id, &self.cursor_created_at) {
            (Some(id), Some(created_at)) => Some(Cursor { id, created_at: created_at.clone(), has_next: true }),
            _ => None,
        }
    }
}

#[derive(Args, Debug)]
struct PostsCommand {
    #[command(subcommand)]
    command: PostsSubcommand,
}

#[derive(Subcommand, Debug)]
enum PostsSubcommand {
    List(PageArgs),
    Show {
        id: i64,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
    Update {
        id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
    Delete {
        id: i64,
    },
}

#[derive(Args, Debug)]
struct CommentsCommand {
    #[command(subcommand)]
    command: CommentsSubcommand,
}

#[derive(Subcommand, Debug)]
enum CommentsSubcommand {
    List {
        post_id: i64,
        #[command(flatten)]
        page: PageArgs,
    },
    Add {
        post_id: i64,
        #[arg(long)]
        content: String,
    },
    Edit {
        comment_id: i64,
        #[arg(long)]
        content: String,
    },
    Delete {
        comment_id: i64,
    },
}

#[derive(Args, Debug)]
struct ProfileCommand {
    #[command(subcommand)]
    command: ProfileSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProfileSubcommand {
    Nickname {
        nickname: String,
    },
    Password {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
    Delete {
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
struct CheckCommand {
    #[command(subcommand)]
    command: CheckSubcommand,
}

#[derive(Subcommand, Debug)]
enum CheckSubcommand {
    Email { email: String },
    Nickname { nickname: String },
}

/// Prints toasts to stderr and turns navigation into a hint.
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn toast(&self, kind: ToastKind, message: &str) {
        let label = match kind {
            ToastKind::Success => "ok",
            ToastKind::Info => "info",
            ToastKind::Warning => "warning",
            ToastKind::Error => "error",
        };
        eprintln!("[{label}] {message}");
    }

    fn navigate(&self, location: &str) {
        if location == ROUTES.login {
            eprintln!("run `board login` to sign in again");
        } else {
            tracing::debug!(location, "navigation ignored");
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.base_url {
        config.set_api_base_url(url)?;
    }
    let app = BoardApp::with_data_dir(config, &cli.data_dir, Arc::new(TerminalNavigator))?;
    app.session.subscribe(|snapshot| {
        tracing::debug!(logged_in = snapshot.is_logged_in, "session state");
    });

    match cli.command {
        Command::Login { email, password } => run_login(&app, &email, &password).await,
        Command::Signup { email, password, password_confirm, nickname } => {
            run_signup(&app, &email, &password, &password_confirm, &nickname).await
        }
        Command::Logout => {
            app.auth.logout().await;
            println!("logged out");
            Ok(())
        }
        Command::Whoami { remote } => run_whoami(&app, remote).await,
        Command::Posts(posts) => run_posts(&app, posts).await,
        Command::Comments(comments) => run_comments(&app, comments).await,
        Command::Profile(profile) => run_profile(&app, profile).await,
        Command::Check(check) => run_check(&app, check).await,
    }
}

async fn run_login(app: &BoardApp, email: &str, password: &str) -> Result<(), CliError> {
    ensure(validate_email(email))?;
    if password.is_empty() {
        return Err(CliError::Invalid("비밀번호를 입력해주세요.".to_owned()));
    }
    let profile = expect_success(app.auth.login(email, password).await, "로그인")?;
    if let Some(profile) = profile {
        println!("logged in as {} <{}>", profile.nickname, profile.email);
    }
    Ok(())
}

async fn run_signup(
    app: &BoardApp,
    email: &str,
    password: &str,
    password_confirm: &str,
    nickname: &str,
) -> Result<(), CliError> {
    ensure(validate_email(email))?;
    ensure(validate_password(password))?;
    ensure(validate_password_confirm(password, password_confirm))?;
    ensure(validate_nickname(nickname))?;
    expect_success(app.auth.signup(email, password, nickname.trim()).await, "회원가입")?;
    println!("signed up; run `board login` next");
    Ok(())
}

async fn run_whoami(app: &BoardApp, remote: bool) -> Result<(), CliError> {
    if !app.auth.is_logged_in() {
        return Err(CliError::NotLoggedIn);
    }
    if remote {
        expect_success(app.auth.get_current_user().await, "프로필 불러오기")?;
    }
    let snapshot = app.session.get_state();
    print_json(&serde_json::to_value(snapshot.user)?)
}

async fn run_posts(app: &BoardApp, posts: PostsCommand) -> Result<(), CliError> {
    match posts.command {
        PostsSubcommand::List(page) => {
            let cursor = page.cursor();
            let response = app.posts.fetch_posts(cursor.as_ref(), page.size).await;
            if !response.success {
                return Err(CliError::Api(contextual_error_message(&response, "게시글 불러오기")));
            }
            let listing = transform_posts_response(&response);
            for post in &listing.posts {
                println!(
                    "#{} {} | {} | {} | views {} comments {}",
                    post.id, post.title, post.author, post.created_at, post.views, post.comments
                );
            }
            if let Some(next) = listing.cursor.filter(|c| c.has_next) {
                println!("next page: --cursor-id {} --cursor-created-at {}", next.id, next.created_at);
            }
            Ok(())
        }
        PostsSubcommand::Show { id } => {
            let post = expect_success(app.posts.get_post(id).await, "게시글 불러오기")?;
            print_json(&serde_json::to_value(post)?)
        }
        PostsSubcommand::Create { title, content } => {
            require_login(app)?;
            ensure(validate_post_title(&title))?;
            ensure(validate_post_content(&content))?;
            let created = expect_success(app.posts.create_post(&title, &content).await, "게시글 작성")?;
            match created {
                Some(created) => println!("created post #{}", created.id),
                None => println!("created post"),
            }
            Ok(())
        }
        PostsSubcommand::Update { id, title, content } => {
            require_login(app)?;
            ensure(validate_post_title(&title))?;
            ensure(validate_post_content(&content))?;
            expect_success(app.posts.update_post(id, &title, &content).await, "게시글 수정")?;
            println!("updated post #{id}");
            Ok(())
        }
        PostsSubcommand::Delete { id } => {
            require_login(app)?;
            expect_success(app.posts.delete_post(id).await, "게시글 삭제")?;
            println!("deleted post #{id}");
            Ok(())
        }
    }
}

async fn run_comments(app: &BoardApp, comments: CommentsCommand) -> Result<(), CliError> {
    match comments.command {
        CommentsSubcommand::List { post_id, page } => {
            let cursor = page.cursor();
            let listing = expect_success(
                app.comments.fetch_comments(post_id, cursor.as_ref(), page.size).await,
                "댓글 불러오기",
            )?;
            let Some(listing) = listing else {
                return Ok(());
            };
            for comment in &listing.comments {
                println!("#{} {} | {} | {}", comment.id, comment.author_nickname, comment.created_at, comment.content);
            }
            if let Some(next) = listing.cursor.filter(|c| c.has_next) {
                println!("next page: --cursor-id {} --cursor-created-at {}", next.id, next.created_at);
            }
            Ok(())
        }
        CommentsSubcommand::Add { post_id, content } => {
            require_login(app)?;
            ensure(validate_comment(&content))?;
            let created = expect_success(app.comments.create_comment(post_id, &content).await, "댓글 작성")?;
            match created {
                Some(created) => println!("added comment #{}", created.id),
                None => println!("added comment"),
            }
            Ok(())
        }
        CommentsSubcommand::Edit { comment_id, content } => {
            require_login(app)?;
            ensure(validate_comment(&content))?;
            expect_success(app.comments.update_comment(comment_id, &content).await, "댓글 수정")?;
            println!("updated comment #{comment_id}");
            Ok(())
        }
        CommentsSubcommand::Delete { comment_id } => {
            require_login(app)?;
            expect_success(app.comments.delete_comment(comment_id).await, "댓글 삭제")?;
            println!("deleted comment #{comment_id}");
            Ok(())
        }
    }
}

async fn run_profile(app: &BoardApp, profile: ProfileCommand) -> Result<(), CliError> {
    require_login(app)?;
    match profile.command {
        ProfileSubcommand::Nickname { nickname } => {
            ensure(validate_nickname(&nickname))?;
            expect_success(app.auth.update_nickname(nickname.trim()).await, "닉네임 수정")?;
            println!("nickname changed to {}", nickname.trim());
            Ok(())
        }
        ProfileSubcommand::Password { current, new, confirm } => {
            if current.is_empty() {
                return Err(CliError::Invalid("현재 비밀번호를 입력해주세요.".to_owned()));
            }
            ensure(validate_password(&new))?;
            ensure(validate_password_confirm(&new, &confirm))?;
            expect_success(app.auth.change_password(&current, &new).await, "비밀번호 변경")?;
            println!("password changed");
            Ok(())
        }
        ProfileSubcommand::Delete { yes } => {
            if !yes {
                return Err(CliError::Unconfirmed);
            }
            expect_success(app.auth.delete_account().await, "회원 탈퇴")?;
            println!("account deleted");
            Ok(())
        }
    }
}

async fn run_check(app: &BoardApp, check: CheckCommand) -> Result<(), CliError> {
    let (response, action) = match check.command {
        CheckSubcommand::Email { email } => {
            ensure(validate_email(&email))?;
            (app.auth.check_email_duplicate(&email).await, "이메일 중복 확인")
        }
        CheckSubcommand::Nickname { nickname } => {
            ensure(validate_nickname(&nickname))?;
            (app.auth.check_nickname_duplicate(nickname.trim()).await, "닉네임 중복 확인")
        }
    };
    let data = expect_success(response, action)?;
    print_json(&data.unwrap_or(Value::Null))
}

fn ensure(validation: Validation) -> Result<(), CliError> {
    if validation.is_valid { Ok(()) } else { Err(CliError::Invalid(validation.message)) }
}

fn require_login(app: &BoardApp) -> Result<(), CliError> {
    if app.auth.is_logged_in() { Ok(()) } else { Err(CliError::NotLoggedIn) }
}

/// Unwrap a successful envelope, or turn the failure into a contextual message.
fn expect_success<T>(response: ApiResponse<T>, action: &str) -> Result<Option<T>, CliError> {
    if response.success {
        Ok(response.data)
    } else {
        Err(CliError::Api(contextual_error_message(&response, action)))
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
