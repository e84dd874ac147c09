use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use feedline::config::{config_schema, load_config, ConfigError};
use feedline::gateway::ApiError;
use feedline::models::{Comment, Page, Post, User};
use feedline::services::{ImageUpload, PostDraft, ProfileUpdate, UploadError};
use feedline::startup::{start, StartupError};
use feedline::state::AppState;
use feedline::utils::logger::init_logging;
use feedline::utils::media::MediaResolver;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("not logged in; run `feedline login` first")]
    NotLoggedIn,
}

#[derive(Parser, Debug)]
#[command(name = "feedline", about = "Command line client for the feedline social API")]
struct Cli {
    #[arg(long, env = "FEEDLINE_CONFIG", default_value = "./config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the configuration JSON schema.
    Schema,
    Login {
        username: String,
        #[arg(long, env = "FEEDLINE_PASSWORD")]
        password: String,
    },
    Logout,
    Whoami,
    Signup {
        username: String,
        email: String,
        #[arg(long, env = "FEEDLINE_PASSWORD")]
        password: String,
    },
    Feed {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    UserPosts {
        user_id: u64,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Post {
        post_id: u64,
    },
    CreatePost {
        #[arg(long, default_value = "")]
        content: String,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    EditPost {
        post_id: u64,
        #[arg(long)]
        content: Option<String>,
        #[arg(long, conflicts_with = "remove_image")]
        image: Option<PathBuf>,
        #[arg(long)]
        remove_image: bool,
    },
    DeletePost {
        post_id: u64,
    },
    /// Toggle the like on a post.
    Like {
        post_id: u64,
    },
    /// Toggle the bookmark on a post.
    Save {
        post_id: u64,
    },
    Comments {
        post_id: u64,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Comment {
        post_id: u64,
        content: String,
    },
    /// Toggle following a user.
    Follow {
        user_id: u64,
    },
    Followers {
        user_id: u64,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Following {
        user_id: u64,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    UpdateProfile {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, conflicts_with = "remove_profile_pic")]
        profile_pic: Option<PathBuf>,
        #[arg(long, conflicts_with = "remove_cover_pic")]
        cover_pic: Option<PathBuf>,
        #[arg(long)]
        remove_profile_pic: bool,
        #[arg(long)]
        remove_cover_pic: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        match &e {
            CliError::Api(api) => {
                for line in api.display_lines() {
                    eprintln!("Error: {}", line);
                }
            }
            other => eprintln!("Error: {}", other),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    if let Command::Schema = cli.command {
        println!("{}", config_schema()?);
        return Ok(());
    }

    let config = load_config(&cli.config)?;
    init_logging(&config.logging)?;
    let (state, _) = start(config).await?;

    match cli.command {
        Command::Schema => Ok(()),
        Command::Login { username, password } => {
            let user = state.session.login(&username, &password).await?;
            print_json(&present_user(&state.media, user))
        }
        Command::Logout => {
            state.session.logout().await;
            println!("ok");
            Ok(())
        }
        Command::Whoami => {
            let user = state.session.current_user().ok_or(CliError::NotLoggedIn)?;
            print_json(&present_user(&state.media, user))
        }
        Command::Signup {
            username,
            email,
            password,
        } => {
            state.session.signup(&username, &email, &password).await?;
            println!("ok");
            Ok(())
        }
        Command::Feed { page } => {
            let posts = state.posts.all_posts(page).await?;
            print_json(&present_posts(&state.media, posts))
        }
        Command::UserPosts { user_id, page } => {
            let posts = state.posts.user_posts(user_id, page).await?;
            print_json(&present_posts(&state.media, posts))
        }
        Command::Post { post_id } => {
            let post = state.posts.post(post_id).await?;
            print_json(&present_post(&state.media, post))
        }
        Command::CreatePost { content, image } => {
            require_login(&state)?;
            let mut draft = PostDraft::new(content);
            if let Some(path) = image {
                draft = draft.with_image(ImageUpload::from_path(&path).await?);
            }
            let post = state.posts.create_post(&draft).await?;
            print_json(&present_post(&state.media, post))
        }
        Command::EditPost {
            post_id,
            content,
            image,
            remove_image,
        } => {
            require_login(&state)?;
            let current = state.posts.post(post_id).await?;
            let mut draft = PostDraft::edit(&current);
            if let Some(content) = content {
                draft.content = content;
            }
            if remove_image {
                draft = draft.remove_image();
            }
            if let Some(path) = image {
                draft = draft.with_image(ImageUpload::from_path(&path).await?);
            }
            let post = state.posts.update_post(post_id, &draft).await?;
            print_json(&present_post(&state.media, post))
        }
        Command::DeletePost { post_id } => {
            require_login(&state)?;
            state.posts.delete_post(post_id).await?;
            println!("ok");
            Ok(())
        }
        Command::Like { post_id } => {
            require_login(&state)?;
            state.posts.like_post(post_id).await?;
            println!("ok");
            Ok(())
        }
        Command::Save { post_id } => {
            require_login(&state)?;
            state.posts.save_post(post_id).await?;
            println!("ok");
            Ok(())
        }
        Command::Comments { post_id, page } => {
            let comments = state.comments.post_comments(post_id, page).await?;
            print_json(&present_comments(&state.media, comments))
        }
        Command::Comment { post_id, content } => {
            require_login(&state)?;
            let comment = state.comments.create_comment(post_id, &content).await?;
            print_json(&present_comment(&state.media, comment))
        }
        Command::Follow { user_id } => {
            require_login(&state)?;
            state.auth.follow_unfollow(user_id).await?;
            println!("ok");
            Ok(())
        }
        Command::Followers { user_id, page } => {
            let users = state.auth.followers(user_id, page).await?;
            print_json(&present_users(&state.media, users))
        }
        Command::Following { user_id, page } => {
            let users = state.auth.following(user_id, page).await?;
            print_json(&present_users(&state.media, users))
        }
        Command::UpdateProfile {
            username,
            email,
            profile_pic,
            cover_pic,
            remove_profile_pic,
            remove_cover_pic,
        } => {
            let current = state.session.current_user().ok_or(CliError::NotLoggedIn)?;
            let mut update = ProfileUpdate::from_user(&current);
            if let Some(username) = username {
                update = update.username(username);
            }
            if let Some(email) = email {
                update = update.email(email);
            }
            if remove_profile_pic {
                update = update.remove_profile_pic();
            }
            if remove_cover_pic {
                update = update.remove_cover_pic();
            }
            if let Some(path) = profile_pic {
                update = update.profile_pic(ImageUpload::from_path(&path).await?);
            }
            if let Some(path) = cover_pic {
                update = update.cover_pic(ImageUpload::from_path(&path).await?);
            }
            let user = state.session.update_user(&update).await?;
            print_json(&present_user(&state.media, user))
        }
    }
}

fn require_login(state: &AppState) -> Result<(), CliError> {
    if state.session.is_authenticated() {
        Ok(())
    } else {
        Err(CliError::NotLoggedIn)
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn resolve(media: &MediaResolver, url: Option<String>) -> Option<String> {
    Some(media.resolve(url.as_deref())).filter(|u| !u.is_empty())
}

fn present_user(media: &MediaResolver, mut user: User) -> User {
    user.profile_pic = resolve(media, user.profile_pic);
    user.cover_pic = resolve(media, user.cover_pic);
    user
}

fn present_users(media: &MediaResolver, mut page: Page<User>) -> Page<User> {
    page.results = page
        .results
        .into_iter()
        .map(|u| present_user(media, u))
        .collect();
    page
}

fn present_post(media: &MediaResolver, mut post: Post) -> Post {
    post.image = resolve(media, post.image);
    post.creator.profile_pic = resolve(media, post.creator.profile_pic);
    post
}

fn present_posts(media: &MediaResolver, mut page: Page<Post>) -> Page<Post> {
    page.results = page
        .results
        .into_iter()
        .map(|p| present_post(media, p))
        .collect();
    page
}

fn present_comment(media: &MediaResolver, mut comment: Comment) -> Comment {
    comment.creator.profile_pic = resolve(media, comment.creator.profile_pic);
    comment.post_creator_profile = media.resolve(Some(comment.post_creator_profile.as_str()));
    comment
}

fn present_comments(media: &MediaResolver, mut page: Page<Comment>) -> Page<Comment> {
    page.results = page
        .results
        .into_iter()
        .map(|c| present_comment(media, c))
        .collect();
    page
}
