use clap::{Parser, Subcommand};
use std::time::Duration;

use crate::config;
use crate::errors::AppResult;
use crate::storage::CredentialStore;
use crate::uploader::api_client::ApiClient;
use crate::uploader::{PostSubmission, PostSubmissionHandler, SubmitOutcome};

#[derive(Parser)]
#[command(name = "photo-post-client", version, about = "Post images to a photo sharing service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Submit a new image post
    Post {
        /// Image files to attach, in order. May be empty.
        images: Vec<String>,

        /// Caption text for the post
        #[arg(short, long, default_value = "")]
        caption: String,
    },

    /// Manage the stored access token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Inspect or reset the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum TokenAction {
    /// Store an access token issued by the web application
    Set { value: String },

    /// Remove the stored access token
    Clear,

    /// Show whether a token is stored and when it was last written
    Status,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the active configuration
    Show,

    /// Reset the configuration file to defaults
    Reset,
}

pub async fn run(cli: Cli) -> AppResult<()> {
    let app_config = config::load_config()?;

    match cli.command {
        Command::Post { images, caption } => {
            let store = CredentialStore::open_default().await?;
            let client = ApiClient::new(
                &app_config.api_base_url,
                Duration::from_secs(app_config.request_timeout_secs),
            )?;
            let handler = PostSubmissionHandler::new(client, store);

            let outcome = handler
                .handle(PostSubmission {
                    image_paths: images,
                    caption,
                })
                .await?;

            match outcome {
                SubmitOutcome::Redirect(route) => {
                    println!(
                        "-> {}{}",
                        app_config.api_base_url.trim_end_matches('/'),
                        route.path()
                    );
                }
                SubmitOutcome::Stay => {
                    println!("Post was not accepted; see the log for details.");
                }
            }
        }

        Command::Token { action } => {
            let store = CredentialStore::open_default().await?;

            match action {
                TokenAction::Set { value } => {
                    store.set_access_token(&value).await?;
                    println!("Access token stored.");
                }
                TokenAction::Clear => {
                    store.clear_access_token().await?;
                    println!("Access token cleared.");
                }
                TokenAction::Status => match store.access_token().await? {
                    Some(_) => {
                        let updated = store.token_updated_at().await?;
                        match updated {
                            Some(ts) => println!(
                                "Access token present (last written {})",
                                ts.format("%Y-%m-%d %H:%M:%S UTC")
                            ),
                            None => println!("Access token present."),
                        }
                    }
                    None => println!("No access token stored."),
                },
            }
        }

        Command::Config { action } => match action {
            ConfigAction::Show => {
                println!("{}", serde_json::to_string_pretty(&app_config)?);
            }
            ConfigAction::Reset => {
                config::reset_config()?;
                println!("Configuration reset to defaults.");
            }
        },
    }

    Ok(())
}
