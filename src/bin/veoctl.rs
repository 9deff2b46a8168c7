use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use veo2_client::{
    AspectRatio, CancelToken, Config, CredentialStore, GenerationRequest, PersonGeneration,
    SourceImage, Veo2Node,
};

#[derive(Parser, Debug)]
#[command(name = "veoctl", about = "CLI for the Veo 2 video generation client", version)]
struct Cli {
    /// Override VEO_API_BASE_URL
    #[arg(global = true, long)]
    api_base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a video and print the status summary JSON
    Generate {
        /// Prompt text describing the desired video
        prompt: String,
        /// Negative prompt text
        #[arg(long, default_value = "")]
        negative_prompt: String,
        /// Aspect ratio: 16:9 or 9:16
        #[arg(long, default_value = "16:9")]
        aspect_ratio: AspectRatio,
        /// Person generation policy: dont_allow or allow_adult
        #[arg(long, default_value = "dont_allow")]
        person_generation: PersonGeneration,
        /// Clip length in seconds (5-8)
        #[arg(long, default_value_t = 8)]
        duration: u8,
        /// Number of videos to request (1-2); only the first is saved
        #[arg(long, default_value_t = 1)]
        count: u8,
        /// Seed recorded in the result metadata (0 = unset)
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Seed image for image-to-video generation
        #[arg(long, value_name = "PATH")]
        image: Option<PathBuf>,
        /// API key; overrides and persists the stored credential
        #[arg(long, default_value = "")]
        api_key: String,
        /// Override VEO_TIMEOUT_SECS for this run
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Override VEO_POLL_INTERVAL_SECS for this run
        #[arg(long)]
        poll_interval_secs: Option<u64>,
        /// Print resolved environment configuration before running
        #[arg(short, long)]
        verbose: bool,
    },
    /// API key management
    Key {
        #[command(subcommand)]
        cmd: KeyCmd,
    },
}

#[derive(Subcommand, Debug)]
enum KeyCmd {
    /// Persist an API key to the credential store
    Set {
        /// The API key value
        value: String,
    },
    /// Show whether a key is stored
    Show,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    Config::dotenv_load();
    let cli = Cli::parse();

    let mut config = Config::new()?;
    if let Some(url) = cli.api_base_url {
        config.api_base_url = url;
    }

    match cli.command {
        Commands::Generate {
            prompt,
            negative_prompt,
            aspect_ratio,
            person_generation,
            duration,
            count,
            seed,
            image,
            api_key,
            timeout_secs,
            poll_interval_secs,
            verbose,
        } => {
            if verbose {
                Config::print_env_vars();
            }
            if let Some(secs) = timeout_secs {
                config.timeout = std::time::Duration::from_secs(secs);
            }
            if let Some(secs) = poll_interval_secs {
                config.poll_interval = std::time::Duration::from_secs(secs);
            }

            let mut request = GenerationRequest::new(prompt)
                .with_negative_prompt(negative_prompt)
                .with_aspect_ratio(aspect_ratio)
                .with_person_generation(person_generation)
                .with_duration_seconds(duration)
                .with_video_count(count)
                .with_seed(seed);
            if let Some(path) = image {
                request = request.with_source_image(load_image(&path).await?);
            }

            let node = Veo2Node::new(config);
            let cancel = CancelToken::new();
            let ctrl_c_token = cancel.clone();
            tokio::spawn(async move {
                tokio::signal::ctrl_c().await.ok();
                ctrl_c_token.cancel();
            });

            let mut progress =
                veo2_client::ProgressFn(|percent: u8| eprintln!("progress: {}%", percent));
            let output = node.generate(request, &api_key, &mut progress, &cancel).await;

            println!("{}", output.response);
            if output.video_path.is_empty() {
                std::process::exit(1);
            }
            eprintln!("saved: {}", output.video_path);
        }
        Commands::Key { cmd } => {
            let store = CredentialStore::new(&config.credentials_path);
            match cmd {
                KeyCmd::Set { value } => {
                    store.save(&value)?;
                    println!("API key saved to {}", config.credentials_path);
                }
                KeyCmd::Show => match store.load() {
                    Some(key) => {
                        let visible = key.chars().take(6).collect::<String>();
                        println!("stored key: {}...", visible);
                    }
                    None => println!("no API key stored"),
                },
            }
        }
    }
    Ok(())
}

/// Read a seed image from disk, inferring the mime type from the extension.
async fn load_image(path: &Path) -> Result<SourceImage, Box<dyn std::error::Error>> {
    let mime_type = match path.extension().and_then(|e| e.to_str()) {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        other => {
            return Err(format!("Unsupported image extension: {:?}", other).into());
        }
    };
    let bytes = tokio::fs::read(path).await?;
    Ok(SourceImage { bytes, mime_type: mime_type.to_string() })
}
