use clap::Parser;

/// CLI arguments for meghai
#[derive(Parser, Debug)]
#[command(name = "meghai")]
#[command(about = "MeghAI - ask anything, answered by Gemini")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Gemini model to query
    #[arg(long, default_value = meghai_api::DEFAULT_MODEL)]
    pub model: String,

    /// API key for the generative-language endpoint
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Override the API base URL (e.g. a local proxy)
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Bounded wait for each provider call, in seconds
    #[arg(long, value_name = "SECS", default_value_t = meghai_api::DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Serve the web surface instead of the terminal REPL
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub web: bool,

    /// Web server port
    #[arg(long, default_value = "8080", env = "MEGHAI_WEB_PORT")]
    pub web_port: u16,

    /// Web server bind address
    #[arg(long, default_value = "127.0.0.1", env = "MEGHAI_WEB_BIND")]
    pub web_bind: String,

    /// Disable the conversation log under logs/
    #[arg(long)]
    pub no_log: bool,

    /// Verbose diagnostics (full provider error details on stderr)
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
