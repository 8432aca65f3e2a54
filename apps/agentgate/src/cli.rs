use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "agentgate", about = "Budget-gated multi-provider AI chat gateway")]
pub struct Cli {
    #[arg(long, env = "AGENTGATE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "AGENTGATE_PORT", default_value_t = 8787)]
    pub port: u16,

    #[arg(long, env = "AGENTGATE_DSN", default_value = "sqlite://agentgate.db?mode=rwc")]
    pub dsn: String,

    /// Optional outbound proxy for upstream egress.
    #[arg(long, env = "AGENTGATE_PROXY")]
    pub proxy: Option<String>,

    /// Upstream request timeout in seconds.
    #[arg(long, env = "AGENTGATE_REQUEST_TIMEOUT", default_value_t = 120)]
    pub request_timeout: u64,
}
