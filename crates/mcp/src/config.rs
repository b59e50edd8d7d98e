// Command-line and environment configuration

use bedrock_client::{BedrockClient, ClientResult, LoginEncoding};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, ValueEnum};
use std::time::Duration;

/// Log filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "bedrock_mcp=info,bedrock_client=info";
const DEBUG_LOG_FILTER: &str = "bedrock_mcp=debug,bedrock_client=debug";

#[derive(Parser, Debug, Clone)]
#[command(name = "bedrock-mcp")]
#[command(about = "MCP server exposing Bedrock Server Manager as tools", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Base URL of the Bedrock Server Manager, e.g. http://127.0.0.1:11325
    #[arg(long, env = "BEDROCK_API_BASE")]
    pub base_url: String,

    /// Manager username
    #[arg(long, env = "BEDROCK_SERVER_MANAGER_USERNAME")]
    pub username: Option<String>,

    /// Manager password
    #[arg(long, env = "BEDROCK_SERVER_MANAGER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Log every API response and raise log verbosity
    #[arg(long, env = "BEDROCK_DEBUG", action = ArgAction::SetTrue, value_parser = BoolishValueParser::new())]
    pub debug: bool,

    /// Path of the login endpoint
    #[arg(long, default_value = "/auth/token")]
    pub login_path: String,

    /// How credentials are encoded at login
    #[arg(long, value_enum, default_value_t = LoginEncodingArg::Form)]
    pub login_encoding: LoginEncodingArg,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginEncodingArg {
    Form,
    Json,
}

impl From<LoginEncodingArg> for LoginEncoding {
    fn from(arg: LoginEncodingArg) -> Self {
        match arg {
            LoginEncodingArg::Form => LoginEncoding::Form,
            LoginEncodingArg::Json => LoginEncoding::Json,
        }
    }
}

impl Cli {
    pub fn has_credentials(&self) -> bool {
        self.username.as_deref().is_some_and(|u| !u.is_empty())
            && self.password.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Build the API client this configuration describes.
    pub fn build_client(&self) -> ClientResult<BedrockClient> {
        BedrockClient::builder()
            .base_url(self.base_url.clone())
            .credentials(
                self.username.clone().unwrap_or_default(),
                self.password.clone().unwrap_or_default(),
            )
            .timeout(Duration::from_secs(self.timeout_secs))
            .login_path(self.login_path.clone())
            .login_encoding(self.login_encoding.into())
            .debug_responses(self.debug)
            .build()
    }

    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            DEBUG_LOG_FILTER
        } else {
            DEFAULT_LOG_FILTER
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("bedrock-mcp").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["--base-url", "http://127.0.0.1:11325"]).unwrap();
        assert_eq!(cli.login_path, "/auth/token");
        assert_eq!(cli.login_encoding, LoginEncodingArg::Form);
        assert_eq!(cli.timeout_secs, 30);
        assert_eq!(cli.log_filter(), DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_all_flags() {
        let cli = parse(&[
            "--base-url",
            "https://bsm.example:8443",
            "--username",
            "admin",
            "--password",
            "secret",
            "--debug",
            "--login-path",
            "/auth/login",
            "--login-encoding",
            "json",
            "--timeout-secs",
            "5",
        ])
        .unwrap();

        assert!(cli.debug);
        assert!(cli.has_credentials());
        assert_eq!(cli.login_encoding, LoginEncodingArg::Json);
        assert_eq!(LoginEncoding::from(cli.login_encoding), LoginEncoding::Json);
        assert_eq!(cli.log_filter(), DEBUG_LOG_FILTER);
        assert!(cli.build_client().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(parse(&["--base-url", "http://h", "--login-encoding", "xml"]).is_err());
        assert!(parse(&["--base-url", "http://h", "--timeout-secs", "0"]).is_err());
    }

    #[test]
    fn test_invalid_base_url_fails_to_build() {
        let cli = parse(&["--base-url", "ftp://h"]).unwrap();
        assert!(cli.build_client().is_err());

        let cli = parse(&["--base-url", "not a url"]).unwrap();
        assert!(cli.build_client().is_err());
    }

    #[test]
    fn test_missing_credentials() {
        let cli = parse(&["--base-url", "http://h", "--username", "admin"]).unwrap();
        assert!(!cli.has_credentials());
    }
}
