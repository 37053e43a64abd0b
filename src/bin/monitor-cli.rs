use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "monitor-cli")]
#[command(about = "Query a running site monitor", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    /// Sent as x-forwarded-for, recorded on resets.
    #[arg(long)]
    operator: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// System metrics and log statistics
    Metrics,
    /// Recent log entries, oldest first
    Logs {
        #[arg(short, long)]
        level: Option<String>,
        #[arg(short = 'n', long)]
        limit: Option<u32>,
    },
    /// Recent requests, newest first
    Requests {
        #[arg(short = 'n', long)]
        limit: Option<u32>,
    },
    /// Health status
    Health,
    /// Uptime, memory and log totals
    Summary,
    /// Clear all metrics and logs
    Reset {
        #[arg(short, long, env = "RESET_TOKEN")]
        token: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(operator) = &cli.operator {
        headers.insert("x-forwarded-for", HeaderValue::from_str(operator)?);
    }

    let monitor = format!("{}/api/monitor", cli.url.trim_end_matches('/'));
    let request = match cli.command {
        Commands::Metrics => client.get(&monitor).query(&[("action", "metrics")]),
        Commands::Logs { level, limit } => {
            let mut query = vec![("action", "logs".to_string())];
            if let Some(level) = level {
                query.push(("level", level));
            }
            if let Some(limit) = limit {
                query.push(("limit", limit.to_string()));
            }
            client.get(&monitor).query(&query)
        }
        Commands::Requests { limit } => {
            let mut query = vec![("action", "requests".to_string())];
            if let Some(limit) = limit {
                query.push(("limit", limit.to_string()));
            }
            client.get(&monitor).query(&query)
        }
        Commands::Health => client.get(format!("{}/api/health", cli.url.trim_end_matches('/'))),
        Commands::Summary => client.get(&monitor),
        Commands::Reset { token } => client
            .get(&monitor)
            .query(&[("action", "reset"), ("token", token.as_str())]),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    println!("{}", render(status, text)?);
    Ok(())
}

/// Pretty-print JSON bodies. Non-2xx statuses become errors carrying the body,
/// so the process exits non-zero.
fn render(status: StatusCode, text: String) -> Result<String, String> {
    let body = serde_json::from_str::<Value>(&text)
        .and_then(|json| serde_json::to_string_pretty(&json))
        .unwrap_or(text);

    if status.is_success() {
        Ok(body)
    } else {
        Err(format!("monitor returned status {}\n{}", status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_is_pretty_printed() {
        let out = render(StatusCode::OK, r#"{"status":"healthy"}"#.into()).unwrap();
        assert_eq!(out, "{\n  \"status\": \"healthy\"\n}");
    }

    #[test]
    fn test_error_status_fails() {
        let err = render(StatusCode::UNAUTHORIZED, r#"{"code":"UNAUTHORIZED"}"#.into()).unwrap_err();
        assert!(err.starts_with("monitor returned status 401 Unauthorized"));
        assert!(err.contains("\"code\": \"UNAUTHORIZED\""));

        let err = render(StatusCode::SERVICE_UNAVAILABLE, "upstream down".into()).unwrap_err();
        assert!(err.ends_with("upstream down"));
    }
}
