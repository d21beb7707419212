use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::{Config, Settings};
use crate::context::TriggerContext;
use crate::output::{export_json, print_summary, write_github_outputs};
use crate::providers::GitHubClient;
use crate::wait::{HttpProbe, WaitOrchestrator};

/// Command-line interface.
///
/// Inputs fall back to the `INPUT_*` variables GitHub Actions sets for action inputs and
/// to the runner's `GITHUB_*` variables for the trigger context. Action inputs arrive as
/// strings and an empty one means "not set", so they are parsed in [`Cli::merged_config`]
/// rather than by clap.
#[derive(Parser)]
#[command(name = "deploywait")]
#[command(author, version, about = "Wait for a deployment preview to go live", long_about = None)]
pub struct Cli {
    /// GitHub token
    #[arg(short, long, env = "INPUT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Token provided by the runner, used when `--token` is not set
    #[arg(long, env = "GITHUB_TOKEN", hide = true, hide_env_values = true)]
    github_token: Option<String>,

    /// Repository in 'owner/repo' form
    #[arg(short = 'R', long, env = "GITHUB_REPOSITORY")]
    repository: Option<String>,

    /// Only consider deployments to this environment
    #[arg(short, long, env = "INPUT_ENVIRONMENT")]
    environment: Option<String>,

    /// Login of the account expected to create the deployment
    #[arg(short, long, env = "INPUT_ACTOR_NAME")]
    actor_name: Option<String>,

    /// Seconds each stage may poll for [default: 60]
    #[arg(long, env = "INPUT_MAX_TIMEOUT")]
    max_timeout: Option<String>,

    /// Accept a deployment whose latest status is `inactive` [default: false]
    #[arg(
        long,
        env = "INPUT_ALLOW_INACTIVE",
        num_args = 0..=1,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    allow_inactive: Option<String>,

    /// Path requested on the deployed URL [default: /]
    #[arg(long, env = "INPUT_PATH")]
    path: Option<String>,

    /// Seconds between attempts [default: 2]
    #[arg(long, env = "INPUT_CHECK_INTERVAL")]
    check_interval: Option<String>,

    /// GitHub API base URL [default: https://api.github.com]
    #[arg(long, env = "GITHUB_API_URL")]
    api_url: Option<String>,

    /// Commit to wait on when not running for a pull request
    #[arg(long, env = "GITHUB_SHA")]
    sha: Option<String>,

    /// Pull request whose head commit should be waited on
    #[arg(long)]
    pr_number: Option<u64>,

    #[arg(long, env = "GITHUB_EVENT_NAME")]
    event_name: Option<String>,

    /// Path to the triggering event's JSON payload
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    event_path: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the JSON report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long, default_value_t = false)]
    pretty: bool,

    /// File that receives `url` and `host` as step outputs
    #[arg(long, env = "GITHUB_OUTPUT")]
    github_output: Option<PathBuf>,
}

impl Cli {
    /// Layers command-line and environment values over the configuration file.
    fn merged_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        self.apply_overrides(&mut config)?;
        Ok(config)
    }

    /// Overwrites every config value given on the command line or through the environment.
    /// Blank values count as unset.
    fn apply_overrides(&self, config: &mut Config) -> Result<()> {
        if let Some(token) = present(&self.token).or_else(|| present(&self.github_token)) {
            config.github.token = Some(token.to_string());
        }
        if let Some(repository) = &self.repository {
            config.github.repository = Some(repository.clone());
        }
        if let Some(api_url) = &self.api_url {
            config.github.api_url.clone_from(api_url);
        }
        if let Some(environment) = present(&self.environment) {
            config.wait.environment = Some(environment.to_string());
        }
        if let Some(actor_name) = present(&self.actor_name) {
            config.wait.actor_name = Some(actor_name.to_string());
        }
        if let Some(max_timeout) = parse_input::<u64>("max timeout", &self.max_timeout)? {
            config.wait.max_timeout = max_timeout;
        }
        if let Some(path) = present(&self.path) {
            config.wait.path = path.to_string();
        }
        if let Some(interval) = parse_input::<f64>("check interval", &self.check_interval)? {
            config.wait.check_interval = interval;
        }
        if let Some(allow_inactive) = parse_bool_input("allow inactive", &self.allow_inactive)? {
            config.wait.allow_inactive = allow_inactive;
        }

        Ok(())
    }

    fn settings(&self) -> Result<Settings> {
        Ok(self.merged_config()?.into_settings()?)
    }

    pub async fn execute(&self) -> Result<()> {
        let settings = self.settings()?;

        let context = TriggerContext::new(
            settings.repository.clone(),
            self.sha.clone(),
            self.pr_number,
        )
        .with_event(self.event_name.as_deref(), self.event_path.as_deref())?;

        let client = GitHubClient::new(
            &settings.api_url,
            &settings.repository,
            Some(settings.token.clone()),
        )?;
        let probe = HttpProbe::new()?;

        let report = WaitOrchestrator::new(&client, &probe, context, settings.wait)
            .run()
            .await?;

        print_summary(&report);

        if let Some(path) = &self.github_output {
            write_github_outputs(&report, path)?;
            info!("Outputs written to: {}", path.display());
        }

        if let Some(output_path) = &self.output {
            let mut file = std::fs::File::create(output_path)?;
            export_json(&report, self.pretty, &mut file)?;
            info!("Report written to: {}", output_path.display());
        } else {
            export_json(&report, self.pretty, &mut std::io::stdout().lock())?;
        }

        Ok(())
    }
}

/// Returns the trimmed value, or `None` when it is unset or blank.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_input<T>(name: &str, value: &Option<String>) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    present(value)
        .map(|raw| {
            raw.parse::<T>()
                .with_context(|| format!("Invalid {name}: '{raw}'"))
        })
        .transpose()
}

/// Accepts the spellings GitHub Actions uses for boolean inputs.
fn parse_bool_input(name: &str, value: &Option<String>) -> Result<Option<bool>> {
    let Some(raw) = present(value) else {
        return Ok(None);
    };
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(Some(true)),
        "false" | "no" | "off" | "0" => Ok(Some(false)),
        _ => bail!("Invalid {name}: '{raw}' (expected true or false)"),
    }
}
