use std::path::PathBuf;

use clap::Parser;
use gh_certificate::Config;
use url::Url;

mod commands;
mod error;

pub use error::AppError;

#[derive(Parser, Debug)]
#[clap(name = "cert-cli")]
#[clap(
    about = "Certificates of appreciation for GitHub users",
    long_about = None
)]
struct Cli {
    #[clap(long, global = true, help = "JSON config file")]
    config: Option<PathBuf>,

    #[clap(long, global = true, help = "Base URL of the GitHub API")]
    api_url: Option<Url>,

    #[clap(long, global = true, help = "Name printed under the issuer label")]
    project_name: Option<String>,

    #[clap(long, global = true, help = "Pixel ratio of exported images")]
    scale: Option<f32>,

    #[clap(subcommand)]
    command: commands::Commands,
}

impl Cli {
    /// Config file first, then flags on top.
    fn provide_config(&self) -> Result<Config, AppError> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(url) = &self.api_url {
            config.api_base_url = url.clone();
        }
        if let Some(name) = &self.project_name {
            config.template.issuer_name = name.clone();
        }
        if let Some(scale) = self.scale {
            config.pixel_ratio = scale;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let args = Cli::parse();
    let result = match args.provide_config() {
        Ok(config) => args.command.run(&config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempdir::TempDir;

    #[test]
    fn flags_override_config_file() {
        let dir = TempDir::new("cert_cli_test").unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"pixel_ratio": 3, "template": {"issuer_name": "From file"}}"#,
        )
        .unwrap();

        let cli = Cli::parse_from([
            "cert-cli",
            "--config",
            path.to_str().unwrap(),
            "--project-name",
            "From flag",
            "show",
            "octocat",
        ]);
        let config = cli.provide_config().unwrap();
        assert_eq!(config.template.issuer_name, "From flag");
        assert_eq!(config.pixel_ratio, 3.0);
    }

    #[test]
    fn invalid_scale_is_rejected() {
        let cli =
            Cli::parse_from(["cert-cli", "--scale", "9", "show", "octocat"]);
        assert!(matches!(cli.provide_config(), Err(AppError::CertError(_))));
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::parse_from([
            "cert-cli",
            "download",
            "octocat",
            "--api-url",
            "http://localhost:8080/",
        ]);
        assert_eq!(
            cli.api_url.as_ref().map(Url::as_str),
            Some("http://localhost:8080/")
        );
    }
}
