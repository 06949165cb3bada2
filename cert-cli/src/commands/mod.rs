use clap::Subcommand;
use gh_certificate::Config;

use crate::AppError;

mod download;
mod show;
mod svg;

#[derive(Debug, Subcommand)]
pub enum Commands {
    Show(show::Show),
    Svg(svg::Svg),
    Download(download::Download),
}

impl Commands {
    pub async fn run(&self, config: &Config) -> Result<(), AppError> {
        match self {
            Commands::Show(show) => show.run(config).await,
            Commands::Svg(svg) => svg.run(config).await,
            Commands::Download(download) => download.run(config).await,
        }
    }
}
