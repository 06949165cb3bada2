use std::fs;
use std::path::PathBuf;

use gh_certificate::{Config, GithubCertificateGenerator};

use crate::AppError;

#[derive(Clone, Debug, clap::Args)]
#[clap(name = "svg", about = "Write the certificate layout as SVG")]
pub struct Svg {
    #[clap(help = "GitHub username")]
    username: String,
    #[clap(long, short, help = "Output file, stdout if omitted")]
    out: Option<PathBuf>,
}

impl Svg {
    pub async fn run(&self, config: &Config) -> Result<(), AppError> {
        let generator = GithubCertificateGenerator::from_config(config)?;
        generator.set_username(&self.username).await;
        let view = generator.render();
        let svg = generator.rasterizer().layout_svg(&view).await?;

        match &self.out {
            Some(path) => {
                fs::write(path, svg)?;
                println!("Layout written to {}", path.display());
            }
            None => println!("{}", svg),
        }
        Ok(())
    }
}
