use std::path::PathBuf;

use gh_certificate::{Config, GithubCertificateGenerator, LoadState};

use crate::AppError;

#[derive(Clone, Debug, clap::Args)]
#[clap(name = "download", about = "Save the certificate as a PNG image")]
pub struct Download {
    #[clap(help = "GitHub username")]
    username: String,
    #[clap(
        long,
        short,
        default_value = ".",
        help = "Directory the image is saved to"
    )]
    out: PathBuf,
}

impl Download {
    pub async fn run(&self, config: &Config) -> Result<(), AppError> {
        if self.out.exists() && !self.out.is_dir() {
            return Err(AppError::InvalidOption(format!(
                "{} is not a directory",
                self.out.display()
            )));
        }

        let generator = GithubCertificateGenerator::from_config(config)?;
        generator.set_username(&self.username).await;
        if let LoadState::Error(message) = generator.state().load_state {
            log::warn!("Exporting certificate without profile: {}", message);
        }
        generator.render();

        match generator.download_certificate(&self.out).await? {
            Some(path) => println!("Certificate saved to {}", path.display()),
            None => println!("Nothing to save"),
        }
        Ok(())
    }
}
