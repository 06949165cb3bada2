use gh_certificate::{Config, GithubCertificateGenerator};

use crate::AppError;

#[derive(Clone, Debug, clap::Args)]
#[clap(name = "show", about = "Print the certificate as text")]
pub struct Show {
    #[clap(help = "GitHub username")]
    username: String,
}

impl Show {
    pub async fn run(&self, config: &Config) -> Result<(), AppError> {
        let generator = GithubCertificateGenerator::from_config(config)?;
        generator.set_username(&self.username).await;
        println!("{}", generator.render());
        Ok(())
    }
}
