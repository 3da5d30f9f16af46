use super::Parser;

#[derive(Parser, Debug)]
#[command(about = "Issues and validates access/refresh token pairs")]
pub struct Cli {
    /// Settings file, without extension
    #[arg(long)]
    pub settings: Option<String>,
}
