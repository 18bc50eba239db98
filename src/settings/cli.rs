use super::Parser;

#[derive(Parser, Debug)]
#[command(name = "userdata", about = "User provisioning and friendship graph service")]
pub struct Cli {
    /// Path to the settings file, without extension is fine
    #[arg(long)]
    pub settings: Option<String>,
}
