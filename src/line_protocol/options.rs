use clap::Parser;

#[derive(Clone, Debug, Parser)]
pub struct ServerOptions {
    #[arg(short, long)]
    pub log_level: Option<String>,

    #[arg(short, long)]
    pub undo_limit: Option<usize>,

    #[arg(short, long)]
    pub document: Option<String>,
}
