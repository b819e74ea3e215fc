use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = curious_cast::cli::Cli::parse();
    curious_cast::run(cli)
}
