use clap::Parser;

use milestone_patches::{Args, Command, command};

fn initialize_logger(debug: bool) -> milestone_patches::Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("milestone_patches")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli_args = Args::parse();

    initialize_logger(cli_args.debug)?;

    match cli_args.command.clone() {
        Command::Fetch {
            milestone,
            no_verify,
            closing_strategy,
            naming,
        } => {
            command::fetch::execute(
                &cli_args,
                milestone,
                no_verify,
                closing_strategy,
                naming,
            )
            .await?
        }
        Command::VerifyApplied { repo_dir, branch } => {
            command::verify_applied::execute(&cli_args, &repo_dir, &branch)
                .await?
        }
    }

    Ok(())
}
