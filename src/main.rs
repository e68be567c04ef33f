use clap::Parser;
use registration_wizard::cli::commands::{GlobalArgs, cmd_check, cmd_run, cmd_show_form, cmd_submit};
use registration_wizard::cli::config::{Cli, Commands, load_config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    // CLI > config > defaults
    let args = GlobalArgs {
        config: &config,
        endpoint: cli.endpoint.as_deref(),
        trace: cli.trace.as_deref(),
        verbose: cli.verbose,
    };

    let ok = match cli.command {
        Commands::Run { form, dry_run } => cmd_run(form.as_deref(), dry_run, &args)?,
        Commands::Check { values, form } => cmd_check(&values, form.as_deref(), &args)?,
        Commands::Submit {
            values,
            form,
            dry_run,
        } => cmd_submit(&values, form.as_deref(), dry_run, &args)?,
        Commands::ShowForm { form } => {
            cmd_show_form(form.as_deref())?;
            true
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
