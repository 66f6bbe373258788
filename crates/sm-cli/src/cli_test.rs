use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

#[test]
fn test_global_args_after_subcommand() {
    let cli = Cli::try_parse_from(["sm", "apply", "-p", "proj", "-v"]).unwrap();
    assert!(matches!(cli.command, Commands::Apply));
    assert_eq!(cli.global.project_dir, "proj");
    assert!(cli.global.verbose);
}

#[test]
fn test_create_flags() {
    let cli = Cli::try_parse_from(["sm", "create", "--name", "add_email", "--dry-run"]).unwrap();
    match cli.command {
        Commands::Create(args) => {
            assert_eq!(args.name.as_deref(), Some("add_email"));
            assert!(args.dry_run);
            assert!(!args.custom);
        }
        other => panic!("unexpected command {other:?}"),
    }

    assert!(Cli::try_parse_from(["sm", "create", "--custom", "--dry-run"]).is_err());
}

#[test]
fn test_init_credentials_come_in_pairs() {
    assert!(Cli::try_parse_from(["sm", "init", "--password", "secret"]).is_err());
    assert!(Cli::try_parse_from(["sm", "init", "--username", "root"]).is_err());
    assert!(Cli::try_parse_from(["sm", "init", "--username", "root", "--password", "root"]).is_ok());
}
