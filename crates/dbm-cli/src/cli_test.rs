use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

#[test]
fn test_setup_defaults() {
    let cli = Cli::try_parse_from([
        "dbmarshal",
        "setup",
        "prod",
        "--hostname",
        "db.internal",
        "--username",
        "deploy",
        "--password",
        "secret",
        "--database",
        "shop",
        "--directory",
        "/srv/migrations",
    ])
    .unwrap();

    match cli.command {
        Commands::Setup(args) => {
            assert_eq!(args.alias, "prod");
            assert_eq!(args.port, 3306);
            assert_eq!(args.driver, DriverArg::Mysql);
            assert_eq!(args.directory, PathBuf::from("/srv/migrations"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_export_statics_is_kebab_case() {
    let cli = Cli::try_parse_from(["dbmarshal", "export-statics", "prod"]).unwrap();
    assert!(matches!(cli.command, Commands::ExportStatics(ref a) if a.alias == "prod"));
}

#[test]
fn test_status_json_with_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "dbmarshal", "status", "prod", "--output", "json", "-v", "--home", "/tmp/profiles",
    ])
    .unwrap();

    assert!(cli.global.verbose);
    assert_eq!(cli.global.home, Some(PathBuf::from("/tmp/profiles")));
    match cli.command {
        Commands::Status(args) => assert_eq!(args.output, OutputFormat::Json),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_alias_is_required() {
    assert!(Cli::try_parse_from(["dbmarshal", "apply"]).is_err());
}
