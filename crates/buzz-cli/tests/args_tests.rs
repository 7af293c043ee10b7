use buzz_cli::args::{CliArgs, Command};
use clap::Parser;

#[test]
fn check_subcommand_parses() {
    let args = CliArgs::try_parse_from(["buzz", "check", "script.buzz"]).unwrap();
    match args.command {
        Command::Check { file, buzz_path } => {
            assert_eq!(file.to_str(), Some("script.buzz"));
            assert!(buzz_path.is_none());
        }
        Command::Ast { .. } => panic!("expected check subcommand"),
    }
}

#[test]
fn ast_subcommand_accepts_buzz_path() {
    let args =
        CliArgs::try_parse_from(["buzz", "ast", "script.buzz", "--buzz-path", "/opt/buzz"])
            .unwrap();
    match args.command {
        Command::Ast { file, buzz_path } => {
            assert_eq!(file.to_str(), Some("script.buzz"));
            assert_eq!(buzz_path.unwrap().to_str(), Some("/opt/buzz"));
        }
        Command::Check { .. } => panic!("expected ast subcommand"),
    }
}

#[test]
fn missing_subcommand_is_an_error() {
    assert!(CliArgs::try_parse_from(["buzz"]).is_err());
}
