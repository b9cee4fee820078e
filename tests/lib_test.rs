//! Library integration tests.

use pipdesk::PipdeskError;

#[test]
fn error_types_are_public() {
    let err = PipdeskError::invalid_request("path must not be empty");
    assert!(err.to_string().contains("path must not be empty"));
    assert_eq!(err.kind(), "invalid_request");
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> pipdesk::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn cli_types_are_public() {
    use pipdesk::cli::{Cli, Commands};
    use clap::Parser;

    let cli = Cli::parse_from(["pipdesk", "--json", "packages", "--python", "/usr/bin/python3"]);
    assert!(cli.json);

    if let Commands::Packages(args) = cli.command {
        assert_eq!(args.python.as_deref(), Some(std::path::Path::new("/usr/bin/python3")));
    } else {
        panic!("Expected Packages command");
    }
}

#[test]
fn version_specs_are_public() {
    use pipdesk::version::{Version, VersionSpec};

    let spec: VersionSpec = "~=1.4.2".parse().unwrap();
    assert!(spec.contains(&"1.4.5".parse::<Version>().unwrap()));
    assert!(!spec.contains(&"1.5.0".parse::<Version>().unwrap()));
}
