//! Tests for the get subcommand.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;

#[test]
fn cli_parse_get() {
    match parse(&["docxdl", "get", "/report/docx/123.pdf"]) {
        CliCommand::Get(args) => {
            assert_eq!(args.url, "/report/docx/123.pdf");
            assert!(args.meta.is_empty());
            assert!(args.dir.is_none());
            assert!(args.base_url.is_none());
            assert!(args.headers.is_empty());
            assert!(!args.overwrite);
            assert!(args.marker.is_none());
        }
        _ => panic!("expected Get"),
    }
}

#[test]
fn cli_parse_get_repeated_meta_and_headers() {
    match parse(&[
        "docxdl",
        "get",
        "/x",
        "--meta",
        "k=v",
        "--meta",
        "n=1",
        "--header",
        "Cookie: a=b",
        "--header",
        "X-Trace:1",
    ]) {
        CliCommand::Get(args) => {
            assert_eq!(
                args.meta,
                vec![("k".to_string(), "v".to_string()), ("n".to_string(), "1".to_string())]
            );
            assert_eq!(args.headers[0], ("Cookie".to_string(), "a=b".to_string()));
            assert_eq!(args.headers[1], ("X-Trace".to_string(), "1".to_string()));
        }
        _ => panic!("expected Get"),
    }
}

#[test]
fn cli_rejects_malformed_meta_and_header() {
    assert!(Cli::try_parse_from(["docxdl", "get", "/x", "--meta", "novalue"]).is_err());
    assert!(Cli::try_parse_from(["docxdl", "get", "/x", "--meta", "=v"]).is_err());
    assert!(Cli::try_parse_from(["docxdl", "get", "/x", "--header", "NoColon"]).is_err());
}

#[test]
fn cli_get_requires_url() {
    assert!(Cli::try_parse_from(["docxdl", "get"]).is_err());
}
