// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Thalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Thalia CLI entrypoint.
//!
//! Runs the interactive editor against a flows directory (the current
//! working directory by default). Saved sheets land there as
//! `<sheet-name>.json`.

use std::error::Error;
use std::path::PathBuf;

use thalia::tui::theme::ThemeMode;
use thalia::tui::{run, RunOptions};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [<flows-dir>] [--theme dark|light]\n  {program} [--flows <dir>] [--theme dark|light]\n\nIf flows-dir/--flows is omitted, the current working directory is used.\n--theme overrides the THALIA_THEME environment variable."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    flows_dir: Option<String>,
    theme: Option<String>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--flows" => {
                if options.flows_dir.is_some() {
                    return Err(());
                }
                let dir = args.next().ok_or(())?;
                options.flows_dir = Some(dir);
            }
            "--theme" => {
                if options.theme.is_some() {
                    return Err(());
                }
                let theme = args.next().ok_or(())?;
                options.theme = Some(theme);
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.flows_dir.is_some() {
                    return Err(());
                }
                options.flows_dir = Some(arg);
            }
        }
    }

    Ok(options)
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "thalia".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        let theme = options.theme.as_deref().map(ThemeMode::parse).transpose()?;
        let flows_dir = PathBuf::from(options.flows_dir.unwrap_or_else(|| ".".to_owned()));

        run(RunOptions { flows_dir, theme })
    })();

    if let Err(err) = result {
        eprintln!("thalia: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_options, CliOptions};

    #[test]
    fn parses_empty_args() {
        let options = parse_options(std::iter::empty()).expect("parse options");
        assert_eq!(options, CliOptions::default());
    }

    #[test]
    fn parses_positional_flows_dir() {
        let options = parse_options(["some/dir".to_owned()].into_iter()).expect("parse options");
        assert_eq!(options.flows_dir.as_deref(), Some("some/dir"));
        assert_eq!(options.theme, None);
    }

    #[test]
    fn parses_flows_flag() {
        let options = parse_options(["--flows".to_owned(), "some/dir".to_owned()].into_iter())
            .expect("parse options");
        assert_eq!(options.flows_dir.as_deref(), Some("some/dir"));
    }

    #[test]
    fn parses_theme_flag() {
        let options = parse_options(["--theme".to_owned(), "light".to_owned()].into_iter())
            .expect("parse options");
        assert_eq!(options.theme.as_deref(), Some("light"));
        assert_eq!(options.flows_dir, None);
    }

    #[test]
    fn parses_flows_dir_and_theme_in_any_order() {
        let options = parse_options(
            ["--theme".to_owned(), "dark".to_owned(), "some/dir".to_owned()].into_iter(),
        )
        .expect("parse options");
        assert_eq!(options.flows_dir.as_deref(), Some("some/dir"));
        assert_eq!(options.theme.as_deref(), Some("dark"));

        let options = parse_options(
            ["some/dir".to_owned(), "--theme".to_owned(), "dark".to_owned()].into_iter(),
        )
        .expect("parse options");
        assert_eq!(options.flows_dir.as_deref(), Some("some/dir"));
        assert_eq!(options.theme.as_deref(), Some("dark"));
    }

    #[test]
    fn rejects_unknown_flags() {
        parse_options(["--nope".to_owned()].into_iter()).unwrap_err();
    }

    #[test]
    fn rejects_duplicate_flags() {
        parse_options(
            ["--theme".to_owned(), "dark".to_owned(), "--theme".to_owned(), "light".to_owned()]
                .into_iter(),
        )
        .unwrap_err();

        parse_options(
            ["--flows".to_owned(), ".".to_owned(), "--flows".to_owned(), "other".to_owned()]
                .into_iter(),
        )
        .unwrap_err();
    }

    #[test]
    fn rejects_multiple_positional_flows_dirs() {
        parse_options(["one".to_owned(), "two".to_owned()].into_iter()).unwrap_err();
    }

    #[test]
    fn rejects_positional_flows_dir_with_flows_flag() {
        parse_options(["--flows".to_owned(), "one".to_owned(), "two".to_owned()].into_iter())
            .unwrap_err();
    }

    #[test]
    fn rejects_missing_flag_values() {
        parse_options(["--flows".to_owned()].into_iter()).unwrap_err();
        parse_options(["--theme".to_owned()].into_iter()).unwrap_err();
    }
}
