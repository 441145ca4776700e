use clap::{Arg, ArgAction, Command};

fn files_arg() -> Arg {
    Arg::new("files")
        .help("Translation files (.ts, .qph)")
        .required(true)
        .num_args(1..)
}

pub fn command() -> Command {
    Command::new("lingo")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect, merge-check, convert and release Qt Linguist translation files")
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log debug details (overridden by RUST_LOG)")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("stats")
                .about("Word, character and message statistics")
                .arg(files_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print JSON instead of a table")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("merge-check")
                .about("Open files side by side and report how well they merge")
                .arg(files_arg())
                .arg(
                    Arg::new("read-only")
                        .long("read-only")
                        .short('r')
                        .help("Open files after the first one read-only")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between catalog formats, chosen by file extension")
                .arg(Arg::new("input").help("Input file").required(true).index(1))
                .arg(Arg::new("output").help("Output file").required(true).index(2)),
        )
        .subcommand(
            Command::new("release")
                .about("Compile a translation file into a .qm file")
                .arg(Arg::new("input").help("Translation file").required(true).index(1))
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file (default: input with .qm extension)"),
                )
                .arg(
                    Arg::new("ignore-unfinished")
                        .long("ignore-unfinished")
                        .help("Leave out unfinished translations")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("compress")
                        .long("compress")
                        .help("Strip source texts and comments")
                        .action(ArgAction::SetTrue),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_is_consistent() {
        command().debug_assert();
    }

    #[test]
    fn test_release_flags() {
        let matches = command()
            .try_get_matches_from(["lingo", "release", "app_de.ts", "--compress", "-o", "out.qm"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "release");
        assert!(sub.get_flag("compress"));
        assert!(!sub.get_flag("ignore-unfinished"));
        assert_eq!(sub.get_one::<String>("output").map(String::as_str), Some("out.qm"));
    }

    #[test]
    fn test_files_required() {
        assert!(command().try_get_matches_from(["lingo", "stats"]).is_err());
        let matches = command()
            .try_get_matches_from(["lingo", "-v", "stats", "a.ts", "b.ts", "--json"])
            .unwrap();
        assert!(matches.get_flag("verbose"));
        let (_, sub) = matches.subcommand().unwrap();
        let files: Vec<&String> = sub.get_many::<String>("files").unwrap().collect();
        assert_eq!(files.len(), 2);
    }
}
