use crate::CLAP_STYLING;
use clap::{arg, command};

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("sfaudit")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("sfaudit")
        .styles(CLAP_STYLING)
        .about("Technical SEO audits from Screaming Frog crawl exports")
        .arg(arg!(-q --"quiet" "Suppress banner and progress output").required(false))
        .arg(
            arg!(-v --"verbose" "Log loader and rule activity")
                .required(false)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("init")
                .about("Writes the default sfaudit configuration file")
                .arg(
                    arg!([PATH])
                        .required(false)
                        .help("Directory to write sfaudit.toml into")
                        .default_value("~/.config/sfaudit/"),
                )
                .arg(
                    arg!(-f - -"force")
                        .help("Overwrite an existing sfaudit.toml at the specified location.")
                        .required(false),
                ),
        )
        .subcommand(
            command!("audit")
                .about(
                    "Analyse a directory of crawl exports, score every issue found and write \
                the reports.",
                )
                .arg(
                    arg!(-e --"exports" <PATH>)
                        .required(true)
                        .help("Directory holding the crawler's CSV exports"),
                )
                .arg(
                    arg!(-d --"domain" <DOMAIN>)
                        .required(false)
                        .help("Domain named in the reports (default: host of the first crawled page)"),
                )
                .arg(
                    arg!(-o --"output" <DIR>)
                        .required(false)
                        .help("Directory to write reports into (default: report.output-dir from the config)"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report formats: text, json, csv, html, markdown, xlsx, chart")
                        .action(clap::ArgAction::Append)
                        .value_delimiter(','),
                )
                .arg(
                    arg!(-c --"config" <FILE>)
                        .required(false)
                        .help("Path to an sfaudit.toml configuration file"),
                )
                .arg(
                    arg!(--"top" <N>)
                        .required(false)
                        .help("Number of issues listed as highest impact")
                        .value_parser(clap::value_parser!(usize)),
                ),
        )
        .subcommand(command!("catalog").about("List every issue the audit can report"))
}
