use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("glean")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Glean Contributors")
        .about("Match keywords against the content blocks of HTML documents")
        .arg(clap::arg!([INPUT] "Local HTML file, or '-' for stdin").default_value("-"))
        .arg(
            clap::arg!(-k --keyword <KEYWORD> "Keyword to look for (repeatable, or comma separated)")
                .action(clap::ArgAction::Append)
                .value_delimiter(','),
        )
        .arg(clap::arg!(--all "Report every qualifying block instead of the best one"))
        .arg(clap::arg!(--threshold <N> "Minimum occurrences for a keyword to count"))
        .arg(clap::arg!(--"whole-word" "Count whole words only"))
        .arg(clap::arg!(--strict "Strip punctuation before matching"))
        .arg(clap::arg!(--semantic "Only consider <article> elements"))
        .arg(clap::arg!(--accumulate "With --all, keep collecting from later passes"))
        .arg(clap::arg!(--date "Resolve publication dates"))
        .arg(clap::arg!(--words <N> "Snippet length in words").conflicts_with("chars"))
        .arg(clap::arg!(--chars <N> "Snippet length in characters"))
        .arg(clap::arg!(--"base-url" <URL> "Base URL for resolving relative links").value_name("URL"))
        .arg(clap::arg!(--clean "Print the cleaned text of the whole document instead of matching"))
        .arg(clap::arg!(--pretty "Pretty-print JSON output"))
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(-v --verbose "Enable debug logging"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "glean", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "glean", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "glean", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "glean", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
