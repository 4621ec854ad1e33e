use std::path::PathBuf;

use tracing_subscriber::filter::LevelFilter;

pub struct CliArgs {
    pub job_path: PathBuf,
    pub out_path: Option<PathBuf>,
    pub log_level: LevelFilter,
}

pub enum Command {
    Run(CliArgs),
    Help,
}

pub fn parse_args(args: &[String]) -> Result<Command, String> {
    let mut job_path = None;
    let mut out_path = None;
    let mut log_level = None;
    let mut iter = args.iter().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--job" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--job requires a path".to_string())?;
                job_path = Some(PathBuf::from(value));
            }
            "--out" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--out requires a path".to_string())?;
                out_path = Some(PathBuf::from(value));
            }
            "--log-level" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--log-level requires a level".to_string())?;
                log_level = Some(parse_level(value)?);
            }
            "--help" | "-h" => return Ok(Command::Help),
            other => return Err(format!("unknown argument '{other}'")),
        }
    }

    let job_path = job_path.ok_or_else(|| "--job is required".to_string())?;
    let log_level = match log_level {
        Some(level) => level,
        None => std::env::var("RUST_LOG")
            .ok()
            .and_then(|value| parse_level(&value).ok())
            .unwrap_or(LevelFilter::INFO),
    };
    Ok(Command::Run(CliArgs {
        job_path,
        out_path,
        log_level,
    }))
}

pub fn print_help() {
    println!(
        "Copy bone weights from a source mesh to target meshes.\n\nOptions:\n  --job <path>         JSON job file\n  --out <path>         write the report here instead of stdout\n  --log-level <level>  off, error, warn, info, debug or trace\n  -h, --help"
    );
}

fn parse_level(value: &str) -> Result<LevelFilter, String> {
    value
        .trim()
        .parse::<LevelFilter>()
        .map_err(|err| format!("invalid log level '{value}': {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        std::iter::once("weightcopy")
            .chain(values.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn parses_all_flags() {
        let Command::Run(parsed) = parse_args(&args(&[
            "--job",
            "job.json",
            "--out",
            "report.json",
            "--log-level",
            "debug",
        ]))
        .expect("args") else {
            panic!("expected run");
        };
        assert_eq!(parsed.job_path, PathBuf::from("job.json"));
        assert_eq!(parsed.out_path, Some(PathBuf::from("report.json")));
        assert_eq!(parsed.log_level, LevelFilter::DEBUG);
    }

    #[test]
    fn job_is_required() {
        let err = parse_args(&args(&["--out", "x.json"])).err().expect("error");
        assert!(err.contains("--job"));
    }

    #[test]
    fn rejects_unknown_flags_and_levels() {
        assert!(parse_args(&args(&["--job", "a.json", "--fast"])).is_err());
        assert!(parse_args(&args(&["--job", "a.json", "--log-level", "loud"])).is_err());
        assert!(matches!(
            parse_args(&args(&["--help"])),
            Ok(Command::Help)
        ));
    }
}
