use esql_tokenizer::config::runtime::RuntimeConfig;
use esql_tokenizer::lexical::{get_tokenizer_limits, validate_tokenization};
use esql_tokenizer::logging::codes;
use esql_tokenizer::rules::esql::MODES;
use esql_tokenizer::{
    log_error, logging, FeatureFlag, MatchPolicy, RuleTable, SourceMap, Token, TokenizeOptions,
    Tokenizer,
};
use std::env;
use std::error::Error;
use std::io::{self, Read, Write};
use std::path::PathBuf;

#[derive(Debug, Default, PartialEq)]
struct CliOptions {
    input: String,
    mode: Option<String>,
    halt_on_error: bool,
    first_match: bool,
    features: Vec<FeatureFlag>,
    json: bool,
    strict: bool,
    show_hidden: bool,
    config_path: Option<PathBuf>,
}

#[derive(Debug, PartialEq)]
enum Command {
    Help,
    Tokenize(CliOptions),
}

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    let program_name = args.first().map(String::as_str).unwrap_or("esql-tokenize");

    let command = match parse_args(&args[1.min(args.len())..]) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!("Usage: {} <file|-> [options]", program_name);
            eprintln!("       {} --help", program_name);
            std::process::exit(2);
        }
    };

    let options = match command {
        Command::Help => {
            print_help(program_name);
            return Ok(());
        }
        Command::Tokenize(options) => options,
    };

    let config = match &options.config_path {
        Some(path) => match RuntimeConfig::load(path) {
            Ok(config) => config,
            Err(error) => {
                eprintln!("error[{}]: {}", error.error_code(), error);
                std::process::exit(2);
            }
        },
        None => RuntimeConfig::default(),
    };

    if let Err(message) = logging::config::init_runtime_preferences(config.logging.clone())
        .and_then(|_| logging::init_global_logging())
    {
        eprintln!("error[{}]: {}", codes::system::INITIALIZATION_FAILURE, message);
        std::process::exit(2);
    }
    validate_tokenization()?;

    let source = match read_input(&options.input) {
        Ok(source) => source,
        Err(error) => {
            log_error!(
                codes::input::INPUT_READ_FAILED,
                "Failed to read input",
                "input" => options.input,
                "error" => error
            );
            eprintln!(
                "error[{}]: {}: {}",
                codes::input::INPUT_READ_FAILED,
                options.input,
                error
            );
            std::process::exit(2);
        }
    };
    let table = RuleTable::esql()?;

    let stdout = io::stdout();
    let stderr = io::stderr();
    let succeeded = run(
        &table,
        &source,
        &options,
        &config,
        &mut stdout.lock(),
        &mut stderr.lock(),
    )?;

    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let mut options = CliOptions::default();
    let mut input = None;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--mode" => {
                let name = iter.next().ok_or("--mode requires a mode name")?;
                options.mode = Some(name.clone());
            }
            "--feature" => {
                let name = iter.next().ok_or("--feature requires a feature name")?;
                let feature = name.parse::<FeatureFlag>().map_err(|e| e.to_string())?;
                options.features.push(feature);
            }
            "--config" => {
                let path = iter.next().ok_or("--config requires a file path")?;
                options.config_path = Some(PathBuf::from(path));
            }
            "--halt-on-error" => options.halt_on_error = true,
            "--first-match" => options.first_match = true,
            "--json" => options.json = true,
            "--strict" => options.strict = true,
            "--hidden" => options.show_hidden = true,
            "-" => input = Some(arg.clone()),
            flag if flag.starts_with("--") => {
                return Err(format!("Unknown option '{}'", flag));
            }
            path => {
                if input.is_some() {
                    return Err(format!("Unexpected argument '{}'", path));
                }
                input = Some(path.to_string());
            }
        }
    }

    options.input = input.ok_or("No input given")?;
    Ok(Command::Tokenize(options))
}

fn read_input(input: &str) -> Result<String, Box<dyn Error>> {
    if input == "-" {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        Ok(source)
    } else {
        Ok(std::fs::read_to_string(input)?)
    }
}

fn build_options(
    table: &RuleTable,
    options: &CliOptions,
    config: &RuntimeConfig,
) -> Result<TokenizeOptions, String> {
    let mut tokenize_options = TokenizeOptions::from_preferences(&config.tokenizer);

    if let Some(name) = &options.mode {
        let mode = table.mode_by_name(name).ok_or_else(|| {
            let known: Vec<&str> = table.modes().iter().map(|m| m.name).collect();
            format!("Unknown mode '{}' (known: {})", name, known.join(", "))
        })?;
        tokenize_options = tokenize_options.with_initial_mode(mode.id);
    }
    if options.halt_on_error {
        tokenize_options = tokenize_options.with_halt_on_error(true);
    }
    if options.first_match {
        tokenize_options = tokenize_options.with_match_policy(MatchPolicy::FirstMatch);
    }
    for feature in &options.features {
        tokenize_options = tokenize_options.with_feature(*feature);
    }

    Ok(tokenize_options)
}

/// Tokenize `source` and report; `Ok(false)` means the run halted or failed strict checks
fn run(
    table: &RuleTable,
    source: &str,
    options: &CliOptions,
    config: &RuntimeConfig,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<bool, Box<dyn Error>> {
    let tokenizer = Tokenizer::new(table).with_options(build_options(table, options, config)?);

    if options.strict {
        return match tokenizer.tokenize_strict(source) {
            Ok(tokens) => {
                print_tokens(table, &tokens, options, out)?;
                Ok(true)
            }
            Err(error) => {
                writeln!(err, "error[{}]: {}", error.error_code(), error)?;
                Ok(false)
            }
        };
    }

    let result = tokenizer.tokenize_checked(source)?.finish();
    print_tokens(table, &result.tokens, options, out)?;

    let source_map = SourceMap::new(source);
    for diagnostic in &result.diagnostics {
        if config.tokenizer.include_position_in_errors {
            writeln!(err, "{}", diagnostic.render(&source_map))?;
        } else {
            writeln!(err, "{}", diagnostic)?;
        }
    }

    if !options.json {
        writeln!(err, "{}", result.metrics.summary())?;
    }

    Ok(!result.halted)
}

fn print_tokens(
    table: &RuleTable,
    tokens: &[Token],
    options: &CliOptions,
    out: &mut dyn Write,
) -> Result<(), Box<dyn Error>> {
    for token in tokens
        .iter()
        .filter(|token| options.show_hidden || !token.is_hidden())
    {
        if options.json {
            writeln!(out, "{}", serde_json::to_string(token)?)?;
        } else {
            writeln!(
                out,
                "{:>4}:{:<4} {:<26} {:<24} {:?}",
                token.span.start.line,
                token.span.start.column,
                token.name,
                table.mode_name(token.mode),
                token.text
            )?;
        }
    }
    Ok(())
}

fn print_help(program_name: &str) {
    println!("ES|QL Tokenizer v{}", env!("CARGO_PKG_VERSION"));
    println!("Mode-stack tokenization of ES|QL query text");
    println!();
    println!("USAGE:");
    println!("    {} <file>  [options]     # Tokenize a file", program_name);
    println!("    {} -       [options]     # Tokenize standard input", program_name);
    println!();
    println!("OPTIONS:");
    println!("    --help              Show this help message");
    println!("    --mode NAME         Start in the named mode instead of DEFAULT_MODE");
    println!("    --halt-on-error     Stop at the first unrecognized character");
    println!("    --first-match       Let the first matching rule win instead of the longest");
    println!("    --feature NAME      Enable a gated rule set (repeatable)");
    println!("    --json              Print tokens as JSON lines");
    println!("    --strict            Fail on any warning or error diagnostic");
    println!("    --hidden            Include whitespace and comment tokens");
    println!("    --config FILE       Load runtime preferences from a TOML file");
    println!();
    println!("EXIT CODES:");
    println!("    0    Tokenized successfully");
    println!("    1    Halted on unrecognized input or failed strict checks");
    println!("    2    Invalid arguments, configuration or unreadable input");
    println!();

    println!("MODES:");
    for mode in MODES {
        println!("    {}", mode.name);
    }
    println!();

    println!("FEATURES:");
    for feature in FeatureFlag::ALL {
        println!("    {}", feature);
    }
    println!();

    let limits = get_tokenizer_limits();
    println!("LIMITS:");
    println!("    Max input size: {} bytes", limits.max_input_size);
    println!("    Max mode depth: {}", limits.max_mode_depth);
    println!("    Max diagnostics: {}", limits.max_diagnostics);
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn run_capture(source: &str, options: &CliOptions) -> (bool, String, String) {
        let table = RuleTable::esql().unwrap();
        let config = RuntimeConfig::from_toml_str("").unwrap();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let ok = run(&table, source, options, &config, &mut out, &mut err).unwrap();
        (
            ok,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_parse_args_collects_flags() {
        let command = parse_args(&args(&[
            "query.esql",
            "--mode",
            "EXPRESSION_MODE",
            "--feature",
            "dev_lookup",
            "--first-match",
            "--json",
            "--hidden",
        ]))
        .unwrap();

        assert_matches!(command, Command::Tokenize(options) => {
            assert_eq!(options.input, "query.esql");
            assert_eq!(options.mode.as_deref(), Some("EXPRESSION_MODE"));
            assert_eq!(options.features, vec![FeatureFlag::DevLookup]);
            assert!(options.first_match && options.json && options.show_hidden);
            assert!(!options.strict);
        });
    }

    #[test]
    fn test_parse_args_errors() {
        assert_eq!(parse_args(&args(&["--help", "x"])), Ok(Command::Help));
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["a", "b"])).is_err());
        assert!(parse_args(&args(&["a", "--mode"])).is_err());
        assert!(parse_args(&args(&["a", "--feature", "nope"])).is_err());
        assert!(parse_args(&args(&["a", "--bogus"])).is_err());
        assert_matches!(parse_args(&args(&["-"])), Ok(Command::Tokenize(o)) if o.input == "-");
    }

    #[test]
    fn test_run_prints_significant_tokens() {
        let options = CliOptions {
            input: "-".into(),
            ..Default::default()
        };
        let (ok, out, err) = run_capture("from logs | limit 5", &options);

        assert!(ok);
        assert_eq!(out.lines().count(), 6);
        assert!(out.lines().next().unwrap().contains("FROM"));
        assert!(!out.contains("WS"));
        assert!(err.contains("tokens"));
    }

    #[test]
    fn test_run_json_with_hidden_tokens() {
        let options = CliOptions {
            input: "-".into(),
            json: true,
            show_hidden: true,
            ..Default::default()
        };
        let (ok, out, _) = run_capture("row a", &options);

        assert!(ok);
        let names: Vec<String> = out
            .lines()
            .map(|line| {
                let value: serde_json::Value = serde_json::from_str(line).unwrap();
                value["name"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(names, vec!["ROW", "WS", "UNQUOTED_IDENTIFIER", "EOF"]);
    }

    #[test]
    fn test_run_reports_halt_and_strict_failures() {
        let halt = CliOptions {
            input: "-".into(),
            halt_on_error: true,
            ..Default::default()
        };
        let (ok, _, err) = run_capture("row a = @", &halt);
        assert!(!ok);
        assert!(err.contains("E020"));

        let strict = CliOptions {
            input: "-".into(),
            strict: true,
            ..Default::default()
        };
        let (ok, out, err) = run_capture("row \"open", &strict);
        assert!(!ok);
        assert!(out.is_empty());
        assert!(err.starts_with("error[W021]"));
    }

    #[test]
    fn test_run_renders_newline_diagnostic_after_tabs() {
        let options = CliOptions {
            input: "-".into(),
            ..Default::default()
        };
        let (ok, _, err) = run_capture("row a = \"\t\t\t\nx", &options);

        assert!(ok);
        assert!(err.contains("E020"));
        assert!(err.contains("1:21"));
        assert!(err.contains("W021"));
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let table = RuleTable::esql().unwrap();
        let config = RuntimeConfig::from_toml_str("").unwrap();
        let options = CliOptions {
            input: "-".into(),
            mode: Some("NOWHERE".into()),
            ..Default::default()
        };

        let error = build_options(&table, &options, &config).unwrap_err();
        assert!(error.contains("EXPRESSION_MODE"));
    }

    #[test]
    fn test_config_file_and_input_file() {
        let mut config_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(config_file, "[tokenizer]\nmatch_policy = \"first_match\"").unwrap();
        let config = RuntimeConfig::load(config_file.path()).unwrap();
        assert_eq!(config.tokenizer.match_policy, MatchPolicy::FirstMatch);

        let mut query = tempfile::NamedTempFile::new().unwrap();
        write!(query, "where a <= 1").unwrap();
        let source = read_input(query.path().to_str().unwrap()).unwrap();

        let table = RuleTable::esql().unwrap();
        let tokenize_options = build_options(&table, &CliOptions::default(), &config).unwrap();
        let names: Vec<String> = Tokenizer::new(&table)
            .with_options(tokenize_options)
            .tokenize(&source)
            .filter(|t| !t.is_hidden())
            .map(|t| t.name)
            .collect();
        assert_eq!(
            names,
            vec!["WHERE", "UNQUOTED_IDENTIFIER", "LT", "ASSIGN", "INTEGER_LITERAL", "EOF"]
        );
    }
}
