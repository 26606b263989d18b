// build.rs - TOML-driven compile-time constant generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    lexical: LexicalLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct LexicalLimits {
    max_input_size: usize,
    max_token_text_length: usize,
    max_mode_depth: usize,
    max_diagnostics: usize,
    max_rules_per_mode: usize,
    metrics_buffer_size: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
    security_min_log_level: u8,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=ESQL_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=ESQL_CONFIG_DIR");

    let profile = env::var("ESQL_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("ESQL_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Workspace root is the parent of the esql_tokenizer directory
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_INPUT_SIZE: usize = 1_000_000_000;
    const ABSOLUTE_MAX_MODE_DEPTH: usize = 4_096;

    if config.lexical.max_input_size > ABSOLUTE_MAX_INPUT_SIZE {
        panic!("SECURITY: max_input_size exceeds absolute maximum");
    }

    if config.lexical.max_mode_depth < 2 {
        panic!("CONFIG: max_mode_depth must allow at least one pushed mode");
    }

    if config.lexical.max_mode_depth > ABSOLUTE_MAX_MODE_DEPTH {
        panic!("SECURITY: max_mode_depth exceeds absolute maximum");
    }

    if config.lexical.max_token_text_length > config.lexical.max_input_size {
        panic!("CONFIG: max_token_text_length cannot exceed max_input_size");
    }

    if config.lexical.max_diagnostics == 0 || config.lexical.max_rules_per_mode == 0 {
        panic!("CONFIG: max_diagnostics and max_rules_per_mode must be non-zero");
    }

    if config.logging.log_buffer_size == 0 || config.logging.max_log_message_length < 64 {
        panic!("CONFIG: log_buffer_size must be non-zero and max_log_message_length at least 64");
    }

    if config.logging.security_min_log_level > 2 {
        panic!("SECURITY: security_min_log_level too high (max: 2)");
    }

    if profile == "production" && config.lexical.max_input_size > 50_000_000 {
        panic!("PRODUCTION: max_input_size too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub const PROFILE: &str = "{}";

    pub mod lexical {{
        pub const MAX_INPUT_SIZE: usize = {};
        pub const MAX_TOKEN_TEXT_LENGTH: usize = {};
        pub const MAX_MODE_DEPTH: usize = {};
        pub const MAX_DIAGNOSTICS: usize = {};
        pub const MAX_RULES_PER_MODE: usize = {};
        pub const METRICS_BUFFER_SIZE: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const SECURITY_MIN_LOG_LEVEL: u8 = {};
    }}
}}
"#,
        profile,
        profile,
        config.lexical.max_input_size,
        config.lexical.max_token_text_length,
        config.lexical.max_mode_depth,
        config.lexical.max_diagnostics,
        config.lexical.max_rules_per_mode,
        config.lexical.metrics_buffer_size,
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
        config.logging.security_min_log_level,
    );

    fs::write(output_path, constants_code).unwrap();
}
