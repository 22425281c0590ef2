//! Build script for xtreme-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates xtreme.toml at compile time
//! - Generates the settings constants included by `src/config.rs`

use std::env;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Characters a ROM title may hold
const TITLE_LEN: usize = 16;

/// ROM banks on the board
const ROM_BANKS: usize = 4;

/// Title used for unnamed banks
const UNKNOWN_TITLE: &str = "TOS name unknown";

/// Rows of the largest bus frame; two of them are shown at once
const MAX_FIRST_ROW: i64 = 2;

fn main() {
    setup_linker();
    let config = validate_config();
    generate_settings(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate xtreme.toml at compile time
fn validate_config() -> toml::Value {
    // Re-run if xtreme.toml changes
    println!("cargo:rerun-if-changed=xtreme.toml");

    let config_path = Path::new("xtreme.toml");

    // Check if config file exists
    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: xtreme.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires an xtreme.toml settings file.             ║\n\
            ║  Please create one in the xtreme-firmware directory.             ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    // Read the config file
    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read xtreme.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in xtreme.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_required_sections(&config, &mut errors);
    validate_defaults(&config, &mut errors);
    validate_display(&config, &mut errors);
    validate_input(&config, &mut errors);
    validate_bus(&config, &mut errors);
    validate_system(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid settings in xtreme.toml                          ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=xtreme.toml validated successfully");
    config
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Validate that required sections exist
fn validate_required_sections(config: &toml::Value, errors: &mut Vec<String>) {
    for section in ["defaults", "display", "input", "bus", "system"] {
        match config.get(section) {
            Some(toml::Value::Table(_)) => {}
            Some(_) => errors.push(format!("[{}] must be a table", section)),
            None => errors.push(format!("Missing [{}] section", section)),
        }
    }
}

/// Integer field of `section`, checked against `min..=max`
fn integer(
    config: &toml::Value,
    section: &str,
    key: &str,
    min: i64,
    max: i64,
    errors: &mut Vec<String>,
) -> Option<i64> {
    match config.get(section).and_then(|s| s.get(key)) {
        Some(toml::Value::Integer(v)) if (min..=max).contains(v) => Some(*v),
        Some(toml::Value::Integer(_)) => {
            errors.push(format!("[{}] {} must be {}-{}", section, key, min, max));
            None
        }
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            None
        }
        None => {
            errors.push(format!("[{}] missing '{}'", section, key));
            None
        }
    }
}

/// String field of `section` that must be one of `choices`
fn choice<'a>(
    config: &'a toml::Value,
    section: &str,
    key: &str,
    choices: &[&str],
    errors: &mut Vec<String>,
) -> Option<&'a str> {
    match config.get(section).and_then(|s| s.get(key)) {
        Some(toml::Value::String(v)) if choices.contains(&v.as_str()) => Some(v.as_str()),
        Some(_) => {
            errors.push(format!(
                "[{}] {} must be '{}'",
                section,
                key,
                choices.join("' or '")
            ));
            None
        }
        None => {
            errors.push(format!("[{}] missing '{}'", section, key));
            None
        }
    }
}

fn validate_defaults(config: &toml::Value, errors: &mut Vec<String>) {
    match config.get("defaults").and_then(|d| d.get("titles")) {
        Some(toml::Value::Array(titles)) => {
            if titles.len() > ROM_BANKS {
                errors.push(format!("[defaults] at most {} titles", ROM_BANKS));
            }
            for (i, title) in titles.iter().enumerate() {
                match title.as_str() {
                    Some(t) if t.len() > TITLE_LEN => errors.push(format!(
                        "[defaults] title {} longer than {} characters",
                        i + 1,
                        TITLE_LEN
                    )),
                    Some(t) if !t.bytes().all(|b| (0x20..=0x7e).contains(&b)) => errors.push(
                        format!("[defaults] title {} must be printable ASCII", i + 1),
                    ),
                    Some(_) => {}
                    None => errors.push(format!("[defaults] title {} must be a string", i + 1)),
                }
            }
        }
        Some(_) => errors.push("[defaults] titles must be an array".to_string()),
        None => {}
    }

    integer(config, "defaults", "rom_bank", 1, ROM_BANKS as i64, errors);
    choice(config, "defaults", "sound", &["stereo", "mono"], errors);
    choice(config, "defaults", "boot", &["internal", "external"], errors);
}

fn validate_display(config: &toml::Value, errors: &mut Vec<String>) {
    integer(config, "display", "address", 0x08, 0x77, errors);
    integer(config, "display", "lcd_first_row", 0, MAX_FIRST_ROW, errors);
    integer(config, "display", "osd_first_row", 0, MAX_FIRST_ROW, errors);
    integer(config, "display", "notify_ms", 100, 60_000, errors);
}

fn validate_input(config: &toml::Value, errors: &mut Vec<String>) {
    integer(config, "input", "first_repeat_ms", 10, 5_000, errors);
    integer(config, "input", "repeat_ms", 10, 5_000, errors);
}

fn validate_bus(config: &toml::Value, errors: &mut Vec<String>) {
    integer(config, "bus", "lcd_address", 0x08, 0x77, errors);
    integer(config, "bus", "osd_address", 0x08, 0x77, errors);
}

fn validate_system(config: &toml::Value, errors: &mut Vec<String>) {
    // The IWDG reload counter tops out around 26 s; the loop needs > 10 ms
    integer(config, "system", "watchdog_ms", 50, 20_000, errors);
}

/// Write `settings.rs` into OUT_DIR
///
/// Only called after validation, so lookups cannot fail.
fn generate_settings(config: &toml::Value) {
    let int = |section: &str, key: &str| -> i64 {
        config
            .get(section)
            .and_then(|s| s.get(key))
            .and_then(|v| v.as_integer())
            .unwrap()
    };
    let text = |section: &str, key: &str| -> String {
        config
            .get(section)
            .and_then(|s| s.get(key))
            .and_then(|v| v.as_str())
            .unwrap()
            .to_string()
    };

    let mut titles: Vec<String> = config
        .get("defaults")
        .and_then(|d| d.get("titles"))
        .and_then(|t| t.as_array())
        .map(|t| t.iter().filter_map(|v| v.as_str()).map(str::to_string).collect())
        .unwrap_or_default();
    titles.resize(ROM_BANKS, UNKNOWN_TITLE.to_string());

    let sound = match text("defaults", "sound").as_str() {
        "mono" => "Mono",
        _ => "Stereo",
    };
    let boot = match text("defaults", "boot").as_str() {
        "external" => "External",
        _ => "Internal",
    };

    let mut out = String::new();
    writeln!(out, "// Generated by build.rs from xtreme.toml").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "pub const DEFAULT_TITLES: [&str; {}] = {:?};", ROM_BANKS, titles).unwrap();
    writeln!(out, "pub const DEFAULT_ROM_BANK: u8 = {};", int("defaults", "rom_bank")).unwrap();
    writeln!(
        out,
        "pub const DEFAULT_SOUND: xtreme_core::config::SoundMode = xtreme_core::config::SoundMode::{};",
        sound
    )
    .unwrap();
    writeln!(
        out,
        "pub const DEFAULT_BOOT: xtreme_core::config::BootSource = xtreme_core::config::BootSource::{};",
        boot
    )
    .unwrap();
    writeln!(out, "pub const DISPLAY_ADDRESS: u8 = {:#04x};", int("display", "address")).unwrap();
    writeln!(out, "pub const LCD_FIRST_ROW: usize = {};", int("display", "lcd_first_row")).unwrap();
    writeln!(out, "pub const OSD_FIRST_ROW: usize = {};", int("display", "osd_first_row")).unwrap();
    writeln!(out, "pub const NOTIFY_MS: u64 = {};", int("display", "notify_ms")).unwrap();
    writeln!(out, "pub const FIRST_REPEAT_MS: u64 = {};", int("input", "first_repeat_ms")).unwrap();
    writeln!(out, "pub const REPEAT_MS: u64 = {};", int("input", "repeat_ms")).unwrap();
    writeln!(out, "pub const LCD_BUS_ADDRESS: u8 = {:#04x};", int("bus", "lcd_address")).unwrap();
    writeln!(out, "pub const OSD_BUS_ADDRESS: u8 = {:#04x};", int("bus", "osd_address")).unwrap();
    writeln!(out, "pub const WATCHDOG_MS: u32 = {};", int("system", "watchdog_ms")).unwrap();

    let major = env::var("CARGO_PKG_VERSION_MAJOR").unwrap();
    let minor = env::var("CARGO_PKG_VERSION_MINOR").unwrap();
    writeln!(out, "pub const FW_MAJOR: u8 = {};", major).unwrap();
    writeln!(out, "pub const FW_MINOR: u8 = {};", minor).unwrap();

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("settings.rs"), out).unwrap();
}
