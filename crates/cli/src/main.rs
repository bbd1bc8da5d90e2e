use anyhow::Context;
use binuuid::{
    generate, optimized_from_env_value, to_hex_string, to_normal, to_optimized, to_raw_bytes,
    version_from_env_value, CodecConfig, NameSpec, UuidValue,
};
use binuuid_core::{KeyCodec, KeyedTable};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "binuuid")]
#[command(about = "Binary UUID key codec CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate new UUIDs
    Generate {
        /// UUID version (1, 3, 4 or 5); defaults to BINUUID_VERSION, then 4
        #[arg(long = "uuid-version")]
        uuid_version: Option<String>,
        /// Also print the optimized form; defaults to BINUUID_OPTIMIZED
        #[arg(long, overrides_with = "no_optimized")]
        optimized: bool,
        /// Do not print the optimized form, even if BINUUID_OPTIMIZED is set
        #[arg(long, overrides_with = "optimized")]
        no_optimized: bool,
        /// Namespace for versions 3 and 5 (dns, url, oid, x500 or a UUID)
        #[arg(long)]
        namespace: Option<String>,
        /// Name for versions 3 and 5
        #[arg(long)]
        name: Option<String>,
        /// Number of UUIDs to generate
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
    /// Print the 16 raw bytes of a canonical or hex UUID
    ToBytes {
        /// Canonical or 32-character hex UUID
        id: String,
    },
    /// Encode 16 bytes given in hex as a 32-character hex string
    ToHex {
        /// Bytes in hex, whitespace between bytes optional
        bytes: Vec<String>,
    },
    /// Convert a canonical UUID to the optimized form
    Optimize {
        /// Canonical hyphenated UUID
        canonical: String,
    },
    /// Convert an optimized string back to the canonical form
    Normalize {
        /// 32-character optimized string
        optimized: String,
    },
    /// Show every representation of a UUID
    Inspect {
        /// Canonical or 32-character hex UUID
        id: String,
    },
    /// Create rows in an in-memory table and print them in key order
    Demo {
        /// Number of rows to create
        #[arg(long, default_value_t = 5)]
        count: usize,
        /// UUID version; defaults to BINUUID_VERSION, then 4
        #[arg(long = "uuid-version")]
        uuid_version: Option<String>,
        /// Store keys in optimized order; defaults to BINUUID_OPTIMIZED
        #[arg(long, overrides_with = "no_optimized")]
        optimized: bool,
        /// Store keys in standard order, even if BINUUID_OPTIMIZED is set
        #[arg(long, overrides_with = "optimized")]
        no_optimized: bool,
    },
}

/// Resolve the startup configuration from optional environment values.
fn resolve_config(version: Option<String>, optimized: Option<String>) -> anyhow::Result<CodecConfig> {
    let version = version_from_env_value(version).context("BINUUID_VERSION")?;
    let optimized = optimized_from_env_value(optimized).context("BINUUID_OPTIMIZED")?;
    Ok(CodecConfig::new(optimized, version))
}

/// Collapse the `--optimized` / `--no-optimized` pair into an optional override.
fn optimized_flag(optimized: bool, no_optimized: bool) -> Option<bool> {
    match (optimized, no_optimized) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// Apply command-line overrides on top of the startup configuration.
///
/// The version override follows the same rules as `BINUUID_VERSION`.
fn with_overrides(
    config: CodecConfig,
    version: Option<String>,
    optimized: Option<bool>,
) -> anyhow::Result<CodecConfig> {
    let version = match version {
        Some(value) => version_from_env_value(Some(value)).context("--uuid-version")?,
        None => config.version,
    };
    Ok(CodecConfig::new(
        optimized.unwrap_or(config.optimized),
        version,
    ))
}

fn name_spec(namespace: Option<String>, name: Option<String>) -> anyhow::Result<Option<NameSpec>> {
    match (namespace, name) {
        (Some(namespace), Some(name)) => Ok(Some(NameSpec::new(
            NameSpec::namespace_from_str(&namespace)?,
            name,
        ))),
        (None, None) => Ok(None),
        _ => anyhow::bail!("--namespace and --name must be given together"),
    }
}

fn format_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_hex_bytes(args: &[String]) -> anyhow::Result<Vec<u8>> {
    let digits: String = args.concat().split_whitespace().collect();
    if digits.len() % 2 != 0 {
        anyhow::bail!("odd number of hex digits: '{}'", digits);
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            let pair = digits
                .get(i..i + 2)
                .with_context(|| format!("invalid hex: '{}'", digits))?;
            if !pair.bytes().all(|b| b.is_ascii_hexdigit()) {
                anyhow::bail!("invalid hex byte '{}'", pair);
            }
            u8::from_str_radix(pair, 16).with_context(|| format!("invalid hex byte '{}'", pair))
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("binuuid=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = resolve_config(
        std::env::var("BINUUID_VERSION").ok(),
        std::env::var("BINUUID_OPTIMIZED").ok(),
    )?;

    match cli.command {
        Some(Commands::Generate {
            uuid_version,
            optimized,
            no_optimized,
            namespace,
            name,
            count,
        }) => {
            let config =
                with_overrides(config, uuid_version, optimized_flag(optimized, no_optimized))?;
            let name = name_spec(namespace, name)?;
            for _ in 0..count {
                let value = generate(config.version, name.as_ref())?;
                if config.optimized {
                    println!("{} {}", value.canonical(), value.optimized());
                } else {
                    println!("{}", value.canonical());
                }
            }
        }
        Some(Commands::ToBytes { id }) => {
            println!("{}", format_bytes(&to_raw_bytes(&id)?));
        }
        Some(Commands::ToHex { bytes }) => {
            let bytes = parse_hex_bytes(&bytes)?;
            println!("{}", to_hex_string(&bytes)?);
        }
        Some(Commands::Optimize { canonical }) => {
            println!("{}", to_optimized(&canonical)?);
        }
        Some(Commands::Normalize { optimized }) => {
            println!("{}", to_normal(&optimized)?);
        }
        Some(Commands::Inspect { id }) => {
            let value = UuidValue::parse(&id)?;
            println!("canonical: {}", value.canonical());
            println!("hex:       {}", value.hex());
            println!("optimized: {}", value.optimized());
            println!("bytes:     {}", format_bytes(&value.bytes()));
            match value.version() {
                Some(version) => println!("version:   {}", version),
                None => println!("version:   {} (unsupported)", value.uuid().get_version_num()),
            }
            println!("variant:   {:?}", value.uuid().get_variant());
            if let Some(ts) = value.timestamp() {
                println!("timestamp: {}", ts.to_rfc3339());
            }
        }
        Some(Commands::Demo {
            count,
            uuid_version,
            optimized,
            no_optimized,
        }) => {
            let config =
                with_overrides(config, uuid_version, optimized_flag(optimized, no_optimized))?;
            tracing::info!(
                version = config.version.tag(),
                optimized = config.optimized,
                "creating {} rows",
                count
            );
            let mut table = KeyedTable::new(KeyCodec::new(config));
            for i in 0..count {
                let record = format!("row-{}", i);
                if config.version.is_name_based() {
                    let name = NameSpec::new(binuuid::Uuid::NAMESPACE_OID, &record);
                    table.create_named(record, &name)?;
                } else {
                    table.create(record)?;
                }
            }
            println!("{}", serde_json::to_string_pretty(&table.views()?)?);
        }
        None => {
            println!("Use 'binuuid --help' for commands");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use binuuid::UuidVersion;

    #[test]
    fn test_resolve_config_defaults() {
        let config = resolve_config(None, None).unwrap();
        assert_eq!(config, CodecConfig::default());
    }

    #[test]
    fn test_resolve_config_from_values() {
        let config = resolve_config(Some("1".into()), Some("true".into())).unwrap();
        assert_eq!(config, CodecConfig::time_ordered());
        assert!(resolve_config(Some("abc".into()), None).is_err());
        assert!(resolve_config(None, Some("abc".into())).is_err());
    }

    #[test]
    fn test_with_overrides() {
        let base = CodecConfig::default();
        assert_eq!(with_overrides(base, None, None).unwrap(), base);
        assert_eq!(
            with_overrides(base, Some("1".into()), Some(true)).unwrap(),
            CodecConfig::time_ordered()
        );
        assert_eq!(
            with_overrides(base, Some("2".into()), None).unwrap().version,
            UuidVersion::V4
        );
        assert!(with_overrides(base, Some("latest".into()), None).is_err());
    }

    #[test]
    fn test_with_overrides_out_of_range_version_falls_back() {
        let base = CodecConfig::time_ordered();
        let config = with_overrides(base, Some("300".into()), None).unwrap();
        assert_eq!(config.version, UuidVersion::V4);
        assert!(config.optimized);
    }

    #[test]
    fn test_with_overrides_can_disable_optimized() {
        let from_env = resolve_config(None, Some("true".into())).unwrap();
        assert!(from_env.optimized);

        let config = with_overrides(from_env, None, optimized_flag(false, true)).unwrap();
        assert!(!config.optimized);

        let config = with_overrides(from_env, None, optimized_flag(false, false)).unwrap();
        assert!(config.optimized);
    }

    #[test]
    fn test_cli_optimized_flags() {
        let cli = Cli::try_parse_from(["binuuid", "demo", "--optimized", "--no-optimized"]).unwrap();
        match cli.command {
            Some(Commands::Demo {
                optimized,
                no_optimized,
                ..
            }) => assert_eq!(optimized_flag(optimized, no_optimized), Some(false)),
            _ => panic!("Expected demo command"),
        }

        let cli = Cli::try_parse_from(["binuuid", "generate", "--uuid-version", "300"]).unwrap();
        match cli.command {
            Some(Commands::Generate { uuid_version, .. }) => {
                assert_eq!(uuid_version.as_deref(), Some("300"));
            }
            _ => panic!("Expected generate command"),
        }
    }

    #[test]
    fn test_name_spec_requires_both() {
        assert!(name_spec(None, None).unwrap().is_none());
        assert!(name_spec(Some("dns".into()), None).is_err());
        assert!(name_spec(None, Some("python.org".into())).is_err());
        let spec = name_spec(Some("dns".into()), Some("python.org".into()))
            .unwrap()
            .unwrap();
        assert_eq!(spec.namespace, binuuid::Uuid::NAMESPACE_DNS);
        assert_eq!(spec.name, b"python.org");
    }

    #[test]
    fn test_parse_hex_bytes() {
        let args = vec!["12 3e 45 67".to_string(), "e89b12d3a456426614174000".to_string()];
        let bytes = parse_hex_bytes(&args).unwrap();
        assert_eq!(bytes.len(), 16);
        assert_eq!(
            to_hex_string(&bytes).unwrap(),
            "123e4567e89b12d3a456426614174000"
        );
        assert!(parse_hex_bytes(&["abc".to_string()]).is_err());
        assert!(parse_hex_bytes(&["zz".to_string()]).is_err());
    }

    #[test]
    fn test_parse_hex_bytes_rejects_sign() {
        assert!(parse_hex_bytes(&["+1".to_string()]).is_err());
        assert!(parse_hex_bytes(&vec!["+1".to_string(); 16]).is_err());
        assert!(parse_hex_bytes(&["-1".to_string()]).is_err());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(&[0x12, 0x3e, 0x00]), "12 3e 00");
        assert_eq!(format_bytes(&[]), "");
    }
}
