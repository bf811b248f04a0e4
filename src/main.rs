use clap::{Arg, ArgAction, Command};
use domainguard::{AnalyzerConfig, AnalysisTarget, DomainAnalyzer, Severity};
use log::LevelFilter;
use std::process;

#[tokio::main]
async fn main() {
    let matches = Command::new("domainguard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Scores a domain's scam likelihood from live network signals")
        .arg(
            Arg::new("domain")
                .value_name("DOMAIN")
                .help("Domain name or URL to analyze")
                .required_unless_present("generate-config"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path (YAML)"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Write the default configuration to a file and exit")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .value_name("SECS")
                .help("Cap every probe budget at this many seconds")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Emit the full analysis result as JSON")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging with per-probe detail")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(path) = matches.get_one::<String>("generate-config") {
        match generate_config(path) {
            Ok(()) => {
                println!("Default configuration written to {path}");
                return;
            }
            Err(e) => {
                eprintln!("Error: failed to write configuration: {e}");
                process::exit(1);
            }
        }
    }

    let mut config = match matches.get_one::<String>("config") {
        Some(path) => match AnalyzerConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {e:#}");
                process::exit(1);
            }
        },
        None => AnalyzerConfig::default(),
    };

    if let Some(cap) = matches.get_one::<u64>("timeout") {
        let probes = &mut config.probes;
        for budget in [
            &mut probes.registration_secs,
            &mut probes.certificate_secs,
            &mut probes.resolution_secs,
            &mut probes.threat_list_secs,
            &mut probes.hosting_secs,
            &mut probes.content_secs,
        ] {
            *budget = (*budget).min(*cap);
        }
    }

    let raw = matches
        .get_one::<String>("domain")
        .expect("clap enforces the domain argument");
    let target = match AnalysisTarget::parse(raw) {
        Ok(target) => target,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let analyzer = match DomainAnalyzer::new(config) {
        Ok(analyzer) => analyzer,
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    };

    let result = analyzer.analyze(&target).await;

    if matches.get_flag("json") {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: failed to serialize result: {e}");
                process::exit(1);
            }
        }
    } else {
        print_report(&result);
    }

    // Non-zero exit for flagged domains so shell pipelines can branch
    if result.verdict != domainguard::Verdict::Safe {
        process::exit(2);
    }
}

fn generate_config(path: &str) -> anyhow::Result<()> {
    let yaml = serde_yaml::to_string(&AnalyzerConfig::default())?;
    std::fs::write(path, yaml)?;
    Ok(())
}

fn print_report(result: &domainguard::AnalysisResult) {
    println!("Domain:     {}", result.domain);
    println!("Verdict:    {}", result.verdict);
    println!("Risk score: {:.1}/100", result.final_score);
    println!(
        "Breakdown:  model {:.1}, rules {:.1}",
        result.components.ml_score, result.components.rule_score
    );
    println!("Confidence: {:.0}%", result.confidence * 100.0);
    println!();

    for reason in &result.reasons {
        let marker = match reason.severity {
            Severity::Critical => "!!",
            Severity::Warning => " !",
            Severity::Positive => " +",
        };
        println!("{marker} {}", reason.text);
    }

    let degraded = result.signals.degraded_probes();
    if !degraded.is_empty() {
        println!();
        println!("Probes without data: {}", degraded.join(", "));
    }
}
